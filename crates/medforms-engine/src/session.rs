use jiff::Timestamp;
use medforms_core::{Field, FieldKey, Form};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answer_store::AnswerStore;
use crate::answers::{AnswerSet, AnswerValue};
use crate::error::EngineError;
use crate::evaluate::ErrorMap;
use crate::flatten::{ResultTree, flatten};
use crate::schema::RuleSet;

/// Lifecycle of one filled form. Validation runs synchronously inside
/// [`FillSession::submit`], which lands in `Invalid` or `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Empty,
    Editing,
    Invalid,
    Submitted,
}

/// Frozen result of a successful submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub form_id: Option<Uuid>,
    pub title: String,
    pub answers: AnswerSet,
    pub result: ResultTree,
    pub submitted_at: Timestamp,
}

/// A user filling one form.
#[derive(Debug, Clone)]
pub struct FillSession {
    form: Form,
    store: AnswerStore,
    state: SessionState,
    submission: Option<Submission>,
}

impl FillSession {
    /// Start filling `form`, with answers seeded from field defaults.
    pub fn open(form: Form) -> Self {
        let answers = AnswerSet::seeded(&form);
        let state = if answers.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Editing
        };
        Self {
            store: AnswerStore::new(answers),
            form,
            state,
            submission: None,
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn answers(&self) -> &AnswerSet {
        self.store.answers()
    }

    pub fn errors(&self) -> &ErrorMap {
        self.store.errors()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn set_answer(&mut self, key: FieldKey, value: AnswerValue) -> Result<(), EngineError> {
        self.ensure_open()?;
        self.store.set_answer(&self.form, key, value)?;
        self.store.refresh_errors(&self.form);
        self.state = SessionState::Editing;
        Ok(())
    }

    pub fn clear_answer(&mut self, key: &FieldKey) -> Result<Option<AnswerValue>, EngineError> {
        self.ensure_open()?;
        let previous = self.store.clear_answer(key);
        self.store.refresh_errors(&self.form);
        self.state = SessionState::Editing;
        Ok(previous)
    }

    pub fn visible_nested_fields(&self, key: &FieldKey) -> Vec<&Field> {
        self.store.visible_nested_fields(&self.form, key)
    }

    /// Rules currently in force.
    pub fn rules(&self) -> RuleSet {
        self.store.rules(&self.form)
    }

    /// Check the answers without changing state.
    pub fn validate(&self) -> ErrorMap {
        crate::evaluate::validate(&self.form, self.store.answers())
    }

    /// Validate and, when clean, freeze the answers and flatten them.
    pub fn submit(&mut self) -> Result<Submission, EngineError> {
        self.ensure_open()?;

        let errors = self.store.validate(&self.form).clone();
        if !errors.is_empty() {
            self.state = SessionState::Invalid;
            tracing::debug!(
                form_id = ?self.form.id,
                errors = errors.len(),
                "submission rejected"
            );
            return Err(EngineError::Invalid { errors });
        }

        let answers = self.store.answers().clone();
        let submission = Submission {
            form_id: self.form.id,
            title: self.form.title.clone(),
            result: flatten(&self.form, &answers),
            answers,
            submitted_at: Timestamp::now(),
        };
        self.state = SessionState::Submitted;
        self.submission = Some(submission.clone());

        tracing::info!(form_id = ?self.form.id, "form submitted");
        Ok(submission)
    }

    fn ensure_open(&self) -> Result<(), EngineError> {
        if self.state == SessionState::Submitted {
            return Err(EngineError::SessionSubmitted);
        }
        Ok(())
    }
}
