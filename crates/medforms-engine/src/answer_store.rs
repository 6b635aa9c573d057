use medforms_core::{Field, FieldKey, Form};

use crate::answers::{AnswerSet, AnswerValue};
use crate::error::EngineError;
use crate::evaluate::{ErrorMap, validate};
use crate::schema::{RuleSet, derive_rules};
use crate::visibility::{locate_any, visible_nested_fields};

/// Live answers plus the errors last shown for them.
///
/// The store never caches derived rules: every check recomputes them from
/// the current answers, so a deselected branch can never contribute a rule.
#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    answers: AnswerSet,
    errors: ErrorMap,
}

impl AnswerStore {
    pub fn new(answers: AnswerSet) -> Self {
        Self {
            answers,
            errors: ErrorMap::new(),
        }
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Record an answer after checking that `key` names an input field of
    /// `form` and that the value has the right shape for it.
    pub fn set_answer(
        &mut self,
        form: &Form,
        key: FieldKey,
        value: AnswerValue,
    ) -> Result<(), EngineError> {
        let field = locate_any(form, &key).ok_or_else(|| EngineError::UnknownField(key.to_string()))?;
        check_shape(field, &key, &value)?;

        tracing::debug!(key = %key, "answer recorded");
        self.errors.remove(&key);
        self.answers.set(key, value);
        Ok(())
    }

    pub fn clear_answer(&mut self, key: &FieldKey) -> Option<AnswerValue> {
        self.errors.remove(key);
        self.answers.remove(key)
    }

    pub fn rules(&self, form: &Form) -> RuleSet {
        derive_rules(form, &self.answers)
    }

    /// Validate and remember the resulting errors.
    pub fn validate(&mut self, form: &Form) -> &ErrorMap {
        self.errors = validate(form, &self.answers);
        &self.errors
    }

    /// Drop previously shown errors whose key is no longer validated, e.g.
    /// after the governing option was deselected.
    pub fn refresh_errors(&mut self, form: &Form) {
        if self.errors.is_empty() {
            return;
        }
        let current = validate(form, &self.answers);
        self.errors.retain(|key, _| current.contains_key(key));
    }

    pub fn visible_nested_fields<'f>(&self, form: &'f Form, key: &FieldKey) -> Vec<&'f Field> {
        visible_nested_fields(form, &self.answers, key)
    }

    /// Forget every answer and error keyed under `field_id`.
    pub fn discard_field(&mut self, field_id: &str) {
        let removed = self.answers.remove_field(field_id);
        self.errors.retain(|key, _| !key.passes_through(field_id));
        if removed > 0 {
            tracing::debug!(field_id, removed, "discarded answers of removed field");
        }
    }
}

fn check_shape(field: &Field, key: &FieldKey, value: &AnswerValue) -> Result<(), EngineError> {
    if !field.is_input() {
        return Err(EngineError::NotAnInput(key.to_string()));
    }
    if !value.fits(field.kind) {
        let expected = match value {
            AnswerValue::Text(_) => "a set of selected option values",
            AnswerValue::Selection(_) => "a single string",
        };
        return Err(EngineError::AnswerShape {
            key: key.to_string(),
            expected,
        });
    }
    Ok(())
}
