use medforms_core::{Field, FieldId, FieldKey, FieldKind, FieldPatch, Form, FormError};

use crate::answer_store::AnswerStore;
use crate::answers::{AnswerSet, AnswerValue};
use crate::error::EngineError;
use crate::evaluate::ErrorMap;

/// A form being authored, with the answers typed into its live preview.
///
/// Removing a field also forgets every preview answer and error keyed under
/// it, so the preview never shows state for a field that no longer exists.
#[derive(Debug, Clone)]
pub struct BuilderSession {
    form: Form,
    preview: AnswerStore,
}

impl BuilderSession {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::edit(Form::new(title, description))
    }

    /// Reopen a saved form for editing.
    pub fn edit(form: Form) -> Self {
        let answers = AnswerSet::seeded(&form);
        Self {
            form,
            preview: AnswerStore::new(answers),
        }
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn into_form(self) -> Form {
        self.form
    }

    pub fn set_title(&mut self, title: &str) {
        self.form.title = title.to_string();
    }

    pub fn set_description(&mut self, description: &str) {
        self.form.description = description.to_string();
    }

    pub fn add_field(&mut self, kind: FieldKind) -> FieldId {
        self.form.add_field(kind).id.clone()
    }

    pub fn update_field(&mut self, id: &str, patch: FieldPatch) -> Result<&Field, FormError> {
        self.form.update_field(id, patch)
    }

    pub fn field_mut(&mut self, id: &str) -> Result<&mut Field, FormError> {
        self.form
            .field_mut(id)
            .ok_or_else(|| FormError::FieldNotFound(id.to_string()))
    }

    pub fn set_options_from_input(&mut self, id: &str, input: &str) -> Result<(), FormError> {
        self.field_mut(id)?.set_options_from_input(input)
    }

    /// Add a new nested field of `kind` under option `option_value` of
    /// `parent_id`.
    pub fn add_nested_field(
        &mut self,
        parent_id: &str,
        option_value: &str,
        kind: FieldKind,
    ) -> Result<FieldId, FormError> {
        let field = Field::create(kind, "");
        let id = field.id.clone();
        self.form.add_nested_field(parent_id, option_value, field)?;
        Ok(id)
    }

    /// Delete a field and cascade to the preview answers and errors of it
    /// and of everything nested beneath it.
    pub fn remove_field(&mut self, id: &str) -> Result<Field, FormError> {
        let removed = self.form.remove_field(id)?;
        self.preview.discard_field(&removed.id);
        tracing::debug!(field_id = %removed.id, "field removed");
        Ok(removed)
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), FormError> {
        self.form.reorder(from, to)
    }

    pub fn set_preview_answer(&mut self, key: FieldKey, value: AnswerValue) -> Result<(), EngineError> {
        self.preview.set_answer(&self.form, key, value)?;
        self.preview.refresh_errors(&self.form);
        Ok(())
    }

    pub fn preview_answers(&self) -> &AnswerSet {
        self.preview.answers()
    }

    pub fn preview_errors(&self) -> &ErrorMap {
        self.preview.errors()
    }

    pub fn validate_preview(&mut self) -> &ErrorMap {
        self.preview.validate(&self.form)
    }

    /// Stamp and return the form if it passes the save-time checks.
    pub fn save(&mut self) -> Result<&Form, FormError> {
        self.form.save()?;
        Ok(&self.form)
    }
}
