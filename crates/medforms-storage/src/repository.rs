use std::sync::Arc;

use medforms_core::store_keys::{FORM_TO_EDIT, FORMS};
use medforms_core::{Form, FormSummary, slugify};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::StorageError;
use crate::state::save_state;
use crate::store::KeyValueStore;

/// Saved forms and the edit pointer, on top of a [`KeyValueStore`].
///
/// Every read treats the stored JSON as untrusted. A collection that cannot
/// be read at all is reset to `[]`; individual entries that are not valid
/// forms are skipped while their siblings are kept.
#[derive(Clone)]
pub struct FormRepository {
    store: Arc<dyn KeyValueStore>,
}

impl FormRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All saved forms, in save order.
    pub fn list(&self) -> Result<Vec<Form>, StorageError> {
        let Some(raw) = self.store.get(FORMS)? else {
            return Ok(Vec::new());
        };

        match parse_collection(&raw) {
            Ok(forms) => Ok(forms),
            Err(reason) => {
                tracing::warn!(key = FORMS, %reason, "stored forms unreadable, resetting to empty");
                self.store.put(FORMS, "[]")?;
                Ok(Vec::new())
            }
        }
    }

    pub fn summaries(&self) -> Result<Vec<FormSummary>, StorageError> {
        Ok(self.list()?.iter().map(Form::summary).collect())
    }

    pub fn get(&self, id: Uuid) -> Result<Form, StorageError> {
        self.list()?
            .into_iter()
            .find(|f| f.id == Some(id))
            .ok_or_else(|| StorageError::NotFound {
                key: id.to_string(),
            })
    }

    /// Validate, stamp and store `form`. A form whose id is already stored
    /// replaces that entry in place and keeps its first `createdAt`;
    /// anything else is appended.
    pub fn save(&self, mut form: Form) -> Result<Form, StorageError> {
        form.validate_for_save()?;

        let mut forms = self.list()?;
        let position = form
            .id
            .and_then(|id| forms.iter().position(|f| f.id == Some(id)));
        if let Some(index) = position {
            form.created_at = forms[index].created_at.or(form.created_at);
            if form.updated_at < forms[index].updated_at {
                form.updated_at = forms[index].updated_at;
            }
        }
        form.save()?;

        match position {
            Some(index) => forms[index] = form.clone(),
            None => forms.push(form.clone()),
        }
        save_state(self.store.as_ref(), FORMS, &forms)?;

        tracing::info!(
            form_id = ?form.id,
            fields = form.total_field_count(),
            replaced = position.is_some(),
            "form saved"
        );
        Ok(form)
    }

    pub fn delete(&self, id: Uuid) -> Result<Form, StorageError> {
        let mut forms = self.list()?;
        let index = forms
            .iter()
            .position(|f| f.id == Some(id))
            .ok_or_else(|| StorageError::NotFound {
                key: id.to_string(),
            })?;
        let removed = forms.remove(index);
        save_state(self.store.as_ref(), FORMS, &forms)?;

        if self.editing()? == Some(id) {
            self.clear_edit()?;
        }

        tracing::info!(form_id = %id, "form deleted");
        Ok(removed)
    }

    /// Point the builder at a saved form.
    pub fn begin_edit(&self, id: Uuid) -> Result<(), StorageError> {
        self.get(id)?;
        self.store.put(FORM_TO_EDIT, &id.to_string())?;
        tracing::debug!(form_id = %id, "edit pointer set");
        Ok(())
    }

    /// Id of the form currently being edited, if any.
    pub fn editing(&self) -> Result<Option<Uuid>, StorageError> {
        let Some(raw) = self.store.get(FORM_TO_EDIT)? else {
            return Ok(None);
        };
        match raw.trim().trim_matches('"').parse::<Uuid>() {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                tracing::warn!(key = FORM_TO_EDIT, error = %e, "edit pointer unreadable, clearing");
                self.clear_edit()?;
                Ok(None)
            }
        }
    }

    pub fn clear_edit(&self) -> Result<(), StorageError> {
        self.store.delete(FORM_TO_EDIT)
    }

    /// The form the edit pointer refers to. A pointer to a form that no
    /// longer exists is cleared.
    pub fn load_for_edit(&self) -> Result<Option<Form>, StorageError> {
        let Some(id) = self.editing()? else {
            return Ok(None);
        };
        match self.get(id) {
            Ok(form) => Ok(Some(form)),
            Err(StorageError::NotFound { .. }) => {
                tracing::warn!(form_id = %id, "edit pointer refers to a missing form, clearing");
                self.clear_edit()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn parse_collection(raw: &str) -> Result<Vec<Form>, String> {
    let value: Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(entries) => entries,
        other => return Err(format!("expected an array, found {}", json_kind(&other))),
    };

    let mut forms = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match parse_entry(entry) {
            Ok(form) => forms.push(form),
            Err(reason) => {
                tracing::warn!(key = FORMS, index, %reason, "skipping invalid stored form");
            }
        }
    }
    Ok(forms)
}

fn parse_entry(mut entry: Value) -> Result<Form, String> {
    let kind = json_kind(&entry);
    let object = entry
        .as_object_mut()
        .ok_or_else(|| format!("expected an object, found {kind}"))?;
    match object.get_mut("fields") {
        Some(Value::Array(fields)) => normalize_fields(fields),
        _ => return Err("missing fields array".to_string()),
    }

    let mut form: Form = serde_json::from_value(entry).map_err(|e| e.to_string())?;
    if form.id.is_none() {
        return Err("missing id".to_string());
    }
    form.retain_labelled();
    Ok(form)
}

/// Drop field entries that cannot be a field at all and rewrite legacy plain
/// string options as `{ value, label }` objects, at every depth.
fn normalize_fields(fields: &mut Vec<Value>) {
    fields.retain(|f| f.get("label").is_some_and(Value::is_string));
    for field in fields.iter_mut() {
        let Some(Value::Array(options)) = field.get_mut("options") else {
            continue;
        };
        for option in options.iter_mut() {
            if let Value::String(label) = option {
                *option = legacy_option(label);
            }
            if let Some(Value::Array(nested)) = option.get_mut("nestedFields") {
                normalize_fields(nested);
            }
        }
    }
}

fn legacy_option(label: &str) -> Value {
    let mut object = Map::new();
    object.insert("value".into(), Value::String(slugify(label)));
    object.insert("label".into(), Value::String(label.trim().to_string()));
    Value::Object(object)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
