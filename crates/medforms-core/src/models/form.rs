use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::field::{Field, FieldKind};
use super::option::FieldOption;
use crate::error::FormError;

/// A form definition authored in the builder.
///
/// `id` and `created_at` are assigned by the first successful [`Form::save`]
/// and never change afterwards; `updated_at` advances on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Form {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

/// Partial update of a field coming from the builder's property editor.
/// `None` leaves the corresponding property untouched. `defaultValue: null`
/// clears the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FieldPatch {
    #[serde(default, rename = "type")]
    pub kind: Option<FieldKind>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[ts(optional, as = "Option<Option<String>>")]
    pub default_value: Option<Option<String>>,
    #[serde(default)]
    pub options: Option<Vec<FieldOption>>,
}

/// Row of the saved-forms listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FormSummary {
    pub id: Option<Uuid>,
    pub title: String,
    pub field_count: usize,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl Form {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: description.into(),
            fields: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Empty form as a new builder session starts it.
    pub fn untitled() -> Self {
        Self::new("Untitled Form", "")
    }

    /// Append a new field of `kind` with its default label.
    pub fn add_field(&mut self, kind: FieldKind) -> &mut Field {
        self.push_field(Field::create(kind, ""))
    }

    pub fn push_field(&mut self, field: Field) -> &mut Field {
        self.fields.push(field);
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }

    /// Look up a field anywhere in the tree.
    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find_map(|f| f.find(id))
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find_map(|f| f.find_mut(id))
    }

    /// Apply `patch` to the field `id`. The patch lands as a whole or not at
    /// all: on error the field is left exactly as it was.
    pub fn update_field(&mut self, id: &str, patch: FieldPatch) -> Result<&Field, FormError> {
        let field = self
            .field_mut(id)
            .ok_or_else(|| FormError::FieldNotFound(id.to_string()))?;

        let mut patched = field.clone();
        if let Some(kind) = patch.kind {
            patched.set_kind(kind);
        }
        if let Some(label) = patch.label {
            patched.set_label(&label);
        }
        if let Some(required) = patch.required {
            patched.set_required(required);
        }
        if let Some(default_value) = patch.default_value {
            patched.set_default_value(default_value);
        }
        if let Some(options) = patch.options {
            patched.set_options(options)?;
        }

        *field = patched;
        Ok(field)
    }

    /// Remove a field, top-level or nested, together with its subtree.
    pub fn remove_field(&mut self, id: &str) -> Result<Field, FormError> {
        if let Some(index) = self.fields.iter().position(|f| f.id == id) {
            return Ok(self.fields.remove(index));
        }
        self.fields
            .iter_mut()
            .find_map(|f| f.remove_descendant(id))
            .ok_or_else(|| FormError::FieldNotFound(id.to_string()))
    }

    /// Move the top-level field at `from` so that it ends up at `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), FormError> {
        let len = self.fields.len();
        for index in [from, to] {
            if index >= len {
                return Err(FormError::IndexOutOfRange { index, len });
            }
        }
        let field = self.fields.remove(from);
        self.fields.insert(to, field);
        Ok(())
    }

    /// Attach `field` under option `option_value` of the field `parent_id`,
    /// which may itself be nested.
    pub fn add_nested_field(
        &mut self,
        parent_id: &str,
        option_value: &str,
        field: Field,
    ) -> Result<(), FormError> {
        let parent = self
            .field_mut(parent_id)
            .ok_or_else(|| FormError::FieldNotFound(parent_id.to_string()))?;
        parent.add_nested_field(option_value, field)
    }

    /// Check the save-time invariants without stamping anything.
    pub fn validate_for_save(&self) -> Result<(), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::EmptyTitle);
        }
        if self.fields.is_empty() {
            return Err(FormError::NoFields);
        }
        if let Some(field_id) = self.fields.iter().find_map(Field::first_unlabelled) {
            return Err(FormError::EmptyLabel {
                field_id: field_id.clone(),
            });
        }
        Ok(())
    }

    pub fn save(&mut self) -> Result<(), FormError> {
        self.save_at(Timestamp::now())
    }

    /// Save with an explicit clock reading. `updated_at` is kept strictly
    /// increasing even if the clock does not move between two saves.
    pub fn save_at(&mut self, now: Timestamp) -> Result<(), FormError> {
        self.validate_for_save()?;

        let stamp = match self.updated_at {
            Some(previous) if now <= previous => previous
                .checked_add(SignedDuration::from_nanos(1))
                .unwrap_or(now),
            _ => now,
        };

        if self.id.is_none() {
            self.id = Some(Uuid::new_v4());
        }
        if self.created_at.is_none() {
            self.created_at = Some(stamp);
        }
        self.updated_at = Some(stamp);
        Ok(())
    }

    /// Every field in the tree, nested ones included.
    pub fn total_field_count(&self) -> usize {
        self.fields.iter().map(|f| 1 + f.descendant_count()).sum()
    }

    /// Drop fields without a label at every depth. Stored forms written by
    /// older builders may contain such placeholders.
    pub fn retain_labelled(&mut self) {
        self.fields.retain(|f| !f.label.trim().is_empty());
        for field in &mut self.fields {
            field.retain_labelled();
        }
    }

    pub fn summary(&self) -> FormSummary {
        FormSummary {
            id: self.id,
            title: self.title.clone(),
            field_count: self.total_field_count(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
