use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::field::Field;

/// One selectable choice of a select, radio or checkbox field.
///
/// Nested fields only become relevant while this option is the active
/// selection of its parent field. Two options are equal when their `value`s
/// are equal.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FieldOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub nested_fields: Vec<Field>,
}

impl FieldOption {
    /// Build an option from display text; the value is the slug of the label.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into().trim().to_string();
        Self {
            value: slugify(&label),
            label,
            nested_fields: Vec::new(),
        }
    }

    pub fn with_value(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            nested_fields: Vec::new(),
        }
    }

    /// Change the display text and re-derive the value from it.
    pub fn relabel(&mut self, label: &str) {
        self.label = label.trim().to_string();
        self.value = slugify(&self.label);
    }

    pub fn add_nested_field(&mut self, field: Field) {
        self.nested_fields.push(field);
    }

    pub fn remove_nested_field(&mut self, field_id: &str) -> Option<Field> {
        let index = self.nested_fields.iter().position(|f| f.id == field_id)?;
        Some(self.nested_fields.remove(index))
    }

    pub fn has_nested_fields(&self) -> bool {
        !self.nested_fields.is_empty()
    }
}

impl PartialEq for FieldOption {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for FieldOption {}

impl From<&str> for FieldOption {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for FieldOption {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

/// Lowercase the label and join its whitespace-separated words with `_`.
pub fn slugify(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
