use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::option::FieldOption;
use crate::error::FormError;

/// Opaque, stable field identity. Generated once and preserved across edits.
pub type FieldId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum FieldKind {
    Text,
    Date,
    Select,
    Radio,
    Checkbox,
    /// Display-only section title. Never validated, never answered.
    Heading,
}

impl FieldKind {
    pub const ALL: [FieldKind; 6] = [
        FieldKind::Text,
        FieldKind::Date,
        FieldKind::Select,
        FieldKind::Radio,
        FieldKind::Checkbox,
        FieldKind::Heading,
    ];

    /// Kinds that carry an option list.
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }

    pub fn is_input(self) -> bool {
        self != Self::Heading
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Date => "date",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Heading => "heading",
        }
    }

    /// Label given to a freshly added field, e.g. "Radio Field".
    pub fn default_label(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("{}{} Field", first.to_uppercase(), chars.as_str()),
            None => String::new(),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single input or display unit of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Field {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}

impl Field {
    /// Create a field with a fresh id. An empty label falls back to the
    /// kind's default label.
    pub fn create(kind: FieldKind, label: impl Into<String>) -> Self {
        let label = label.into().trim().to_string();
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            label: if label.is_empty() {
                kind.default_label()
            } else {
                label
            },
            required: false,
            default_value: None,
            options: Vec::new(),
        }
    }

    pub fn is_choice(&self) -> bool {
        self.kind.is_choice()
    }

    pub fn is_input(&self) -> bool {
        self.kind.is_input()
    }

    pub fn set_label(&mut self, label: &str) {
        self.label = label.trim().to_string();
    }

    /// Headings are never required.
    pub fn set_required(&mut self, required: bool) {
        self.required = required && self.kind.is_input();
    }

    pub fn set_default_value(&mut self, value: Option<String>) {
        self.default_value = if self.kind.is_input() { value } else { None };
    }

    /// Switching to a non-choice kind discards the option list together with
    /// every nested field under it.
    pub fn set_kind(&mut self, kind: FieldKind) {
        self.kind = kind;
        if !kind.is_choice() {
            self.options.clear();
        }
        if !kind.is_input() {
            self.required = false;
            self.default_value = None;
        }
    }

    /// Replace the option list.
    ///
    /// Labels are trimmed, blank entries dropped, and entries whose value
    /// collides with an earlier one are discarded (first occurrence wins).
    pub fn set_options<I, O>(&mut self, options: I) -> Result<(), FormError>
    where
        I: IntoIterator<Item = O>,
        O: Into<FieldOption>,
    {
        if !self.is_choice() {
            return Err(FormError::NotAChoiceField(self.id.clone()));
        }

        let mut seen = HashSet::new();
        let mut cleaned = Vec::new();
        for option in options {
            let mut option = option.into();
            option.label = option.label.trim().to_string();
            if option.value.trim().is_empty() {
                option.value = super::option::slugify(&option.label);
            }
            if option.label.is_empty() || option.value.is_empty() {
                continue;
            }
            if seen.insert(option.value.clone()) {
                cleaned.push(option);
            }
        }

        self.options = cleaned;
        Ok(())
    }

    /// Replace the option list from comma-separated pill input.
    ///
    /// Existing options whose value survives keep their nested fields.
    pub fn set_options_from_input(&mut self, input: &str) -> Result<(), FormError> {
        let mut previous = std::mem::take(&mut self.options);
        let parsed = input.split(',').map(|label| {
            let fresh = FieldOption::new(label);
            match previous.iter().position(|o| o.value == fresh.value) {
                Some(index) => {
                    let mut kept = previous.swap_remove(index);
                    kept.label = fresh.label;
                    kept
                }
                None => fresh,
            }
        });
        let parsed: Vec<FieldOption> = parsed.collect();
        self.set_options(parsed)
    }

    pub fn add_option(
        &mut self,
        option: impl Into<FieldOption>,
    ) -> Result<&mut FieldOption, FormError> {
        if !self.is_choice() {
            return Err(FormError::NotAChoiceField(self.id.clone()));
        }
        let option = option.into();
        if option.label.trim().is_empty() || option.value.is_empty() {
            return Err(FormError::EmptyOptionLabel);
        }
        if self.options.contains(&option) {
            return Err(FormError::DuplicateOption {
                field_id: self.id.clone(),
                value: option.value,
            });
        }
        self.options.push(option);
        let last = self.options.len() - 1;
        Ok(&mut self.options[last])
    }

    pub fn remove_option(&mut self, value: &str) -> Result<FieldOption, FormError> {
        let index = self
            .options
            .iter()
            .position(|o| o.value == value)
            .ok_or_else(|| self.option_not_found(value))?;
        Ok(self.options.remove(index))
    }

    /// Edit an option's label in place. The value is re-derived, and must not
    /// collide with a sibling option.
    pub fn rename_option(&mut self, value: &str, label: &str) -> Result<(), FormError> {
        let new_value = super::option::slugify(label);
        if new_value.is_empty() {
            return Err(FormError::EmptyOptionLabel);
        }
        if new_value != value && self.options.iter().any(|o| o.value == new_value) {
            return Err(FormError::DuplicateOption {
                field_id: self.id.clone(),
                value: new_value,
            });
        }
        let not_found = self.option_not_found(value);
        let option = self.option_mut(value).ok_or(not_found)?;
        option.relabel(label);
        Ok(())
    }

    pub fn option(&self, value: &str) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.value == value)
    }

    pub fn option_mut(&mut self, value: &str) -> Option<&mut FieldOption> {
        self.options.iter_mut().find(|o| o.value == value)
    }

    /// Attach `field` under the option `option_value` of this field.
    pub fn add_nested_field(&mut self, option_value: &str, field: Field) -> Result<(), FormError> {
        if !self.is_choice() {
            return Err(FormError::NotAChoiceField(self.id.clone()));
        }
        let not_found = self.option_not_found(option_value);
        let option = self.option_mut(option_value).ok_or(not_found)?;
        option.add_nested_field(field);
        Ok(())
    }

    /// Look up this field or any field nested beneath it.
    pub fn find(&self, id: &str) -> Option<&Field> {
        if self.id == id {
            return Some(self);
        }
        self.options
            .iter()
            .flat_map(|o| &o.nested_fields)
            .find_map(|nested| nested.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Field> {
        if self.id == id {
            return Some(self);
        }
        self.options
            .iter_mut()
            .flat_map(|o| o.nested_fields.iter_mut())
            .find_map(|nested| nested.find_mut(id))
    }

    /// Detach a field nested anywhere beneath this one.
    pub fn remove_descendant(&mut self, id: &str) -> Option<Field> {
        for option in &mut self.options {
            if let Some(removed) = option.remove_nested_field(id) {
                return Some(removed);
            }
            for nested in &mut option.nested_fields {
                if let Some(removed) = nested.remove_descendant(id) {
                    return Some(removed);
                }
            }
        }
        None
    }

    /// Number of fields nested beneath this one, at any depth.
    pub fn descendant_count(&self) -> usize {
        self.options
            .iter()
            .flat_map(|o| &o.nested_fields)
            .map(|nested| 1 + nested.descendant_count())
            .sum()
    }

    /// Id of the first field without a label, this one or any beneath it.
    pub fn first_unlabelled(&self) -> Option<&FieldId> {
        if self.label.trim().is_empty() {
            return Some(&self.id);
        }
        self.options
            .iter()
            .flat_map(|o| &o.nested_fields)
            .find_map(Field::first_unlabelled)
    }

    /// Drop nested fields that have no label, at every depth.
    pub fn retain_labelled(&mut self) {
        for option in &mut self.options {
            option.nested_fields.retain(|f| !f.label.trim().is_empty());
            for nested in &mut option.nested_fields {
                nested.retain_labelled();
            }
        }
    }

    fn option_not_found(&self, value: &str) -> FormError {
        FormError::OptionNotFound {
            field_id: self.id.clone(),
            value: value.to_string(),
        }
    }
}
