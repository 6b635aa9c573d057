use std::collections::{BTreeMap, BTreeSet};

use medforms_core::{Field, FieldKey, FieldKind, Form};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single answer. Text, date, select and radio fields answer with a
/// string; checkbox fields answer with the set of selected option values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum AnswerValue {
    Text(String),
    Selection(BTreeSet<String>),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn selection<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Selection(values.into_iter().map(Into::into).collect())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Selection(_) => None,
        }
    }

    pub fn as_selection(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Selection(values) => Some(values),
            Self::Text(_) => None,
        }
    }

    /// Blank text or an empty selection.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(value) => value.trim().is_empty(),
            Self::Selection(values) => values.is_empty(),
        }
    }

    /// Whether this answer, given for a field of `kind`, selects
    /// `option_value`. Answers of the wrong shape select nothing.
    pub fn selects(&self, kind: FieldKind, option_value: &str) -> bool {
        match (kind, self) {
            (FieldKind::Select | FieldKind::Radio, Self::Text(value)) => value == option_value,
            (FieldKind::Checkbox, Self::Selection(values)) => values.contains(option_value),
            _ => false,
        }
    }

    /// Whether this answer has the shape expected for a field of `kind`.
    pub fn fits(&self, kind: FieldKind) -> bool {
        match kind {
            FieldKind::Checkbox => matches!(self, Self::Selection(_)),
            FieldKind::Heading => false,
            _ => matches!(self, Self::Text(_)),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// In-progress answers of one fill session, keyed by composite field key.
///
/// Answers under branches that are no longer selected stay in the set; they
/// are skipped by validation and by the flattener.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet {
    answers: BTreeMap<FieldKey, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers pre-filled from the fields' default values, at every depth.
    pub fn seeded(form: &Form) -> Self {
        let mut set = Self::new();
        for field in &form.fields {
            set.seed_field(field, FieldKey::top(field.id.clone()));
        }
        set
    }

    fn seed_field(&mut self, field: &Field, key: FieldKey) {
        if let Some(default) = field.default_value.as_deref().filter(|d| !d.is_empty()) {
            let value = match field.kind {
                FieldKind::Checkbox => AnswerValue::selection([default]),
                FieldKind::Heading => return,
                _ => AnswerValue::text(default),
            };
            self.answers.insert(key.clone(), value);
        }
        for nested in field.options.iter().flat_map(|o| &o.nested_fields) {
            self.seed_field(nested, key.nested(nested.id.clone()));
        }
    }

    pub fn set(&mut self, key: FieldKey, value: AnswerValue) -> Option<AnswerValue> {
        self.answers.insert(key, value)
    }

    pub fn get(&self, key: &FieldKey) -> Option<&AnswerValue> {
        self.answers.get(key)
    }

    pub fn remove(&mut self, key: &FieldKey) -> Option<AnswerValue> {
        self.answers.remove(key)
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.answers.contains_key(key)
    }

    /// Drop every answer keyed under `field_id`, nested keys included.
    /// Returns how many answers were removed.
    pub fn remove_field(&mut self, field_id: &str) -> usize {
        let before = self.answers.len();
        self.answers.retain(|key, _| !key.passes_through(field_id));
        before - self.answers.len()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&FieldKey, &AnswerValue) -> bool) {
        self.answers.retain(|key, value| keep(key, value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &AnswerValue)> {
        self.answers.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.answers.keys()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl FromIterator<(FieldKey, AnswerValue)> for AnswerSet {
    fn from_iter<T: IntoIterator<Item = (FieldKey, AnswerValue)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}
