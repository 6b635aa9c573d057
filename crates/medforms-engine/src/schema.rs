use std::collections::BTreeMap;

use medforms_core::{Field, FieldKey, FieldKind, Form};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::answers::AnswerSet;
use crate::visibility::walk_active;

/// What a rule checks about the answer at its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RuleKind {
    /// Non-blank string (text, select, radio).
    Required,
    /// Present and parseable as a date.
    ValidDate,
    /// At least one selected option (checkbox).
    NonEmptySet,
}

impl RuleKind {
    /// Rule for a required field of `kind`. Headings take none.
    pub fn for_field(kind: FieldKind) -> Option<Self> {
        match kind {
            FieldKind::Text | FieldKind::Select | FieldKind::Radio => Some(Self::Required),
            FieldKind::Date => Some(Self::ValidDate),
            FieldKind::Checkbox => Some(Self::NonEmptySet),
            FieldKind::Heading => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Rule {
    pub kind: RuleKind,
    #[ts(type = "string")]
    pub key: FieldKey,
    pub field_kind: FieldKind,
    pub label: String,
}

impl Rule {
    fn for_field(field: &Field, key: &FieldKey) -> Option<Self> {
        if !field.required {
            return None;
        }
        Some(Self {
            kind: RuleKind::for_field(field.kind)?,
            key: key.clone(),
            field_kind: field.kind,
            label: field.label.clone(),
        })
    }
}

/// Rules in force for one (form, answers) pair, keyed by answer key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: BTreeMap<FieldKey, Rule>,
}

impl RuleSet {
    pub fn get(&self, key: &FieldKey) -> Option<&Rule> {
        self.rules.get(key)
    }

    pub fn contains(&self, key: &FieldKey) -> bool {
        self.rules.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.rules.keys()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Derive the validation rules for `form` under the current `answers`.
///
/// Every required input field on an active branch gets one rule. A nested
/// field's rule depends only on its own `required` flag and on its governing
/// option being selected; the parent's `required` flag plays no part. Keys
/// under unselected options get no rule at all. The result is a pure
/// function of its inputs and must be recomputed whenever a selection
/// changes.
pub fn derive_rules(form: &Form, answers: &AnswerSet) -> RuleSet {
    let mut rules = BTreeMap::new();
    walk_active(form, answers, &mut |field, key| {
        if let Some(rule) = Rule::for_field(field, key) {
            rules.insert(key.clone(), rule);
        }
    });
    RuleSet { rules }
}
