use std::collections::BTreeMap;

use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use jiff::Timestamp;
use medforms_core::{FieldKey, FieldKind, Form};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::answers::{AnswerSet, AnswerValue};
use crate::schema::{Rule, RuleKind, RuleSet, derive_rules};

/// A per-field validation failure, shown next to the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    #[error("{message}")]
    Required { key: FieldKey, message: String },

    #[error("{message}")]
    InvalidDate { key: FieldKey, message: String },
}

impl FieldError {
    pub fn key(&self) -> &FieldKey {
        match self {
            Self::Required { key, .. } | Self::InvalidDate { key, .. } => key,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Required { message, .. } | Self::InvalidDate { message, .. } => message,
        }
    }
}

/// Failures keyed by answer key. Empty means the answers are valid.
pub type ErrorMap = BTreeMap<FieldKey, FieldError>;

/// Validate `answers` against the rules derived from them.
pub fn validate(form: &Form, answers: &AnswerSet) -> ErrorMap {
    let rules = derive_rules(form, answers);
    validate_against(&rules, answers)
}

/// Validate `answers` against an already derived rule set. Answers whose key
/// has no rule are never looked at.
pub fn validate_against(rules: &RuleSet, answers: &AnswerSet) -> ErrorMap {
    rules
        .iter()
        .filter_map(|rule| check(rule, answers.get(&rule.key)))
        .map(|error| (error.key().clone(), error))
        .collect()
}

/// Evaluate a single rule against the answer at its key.
pub fn check(rule: &Rule, answer: Option<&AnswerValue>) -> Option<FieldError> {
    let present = answer.filter(|a| a.fits(rule.field_kind) && !a.is_empty());

    match rule.kind {
        RuleKind::Required | RuleKind::NonEmptySet => match present {
            Some(_) => None,
            None => Some(FieldError::Required {
                key: rule.key.clone(),
                message: required_message(rule),
            }),
        },
        RuleKind::ValidDate => {
            if answer.is_none_or(AnswerValue::is_empty) {
                return Some(FieldError::Required {
                    key: rule.key.clone(),
                    message: required_message(rule),
                });
            }
            match present.and_then(AnswerValue::as_text).and_then(parse_date) {
                Some(_) => None,
                None => Some(FieldError::InvalidDate {
                    key: rule.key.clone(),
                    message: "Please enter a valid date".to_string(),
                }),
            }
        }
    }
}

fn required_message(rule: &Rule) -> String {
    match rule.field_kind {
        FieldKind::Radio => format!("Please select a {} option", rule.label),
        FieldKind::Checkbox => format!("Please select at least one {} option", rule.label),
        _ => format!("{} is required", rule.label),
    }
}

/// Parse a date answer. Accepts `YYYY-MM-DD`, an ISO datetime without
/// offset, or an RFC 3339 timestamp (taken in UTC).
pub fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if let Ok(date) = raw.parse::<Date>() {
        return Some(date);
    }
    if let Ok(datetime) = raw.parse::<DateTime>() {
        return Some(datetime.date());
    }
    raw.parse::<Timestamp>()
        .ok()
        .map(|ts| ts.to_zoned(TimeZone::UTC).date())
}
