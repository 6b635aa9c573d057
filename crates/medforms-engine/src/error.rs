use medforms_core::FormError;
use thiserror::Error;

use crate::evaluate::ErrorMap;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("form error: {0}")]
    Form(#[from] FormError),

    #[error("unknown field key: {0}")]
    UnknownField(String),

    #[error("field {0} is display-only and takes no answer")]
    NotAnInput(String),

    #[error("answer for {key} must be {expected}")]
    AnswerShape { key: String, expected: &'static str },

    #[error("session already submitted")]
    SessionSubmitted,

    #[error("{} field(s) failed validation", .errors.len())]
    Invalid { errors: ErrorMap },
}
