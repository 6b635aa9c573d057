use medforms_audit::AuditError;
use medforms_core::FormError;
use medforms_engine::{EngineError, ErrorMap};
use medforms_export::ExportError;
use medforms_storage::StorageError;
use serde::Serialize;
use thiserror::Error;

/// Unified error type for every host command.
///
/// Serialized with a `kind` tag so the front-end can tell an inline
/// validation problem from a terminal one.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppError {
    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("{} field(s) failed validation", .errors.len())]
    Invalid { errors: ErrorMap },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::error!("internal error: {message}");
        Self::Internal { message }
    }
}

impl From<FormError> for AppError {
    fn from(e: FormError) -> Self {
        match e {
            FormError::FieldNotFound(_) => AppError::not_found(e.to_string()),
            e if e.is_save_validation() => AppError::bad_request(format!("cannot save form: {e}")),
            other => AppError::bad_request(other.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { key } => AppError::not_found(format!("form not found: {key}")),
            StorageError::Form(e) => e.into(),
            other => AppError::internal(other.to_string()),
        }
    }
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Invalid { errors } => AppError::Invalid { errors },
            EngineError::Form(e) => e.into(),
            other => AppError::bad_request(other.to_string()),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        AppError::internal(e.to_string())
    }
}

impl From<AuditError> for AppError {
    fn from(e: AuditError) -> Self {
        AppError::internal(e.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::bad_request(e.to_string())
    }
}
