use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("audit trail I/O error: {0}")]
    Io(#[from] std::io::Error),
}
