use thiserror::Error;

/// Errors raised by builder-side operations on the form tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("form title must not be empty")]
    EmptyTitle,

    #[error("form must contain at least one field")]
    NoFields,

    #[error("field {field_id} has no label")]
    EmptyLabel { field_id: String },

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("option '{value}' not found on field {field_id}")]
    OptionNotFound { field_id: String, value: String },

    #[error("option '{value}' already exists on field {field_id}")]
    DuplicateOption { field_id: String, value: String },

    #[error("option label must not be empty")]
    EmptyOptionLabel,

    #[error("field {0} does not accept options")]
    NotAChoiceField(String),

    #[error("field index {index} is out of range (form has {len} fields)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("invalid field key: '{0}'")]
    InvalidFieldKey(String),
}

impl FormError {
    /// Save-time invariant violations, as opposed to intents that referenced
    /// a missing node.
    pub fn is_save_validation(&self) -> bool {
        matches!(self, Self::EmptyTitle | Self::NoFields | Self::EmptyLabel { .. })
    }
}
