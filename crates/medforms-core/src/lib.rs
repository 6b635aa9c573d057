//! medforms-core
//!
//! Pure domain types for the form builder: options, fields, forms, composite
//! answer keys and store key conventions.
//! No storage or validation logic lives here. This is the shared vocabulary
//! of the builder, the filler and the persistence layer.

pub mod error;
pub mod keys;
pub mod models;
pub mod store_keys;

pub use error::FormError;
pub use keys::FieldKey;
pub use models::field::{Field, FieldId, FieldKind};
pub use models::form::{FieldPatch, Form, FormSummary};
pub use models::option::{slugify, FieldOption};
