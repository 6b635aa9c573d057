//! Key/value store key conventions.
//!
//! Pure string constants. These define where the persistence layer keeps
//! the form collection and the builder's edit pointer.

/// JSON array of every saved form.
pub const FORMS: &str = "forms";

/// Id of the form currently open in the builder.
pub const FORM_TO_EDIT: &str = "formToEdit";
