//! medforms-export
//!
//! Printable rendering of forms and the JSON payload of submissions.

pub mod error;
pub mod payload;
pub mod printable;
pub mod render;

pub use error::ExportError;
pub use payload::{SubmissionExport, submission_json};
pub use printable::{render_blank, render_printable};
