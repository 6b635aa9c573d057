//! medforms-audit
//!
//! Application-level audit events. Every event is emitted through `tracing`
//! and can additionally be appended to a JSON-lines trail on disk.

pub mod error;
pub mod events;
pub mod trail;

pub use error::AuditError;
pub use events::{AuditAction, AuditEvent};
pub use trail::AuditTrail;
