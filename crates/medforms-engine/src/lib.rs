//! medforms-engine
//!
//! Everything that turns a form definition plus live answers into a verdict:
//! conditional rule derivation, per-field evaluation, the flattener that
//! builds the nested submission payload, and the builder/filler sessions
//! that drive them. Pure computation, no storage.

pub mod answer_store;
pub mod answers;
pub mod builder;
pub mod error;
pub mod evaluate;
pub mod flatten;
pub mod schema;
pub mod session;
pub mod visibility;

pub use answer_store::AnswerStore;
pub use answers::{AnswerSet, AnswerValue};
pub use builder::BuilderSession;
pub use error::EngineError;
pub use evaluate::{ErrorMap, FieldError, validate};
pub use flatten::{ResultNode, ResultTree, expand, flatten, nest};
pub use schema::{Rule, RuleKind, RuleSet, derive_rules};
pub use session::{FillSession, SessionState, Submission};
pub use visibility::{active_keys, locate, visible_nested_fields};
