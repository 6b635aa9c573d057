//! medforms-storage
//!
//! Persistence of saved forms over a plain key-value store. The store holds
//! one JSON array under [`medforms_core::store_keys::FORMS`] and the id of the
//! form being edited under [`medforms_core::store_keys::FORM_TO_EDIT`].

pub mod error;
pub mod repository;
pub mod state;
pub mod store;

pub use error::StorageError;
pub use repository::FormRepository;
pub use store::{FileStore, KeyValueStore, MemoryStore};
