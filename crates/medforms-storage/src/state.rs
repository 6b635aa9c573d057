use serde::Serialize;

use crate::error::StorageError;
use crate::store::KeyValueStore;

/// Save `value` as JSON under `key`.
pub fn save_state<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let body = serde_json::to_string(value)?;
    store.put(key, &body)
}
