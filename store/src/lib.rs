//! Durable key-value storage.
//!
//! The client keeps a small amount of state that must survive restarts: the
//! session token pair and the table's rows-per-page preference. Both go
//! through [`KeyValueStore`], so callers can pick a backend:
//!
//! - [`FileStore`]: a TOML file under the platform config directory
//! - [`MemoryStore`]: process-local, used in tests and for ephemeral sessions
//!
//! Values are plain strings. Structured values are serialized by the caller.

mod error;
mod file;
mod memory;

use std::fmt::Debug;
use std::sync::Arc;

pub use error::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A string-to-string store that survives process restarts (depending on the backend).
///
/// Implementations use interior mutability so a single store can be shared
/// between the API client and the table preferences.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}
