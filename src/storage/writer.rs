//! Content store writer
//!
//! Wraps any `ObjectStore` with the no-overwrite contract: an object that
//! already exists is left untouched and the write is reported as skipped.

use crate::storage::key::StorageKey;
use crate::storage::traits::{ObjectStore, StorageError, StorageResult};

/// Result of a single write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The body was written; `location` is the object's resolvable URL
    Stored { location: String },

    /// An object already existed under the key
    Skipped,
}

/// Writes post bodies into an object store without ever replacing one
#[derive(Debug)]
pub struct ContentWriter<S: ObjectStore> {
    store: S,
}

impl<S: ObjectStore> ContentWriter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stores `body` under `key` unless an object already exists there
    ///
    /// # Arguments
    ///
    /// * `key` - Derived storage key
    /// * `body` - Post body, stored as UTF-8
    ///
    /// # Returns
    ///
    /// * `Ok(WriteOutcome::Stored)` - The object was created
    /// * `Ok(WriteOutcome::Skipped)` - The key was already taken
    /// * `Err(StorageError)` - The store could not be reached or written
    pub fn write_if_absent(&mut self, key: &StorageKey, body: &str) -> StorageResult<WriteOutcome> {
        if self.store.exists(key.as_str())? {
            tracing::info!(
                bucket = self.store.bucket(),
                key = %key,
                "Object already exists, skipping upload"
            );
            return Ok(WriteOutcome::Skipped);
        }

        match self.store.put(key.as_str(), body.as_bytes()) {
            Ok(()) => {
                let location = self.store.location(key.as_str());
                tracing::debug!(key = %key, location = %location, "Stored object");
                Ok(WriteOutcome::Stored { location })
            }
            // Created between the existence check and the write
            Err(StorageError::AlreadyExists(_)) => {
                tracing::info!(key = %key, "Object appeared during upload, skipping");
                Ok(WriteOutcome::Skipped)
            }
            Err(e) => Err(e),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
