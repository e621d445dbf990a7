//! Storage traits and error types
//!
//! This module defines the trait interface for object store backends and
//! the error type shared with the record store.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Bucket unavailable: {0}")]
    Bucket(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Listing entry of a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Trait for object store backends
///
/// Backends never overwrite: `put` on an existing key fails with
/// `StorageError::AlreadyExists`.
pub trait ObjectStore {
    /// Name of the bucket (namespace) objects are written to
    fn bucket(&self) -> &str;

    /// Checks whether an object exists under `key`
    fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Writes `body` under `key`
    ///
    /// # Errors
    ///
    /// * `StorageError::AlreadyExists` - An object is already stored under `key`
    /// * `StorageError::InvalidKey` - The key is empty or contains path components
    fn put(&mut self, key: &str, body: &[u8]) -> StorageResult<()>;

    /// Lists every object in the bucket, sorted by key
    fn list(&self) -> StorageResult<Vec<ObjectInfo>>;

    /// Resolvable location (URL) of the object stored under `key`
    fn location(&self, key: &str) -> String;
}

/// Rejects keys that could escape the bucket directory
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key.contains('/')
        || key.contains('\\')
        || key.contains("..")
        || key.contains('\0')
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
