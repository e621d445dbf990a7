//! Object storage for extracted post bodies
//!
//! This module handles:
//! - Storage key derivation from publish date and title
//! - Object store backends (directory-backed and in-memory)
//! - The no-overwrite content writer used by the pipeline

mod filesystem;
mod key;
mod memory;
mod traits;
mod writer;

pub use filesystem::FsObjectStore;
pub use key::{derive_storage_key, slugify, StorageKey};
pub use memory::MemoryObjectStore;
pub use traits::{validate_key, ObjectInfo, ObjectStore, StorageError, StorageResult};
pub use writer::{ContentWriter, WriteOutcome};

use crate::config::StorageConfig;
use std::path::Path;

/// Opens the configured filesystem bucket
///
/// # Arguments
///
/// * `config` - The `[storage]` section
///
/// # Returns
///
/// * `Ok(FsObjectStore)` - Bucket directory ready for writes
/// * `Err(StorageError)` - The bucket directory could not be created
pub fn open_object_store(config: &StorageConfig) -> StorageResult<FsObjectStore> {
    FsObjectStore::open(
        Path::new(&config.root),
        &config.bucket,
        &config.prefix,
        config.public_base_url.as_deref(),
    )
}
