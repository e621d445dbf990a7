//! In-process object store
//!
//! Backs `--dry-run` and the tests. Objects live in an ordered map and
//! follow the same no-overwrite and key rules as the filesystem store.

use crate::storage::traits::{validate_key, ObjectInfo, ObjectStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    written_at: DateTime<Utc>,
}

/// Object store backed by an ordered map; nothing outlives the process
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    bucket: String,
    objects: BTreeMap<String, StoredObject>,
}

impl MemoryObjectStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: BTreeMap::new(),
        }
    }

    /// Body of the object stored under `key`
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.objects.get(key).map(|object| object.body.as_slice())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        validate_key(key)?;
        Ok(self.objects.contains_key(key))
    }

    fn put(&mut self, key: &str, body: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        if self.objects.contains_key(key) {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }

        self.objects.insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                written_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<ObjectInfo>> {
        Ok(self
            .objects
            .iter()
            .map(|(key, object)| ObjectInfo {
                key: key.clone(),
                size: object.body.len() as u64,
                last_modified: Some(object.written_at),
            })
            .collect())
    }

    fn location(&self, key: &str) -> String {
        format!("memory://{}/{}", self.bucket, key)
    }
}
