//! Directory-backed object store
//!
//! A bucket is a directory `{root}/{bucket}`; objects live under the
//! configured key prefix inside it. Writes use create-new semantics, so an
//! existing object is never replaced even when two writers race.

use crate::storage::traits::{validate_key, ObjectInfo, ObjectStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Filesystem object store
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    bucket: String,
    prefix: String,
    dir: PathBuf,
    public_base_url: String,
}

impl FsObjectStore {
    /// Opens (creating if needed) a bucket directory
    ///
    /// # Arguments
    ///
    /// * `root` - Directory holding the buckets
    /// * `bucket` - Bucket name
    /// * `prefix` - Key prefix inside the bucket, may be empty
    /// * `public_base_url` - Base of reported locations; defaults to
    ///   `https://{bucket}.s3.amazonaws.com`
    pub fn open(
        root: &Path,
        bucket: &str,
        prefix: &str,
        public_base_url: Option<&str>,
    ) -> StorageResult<Self> {
        let prefix = prefix.trim_matches('/').to_string();
        let mut dir = root.join(bucket);
        if !prefix.is_empty() {
            dir.push(&prefix);
        }

        fs::create_dir_all(&dir).map_err(|e| {
            StorageError::Bucket(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let public_base_url = public_base_url
            .map(|base| base.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{}.s3.amazonaws.com", bucket));

        tracing::debug!(bucket, dir = %dir.display(), "Opened object store");

        Ok(Self {
            bucket: bucket.to_string(),
            prefix,
            dir,
            public_base_url,
        })
    }

    fn object_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

impl ObjectStore for FsObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.object_path(key)?;
        Ok(path.try_exists()?)
    }

    fn put(&mut self, key: &str, body: &[u8]) -> StorageResult<()> {
        let path = self.object_path(key)?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = file.write_all(body).and_then(|_| file.sync_all()) {
            // Leave no truncated object behind
            let _ = fs::remove_file(&path);
            return Err(e.into());
        }

        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<ObjectInfo>> {
        let mut objects = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            objects.push(ObjectInfo {
                key: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn location(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            format!("{}/{}", self.public_base_url, key)
        } else {
            format!("{}/{}/{}", self.public_base_url, self.prefix, key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> FsObjectStore {
        FsObjectStore::open(dir.path(), "blog-archive", "data", None).unwrap()
    }

    #[test]
    fn test_put_then_exists() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        assert!(!store.exists("a.txt").unwrap());
        store.put("a.txt", b"hello").unwrap();
        assert!(store.exists("a.txt").unwrap());

        let on_disk = fs::read_to_string(dir.path().join("blog-archive/data/a.txt")).unwrap();
        assert_eq!(on_disk, "hello");
    }

    #[test]
    fn test_put_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        store.put("a.txt", b"first").unwrap();
        let result = store.put("a.txt", b"second");

        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
        let on_disk = fs::read_to_string(dir.path().join("blog-archive/data/a.txt")).unwrap();
        assert_eq!(on_disk, "first");
    }

    #[test]
    fn test_rejects_path_keys() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        assert!(matches!(
            store.put("../escape.txt", b"x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            store.exists("nested/key.txt"),
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_list_sorted() {
        let dir = TempDir::new().unwrap();
        let mut store = open_store(&dir);

        store.put("b.txt", b"bb").unwrap();
        store.put("a.txt", b"a").unwrap();

        let objects = store.list().unwrap();
        let keys: Vec<&str> = objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["a.txt", "b.txt"]);
        assert_eq!(objects[1].size, 2);
        assert!(objects[0].last_modified.is_some());
    }

    #[test]
    fn test_location() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        assert_eq!(
            store.location("a.txt"),
            "https://blog-archive.s3.amazonaws.com/data/a.txt"
        );

        let store =
            FsObjectStore::open(dir.path(), "blog-archive", "", Some("https://cdn.example.com/"))
                .unwrap();
        assert_eq!(store.location("a.txt"), "https://cdn.example.com/a.txt");
    }
}
