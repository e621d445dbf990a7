//! Secondary record store
//!
//! Keeps the metadata of every stored post in a queryable table:
//! - one record per `(blog_title, date_published)`
//! - exact-match lookups on the indexed attributes
//! - full scans (with a warning) on the rest

mod schema;
mod sqlite;

pub use sqlite::SqliteRecordStore;

use crate::extract::PostRecord;
use crate::storage::StorageResult;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Metadata of a stored post as kept in the record store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPost {
    pub blog_title: String,

    /// ISO date, `YYYY-MM-DD`
    pub date_published: String,

    pub category: String,
    pub authors: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub source_url: String,

    /// Key of the body in the object store
    pub object_key: String,
}

impl StoredPost {
    pub fn from_record(record: &PostRecord, object_key: &str) -> Self {
        Self {
            blog_title: record.title.clone(),
            date_published: record.date_iso(),
            category: record.category.clone(),
            authors: record.authors.clone(),
            tags: record.tags.clone(),
            source_url: record.source_url.clone(),
            object_key: object_key.to_string(),
        }
    }
}

/// Attributes a query can match on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAttribute {
    BlogTitle,
    DatePublished,
    Category,
    Author,
    Tag,
    SourceUrl,
    ObjectKey,
}

impl RecordAttribute {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BlogTitle => "blog_title",
            Self::DatePublished => "date_published",
            Self::Category => "category",
            Self::Author => "author",
            Self::Tag => "tag",
            Self::SourceUrl => "source_url",
            Self::ObjectKey => "object_key",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "blog_title" => Some(Self::BlogTitle),
            "date_published" => Some(Self::DatePublished),
            "category" => Some(Self::Category),
            "author" => Some(Self::Author),
            "tag" => Some(Self::Tag),
            "source_url" => Some(Self::SourceUrl),
            "object_key" => Some(Self::ObjectKey),
            _ => None,
        }
    }

    /// Whether lookups on this attribute are served by an index
    pub fn is_indexed(&self) -> bool {
        !matches!(self, Self::SourceUrl | Self::ObjectKey)
    }
}

impl fmt::Display for RecordAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Trait for record store backends
pub trait RecordStore {
    /// Inserts the metadata of a stored post
    ///
    /// # Errors
    ///
    /// `StorageError::ConstraintViolation` when a record with the same
    /// `(blog_title, date_published)` exists; the stored record is unchanged.
    fn insert(&mut self, record: &PostRecord, object_key: &str) -> StorageResult<()>;

    /// Looks up a post by its primary key
    fn get(&self, blog_title: &str, date_published: &str) -> StorageResult<Option<StoredPost>>;

    /// Returns every post whose `attribute` equals `value`, ordered by key
    fn query(&self, attribute: RecordAttribute, value: &str) -> StorageResult<Vec<StoredPost>>;

    /// Number of stored posts
    fn count(&self) -> StorageResult<u64>;
}

/// Opens or creates the record store database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_record_store(path: &Path) -> StorageResult<SqliteRecordStore> {
    SqliteRecordStore::new(path)
}
