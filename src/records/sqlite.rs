//! SQLite record store implementation

use crate::extract::PostRecord;
use crate::records::schema::initialize_schema;
use crate::records::{RecordAttribute, RecordStore, StoredPost};
use crate::storage::{StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;

/// SQLite record store backend
pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Opens or creates a record store
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteRecordStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn load_children(
        &self,
        table: &str,
        column: &str,
        blog_title: &str,
        date_published: &str,
    ) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {column} FROM {table} WHERE blog_title = ?1 AND date_published = ?2 ORDER BY {column}"
        ))?;
        let values = stmt
            .query_map(params![blog_title, date_published], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(values)
    }

    fn matching_keys(
        &self,
        attribute: RecordAttribute,
        value: &str,
    ) -> StorageResult<Vec<(String, String)>> {
        let sql = match attribute {
            RecordAttribute::BlogTitle => {
                "SELECT blog_title, date_published FROM posts WHERE blog_title = ?1"
            }
            RecordAttribute::DatePublished => {
                "SELECT blog_title, date_published FROM posts WHERE date_published = ?1"
            }
            RecordAttribute::Category => {
                "SELECT blog_title, date_published FROM posts WHERE category = ?1"
            }
            RecordAttribute::Author => {
                "SELECT blog_title, date_published FROM post_authors WHERE author = ?1"
            }
            RecordAttribute::Tag => {
                "SELECT blog_title, date_published FROM post_tags WHERE tag = ?1"
            }
            RecordAttribute::SourceUrl => {
                "SELECT blog_title, date_published FROM posts WHERE source_url = ?1"
            }
            RecordAttribute::ObjectKey => {
                "SELECT blog_title, date_published FROM posts WHERE object_key = ?1"
            }
        };

        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY date_published, blog_title", sql))?;
        let keys = stmt
            .query_map(params![value], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(String, String)>, _>>()?;
        Ok(keys)
    }
}

impl RecordStore for SqliteRecordStore {
    fn insert(&mut self, record: &PostRecord, object_key: &str) -> StorageResult<()> {
        let date_published = record.date_iso();
        let tx = self.conn.transaction()?;

        let inserted = tx.execute(
            "INSERT INTO posts (blog_title, date_published, category, source_url, object_key, stored_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.title,
                date_published,
                record.category,
                record.source_url,
                object_key,
                Utc::now().to_rfc3339(),
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(StorageError::ConstraintViolation(format!(
                    "record ({}, {}) already exists",
                    record.title, date_published
                )));
            }
            Err(e) => return Err(e.into()),
        }

        for author in &record.authors {
            tx.execute(
                "INSERT INTO post_authors (blog_title, date_published, author) VALUES (?1, ?2, ?3)",
                params![record.title, date_published, author],
            )?;
        }

        for tag in &record.tags {
            tx.execute(
                "INSERT INTO post_tags (blog_title, date_published, tag) VALUES (?1, ?2, ?3)",
                params![record.title, date_published, tag],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get(&self, blog_title: &str, date_published: &str) -> StorageResult<Option<StoredPost>> {
        let row = self
            .conn
            .query_row(
                "SELECT category, source_url, object_key FROM posts
                 WHERE blog_title = ?1 AND date_published = ?2",
                params![blog_title, date_published],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((category, source_url, object_key)) = row else {
            return Ok(None);
        };

        let authors = self.load_children("post_authors", "author", blog_title, date_published)?;
        let tags = self.load_children("post_tags", "tag", blog_title, date_published)?;

        Ok(Some(StoredPost {
            blog_title: blog_title.to_string(),
            date_published: date_published.to_string(),
            category,
            authors: authors.into_iter().collect(),
            tags: tags.into_iter().collect(),
            source_url,
            object_key,
        }))
    }

    fn query(&self, attribute: RecordAttribute, value: &str) -> StorageResult<Vec<StoredPost>> {
        if !attribute.is_indexed() {
            tracing::warn!(
                attribute = %attribute,
                "Attribute is not indexed, scanning the whole table; this is expensive"
            );
        }

        let mut posts = Vec::new();
        for (blog_title, date_published) in self.matching_keys(attribute, value)? {
            if let Some(post) = self.get(&blog_title, &date_published)? {
                posts.push(post);
            }
        }
        Ok(posts)
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
