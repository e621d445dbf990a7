//! Record store schema
//!
//! One row per post keyed by `(blog_title, date_published)`, with authors and
//! tags in child tables so both can be matched exactly.

/// SQL schema for the record store
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS posts (
    blog_title TEXT NOT NULL,
    date_published TEXT NOT NULL,
    category TEXT NOT NULL,
    source_url TEXT NOT NULL,
    object_key TEXT NOT NULL,
    stored_at TEXT NOT NULL,
    PRIMARY KEY (blog_title, date_published)
);

CREATE INDEX IF NOT EXISTS idx_posts_date ON posts(date_published);
CREATE INDEX IF NOT EXISTS idx_posts_category ON posts(category);

CREATE TABLE IF NOT EXISTS post_authors (
    blog_title TEXT NOT NULL,
    date_published TEXT NOT NULL,
    author TEXT NOT NULL,
    PRIMARY KEY (blog_title, date_published, author),
    FOREIGN KEY (blog_title, date_published)
        REFERENCES posts(blog_title, date_published) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_post_authors_author ON post_authors(author);

CREATE TABLE IF NOT EXISTS post_tags (
    blog_title TEXT NOT NULL,
    date_published TEXT NOT NULL,
    tag TEXT NOT NULL,
    PRIMARY KEY (blog_title, date_published, tag),
    FOREIGN KEY (blog_title, date_published)
        REFERENCES posts(blog_title, date_published) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_post_tags_tag ON post_tags(tag);
"#;

/// Initializes the record store schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
