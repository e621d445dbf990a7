//! Post extraction
//!
//! This module turns the document of a single blog post into a `PostRecord`:
//! - category, title, authors and publish date from fixed structural markers
//! - tags from the keyword dictionary plus explicit tag-list regions
//! - body text with author-box, meta-footer and tag-list regions removed

mod post;
mod tags;

pub use post::extract_post;
pub use tags::{explicit_tag, merge_tags, TagDictionary};

use chrono::NaiveDate;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors that reject a single post
///
/// Both variants are permanent for the page that produced them; retrying
/// the same document cannot succeed.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Structural mismatch at {url}: missing {field}")]
    StructuralMismatch { url: String, field: &'static str },

    #[error("Unparseable publish date '{text}' at {url}: {source}")]
    DateFormat {
        url: String,
        text: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// Canonical extracted representation of one blog post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// Lower-cased category
    pub category: String,

    /// Lower-cased title
    pub title: String,

    /// Lower-cased author names
    pub authors: BTreeSet<String>,

    pub date_published: NaiveDate,

    /// Lower-cased tags; may be empty
    pub tags: BTreeSet<String>,

    pub source_url: String,

    /// Trimmed article text without boilerplate regions
    pub body: String,
}

impl PostRecord {
    /// Publish date as `YYYY-MM-DD`
    pub fn date_iso(&self) -> String {
        self.date_published.format("%Y-%m-%d").to_string()
    }
}
