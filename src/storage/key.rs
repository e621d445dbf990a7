//! Storage key derivation
//!
//! A key is `{date_published}-{slug}{extension}`. It is a pure function of
//! the date and title, so a re-crawl maps every post onto the key it was
//! stored under the first time.

use crate::HarvestError;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Everything except word characters, whitespace and hyphens
static SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("Failed to compile special-chars regex"));

/// Runs of whitespace and hyphens
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("Failed to compile separator regex"));

/// Derived object key of a stored post
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a title into a filename-safe slug
///
/// # Examples
///
/// ```
/// use blog_harvester::storage::slugify;
///
/// assert_eq!(slugify("This is my first! blog?"), "this-is-my-first-blog");
/// assert_eq!(slugify("  AWS -- Networking  "), "aws-networking");
/// ```
pub fn slugify(title: &str) -> String {
    let stripped = SPECIAL_CHARS.replace_all(title, "");
    let lowered = stripped.trim().to_lowercase();
    SEPARATORS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Derives the storage key of a post
///
/// # Arguments
///
/// * `date_published` - ISO date (`YYYY-MM-DD`)
/// * `title` - Post title, any casing
/// * `extension` - Appended verbatim, e.g. `.txt`
///
/// # Errors
///
/// `HarvestError::PreconditionViolation` when the date is empty or the title
/// leaves nothing to slug; no meaningful key exists for such a post.
pub fn derive_storage_key(
    date_published: &str,
    title: &str,
    extension: &str,
) -> Result<StorageKey, HarvestError> {
    let date = date_published.trim();
    if date.is_empty() {
        return Err(HarvestError::PreconditionViolation(
            "date_published is required".to_string(),
        ));
    }

    let slug = slugify(title);
    if slug.is_empty() {
        return Err(HarvestError::PreconditionViolation(format!(
            "blog_title is required (got '{}')",
            title
        )));
    }

    Ok(StorageKey(format!("{}-{}{}", date, slug, extension)))
}
