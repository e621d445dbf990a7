//! Tag dictionary and tag merging
//!
//! The dictionary is a static list of known keywords, one per line. Tagging is
//! plain substring containment against a candidate string; multi-word keywords
//! only match when they appear verbatim.

use crate::HarvestError;
use std::collections::BTreeSet;
use std::path::Path;

/// Static keyword table loaded once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDictionary {
    keywords: Vec<String>,
}

impl TagDictionary {
    /// Loads a newline-delimited UTF-8 keyword list
    ///
    /// # Errors
    ///
    /// `HarvestError::TagDictionary` when the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, HarvestError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| HarvestError::TagDictionary {
                path: path.display().to_string(),
                source,
            })?;

        let dictionary = Self::from_lines(&content);
        tracing::info!(
            path = %path.display(),
            keywords = dictionary.len(),
            "Loaded tag dictionary"
        );
        Ok(dictionary)
    }

    /// Builds a dictionary from in-memory text
    ///
    /// Lines are trimmed and lower-cased; blank lines and repeated keywords
    /// are dropped, keeping the first occurrence.
    pub fn from_lines(text: &str) -> Self {
        let mut keywords: Vec<String> = Vec::new();

        for line in text.lines() {
            let keyword = line.trim().to_lowercase();
            if keyword.is_empty() || keywords.contains(&keyword) {
                continue;
            }
            keywords.push(keyword);
        }

        Self { keywords }
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Returns every keyword occurring as a substring of `candidate`,
    /// in dictionary order
    pub fn match_keywords(&self, candidate: &str) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|keyword| candidate.contains(keyword.as_str()))
            .cloned()
            .collect()
    }
}

/// Union of keyword matches and explicit on-page tags, lower-cased
pub fn merge_tags(
    keyword_tags: impl IntoIterator<Item = String>,
    explicit_tags: impl IntoIterator<Item = String>,
) -> BTreeSet<String> {
    keyword_tags
        .into_iter()
        .chain(explicit_tags)
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Turns the text of one tag-list region into a literal tag
///
/// An exact `prefix` at the start of the text is removed first.
pub fn explicit_tag(region_text: &str, prefix: &str) -> Option<String> {
    let text = region_text.trim();
    let text = if prefix.is_empty() {
        text
    } else {
        text.strip_prefix(prefix).unwrap_or(text)
    };

    let tag = text.trim().to_lowercase();
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}
