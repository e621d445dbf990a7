//! Blog-Harvester: a paginated blog archiver
//!
//! This crate walks the paginated listing of a blog, extracts structured
//! metadata and body text from every post, and persists the text to an object
//! store (and optionally the metadata to a queryable record store).

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod records;
pub mod storage;

use thiserror::Error;

/// Main error type for Blog-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Page unavailable: {url} ({reason})")]
    FetchUnavailable { url: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Cannot derive storage key: {0}")]
    PreconditionViolation(String),

    #[error("Failed to load tag dictionary {path}: {source}")]
    TagDictionary {
        path: String,
        source: std::io::Error,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in template: {0}")]
    InvalidSelector(String),
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Harvester, PageFetcher};
pub use extract::{PostRecord, TagDictionary};
pub use storage::{derive_storage_key, StorageKey};
