//! Configuration module for Blog-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use blog_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvesting from: {}", config.harvest.seed_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, HarvestConfig, HttpConfig, LoggingConfig, RecordsConfig, StorageConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
