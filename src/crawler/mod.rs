//! Crawler module for page fetching and pipeline orchestration
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with bounded timeouts
//! - Site template compilation (structural markers)
//! - Pagination walking with a cycle guard
//! - Overall harvest coordination

mod coordinator;
mod fetcher;
mod paginator;
mod template;

pub use coordinator::{Harvester, PostOutcome};
pub use fetcher::{build_http_client, fetch_url, FetchResult, FetchedPage, PageFetcher};
pub use paginator::{discover, find_next_page, harvest_post_links, Discovery, PostReference};
pub use template::{CompiledTemplate, SiteTemplate};

use crate::config::Config;
use crate::output::HarvestStats;
use crate::records::open_record_store;
use crate::storage::open_object_store;
use crate::HarvestError;
use std::path::Path;
use url::Url;

/// Runs a complete harvest against the configured filesystem bucket
///
/// This is the main entry point for starting a harvest. It will:
/// 1. Open the object store bucket
/// 2. Open the record store when `[records]` is configured
/// 3. Build the HTTP client, template and tag dictionary
/// 4. Walk the listing and process every post
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(HarvestStats)` - Harvest completed
/// * `Err(HarvestError)` - Start-up failure or precondition violation
pub async fn run_harvest(config: &Config) -> Result<HarvestStats, HarvestError> {
    let seed = Url::parse(&config.harvest.seed_url)?;
    let store = open_object_store(&config.storage)?;

    let mut harvester = Harvester::from_config(config, store)?;

    if let Some(records) = &config.records {
        let record_store = open_record_store(Path::new(&records.database_path))?;
        tracing::info!(path = %records.database_path, "Opened record store");
        harvester = harvester.with_records(Box::new(record_store));
    }

    harvester.run(&seed).await
}
