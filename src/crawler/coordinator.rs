//! Harvest coordinator - main pipeline orchestration logic
//!
//! This module drives a complete harvest:
//! - Discovering post links through the pagination walker
//! - Fetching and extracting every post in discovery order
//! - Deriving storage keys and writing bodies without overwriting
//! - Recording metadata in the optional record store
//! - Tallying outcomes for the final summary

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, PageFetcher};
use crate::crawler::paginator::discover;
use crate::crawler::template::CompiledTemplate;
use crate::extract::{extract_post, ExtractError, PostRecord, TagDictionary};
use crate::output::{print_progress, HarvestStats};
use crate::records::RecordStore;
use crate::storage::{derive_storage_key, ContentWriter, ObjectStore, StorageError, StorageKey, WriteOutcome};
use crate::HarvestError;
use reqwest::Client;
use std::path::Path;
use url::Url;

/// Outcome of processing a single post
#[derive(Debug)]
pub enum PostOutcome {
    /// Body written to the object store
    Stored { key: StorageKey, location: String },

    /// An object already existed under the key
    Skipped { key: StorageKey },

    /// The post page could not be fetched
    Unavailable,

    /// The page did not match the expected structure
    Rejected(ExtractError),

    /// The object store failed to accept the body
    StorageFailed(StorageError),
}

/// Main harvest pipeline
pub struct Harvester<S: ObjectStore> {
    fetcher: PageFetcher,
    template: CompiledTemplate,
    dictionary: TagDictionary,
    writer: ContentWriter<S>,
    records: Option<Box<dyn RecordStore>>,
    extension: String,
    max_pages: Option<u32>,
}

impl<S: ObjectStore> Harvester<S> {
    /// Creates a new harvester
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for every request
    /// * `template` - Compiled structural markers of the site
    /// * `dictionary` - Keyword table used for tagging
    /// * `store` - Destination object store
    pub fn new(
        client: Client,
        template: CompiledTemplate,
        dictionary: TagDictionary,
        store: S,
    ) -> Self {
        Self {
            fetcher: PageFetcher::new(client),
            template,
            dictionary,
            writer: ContentWriter::new(store),
            records: None,
            extension: ".txt".to_string(),
            max_pages: None,
        }
    }

    /// Builds a harvester from a validated configuration
    ///
    /// The record store is not opened here; attach one with `with_records`.
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - Invalid template, unreadable tag dictionary or
    ///   HTTP client construction failure
    pub fn from_config(config: &Config, store: S) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.http, &config.user_agent)?;
        let template = CompiledTemplate::compile(&config.template)?;
        let dictionary = TagDictionary::load(Path::new(&config.harvest.tag_dictionary))?;

        Ok(Self::new(client, template, dictionary, store)
            .with_extension(&config.harvest.file_extension)
            .with_max_pages(config.harvest.max_pages))
    }

    pub fn with_records(mut self, records: Box<dyn RecordStore>) -> Self {
        self.records = Some(records);
        self
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Object store the harvester writes to
    pub fn store(&self) -> &S {
        self.writer.store()
    }

    /// Consumes the harvester, returning its object store
    pub fn into_store(self) -> S {
        self.writer.into_store()
    }

    /// Runs discovery and then processes every discovered post in order
    ///
    /// Posts that are unavailable, rejected or fail to store are counted and
    /// the run continues.
    ///
    /// # Returns
    ///
    /// * `Ok(HarvestStats)` - Outcome counts of the run
    /// * `Err(HarvestError::PreconditionViolation)` - A post produced no
    ///   usable storage key; the run stops at that post
    pub async fn run(&mut self, seed: &Url) -> Result<HarvestStats, HarvestError> {
        tracing::info!(seed = %seed, bucket = self.writer.store().bucket(), "Starting harvest");

        let discovery = discover(&mut self.fetcher, &self.template, seed, self.max_pages).await;

        let mut stats = HarvestStats {
            pages_visited: discovery.pages_visited.len(),
            posts_discovered: discovery.posts.len(),
            ..HarvestStats::default()
        };

        for post in &discovery.posts {
            match self.process_post(&post.url, &mut stats).await? {
                PostOutcome::Stored { key, location } => {
                    stats.stored += 1;
                    tracing::debug!(key = %key, location = %location, "Post stored");
                    print_progress(stats.stored, key.as_str());
                }
                PostOutcome::Skipped { .. } => stats.skipped += 1,
                PostOutcome::Unavailable => stats.unavailable += 1,
                PostOutcome::Rejected(e) => {
                    tracing::warn!(url = %post.url, error = %e, "Post rejected");
                    stats.rejected += 1;
                }
                PostOutcome::StorageFailed(e) => {
                    tracing::error!(url = %post.url, error = %e, "Failed to store post");
                    stats.storage_failed += 1;
                }
            }
        }

        tracing::info!(
            pages = stats.pages_visited,
            discovered = stats.posts_discovered,
            summary = %stats,
            "Harvest finished"
        );

        Ok(stats)
    }

    /// Processes a single post: fetch, extract, then persist
    ///
    /// Only a precondition violation while deriving the key is returned as an
    /// error; every other failure becomes a `PostOutcome`.
    async fn process_post(
        &mut self,
        url: &Url,
        stats: &mut HarvestStats,
    ) -> Result<PostOutcome, HarvestError> {
        let mut page = match self.fetcher.fetch_document(url).await {
            Some(page) => page,
            None => return Ok(PostOutcome::Unavailable),
        };

        // Final URL of this fetch, after redirects
        let source_url = self
            .fetcher
            .last_url()
            .cloned()
            .unwrap_or_else(|| page.url.clone());

        let record = match extract_post(&mut page.document, &source_url, &self.template, &self.dictionary)
        {
            Ok(record) => record,
            Err(e) => return Ok(PostOutcome::Rejected(e)),
        };

        self.persist(&record, stats)
    }

    /// Derives the key of an extracted post, writes its body and records it
    fn persist(
        &mut self,
        record: &PostRecord,
        stats: &mut HarvestStats,
    ) -> Result<PostOutcome, HarvestError> {
        let key = derive_storage_key(&record.date_iso(), &record.title, &self.extension)?;

        let outcome = match self.writer.write_if_absent(&key, &record.body) {
            Ok(WriteOutcome::Stored { location }) => PostOutcome::Stored {
                key: key.clone(),
                location,
            },
            Ok(WriteOutcome::Skipped) => PostOutcome::Skipped { key: key.clone() },
            Err(e) => return Ok(PostOutcome::StorageFailed(e)),
        };

        if let Some(records) = self.records.as_mut() {
            match records.insert(record, key.as_str()) {
                Ok(()) => tracing::debug!(key = %key, "Recorded post metadata"),
                Err(StorageError::ConstraintViolation(reason)) => {
                    tracing::debug!(key = %key, reason = %reason, "Post metadata already recorded");
                }
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Failed to record post metadata");
                    stats.record_failures += 1;
                }
            }
        }

        Ok(outcome)
    }
}
