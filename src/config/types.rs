use crate::crawler::SiteTemplate;
use serde::Deserialize;

/// Main configuration structure for Blog-Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub harvest: HarvestConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub records: Option<RecordsConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub template: SiteTemplate,
}

impl Config {
    /// Applies command-line overrides on top of the file values
    ///
    /// The caller is expected to validate the configuration again afterwards.
    pub fn apply_overrides(&mut self, seed_url: Option<String>, bucket: Option<String>) {
        if let Some(seed_url) = seed_url {
            self.harvest.seed_url = seed_url;
        }
        if let Some(bucket) = bucket {
            self.storage.bucket = bucket;
        }
    }
}

/// What to harvest and how to name it
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// First page of the paginated listing
    #[serde(rename = "seed-url")]
    pub seed_url: String,

    /// Newline-delimited keyword list used for tagging
    #[serde(rename = "tag-dictionary")]
    pub tag_dictionary: String,

    /// Extension appended to every storage key
    #[serde(rename = "file-extension", default = "default_extension")]
    pub file_extension: String,

    /// Upper bound on listing pages walked during discovery
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,
}

/// HTTP client behavior
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the header value: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Object store destination
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Bucket (namespace) name
    pub bucket: String,

    /// Local directory holding the buckets
    #[serde(default = "default_storage_root")]
    pub root: String,

    /// Key prefix inside the bucket
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Base of the public URL reported for stored objects
    #[serde(rename = "public-base-url", default)]
    pub public_base_url: Option<String>,
}

/// Secondary record store
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// Log level and destination
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file; logs go to stderr only when unset
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_extension() -> String {
    ".txt".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_storage_root() -> String {
    "./objects".to_string()
}

fn default_prefix() -> String {
    "data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
