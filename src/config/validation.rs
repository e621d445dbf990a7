use crate::config::types::{
    Config, HarvestConfig, HttpConfig, LoggingConfig, RecordsConfig, StorageConfig,
    UserAgentConfig,
};
use crate::crawler::CompiledTemplate;
use crate::ConfigError;
use url::Url;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_harvest_config(&config.harvest)?;
    validate_http_config(&config.http)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    if let Some(records) = &config.records {
        validate_records_config(records)?;
    }
    validate_logging_config(&config.logging)?;
    CompiledTemplate::compile(&config.template)?;
    Ok(())
}

fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.seed_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", config.seed_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            config.seed_url
        )));
    }

    if config.tag_dictionary.is_empty() {
        return Err(ConfigError::Validation(
            "tag_dictionary cannot be empty".to_string(),
        ));
    }

    validate_extension(&config.file_extension)?;

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// An extension is either empty or a dot followed by filename-safe characters
///
/// `..` is refused since object keys may not contain it.
fn validate_extension(extension: &str) -> Result<(), ConfigError> {
    if extension.is_empty() {
        return Ok(());
    }

    let valid = extension.starts_with('.')
        && extension.len() > 1
        && !extension.contains("..")
        && extension[1..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_');

    if !valid {
        return Err(ConfigError::Validation(format!(
            "file_extension must look like '.txt', got '{}'",
            extension
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    validate_bucket_name(&config.bucket)?;

    if config.root.is_empty() {
        return Err(ConfigError::Validation(
            "storage root cannot be empty".to_string(),
        ));
    }

    if config.prefix.contains("..") || config.prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "storage prefix must be a relative path without '..', got '{}'",
            config.prefix
        )));
    }

    if let Some(base) = &config.public_base_url {
        Url::parse(base)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid public_base_url: {}", e)))?;
    }

    Ok(())
}

/// Bucket names follow the usual object-store rules: 3-63 characters of
/// lowercase letters, digits, dots and hyphens, starting and ending with a
/// letter or digit.
fn validate_bucket_name(bucket: &str) -> Result<(), ConfigError> {
    if bucket.is_empty() {
        return Err(ConfigError::Validation(
            "bucket cannot be empty".to_string(),
        ));
    }

    if bucket.len() < 3 || bucket.len() > 63 {
        return Err(ConfigError::Validation(format!(
            "bucket '{}' must be between 3 and 63 characters",
            bucket
        )));
    }

    if !bucket
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "bucket '{}' may only contain lowercase letters, digits, '.' and '-'",
            bucket
        )));
    }

    let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric());
    if !edge_ok(bucket.chars().next()) || !edge_ok(bucket.chars().last()) {
        return Err(ConfigError::Validation(format!(
            "bucket '{}' must start and end with a letter or digit",
            bucket
        )));
    }

    Ok(())
}

fn validate_records_config(config: &RecordsConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) -> Result<(), ConfigError> {
    if !LOG_LEVELS.contains(&config.level.as_str()) {
        return Err(ConfigError::Validation(format!(
            "logging level must be one of {:?}, got '{}'",
            LOG_LEVELS, config.level
        )));
    }

    if config.file.as_deref() == Some("") {
        return Err(ConfigError::Validation(
            "logging file cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Must contain exactly one @ with text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
