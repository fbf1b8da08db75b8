use std::env;
use std::str::FromStr;

use crate::error::{Result, ScamLensError};

/// Runtime configuration for one scan run. Built once at startup and
/// validated before any network call is made.
#[derive(Debug, Clone)]
pub struct Config {
    pub places_api_key: String,
    pub vision_api_key: String,

    /// Tab-separated postcode reference file (query point source).
    pub postcode_file: String,
    /// State/region name used to filter the postcode table.
    pub region: String,
    /// Free-text search term, e.g. "wine shop".
    pub query: String,

    pub output_dir: String,

    /// Concurrent in-flight detail requests.
    pub detail_concurrency: usize,
    /// Concurrent listings in the text-detection phase.
    pub detection_concurrency: usize,
    /// Extra result pages to follow per query point, beyond the first.
    pub max_pages: u32,
    /// Wait before using a pagination token; the upstream API rejects
    /// tokens used immediately after issuance.
    pub page_token_delay_ms: u64,
    /// Photos scanned per listing.
    pub photos_per_listing: usize,
    pub search_radius_m: u32,
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let config = Self {
            places_api_key: required_env("PLACES_API_KEY")?,
            vision_api_key: required_env("VISION_API_KEY")?,
            postcode_file: required_env("POSTCODE_FILE")?,
            region: required_env("SCAN_REGION")?,
            query: required_env("SCAN_QUERY")?,
            output_dir: env::var("OUTPUT_DIR").unwrap_or_else(|_| "data".to_string()),
            detail_concurrency: parsed_env("DETAIL_CONCURRENCY", 50)?,
            detection_concurrency: parsed_env("DETECTION_CONCURRENCY", 50)?,
            max_pages: parsed_env("MAX_PAGES", 3)?,
            page_token_delay_ms: parsed_env("PAGE_TOKEN_DELAY_MS", 200)?,
            photos_per_listing: parsed_env("PHOTOS_PER_LISTING", 3)?,
            search_radius_m: parsed_env("SEARCH_RADIUS_M", 5000)?,
            http_timeout_secs: parsed_env("HTTP_TIMEOUT_SECS", 30)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(ScamLensError::Config("SCAN_QUERY must not be empty".into()));
        }
        if self.region.trim().is_empty() {
            return Err(ScamLensError::Config("SCAN_REGION must not be empty".into()));
        }
        if self.detail_concurrency == 0 || self.detection_concurrency == 0 {
            return Err(ScamLensError::Config(
                "concurrency settings must be at least 1".into(),
            ));
        }
        if self.photos_per_listing == 0 {
            return Err(ScamLensError::Config(
                "PHOTOS_PER_LISTING must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Filename stem derived from the search query: "wine shop" -> "wine_shop".
    pub fn query_slug(&self) -> String {
        self.query.split_whitespace().collect::<Vec<_>>().join("_")
    }
}

fn required_env(key: &str) -> Result<String> {
    env::var(key).map_err(|_| ScamLensError::Config(format!("{key} environment variable is required")))
}

fn parsed_env<T: FromStr + Copy>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ScamLensError::Config(format!("{key} must be a number, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}
