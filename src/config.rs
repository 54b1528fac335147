// Configuration for the sync layer.
// Every component has a serde-deserializable section with working defaults.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::{MAX_TTL, paths};
use crate::error::{Result, SyncError};
use crate::sync::SyncTarget;

/// Top-level configuration, usually loaded from a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limiter: RateLimiterConfig,
    pub cache: CacheConfig,
    pub sheets: SheetsConfig,
    pub geocoder: GeocoderConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Parse configuration from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load the config file from the platform config directory, or defaults
    /// when there is none.
    pub fn load_default() -> Result<Self> {
        match paths::config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        if self.cache.max_size == 0 {
            return Err(SyncError::Config("cache.max_size must be at least 1".into()));
        }
        let max_ttl_secs = MAX_TTL.as_secs();
        if self.cache.default_ttl_secs > max_ttl_secs {
            return Err(SyncError::Config(format!(
                "cache.default_ttl_secs must be at most {}",
                max_ttl_secs
            )));
        }
        if self.cache.cleanup_interval_secs > max_ttl_secs {
            return Err(SyncError::Config(format!(
                "cache.cleanup_interval_secs must be at most {}",
                max_ttl_secs
            )));
        }
        if self.limiter.call_timeout_secs == 0 {
            return Err(SyncError::Config(
                "limiter.call_timeout_secs must be at least 1".into(),
            ));
        }

        let mut namespaces = HashSet::new();
        for target in &self.pipeline.targets {
            target.validate()?;
            if !namespaces.insert(target.namespace.as_str()) {
                return Err(SyncError::Config(format!(
                    "duplicate target namespace: {}",
                    target.namespace
                )));
            }
        }
        Ok(())
    }
}

/// Document API rate limiter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimiterConfig {
    /// Minimum spacing between call starts.
    pub cooldown_ms: u64,
    /// Quota retries after the first attempt.
    pub max_retries: u32,
    /// Hard timeout per dispatched call.
    pub call_timeout_secs: u64,
}

impl RateLimiterConfig {
    /// Spacing between call starts.
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Per-call timeout; `None` when disabled.
    pub fn call_timeout(&self) -> Option<Duration> {
        (self.call_timeout_secs > 0).then(|| Duration::from_secs(self.call_timeout_secs))
    }
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 1000,
            max_retries: 5,
            call_timeout_secs: 60,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub default_ttl_secs: u64,
    pub max_size: usize,
    /// Interval of the background sweep; 0 disables it.
    pub cleanup_interval_secs: u64,
}

impl CacheConfig {
    /// TTL for entries stored without one.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Background sweep interval; `None` when disabled.
    pub fn cleanup_interval(&self) -> Option<Duration> {
        (self.cleanup_interval_secs > 0).then(|| Duration::from_secs(self.cleanup_interval_secs))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 5 * 60,
            max_size: 200,
            cleanup_interval_secs: 60,
        }
    }
}

/// Spreadsheet values API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    pub base_url: String,
    pub spreadsheet_id: String,
    pub timeout_secs: u64,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sheets.googleapis.com".into(),
            spreadsheet_id: String::new(),
            timeout_secs: 60,
        }
    }
}

/// Geocoding service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Prefixed to addresses that name no city, district, or county.
    pub default_region: String,
    pub timeout_secs: u64,
    /// Fixed wait before the extra retry after a 429 from the geocoder.
    pub quota_retry_delay_ms: u64,
    pub network_retries: u32,
    /// First network retry delay; doubles per retry.
    pub network_backoff_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dapi.kakao.com/v2/local/search/address.json".into(),
            default_region: "서울특별시".into(),
            timeout_secs: 10,
            quota_retry_delay_ms: 5000,
            network_retries: 2,
            network_backoff_ms: 2000,
        }
    }
}

/// Geocoding sync pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fixed delay between consecutive geocode calls in one run.
    pub pacing_ms: u64,
    /// Send a summary to the notification sink when rows changed.
    pub notify: bool,
    pub targets: Vec<SyncTarget>,
}

impl PipelineConfig {
    /// Delay between consecutive geocode calls.
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pacing_ms: 500,
            notify: true,
            targets: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::Column;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.limiter.cooldown(), Duration::from_secs(1));
        assert_eq!(config.limiter.max_retries, 5);
        assert_eq!(config.cache.default_ttl(), Duration::from_secs(300));
        assert_eq!(config.cache.max_size, 200);
        assert_eq!(config.pipeline.pacing(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "limiter": { "cooldown_ms": 250 },
            "sheets": { "spreadsheet_id": "abc" },
            "pipeline": {
                "targets": [{
                    "namespace": "store",
                    "sheet": "Stores",
                    "key_columns": ["A"],
                    "address_columns": ["C", "D"],
                    "lat_column": "F",
                    "lng_column": "G",
                    "status": { "column": "H", "inactive_values": ["폐점"] }
                }]
            }
        }"#;

        let config = Config::from_json(json).unwrap();
        assert_eq!(config.limiter.cooldown_ms, 250);
        assert_eq!(config.limiter.max_retries, 5);
        assert_eq!(config.sheets.spreadsheet_id, "abc");
        assert_eq!(config.sheets.timeout_secs, 60);

        let target = &config.pipeline.targets[0];
        assert_eq!(target.first_row, 2);
        assert_eq!(target.address_columns, vec![Column(2), Column(3)]);
        assert_eq!(target.lat_column, Column(5));
    }

    #[test]
    fn test_rejects_duplicate_namespaces() {
        let target = r#"{ "namespace": "store", "sheet": "S", "key_columns": ["A"],
            "address_columns": ["B"], "lat_column": "C", "lng_column": "D" }"#;
        let json = format!(r#"{{ "pipeline": {{ "targets": [{}, {}] }} }}"#, target, target);
        assert!(matches!(Config::from_json(&json), Err(SyncError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_cache_size() {
        let json = r#"{ "cache": { "max_size": 0 } }"#;
        assert!(matches!(Config::from_json(json), Err(SyncError::Config(_))));
    }

    #[test]
    fn test_rejects_huge_cache_durations() {
        let json = r#"{ "cache": { "default_ttl_secs": 18446744073709551615 } }"#;
        assert!(matches!(Config::from_json(json), Err(SyncError::Config(_))));

        let json = r#"{ "cache": { "cleanup_interval_secs": 18446744073709551615 } }"#;
        assert!(matches!(Config::from_json(json), Err(SyncError::Config(_))));

        let json = format!(r#"{{ "cache": {{ "default_ttl_secs": {} }} }}"#, MAX_TTL.as_secs());
        assert!(Config::from_json(&json).is_ok());
    }

    #[test]
    fn test_load_or_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.cache.max_size, 200);

        std::fs::write(&path, r#"{ "cache": { "max_size": 20 } }"#).unwrap();
        let config = Config::load_or_default(&path).unwrap();
        assert_eq!(config.cache.max_size, 20);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sheetsync.json");
        std::fs::write(&path, r#"{ "cache": { "default_ttl_secs": 30 } }"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.cache.default_ttl(), Duration::from_secs(30));
    }
}
