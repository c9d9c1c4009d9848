//! Configuration management for CiteForge
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with CITEFORGE__)
//! - Configuration files (config/default.toml, config/{env}.toml, config/local.toml)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AppConfig {
    /// Metadata service configuration
    #[serde(default)]
    #[validate(nested)]
    pub scholar: ScholarConfig,

    /// Pruning and promotion thresholds
    #[serde(default)]
    #[validate(nested)]
    pub classification: ClassificationConfig,

    /// Export targets
    #[serde(default)]
    #[validate(nested)]
    pub output: OutputConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// What to do when the metadata service starts rate limiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitMode {
    /// Ask on the console
    Ask,
    /// Always keep waiting
    Wait,
    /// Stop processing the bibliography
    Abort,
}

/// Which records feed the quantile computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantileBasis {
    /// Only records currently tagged `New`
    NewOnly,
    /// Every record in the corpus, whatever its tag
    AllRecords,
}

/// Occurrence policy when an owned paper is seen again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnedResighting {
    /// Count the re-sighting like any other
    Increment,
    /// Only retag, leave the count untouched
    Keep,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ScholarConfig {
    /// API base URL
    #[serde(default = "default_base_url")]
    #[validate(length(min = 1))]
    pub base_url: String,

    /// API key, sent as `x-api-key`
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    /// Fixed delay between rate-limited attempts
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// Maximum requests per identifier
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1))]
    pub max_attempts: u32,

    #[serde(default = "default_rate_limit_mode")]
    pub on_rate_limit: RateLimitMode,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ClassificationConfig {
    /// New papers at or below this quantile are pruned
    #[serde(default = "default_prune_quantile")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub prune_quantile: f64,

    /// New papers at or above this quantile are recommended
    #[serde(default = "default_promote_quantile")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub promote_quantile: f64,

    #[serde(default = "default_quantile_basis")]
    pub quantile_basis: QuantileBasis,

    #[serde(default = "default_owned_resighting")]
    pub owned_resighting: OwnedResighting,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct OutputConfig {
    /// CSV list of recommended papers
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,

    /// Interactive graph page
    #[serde(default = "default_graph_path")]
    pub graph_path: PathBuf,

    /// Replace existing files
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,

    /// Rendered size of the most frequent paper
    #[serde(default = "default_max_node_size")]
    #[validate(range(min = 1))]
    pub max_node_size: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error) or a full filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logging: bool,

    /// Write a Prometheus text snapshot here after the run
    pub metrics_path: Option<PathBuf>,
}

// Default value functions
fn default_base_url() -> String { crate::DEFAULT_SCHOLAR_BASE_URL.to_string() }
fn default_timeout() -> u64 { 30 }
fn default_retry_delay() -> u64 { 5 }
fn default_max_attempts() -> u32 { 10 }
fn default_rate_limit_mode() -> RateLimitMode { RateLimitMode::Ask }
fn default_prune_quantile() -> f64 { 0.95 }
fn default_promote_quantile() -> f64 { 0.98 }
fn default_quantile_basis() -> QuantileBasis { QuantileBasis::NewOnly }
fn default_owned_resighting() -> OwnedResighting { OwnedResighting::Increment }
fn default_csv_path() -> PathBuf { PathBuf::from("recommended_papers.csv") }
fn default_graph_path() -> PathBuf { PathBuf::from("paper_connections.html") }
fn default_overwrite() -> bool { true }
fn default_max_node_size() -> u32 { 10 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ScholarConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout(),
            retry_delay_secs: default_retry_delay(),
            max_attempts: default_max_attempts(),
            on_rate_limit: default_rate_limit_mode(),
        }
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            prune_quantile: default_prune_quantile(),
            promote_quantile: default_promote_quantile(),
            quantile_basis: default_quantile_basis(),
            owned_resighting: default_owned_resighting(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            graph_path: default_graph_path(),
            overwrite: default_overwrite(),
            max_node_size: default_max_node_size(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: false,
            metrics_path: None,
        }
    }
}

impl ScholarConfig {
    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the delay between rate-limited attempts as Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("CITEFORGE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with CITEFORGE__ prefix
            // e.g., CITEFORGE__SCHOLAR__MAX_ATTEMPTS=3
            .add_source(
                Environment::with_prefix("CITEFORGE")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific file, still honouring environment overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix("CITEFORGE")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Validate ranges and return the configuration unchanged
    pub fn validated(self) -> crate::Result<Self> {
        self.validate()?;

        // Range checks let NaN through
        for (name, q) in [
            ("prune_quantile", self.classification.prune_quantile),
            ("promote_quantile", self.classification.promote_quantile),
        ] {
            if !q.is_finite() {
                return Err(crate::AppError::Validation {
                    message: format!("classification.{} must be a number in [0, 1], got {}", name, q),
                });
            }
        }

        if self.classification.promote_quantile < self.classification.prune_quantile {
            tracing::warn!(
                prune = self.classification.prune_quantile,
                promote = self.classification.promote_quantile,
                "Promotion quantile is below the pruning quantile; every surviving new paper will be recommended"
            );
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scholar.max_attempts, 10);
        assert_eq!(config.scholar.retry_delay(), Duration::from_secs(5));
        assert_eq!(config.classification.prune_quantile, 0.95);
        assert_eq!(config.classification.promote_quantile, 0.98);
        assert_eq!(config.classification.quantile_basis, QuantileBasis::NewOnly);
        assert_eq!(config.classification.owned_resighting, OwnedResighting::Increment);
        assert!(config.output.overwrite);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validated().is_ok());
    }

    #[test]
    fn test_out_of_range_quantile_rejected() {
        let mut config = AppConfig::default();
        config.classification.prune_quantile = 1.5;
        let err = config.validated().unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::ValidationError);
    }

    #[test]
    fn test_nan_quantile_rejected() {
        let mut config = AppConfig::default();
        config.classification.prune_quantile = f64::NAN;
        let err = config.validated().unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::ValidationError);
        assert!(err.to_string().contains("prune_quantile"));

        let mut config = AppConfig::default();
        config.classification.promote_quantile = f64::NAN;
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = AppConfig::default();
        config.scholar.max_attempts = 0;
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("citeforge.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[classification]").unwrap();
        writeln!(file, "prune_quantile = 0.9").unwrap();
        writeln!(file, "owned_resighting = \"keep\"").unwrap();
        writeln!(file, "[scholar]").unwrap();
        writeln!(file, "on_rate_limit = \"abort\"").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.classification.prune_quantile, 0.9);
        assert_eq!(config.classification.promote_quantile, 0.98);
        assert_eq!(config.classification.owned_resighting, OwnedResighting::Keep);
        assert_eq!(config.scholar.on_rate_limit, RateLimitMode::Abort);
        assert_eq!(config.scholar.base_url, crate::DEFAULT_SCHOLAR_BASE_URL);
        assert_eq!(config.output.csv_path, PathBuf::from("recommended_papers.csv"));
    }
}
