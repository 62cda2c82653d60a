use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Open-Meteo forecast endpoint
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
/// Open-Meteo forward geocoding endpoint
pub const DEFAULT_GEOCODING_SEARCH_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
/// Open-Meteo reverse geocoding endpoint
pub const DEFAULT_GEOCODING_REVERSE_URL: &str = "https://geocoding-api.open-meteo.com/v1/reverse";

const DEFAULT_HTTP_TIMEOUT_SECONDS: f64 = 8.0;
const DEFAULT_CACHE_TTL_SECONDS: i64 = 45;
const MAX_RECOMMENDED_TTL_SECONDS: i64 = 60;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a one-line summary of all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Upstream provider endpoints
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout applied to every upstream call, in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: f64,
}

fn default_timeout_seconds() -> f64 {
    DEFAULT_HTTP_TIMEOUT_SECONDS
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl HttpConfig {
    /// Timeout as a `Duration`. Non-positive or non-finite values fall back to the default.
    pub fn timeout(&self) -> Duration {
        if self.timeout_seconds.is_finite() && self.timeout_seconds > 0.0 {
            Duration::from_secs_f64(self.timeout_seconds)
        } else {
            Duration::from_secs_f64(DEFAULT_HTTP_TIMEOUT_SECONDS)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum age of a cached upstream response, in seconds. Zero or negative disables caching.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: i64,
}

fn default_ttl_seconds() -> i64 {
    DEFAULT_CACHE_TTL_SECONDS
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,

    #[serde(default = "default_geocoding_search_url")]
    pub geocoding_search_url: String,

    #[serde(default = "default_geocoding_reverse_url")]
    pub geocoding_reverse_url: String,
}

fn default_forecast_url() -> String {
    DEFAULT_FORECAST_URL.to_string()
}

fn default_geocoding_search_url() -> String {
    DEFAULT_GEOCODING_SEARCH_URL.to_string()
}

fn default_geocoding_reverse_url() -> String {
    DEFAULT_GEOCODING_REVERSE_URL.to_string()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            forecast_url: default_forecast_url(),
            geocoding_search_url: default_geocoding_search_url(),
            geocoding_reverse_url: default_geocoding_reverse_url(),
        }
    }
}

impl UpstreamConfig {
    /// Point all three endpoints at a single base URL (used against mock servers).
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            forecast_url: format!("{}/v1/forecast", base),
            geocoding_search_url: format!("{}/v1/search", base),
            geocoding_reverse_url: format!("{}/v1/reverse", base),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it with defaults if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors abort loading.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !self.http.timeout_seconds.is_finite() || self.http.timeout_seconds <= 0.0 {
            result.add_error("http.timeout_seconds", "Timeout must be greater than 0");
        }

        if self.cache.ttl_seconds <= 0 {
            result.add_warning("cache.ttl_seconds", "Response caching disabled");
        } else if self.cache.ttl_seconds > MAX_RECOMMENDED_TTL_SECONDS {
            result.add_warning(
                "cache.ttl_seconds",
                format!(
                    "TTL above {} seconds may serve stale weather",
                    MAX_RECOMMENDED_TTL_SECONDS
                ),
            );
        }

        self.validate_url(&self.upstream.forecast_url, "upstream.forecast_url", &mut result);
        self.validate_url(
            &self.upstream.geocoding_search_url,
            "upstream.geocoding_search_url",
            &mut result,
        );
        self.validate_url(
            &self.upstream.geocoding_reverse_url,
            "upstream.geocoding_reverse_url",
            &mut result,
        );

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}
