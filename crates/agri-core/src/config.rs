use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

/// Environment variable holding the OpenRouter API key
pub const ENV_API_KEY: &str = "OPENROUTER_API_KEY";
/// Environment variable holding the calling site's URL (sent as `HTTP-Referer`)
pub const ENV_SITE_URL: &str = "SITE_URL";
/// Environment variable holding the calling site's display name (sent as `X-Title`)
pub const ENV_SITE_NAME: &str = "SITE_NAME";
/// Environment variable overriding the completion model
pub const ENV_MODEL: &str = "OPENROUTER_MODEL";

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

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
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
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub geocoding: GeocodingConfig,

    #[serde(default)]
    pub climate: ClimateConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

/// Chat completion service settings
#[derive(Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    /// Base URL of the OpenAI-compatible API (without `/chat/completions`)
    #[serde(default = "default_openrouter_url")]
    pub base_url: String,

    /// Instruction-following model to request
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token; normally supplied through `OPENROUTER_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

// Hand-written so the API key never ends up in logs.
impl std::fmt::Debug for OpenRouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn default_openrouter_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "meta-llama/llama-3.1-8b-instruct:free".to_string()
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: default_openrouter_url(),
            model: default_model(),
            api_key: None,
        }
    }
}

/// Identity of the site embedding the chat, forwarded to OpenRouter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Nominatim base URL (the client appends `/reverse`)
    #[serde(default = "default_geocoding_url")]
    pub base_url: String,

    /// Nominatim's usage policy requires an identifying User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_geocoding_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("AgriChat/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClimateConfig {
    /// NASA POWER base URL
    #[serde(default = "default_climate_url")]
    pub base_url: String,

    /// Number of past days of daily data to request
    #[serde(default = "default_climate_days")]
    pub days: u32,
}

fn default_climate_url() -> String {
    "https://power.larc.nasa.gov".to_string()
}

fn default_climate_days() -> u32 {
    7
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            base_url: default_climate_url(),
            days: default_climate_days(),
        }
    }
}

/// Transport settings shared by all outbound clients
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout. Unset means the transport default (no timeout).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Load configuration from the default location, then apply environment overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from an explicit TOML file, without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration (from `path`, or the default location), apply
    /// environment overrides, and validate.
    ///
    /// Warnings are logged; errors fail the load.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(path) => {
                let mut config = Self::load_from(path)?;
                config.apply_env_overrides(|key| std::env::var(key).ok());
                config
            }
            None => Self::load()?,
        };

        let validation = config.validate();
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Overlay values from the environment. `lookup` is `std::env::var` in production.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.openrouter.api_key = Some(key);
        }
        if let Some(url) = non_empty(ENV_SITE_URL) {
            self.site.url = url;
        }
        if let Some(name) = non_empty(ENV_SITE_NAME) {
            self.site.name = name;
        }
        if let Some(model) = non_empty(ENV_MODEL) {
            self.openrouter.model = model;
        }
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        validate_url(&self.openrouter.base_url, "openrouter.base_url", &mut result);
        validate_url(&self.geocoding.base_url, "geocoding.base_url", &mut result);
        validate_url(&self.climate.base_url, "climate.base_url", &mut result);

        if self.openrouter.model.trim().is_empty() {
            result.add_error("openrouter.model", "Model name must not be empty");
        }

        if self.openrouter.api_key.is_none() {
            result.add_warning(
                "openrouter.api_key",
                format!("{} not set - advice requests will fail", ENV_API_KEY),
            );
        }

        if self.site.url.is_empty() {
            result.add_warning("site.url", format!("{} not set", ENV_SITE_URL));
        } else {
            validate_url(&self.site.url, "site.url", &mut result);
        }

        if self.site.name.is_empty() {
            result.add_warning("site.name", format!("{} not set", ENV_SITE_NAME));
        }

        if self.geocoding.user_agent.trim().is_empty() {
            result.add_error("geocoding.user_agent", "User-Agent must not be empty");
        }

        if self.climate.days == 0 {
            result.add_error("climate.days", "At least one day of climate data is required");
        } else if self.climate.days > 366 {
            result.add_warning("climate.days", "Climate window is longer than a year");
        }

        if self.http.request_timeout_secs == Some(0) {
            result.add_error("http.request_timeout_secs", "Timeout cannot be 0");
        }

        result
    }

    /// Path of the configuration file, if the platform has a config directory
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("agrichat").join("config.toml"))
    }
}

fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
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
