//! Server configuration, read from `ARMETIX_*` environment variables.

use serde::Deserialize;
use thiserror::Error;

use armetix_products::DEFAULT_LOW_STOCK_THRESHOLD;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_json: bool,
    pub low_stock_threshold: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            log_json: true,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

impl ApiConfig {
    /// Load from the process environment on top of [`ApiConfig::default`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(config::Environment::with_prefix("ARMETIX").try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Self::default();
        let loaded: Self = config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("log_level", defaults.log_level)?
            .set_default("log_json", defaults.log_json)?
            .set_default("low_stock_threshold", defaults.low_stock_threshold)?
            .add_source(source)
            .build()?
            .try_deserialize()?;
        loaded.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host cannot be empty".to_string()));
        }
        if self.low_stock_threshold < 0 {
            return Err(ConfigError::Invalid(format!(
                "low_stock_threshold must be >= 0, got {}",
                self.low_stock_threshold
            )));
        }
        Ok(self)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
