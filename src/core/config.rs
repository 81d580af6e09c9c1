use crate::providers::exchange_rate_api::DEFAULT_ENDPOINT;
use crate::rate_provider::{
    DEFAULT_CACHE_EXPIRY, DEFAULT_CACHE_FILE, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY,
    RateSettings,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub endpoint: String,
    pub max_retries: u32,
    pub retry_delay_secs: f64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_secs: DEFAULT_RETRY_DELAY.as_secs_f64(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub path: Option<String>,
    pub expiry_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            path: None,
            expiry_secs: DEFAULT_CACHE_EXPIRY.as_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub targets: Vec<String>,
    pub provider: ProviderConfig,
    pub cache: CacheConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            targets: ["RUB", "EUR", "GBP", "CNY"]
                .into_iter()
                .map(String::from)
                .collect(),
            provider: ProviderConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads `path` when given, otherwise the default config file if one
    /// exists, otherwise built-in defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        match Self::default_config_path() {
            Ok(default_path) if default_path.exists() => Self::load_from_path(&default_path),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxconv", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// The configured cache file, falling back to the data directory and
    /// then the working directory.
    pub fn cache_path(&self) -> PathBuf {
        if let Some(custom_path) = &self.cache.path {
            return PathBuf::from(custom_path);
        }
        Self::default_data_path()
            .map(|dir| dir.join(DEFAULT_CACHE_FILE))
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_FILE))
    }

    /// Base currency label, taken from the last path segment of the endpoint
    /// (`.../latest/USD`). Falls back to "base" when that is not a currency
    /// code.
    pub fn base_currency(&self) -> String {
        reqwest::Url::parse(&self.provider.endpoint)
            .ok()
            .and_then(|url| {
                url.path_segments()
                    .and_then(|segments| segments.last().map(str::to_string))
            })
            .filter(|code| code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()))
            .map(|code| code.to_ascii_uppercase())
            .unwrap_or_else(|| "base".to_string())
    }

    pub fn rate_settings(&self) -> Result<RateSettings> {
        let retry_delay = Duration::try_from_secs_f64(self.provider.retry_delay_secs)
            .with_context(|| {
                format!(
                    "Invalid retry_delay_secs: {}",
                    self.provider.retry_delay_secs
                )
            })?;

        Ok(RateSettings {
            endpoint: self.provider.endpoint.clone(),
            cache_path: self.cache_path(),
            cache_expiry: Duration::from_secs(self.cache.expiry_secs),
            max_retries: self.provider.max_retries,
            retry_delay,
        })
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
targets: ["EUR", "JPY"]
provider:
  endpoint: "http://example.com/latest/USD"
  max_retries: 5
  retry_delay_secs: 0.5
cache:
  path: "/tmp/rates.json"
  expiry_secs: 60
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.targets, vec!["EUR", "JPY"]);
        assert_eq!(config.provider.endpoint, "http://example.com/latest/USD");
        assert_eq!(config.base_currency(), "USD");

        let settings = config.rate_settings().unwrap();
        assert_eq!(settings.endpoint, "http://example.com/latest/USD");
        assert_eq!(settings.cache_path, PathBuf::from("/tmp/rates.json"));
        assert_eq!(settings.cache_expiry, Duration::from_secs(60));
        assert_eq!(settings.max_retries, 5);
        assert_eq!(settings.retry_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml_str = r#"
targets: ["GBP"]
provider:
  max_retries: 1
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str).unwrap();
        assert_eq!(config.base_currency(), "USD");
        assert_eq!(config.targets, vec!["GBP"]);
        assert_eq!(config.provider.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.provider.max_retries, 1);
        assert_eq!(config.provider.retry_delay_secs, 2.0);
        assert_eq!(config.cache.expiry_secs, 3600);
        assert!(config.cache.path.is_none());
        assert!(config.cache_path().ends_with(DEFAULT_CACHE_FILE));
    }

    #[test]
    fn test_base_currency_follows_endpoint() {
        let mut config = AppConfig::default();

        config.provider.endpoint = "https://api.exchangerate-api.com/v4/latest/EUR".to_string();
        assert_eq!(config.base_currency(), "EUR");

        config.provider.endpoint = "http://127.0.0.1:8080/v4/latest/gbp?key=abc".to_string();
        assert_eq!(config.base_currency(), "GBP");

        config.provider.endpoint = "http://127.0.0.1:8080/rates.json".to_string();
        assert_eq!(config.base_currency(), "base");

        config.provider.endpoint = "not a url".to_string();
        assert_eq!(config.base_currency(), "base");
    }

    #[test]
    fn test_negative_retry_delay_is_rejected() {
        let mut config = AppConfig::default();
        config.provider.retry_delay_secs = -1.0;
        let err = config.rate_settings().unwrap_err();
        assert!(err.to_string().contains("retry_delay_secs"));
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_or_default(Some("/nonexistent/fxconv/config.yaml"));
        assert!(result.is_err());
    }
}
