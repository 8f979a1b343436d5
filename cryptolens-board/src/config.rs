//! Application configuration.
//!
//! Resolution order: an explicit `--config` path, else
//! `{config_dir}/cryptolens/config.toml` when it exists, else built-in
//! defaults. Environment variables are applied last. The API key is never
//! compiled in; it comes from the variable named by
//! `coinmarketcap.api_key_env` or from the config file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use cryptolens_core::data::cache::DEFAULT_CAPACITY;
use cryptolens_core::data::http::DEFAULT_TIMEOUT;
use cryptolens_core::data::{coingecko, coinmarketcap};
use cryptolens_core::data::{ApiKey, CoinGeckoSource, CoinMarketCapSource, MarketDataSource, SourceKind};
use cryptolens_core::domain::{Currency, FetchParams, SortOrder, Timeframe};

use crate::export::DEFAULT_EXPORT_FILE;

pub const ENV_SOURCE: &str = "CRYPTOLENS_SOURCE";
pub const ENV_CACHE_CAPACITY: &str = "CRYPTOLENS_CACHE_CAPACITY";
pub const ENV_TIMEOUT_SECS: &str = "CRYPTOLENS_TIMEOUT_SECS";
pub const DEFAULT_API_KEY_ENV: &str = "CMC_PRO_API_KEY";

const REDACTED: &str = "***";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceKind,
    pub cache_capacity: usize,
    pub timeout_secs: u64,
    pub export_path: PathBuf,
    pub coingecko: CoinGeckoConfig,
    pub coinmarketcap: CoinMarketCapConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinGeckoConfig {
    pub base_url: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoinMarketCapConfig {
    pub base_url: String,
    /// Name of the environment variable holding the key.
    pub api_key_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

/// Initial control values for both front ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub currency: Currency,
    /// `None` uses the source's default listing size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u16>,
    pub order: SortOrder,
    pub timeframe: Timeframe,
    /// `None` shows every selected coin.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    pub ascending: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            cache_capacity: DEFAULT_CAPACITY,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
            coingecko: CoinGeckoConfig::default(),
            coinmarketcap: CoinMarketCapConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: coingecko::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Default for CoinMarketCapConfig {
    fn default() -> Self {
        Self {
            base_url: coinmarketcap::DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
        }
    }
}

impl fmt::Debug for CoinMarketCapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoinMarketCapConfig")
            .field("base_url", &self.base_url)
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .finish()
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            page_size: None,
            order: SortOrder::default(),
            timeframe: Timeframe::default(),
            top_n: None,
            ascending: true,
        }
    }
}

impl AppConfig {
    /// `{config_dir}/cryptolens/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cryptolens").join("config.toml"))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid config TOML")
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Resolve the effective config from files and the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => {
                    debug!(path = %path.display(), "loading config");
                    Self::load_file(&path)?
                }
                None => Self::default(),
            },
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_SOURCE) {
            self.source = value
                .parse()
                .with_context(|| format!("{ENV_SOURCE}={value}"))?;
        }
        if let Some(value) = lookup(ENV_CACHE_CAPACITY) {
            self.cache_capacity = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_CACHE_CAPACITY}={value}"))?;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = value
                .trim()
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS}={value}"))?;
        }
        if let Some(key) = lookup(&self.coinmarketcap.api_key_env).filter(|k| !k.trim().is_empty()) {
            self.coinmarketcap.api_key = Some(key.trim().to_string());
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            bail!("cache_capacity must be at least 1");
        }
        if self.timeout_secs == 0 {
            bail!("timeout_secs must be at least 1");
        }
        self.fetch_params()?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured page size, else the source's default.
    pub fn page_size(&self) -> u16 {
        self.defaults
            .page_size
            .unwrap_or_else(|| self.source.default_page_size())
    }

    pub fn fetch_params(&self) -> Result<FetchParams> {
        let d = &self.defaults;
        FetchParams::new(d.currency, self.page_size(), d.order).context("invalid [defaults]")
    }

    pub fn api_key(&self) -> Option<ApiKey> {
        self.coinmarketcap.api_key.as_deref().map(ApiKey::new)
    }

    /// Construct the configured source.
    pub fn build_source(&self) -> Result<Box<dyn MarketDataSource>> {
        self.build_source_for(self.source)
    }

    pub fn build_source_for(&self, kind: SourceKind) -> Result<Box<dyn MarketDataSource>> {
        info!(source = %kind, timeout_secs = self.timeout_secs, "building market data source");
        let source: Box<dyn MarketDataSource> = match kind {
            SourceKind::CoinGecko => Box::new(
                CoinGeckoSource::new(self.coingecko.base_url.clone(), self.timeout())
                    .context("failed to build CoinGecko client")?,
            ),
            SourceKind::CoinMarketCap => {
                let Some(key) = self.api_key() else {
                    bail!(
                        "CoinMarketCap needs an API key: set {} or coinmarketcap.api_key",
                        self.coinmarketcap.api_key_env
                    );
                };
                Box::new(
                    CoinMarketCapSource::new(self.coinmarketcap.base_url.clone(), key, self.timeout())
                        .context("failed to build CoinMarketCap client")?,
                )
            }
        };
        Ok(source)
    }

    /// TOML rendering with the API key masked, for `config show`.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.coinmarketcap.api_key.is_some() {
            shown.coinmarketcap.api_key = Some(REDACTED.to_string());
        }
        toml::to_string_pretty(&shown).context("failed to render config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.cache_capacity, 8);
        assert_eq!(config.export_path, PathBuf::from("crypto_prices.csv"));
    }

    #[test]
    fn parses_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            source = "coinmarketcap"
            cache_capacity = 3

            [coinmarketcap]
            api_key_env = "MY_CMC_KEY"

            [defaults]
            currency = "eth"
            page_size = 100
            order = "volume_desc"
            timeframe = "24h"
            top_n = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.source, SourceKind::CoinMarketCap);
        assert_eq!(config.cache_capacity, 3);
        assert_eq!(config.coinmarketcap.api_key_env, "MY_CMC_KEY");
        assert_eq!(config.coinmarketcap.base_url, coinmarketcap::DEFAULT_BASE_URL);
        assert_eq!(config.defaults.currency, Currency::Eth);
        assert_eq!(config.defaults.order, SortOrder::VolumeDesc);
        assert_eq!(config.defaults.timeframe, Timeframe::Hour24);
        assert_eq!(config.defaults.top_n, Some(10));
        assert_eq!(config.fetch_params().unwrap().page_size(), 100);
    }

    #[test]
    fn page_size_defaults_per_source() {
        let mut config = AppConfig::default();
        assert_eq!(config.fetch_params().unwrap().page_size(), 50);

        config.source = SourceKind::CoinMarketCap;
        assert_eq!(config.fetch_params().unwrap().page_size(), 100);

        config.defaults.page_size = Some(30);
        assert_eq!(config.fetch_params().unwrap().page_size(), 30);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = AppConfig::from_toml_str("[coinmarketcap]\napi_key = \"from-file\"").unwrap();
        config
            .apply_env(env(&[
                (ENV_SOURCE, "cmc"),
                (ENV_TIMEOUT_SECS, "5"),
                (DEFAULT_API_KEY_ENV, "from-env"),
            ]))
            .unwrap();
        assert_eq!(config.source, SourceKind::CoinMarketCap);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.api_key().unwrap().expose(), "from-env");
    }

    #[test]
    fn custom_key_variable_is_honoured() {
        let mut config = AppConfig::default();
        config.coinmarketcap.api_key_env = "OTHER_KEY".into();
        config
            .apply_env(env(&[(DEFAULT_API_KEY_ENV, "ignored"), ("OTHER_KEY", "k2")]))
            .unwrap();
        assert_eq!(config.api_key().unwrap().expose(), "k2");
    }

    #[test]
    fn bad_env_value_is_an_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(env(&[(ENV_CACHE_CAPACITY, "lots")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains(ENV_CACHE_CAPACITY));
    }

    #[test]
    fn invalid_defaults_fail_validation() {
        let config = AppConfig::from_toml_str("[defaults]\npage_size = 0").unwrap();
        assert!(config.validate().is_err());
        let config = AppConfig::from_toml_str("cache_capacity = 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn cmc_without_key_is_refused() {
        let config = AppConfig {
            source: SourceKind::CoinMarketCap,
            ..AppConfig::default()
        };
        let err = config.build_source().err().unwrap();
        assert!(err.to_string().contains(DEFAULT_API_KEY_ENV));
    }

    #[test]
    fn key_never_printed() {
        let mut config = AppConfig::default();
        config.coinmarketcap.api_key = Some("secret-value".into());
        assert!(!format!("{config:?}").contains("secret-value"));
        let shown = config.to_redacted_toml().unwrap();
        assert!(!shown.contains("secret-value"));
        assert!(shown.contains("***"));
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load_file(&missing).is_err());

        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = 7").unwrap();
        assert_eq!(AppConfig::load_file(&path).unwrap().timeout_secs, 7);
    }
}
