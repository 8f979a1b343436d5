//! Market data source trait and structured error types.
//!
//! The MarketDataSource trait abstracts over listing APIs (CoinGecko,
//! CoinMarketCap) so the pipeline is written once and tests can swap in a fake.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::{FetchParams, ParamError, Snapshot, DEFAULT_PAGE_SIZE};

/// Structured error types for data operations.
///
/// Displayable in both CLI and TUI contexts. Every variant is terminal for
/// the load that produced it; nothing retries.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network error: {0}")]
    Network(String),

    #[error("api error{}: {message}", http_status(.status))]
    Api { status: Option<u16>, message: String },

    #[error("schema error: {0}")]
    Schema(String),

    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ParamError),
}

fn http_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl DataError {
    /// Short category tag for status bars and error history.
    pub fn category(&self) -> &'static str {
        match self {
            DataError::Network(_) => "NET",
            DataError::Api { .. } => "API",
            DataError::Schema(_) => "SCHEMA",
            DataError::InvalidRequest(_) => "REQ",
        }
    }
}

/// Which listing API a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    CoinGecko,
    CoinMarketCap,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::CoinGecko => "coingecko",
            SourceKind::CoinMarketCap => "coinmarketcap",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SourceKind::CoinGecko => "CoinGecko",
            SourceKind::CoinMarketCap => "CoinMarketCap",
        }
    }

    /// Page size used when none is configured.
    pub fn default_page_size(self) -> u16 {
        match self {
            SourceKind::CoinGecko => DEFAULT_PAGE_SIZE,
            SourceKind::CoinMarketCap => super::coinmarketcap::DEFAULT_LIMIT,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coingecko" | "gecko" | "cg" => Ok(SourceKind::CoinGecko),
            "coinmarketcap" | "cmc" => Ok(SourceKind::CoinMarketCap),
            _ => Err(ParamError::Unknown {
                kind: "source",
                value: s.to_string(),
            }),
        }
    }
}

/// Trait for market data sources.
///
/// Implementations own the request format and the extraction rules of one
/// API. The cache sits above this trait; sources don't know about it.
pub trait MarketDataSource: Send + Sync {
    /// Which API this is.
    fn kind(&self) -> SourceKind;

    /// Issue one blocking request and return the decoded payload.
    fn fetch_raw(&self, params: &FetchParams) -> Result<serde_json::Value, DataError>;

    /// Turn a decoded payload into a snapshot.
    fn shape(&self, payload: &serde_json::Value, params: &FetchParams) -> Result<Snapshot, DataError>;

    /// Fetch and shape in one step.
    fn fetch(&self, params: &FetchParams) -> Result<Snapshot, DataError> {
        let payload = self.fetch_raw(params)?;
        self.shape(&payload, params)
    }
}
