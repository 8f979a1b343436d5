//! CoinMarketCap listings source (authenticated).
//!
//! `GET /v1/cryptocurrency/listings/latest` with the key in the
//! `X-CMC_PRO_API_KEY` header. The response is an envelope
//! `{status, data}`; per-currency values sit under `coin.quote[CUR]`.
//! A non-zero `status.error_code` is an API failure even under HTTP 200.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use serde_json::Value;
use tracing::info;

use super::coingecko::json_kind;
use super::http;
use super::provider::{DataError, MarketDataSource, SourceKind};
use super::shape::{shape_items, FieldRule, ShapeRules};
use crate::domain::{Column, FetchParams, Snapshot, SortOrder};

pub const DEFAULT_BASE_URL: &str =
    "https://pro-api.coinmarketcap.com/v1/cryptocurrency/listings/latest";
pub const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";
/// Listing size when the page size is not configured.
pub const DEFAULT_LIMIT: u16 = 100;

const RULES: ShapeRules = ShapeRules {
    name_field: "name",
    symbol_field: "symbol",
    quote_field: Some("quote"),
    fields: &[
        FieldRule::top(Column::Rank, "cmc_rank"),
        FieldRule::quote(Column::Price, "price"),
        FieldRule::quote(Column::MarketCap, "market_cap"),
        FieldRule::quote(Column::Volume24h, "volume_24h"),
        FieldRule::quote(Column::Change1h, "percent_change_1h"),
        FieldRule::quote(Column::Change24h, "percent_change_24h"),
        FieldRule::quote(Column::Change7d, "percent_change_7d"),
    ],
};

/// API key wrapper that never prints its contents.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// CoinMarketCap `/listings/latest` source.
pub struct CoinMarketCapSource {
    client: Client,
    base_url: String,
    api_key: ApiKey,
}

impl CoinMarketCapSource {
    pub fn new(base_url: impl Into<String>, api_key: ApiKey, timeout: Duration) -> Result<Self, DataError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            base_url: base_url.into(),
            api_key,
        })
    }

    /// Build the listings URL for a parameter set.
    ///
    /// `sort`/`sort_dir` are only sent when they differ from the API's own
    /// market-cap-descending default.
    pub fn listings_url(&self, params: &FetchParams) -> Result<Url, DataError> {
        let limit = params.page_size().to_string();
        let mut query = vec![
            ("start", "1"),
            ("limit", limit.as_str()),
            ("convert", params.currency.upper_code()),
        ];
        if params.sort_order != SortOrder::MarketCapDesc {
            query.push(("sort", params.sort_order.sort_field()));
            query.push(("sort_dir", params.sort_order.direction()));
        }
        Url::parse_with_params(&self.base_url, &query)
        .map_err(|e| DataError::Network(format!("invalid base URL '{}': {e}", self.base_url)))
    }
}

impl MarketDataSource for CoinMarketCapSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CoinMarketCap
    }

    fn fetch_raw(&self, params: &FetchParams) -> Result<Value, DataError> {
        let url = self.listings_url(params)?;
        info!(source = "coinmarketcap", %params, "fetching listings");
        let request = self
            .client
            .get(url)
            .header("Accepts", "application/json")
            .header(API_KEY_HEADER, self.api_key.expose());
        http::send_json(request)
    }

    fn shape(&self, payload: &Value, params: &FetchParams) -> Result<Snapshot, DataError> {
        shape_listings(payload, params)
    }
}

/// Shape a `/listings/latest` envelope.
pub fn shape_listings(payload: &Value, params: &FetchParams) -> Result<Snapshot, DataError> {
    let error_code = payload
        .get("status")
        .and_then(|s| s.get("error_code"))
        .and_then(Value::as_i64)
        .unwrap_or(0);
    if error_code != 0 {
        let message = http::error_message(payload)
            .unwrap_or_else(|| format!("error code {error_code}"));
        return Err(DataError::Api {
            status: None,
            message,
        });
    }

    let items = match payload.get("data") {
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(DataError::Schema(format!(
                "expected 'data' to be an array, got {}",
                json_kind(other)
            )))
        }
        None => return Err(DataError::Schema("response has no 'data' field".into())),
    };

    let shaped = shape_items(items, &RULES, params.currency)?;
    info!(
        source = "coinmarketcap",
        records = shaped.records.len(),
        skipped = shaped.skipped,
        duplicates = shaped.duplicates,
        "shaped listings"
    );
    Ok(Snapshot::new(
        SourceKind::CoinMarketCap,
        *params,
        shaped.records,
        shaped.schema,
    ))
}
