//! CoinGecko markets source (public, no key).
//!
//! `GET /coins/markets` returns a flat JSON array of coin objects with the
//! percent-change windows requested inline. Errors come back as an object
//! (`{"error": ...}` or `{"status": {"error_message": ...}}`) instead of an array.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use serde_json::Value;
use tracing::info;

use super::http;
use super::provider::{DataError, MarketDataSource, SourceKind};
use super::shape::{shape_items, FieldRule, ShapeRules};
use crate::domain::{Column, FetchParams, Snapshot};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3/coins/markets";

const RULES: ShapeRules = ShapeRules {
    name_field: "name",
    symbol_field: "symbol",
    quote_field: None,
    fields: &[
        FieldRule::top(Column::Rank, "market_cap_rank"),
        FieldRule::top(Column::Price, "current_price"),
        FieldRule::top(Column::MarketCap, "market_cap"),
        FieldRule::top(Column::Volume24h, "total_volume"),
        FieldRule::top(Column::Change1h, "price_change_percentage_1h_in_currency"),
        FieldRule::top(Column::Change24h, "price_change_percentage_24h_in_currency"),
        FieldRule::top(Column::Change7d, "price_change_percentage_7d_in_currency"),
    ],
};

/// CoinGecko `/coins/markets` source.
pub struct CoinGeckoSource {
    client: Client,
    base_url: String,
}

impl CoinGeckoSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DataError> {
        Ok(Self {
            client: http::build_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    /// Build the markets URL for a parameter set.
    pub fn markets_url(&self, params: &FetchParams) -> Result<Url, DataError> {
        let per_page = params.page_size().to_string();
        Url::parse_with_params(
            &self.base_url,
            &[
                ("vs_currency", params.currency.code()),
                ("order", params.sort_order.as_str()),
                ("per_page", per_page.as_str()),
                ("page", "1"),
                ("sparkline", "false"),
                ("price_change_percentage", "1h,24h,7d"),
            ],
        )
        .map_err(|e| DataError::Network(format!("invalid base URL '{}': {e}", self.base_url)))
    }
}

impl MarketDataSource for CoinGeckoSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CoinGecko
    }

    fn fetch_raw(&self, params: &FetchParams) -> Result<Value, DataError> {
        let url = self.markets_url(params)?;
        info!(source = "coingecko", %params, "fetching markets");
        http::send_json(self.client.get(url))
    }

    fn shape(&self, payload: &Value, params: &FetchParams) -> Result<Snapshot, DataError> {
        shape_markets(payload, params)
    }
}

/// Shape a `/coins/markets` payload.
pub fn shape_markets(payload: &Value, params: &FetchParams) -> Result<Snapshot, DataError> {
    let items = match payload {
        Value::Array(items) => items,
        other => {
            if let Some(message) = http::error_message(other) {
                return Err(DataError::Api {
                    status: None,
                    message,
                });
            }
            return Err(DataError::Schema(format!(
                "expected a JSON array of coins, got {}",
                json_kind(other)
            )));
        }
    };

    let shaped = shape_items(items, &RULES, params.currency)?;
    info!(
        source = "coingecko",
        records = shaped.records.len(),
        skipped = shaped.skipped,
        duplicates = shaped.duplicates,
        "shaped markets"
    );
    Ok(Snapshot::new(
        SourceKind::CoinGecko,
        *params,
        shaped.records,
        shaped.schema,
    ))
}

pub(crate) fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
