//! Offline fake source for tests and demos.
//!
//! Serves a fixed coin list as a CoinGecko-shaped payload, counts calls,
//! and can be told to fail for some parameter sets, either with an HTTP
//! status or as an unreachable host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use super::coingecko::shape_markets;
use super::provider::{DataError, MarketDataSource, SourceKind};
use crate::domain::{CoinRecord, FetchParams, Snapshot};

type FailPredicate = Box<dyn Fn(&FetchParams) -> bool + Send + Sync>;

enum Failure {
    Status(u16),
    Unreachable,
}

/// Shared call counter handed out before the source is boxed.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeSource {
    records: Vec<CoinRecord>,
    calls: CallCounter,
    fail: Option<(FailPredicate, Failure)>,
}

impl FakeSource {
    pub fn new(records: Vec<CoinRecord>) -> Self {
        Self {
            records,
            calls: CallCounter::default(),
            fail: None,
        }
    }

    /// Coins with only name and symbol set.
    pub fn with_coins(coins: &[(&str, &str)]) -> Self {
        Self::new(
            coins
                .iter()
                .map(|(name, symbol)| CoinRecord::new(*name, *symbol))
                .collect(),
        )
    }

    /// Respond with HTTP `status` whenever `predicate` matches.
    pub fn fail_when<F>(mut self, predicate: F, status: u16) -> Self
    where
        F: Fn(&FetchParams) -> bool + Send + Sync + 'static,
    {
        self.fail = Some((Box::new(predicate), Failure::Status(status)));
        self
    }

    /// Fail with a transport error whenever `predicate` matches.
    pub fn unreachable_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&FetchParams) -> bool + Send + Sync + 'static,
    {
        self.fail = Some((Box::new(predicate), Failure::Unreachable));
        self
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

impl MarketDataSource for FakeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::CoinGecko
    }

    fn fetch_raw(&self, params: &FetchParams) -> Result<Value, DataError> {
        self.calls.bump();
        if let Some((predicate, failure)) = &self.fail {
            if predicate(params) {
                return Err(match failure {
                    Failure::Status(status) => DataError::Api {
                        status: Some(*status),
                        message: "rejected by fake source".into(),
                    },
                    Failure::Unreachable => {
                        DataError::Network("connection failed: fake host unreachable".into())
                    }
                });
            }
        }
        let coins: Vec<Value> = self
            .records
            .iter()
            .take(usize::from(params.page_size()))
            .map(to_markets_json)
            .collect();
        Ok(Value::Array(coins))
    }

    fn shape(&self, payload: &Value, params: &FetchParams) -> Result<Snapshot, DataError> {
        shape_markets(payload, params)
    }
}

fn to_markets_json(r: &CoinRecord) -> Value {
    json!({
        "name": r.name,
        "symbol": r.symbol,
        "market_cap_rank": r.rank,
        "current_price": r.price,
        "market_cap": r.market_cap,
        "total_volume": r.volume_24h,
        "price_change_percentage_1h_in_currency": r.percent_change_1h,
        "price_change_percentage_24h_in_currency": r.percent_change_24h,
        "price_change_percentage_7d_in_currency": r.percent_change_7d,
    })
}
