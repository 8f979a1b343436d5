//! Every coin from one fetch, with the parameters that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::coin::{CoinRecord, ColumnSet};
use super::params::FetchParams;
use crate::data::provider::SourceKind;

/// Immutable result of one Fetcher + Shaper pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub source: SourceKind,
    pub params: FetchParams,
    pub records: Vec<CoinRecord>,
    pub schema: ColumnSet,
    pub fetched_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(
        source: SourceKind,
        params: FetchParams,
        records: Vec<CoinRecord>,
        schema: ColumnSet,
    ) -> Self {
        Self {
            source,
            params,
            records,
            schema,
            fetched_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Uppercased symbols in snapshot order.
    pub fn symbols(&self) -> Vec<String> {
        self.records.iter().map(CoinRecord::display_symbol).collect()
    }

    /// Case-insensitive lookup.
    pub fn get(&self, symbol: &str) -> Option<&CoinRecord> {
        self.records
            .iter()
            .find(|r| r.symbol.eq_ignore_ascii_case(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::coin::Column;

    #[test]
    fn lookup_ignores_case() {
        let snapshot = Snapshot::new(
            SourceKind::CoinGecko,
            FetchParams::default(),
            vec![CoinRecord::new("Bitcoin", "btc"), CoinRecord::new("Ether", "eth")],
            [Column::Name, Column::Symbol].into_iter().collect(),
        );
        assert_eq!(snapshot.get("ETH").map(|r| r.name.as_str()), Some("Ether"));
        assert!(snapshot.get("xrp").is_none());
        assert_eq!(snapshot.symbols(), vec!["BTC", "ETH"]);
    }
}
