//! CryptoLens core: market data domain types, sources, shaping and caching.
//!
//! This crate contains the data half of the dashboard:
//! - Domain types (coin records, columns, fetch parameters, snapshots)
//! - `MarketDataSource` trait with CoinGecko and CoinMarketCap implementations
//! - Rule-driven shaper from raw JSON to flat records
//! - Bounded in-memory snapshot cache and the session that owns it

pub mod data;
pub mod domain;

pub use data::{DataError, MarketDataSource, MarketSession, SourceKind};
pub use domain::{CoinRecord, Column, ColumnSet, FetchParams, Snapshot, Timeframe};

#[cfg(test)]
mod tests {
    use super::*;

    /// Snapshots are shared through `Arc` and sources are boxed trait objects.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Snapshot>();
        require_sync::<Snapshot>();
        require_send::<DataError>();
        require_sync::<DataError>();
        require_send::<data::CoinGeckoSource>();
        require_sync::<data::CoinGeckoSource>();
        require_send::<data::CoinMarketCapSource>();
        require_sync::<data::CoinMarketCapSource>();
    }
}
