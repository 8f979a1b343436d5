//! Data retrieval: sources, shaping, and the snapshot cache

pub mod cache;
pub mod coingecko;
pub mod coinmarketcap;
pub mod http;
pub mod provider;
pub mod session;
pub mod shape;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cache::{CacheKey, CacheStats, SnapshotCache};
pub use coingecko::CoinGeckoSource;
pub use coinmarketcap::{ApiKey, CoinMarketCapSource};
pub use provider::{DataError, MarketDataSource, SourceKind};
pub use session::MarketSession;
