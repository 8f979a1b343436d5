//! Domain types for CryptoLens

pub mod coin;
pub mod params;
pub mod snapshot;

pub use coin::{CellValue, CoinRecord, Column, ColumnSet};
pub use params::{
    Currency, FetchParams, ParamError, SortOrder, Timeframe, DEFAULT_PAGE_SIZE, PAGE_SIZE_MAX,
    PAGE_SIZE_MIN,
};
pub use snapshot::Snapshot;
