//! Fetch parameters: currency, page size, server-side sort order, timeframe.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::coin::Column;

pub const PAGE_SIZE_MIN: u16 = 1;
pub const PAGE_SIZE_MAX: u16 = 250;
pub const DEFAULT_PAGE_SIZE: u16 = 50;

/// Rejected fetch parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("page size {0} out of range (1..=250)")]
    PageSize(u16),

    #[error("unknown {kind} '{value}'")]
    Unknown { kind: &'static str, value: String },
}

/// Quote currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    #[default]
    Usd,
    Btc,
    Eth,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Usd, Currency::Btc, Currency::Eth];

    /// Lowercase code, as CoinGecko expects it.
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "usd",
            Currency::Btc => "btc",
            Currency::Eth => "eth",
        }
    }

    /// Uppercase code, as CoinMarketCap expects it and keys its quotes.
    pub fn upper_code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Btc => "BTC",
            Currency::Eth => "ETH",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.upper_code())
    }
}

impl FromStr for Currency {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "usd" => Ok(Currency::Usd),
            "btc" => Ok(Currency::Btc),
            "eth" => Ok(Currency::Eth),
            _ => Err(ParamError::Unknown {
                kind: "currency",
                value: s.to_string(),
            }),
        }
    }
}

/// Server-side ordering of the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    MarketCapDesc,
    MarketCapAsc,
    VolumeDesc,
    VolumeAsc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::MarketCapDesc,
        SortOrder::MarketCapAsc,
        SortOrder::VolumeDesc,
        SortOrder::VolumeAsc,
    ];

    /// CoinGecko `order` value.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::MarketCapDesc => "market_cap_desc",
            SortOrder::MarketCapAsc => "market_cap_asc",
            SortOrder::VolumeDesc => "volume_desc",
            SortOrder::VolumeAsc => "volume_asc",
        }
    }

    /// CoinMarketCap `sort` field.
    pub fn sort_field(self) -> &'static str {
        match self {
            SortOrder::MarketCapDesc | SortOrder::MarketCapAsc => "market_cap",
            SortOrder::VolumeDesc | SortOrder::VolumeAsc => "volume_24h",
        }
    }

    /// CoinMarketCap `sort_dir` value.
    pub fn direction(self) -> &'static str {
        match self {
            SortOrder::MarketCapDesc | SortOrder::VolumeDesc => "desc",
            SortOrder::MarketCapAsc | SortOrder::VolumeAsc => "asc",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|o| o.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParamError::Unknown {
                kind: "sort order",
                value: s.to_string(),
            })
    }
}

/// Percent-change window shown in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "24h")]
    Hour24,
    #[default]
    #[serde(rename = "7d")]
    Day7,
}

impl Timeframe {
    pub const ALL: [Timeframe; 3] = [Timeframe::Hour1, Timeframe::Hour24, Timeframe::Day7];

    pub fn label(self) -> &'static str {
        match self {
            Timeframe::Hour1 => "1h",
            Timeframe::Hour24 => "24h",
            Timeframe::Day7 => "7d",
        }
    }

    /// Caption under the chart title.
    pub fn period(self) -> &'static str {
        match self {
            Timeframe::Hour1 => "1 hour period",
            Timeframe::Hour24 => "24 hour period",
            Timeframe::Day7 => "7 days period",
        }
    }

    pub fn column(self) -> Column {
        match self {
            Timeframe::Hour1 => Column::Change1h,
            Timeframe::Hour24 => Column::Change24h,
            Timeframe::Day7 => Column::Change7d,
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParamError::Unknown {
                kind: "timeframe",
                value: s.to_string(),
            })
    }
}

/// The parameter tuple that identifies one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchParams {
    pub currency: Currency,
    page_size: u16,
    pub sort_order: SortOrder,
}

impl FetchParams {
    pub fn new(currency: Currency, page_size: u16, sort_order: SortOrder) -> Result<Self, ParamError> {
        if !(PAGE_SIZE_MIN..=PAGE_SIZE_MAX).contains(&page_size) {
            return Err(ParamError::PageSize(page_size));
        }
        Ok(Self {
            currency,
            page_size,
            sort_order,
        })
    }

    pub fn page_size(&self) -> u16 {
        self.page_size
    }

    /// Copy with a different page size, clamped into range.
    pub fn with_page_size_clamped(self, page_size: i32) -> Self {
        let clamped = page_size.clamp(i32::from(PAGE_SIZE_MIN), i32::from(PAGE_SIZE_MAX));
        Self {
            page_size: clamped as u16,
            ..self
        }
    }
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            page_size: DEFAULT_PAGE_SIZE,
            sort_order: SortOrder::default(),
        }
    }
}

impl fmt::Display for FetchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} coins / {}",
            self.currency, self.page_size, self.sort_order
        )
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: usize) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    all[(idx + step) % all.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_bounds_are_enforced() {
        assert!(FetchParams::new(Currency::Usd, 0, SortOrder::MarketCapDesc).is_err());
        assert!(FetchParams::new(Currency::Usd, 251, SortOrder::MarketCapDesc).is_err());
        let p = FetchParams::new(Currency::Eth, 250, SortOrder::VolumeAsc).unwrap();
        assert_eq!(p.page_size(), 250);
    }

    #[test]
    fn clamped_page_size_stays_in_range() {
        let p = FetchParams::default();
        assert_eq!(p.with_page_size_clamped(-10).page_size(), PAGE_SIZE_MIN);
        assert_eq!(p.with_page_size_clamped(9_999).page_size(), PAGE_SIZE_MAX);
        assert_eq!(p.with_page_size_clamped(60).page_size(), 60);
    }

    #[test]
    fn currency_codes() {
        assert_eq!(Currency::Btc.code(), "btc");
        assert_eq!(Currency::Btc.upper_code(), "BTC");
        assert_eq!("ETH".parse::<Currency>().unwrap(), Currency::Eth);
        assert!("eur".parse::<Currency>().is_err());
    }

    #[test]
    fn sort_order_maps_to_both_sources() {
        assert_eq!(SortOrder::VolumeAsc.as_str(), "volume_asc");
        assert_eq!(SortOrder::VolumeAsc.sort_field(), "volume_24h");
        assert_eq!(SortOrder::VolumeAsc.direction(), "asc");
        assert_eq!("market_cap_desc".parse::<SortOrder>().unwrap(), SortOrder::MarketCapDesc);
    }

    #[test]
    fn cycling_wraps_around() {
        assert_eq!(Currency::Eth.next(), Currency::Usd);
        assert_eq!(Currency::Usd.prev(), Currency::Eth);
        assert_eq!(SortOrder::VolumeAsc.next(), SortOrder::MarketCapDesc);
        assert_eq!(Timeframe::Hour1.prev(), Timeframe::Day7);
    }

    #[test]
    fn timeframe_maps_to_change_columns() {
        assert_eq!(Timeframe::Hour1.column(), Column::Change1h);
        assert_eq!(Timeframe::Day7.column(), Column::Change7d);
        assert_eq!("24H".parse::<Timeframe>().unwrap(), Timeframe::Hour24);
    }
}
