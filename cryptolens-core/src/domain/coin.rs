//! CoinRecord, one shaped row of market data, and the column vocabulary.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One coin from a market snapshot.
///
/// Every numeric field is optional: sources omit fields, send `null`, or
/// leave whole quote objects out. Absent values render blank and sort last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinRecord {
    pub name: String,
    /// Symbol as delivered by the source. Use [`CoinRecord::display_symbol`] for output.
    pub symbol: String,
    pub rank: Option<u32>,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub percent_change_1h: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub percent_change_7d: Option<f64>,
}

impl CoinRecord {
    /// A record with only the required fields set.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            rank: None,
            price: None,
            market_cap: None,
            volume_24h: None,
            percent_change_1h: None,
            percent_change_24h: None,
            percent_change_7d: None,
        }
    }

    /// Uppercased symbol, the form shown in tables and chart labels.
    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }

    /// Numeric value of a column, `None` for text columns or absent values.
    pub fn number(&self, column: Column) -> Option<f64> {
        match column {
            Column::Rank => self.rank.map(f64::from),
            Column::Price => self.price,
            Column::MarketCap => self.market_cap,
            Column::Volume24h => self.volume_24h,
            Column::Change1h => self.percent_change_1h,
            Column::Change24h => self.percent_change_24h,
            Column::Change7d => self.percent_change_7d,
            Column::Name | Column::Symbol => None,
        }
    }

    /// Typed cell value for a column, used by sorting and export.
    pub fn value(&self, column: Column) -> Option<CellValue<'_>> {
        match column {
            Column::Name => Some(CellValue::Text(&self.name)),
            Column::Symbol => Some(CellValue::Text(&self.symbol)),
            other => self.number(other).map(CellValue::Number),
        }
    }

    /// Mutable slot for a numeric column. Used by the shaper.
    pub(crate) fn set_number(&mut self, column: Column, value: Option<f64>) {
        match column {
            Column::Rank => {
                self.rank = value
                    .filter(|v| *v >= 0.0 && *v <= f64::from(u32::MAX))
                    .map(|v| v as u32)
            }
            Column::Price => self.price = value,
            Column::MarketCap => self.market_cap = value,
            Column::Volume24h => self.volume_24h = value,
            Column::Change1h => self.percent_change_1h = value,
            Column::Change24h => self.percent_change_24h = value,
            Column::Change7d => self.percent_change_7d = value,
            Column::Name | Column::Symbol => {}
        }
    }
}

/// A borrowed cell value with a total order.
///
/// Text compares case-insensitively; numbers compare with `total_cmp`
/// (the shaper never lets NaN through).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl CellValue<'_> {
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Number(a), CellValue::Number(b)) => a.total_cmp(b),
            (CellValue::Text(a), CellValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (CellValue::Number(_), CellValue::Text(_)) => Ordering::Less,
            (CellValue::Text(_), CellValue::Number(_)) => Ordering::Greater,
        }
    }
}

/// Every column a CoinRecord can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Rank,
    Name,
    Symbol,
    Price,
    MarketCap,
    #[serde(rename = "volume_24h")]
    Volume24h,
    #[serde(rename = "percent_change_1h")]
    Change1h,
    #[serde(rename = "percent_change_24h")]
    Change24h,
    #[serde(rename = "percent_change_7d")]
    Change7d,
}

impl Column {
    pub const ALL: [Column; 9] = [
        Column::Rank,
        Column::Name,
        Column::Symbol,
        Column::Price,
        Column::MarketCap,
        Column::Volume24h,
        Column::Change1h,
        Column::Change24h,
        Column::Change7d,
    ];

    /// Stable machine key, used as the CSV header.
    pub fn key(self) -> &'static str {
        match self {
            Column::Rank => "rank",
            Column::Name => "name",
            Column::Symbol => "symbol",
            Column::Price => "price",
            Column::MarketCap => "market_cap",
            Column::Volume24h => "volume_24h",
            Column::Change1h => "percent_change_1h",
            Column::Change24h => "percent_change_24h",
            Column::Change7d => "percent_change_7d",
        }
    }

    /// Human header for tables.
    pub fn header(self) -> &'static str {
        match self {
            Column::Rank => "#",
            Column::Name => "Name",
            Column::Symbol => "Symbol",
            Column::Price => "Price",
            Column::MarketCap => "Market Cap",
            Column::Volume24h => "Volume 24h",
            Column::Change1h => "1h %",
            Column::Change24h => "24h %",
            Column::Change7d => "7d %",
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, Column::Name | Column::Symbol)
    }

    pub fn is_percent_change(self) -> bool {
        matches!(self, Column::Change1h | Column::Change24h | Column::Change7d)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let column = match lowered.as_str() {
            "rank" | "#" => Column::Rank,
            "name" => Column::Name,
            "symbol" => Column::Symbol,
            "price" => Column::Price,
            "market_cap" | "marketcap" | "mcap" => Column::MarketCap,
            "volume_24h" | "volume" => Column::Volume24h,
            "percent_change_1h" | "1h" => Column::Change1h,
            "percent_change_24h" | "24h" => Column::Change24h,
            "percent_change_7d" | "7d" => Column::Change7d,
            _ => return Err(format!("unknown column '{s}'")),
        };
        Ok(column)
    }
}

/// The set of columns a payload actually carried.
///
/// A column belongs to the set when its source field appeared (even as
/// `null`) on at least one coin object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSet(BTreeSet<Column>);

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every column present.
    pub fn full() -> Self {
        Column::ALL.into_iter().collect()
    }

    pub fn insert(&mut self, column: Column) {
        self.0.insert(column);
    }

    pub fn contains(&self, column: Column) -> bool {
        self.0.contains(&column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        self.0.iter().copied()
    }

    /// Keep only the requested columns that are in this set, in request order.
    pub fn available(&self, requested: &[Column]) -> Vec<Column> {
        requested
            .iter()
            .copied()
            .filter(|c| self.contains(*c))
            .collect()
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
