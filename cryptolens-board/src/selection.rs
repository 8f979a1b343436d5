//! Narrow a snapshot to the coins the user picked.
//!
//! Order of operations: keep selected symbols in snapshot order, truncate
//! to `top_n`, then stable-sort if a sort column is set. Absent values sort
//! last regardless of direction.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use cryptolens_core::domain::{CoinRecord, Column, ColumnSet, Currency, Snapshot};

/// User choices applied to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    /// Uppercased symbols.
    symbols: BTreeSet<String>,
    pub top_n: usize,
    pub sort_by: Option<Column>,
    pub ascending: bool,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            symbols: BTreeSet::new(),
            top_n: usize::MAX,
            sort_by: None,
            ascending: true,
        }
    }
}

impl FilterSelection {
    /// Every symbol of the snapshot, no truncation, no sort.
    pub fn all(snapshot: &Snapshot) -> Self {
        Self {
            symbols: snapshot.symbols().into_iter().collect(),
            top_n: snapshot.len(),
            ..Self::default()
        }
    }

    /// Selection over an explicit symbol list (any case).
    pub fn with_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            symbols: symbols
                .into_iter()
                .map(|s| s.as_ref().trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .collect(),
            ..Self::default()
        }
    }

    pub fn top(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    pub fn sorted_by(mut self, column: Column, ascending: bool) -> Self {
        self.sort_by = Some(column);
        self.ascending = ascending;
        self
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(&symbol.to_uppercase())
    }

    /// Flip one symbol in or out. Returns true if it is now selected.
    pub fn toggle(&mut self, symbol: &str) -> bool {
        let key = symbol.to_uppercase();
        if self.symbols.remove(&key) {
            false
        } else {
            self.symbols.insert(key);
            true
        }
    }

    pub fn select_all(&mut self, snapshot: &Snapshot) {
        self.symbols = snapshot.symbols().into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.symbols.clear();
    }

    /// Drop symbols the snapshot doesn't have.
    pub fn retain_known(&mut self, snapshot: &Snapshot) {
        self.symbols.retain(|s| snapshot.get(s).is_some());
    }

    /// Produce the view. Records are borrowed from the snapshot.
    pub fn apply<'a>(&self, snapshot: &'a Snapshot) -> View<'a> {
        let mut records: Vec<&CoinRecord> = snapshot
            .records
            .iter()
            .filter(|r| self.symbols.contains(&r.display_symbol()))
            .take(self.top_n)
            .collect();

        if let Some(column) = self.sort_by {
            sort_records(&mut records, column, self.ascending);
        }

        View {
            records,
            schema: &snapshot.schema,
            currency: snapshot.params.currency,
        }
    }
}

/// Ordered, borrowed projection of a snapshot.
#[derive(Debug, Clone)]
pub struct View<'a> {
    pub records: Vec<&'a CoinRecord>,
    pub schema: &'a ColumnSet,
    pub currency: Currency,
}

impl View<'_> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.records.iter().map(|r| r.display_symbol()).collect()
    }

    /// The requested columns the payload carried. An empty payload has no
    /// schema to degrade against, so every requested column is kept.
    pub fn columns(&self, requested: &[Column]) -> Vec<Column> {
        if self.schema.is_empty() {
            requested.to_vec()
        } else {
            self.schema.available(requested)
        }
    }
}

/// Stable sort by one column; absent values last in both directions.
pub fn sort_records(records: &mut [&CoinRecord], column: Column, ascending: bool) {
    records.sort_by(|a, b| compare(a, b, column, ascending));
}

fn compare(a: &CoinRecord, b: &CoinRecord, column: Column, ascending: bool) -> Ordering {
    match (a.value(column), b.value(column)) {
        (Some(x), Some(y)) => {
            let ord = x.compare(&y);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptolens_core::data::SourceKind;
    use cryptolens_core::domain::FetchParams;

    fn coin(symbol: &str, change_7d: Option<f64>) -> CoinRecord {
        CoinRecord {
            percent_change_7d: change_7d,
            ..CoinRecord::new(symbol.to_uppercase(), symbol)
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot::new(
            SourceKind::CoinGecko,
            FetchParams::default(),
            vec![
                coin("btc", Some(5.2)),
                coin("eth", Some(-1.1)),
                coin("xrp", None),
                coin("sol", Some(12.0)),
            ],
            ColumnSet::full(),
        )
    }

    #[test]
    fn selection_is_case_insensitive() {
        let snap = snapshot();
        let view = FilterSelection::with_symbols(["Eth", "BTC"]).apply(&snap);
        assert_eq!(view.symbols(), vec!["BTC", "ETH"]);
    }

    #[test]
    fn empty_selection_yields_empty_view() {
        let snap = snapshot();
        let view = FilterSelection::with_symbols(Vec::<String>::new()).apply(&snap);
        assert!(view.is_empty());
    }

    #[test]
    fn truncates_before_sorting() {
        let snap = snapshot();
        // top 2 of snapshot order = BTC, ETH; SOL never makes it in.
        let view = FilterSelection::all(&snap)
            .top(2)
            .sorted_by(Column::Change7d, false)
            .apply(&snap);
        assert_eq!(view.symbols(), vec!["BTC", "ETH"]);
    }

    #[test]
    fn ascending_sort_puts_absent_last() {
        let snap = snapshot();
        let view = FilterSelection::with_symbols(["BTC", "ETH", "XRP"])
            .sorted_by(Column::Change7d, true)
            .apply(&snap);
        assert_eq!(view.symbols(), vec!["ETH", "BTC", "XRP"]);
    }

    #[test]
    fn descending_sort_also_puts_absent_last() {
        let snap = snapshot();
        let view = FilterSelection::all(&snap)
            .sorted_by(Column::Change7d, false)
            .apply(&snap);
        assert_eq!(view.symbols(), vec!["SOL", "BTC", "ETH", "XRP"]);
    }

    #[test]
    fn text_columns_sort_case_insensitively() {
        let snap = Snapshot::new(
            SourceKind::CoinGecko,
            FetchParams::default(),
            vec![
                CoinRecord::new("solana", "sol"),
                CoinRecord::new("Bitcoin", "btc"),
                CoinRecord::new("cardano", "ada"),
            ],
            ColumnSet::full(),
        );
        let view = FilterSelection::all(&snap)
            .sorted_by(Column::Name, true)
            .apply(&snap);
        assert_eq!(view.symbols(), vec!["BTC", "ADA", "SOL"]);
    }

    #[test]
    fn toggle_and_retain() {
        let snap = snapshot();
        let mut sel = FilterSelection::all(&snap);
        assert!(!sel.toggle("btc"));
        assert!(!sel.contains("BTC"));
        assert!(sel.toggle("BTC"));
        assert!(sel.toggle("DOGE"));
        sel.retain_known(&snap);
        assert!(!sel.contains("DOGE"));
        assert_eq!(sel.symbol_count(), 4);
        sel.clear();
        assert_eq!(sel.symbol_count(), 0);
        sel.select_all(&snap);
        assert_eq!(sel.symbol_count(), 4);
    }
}
