//! CSV export of the current view.
//!
//! Header row of column keys, no index column, absent values as empty
//! fields, numbers in full precision. Symbols are written as delivered.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use cryptolens_core::domain::{CellValue, Column};

use crate::selection::View;

pub const DEFAULT_EXPORT_FILE: &str = "crypto_prices.csv";

/// Serialize `columns` of a view to CSV text. Columns the payload lacked are skipped.
pub fn export_csv(view: &View<'_>, columns: &[Column]) -> Result<String> {
    let columns = view.columns(columns);
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(columns.iter().map(|c| c.key()))?;
    for record in &view.records {
        wtr.write_record(columns.iter().map(|c| match record.value(*c) {
            Some(CellValue::Text(s)) => s.to_string(),
            Some(CellValue::Number(n)) => n.to_string(),
            None => String::new(),
        }))?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write the view to `path`, creating parent directories.
pub fn write_csv(view: &View<'_>, columns: &[Column], path: &Path) -> Result<()> {
    let csv = export_csv(view, columns)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create export dir: {}", parent.display()))?;
    }
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = view.len(), "exported CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::FilterSelection;
    use crate::table::TABLE_COLUMNS;
    use cryptolens_core::data::SourceKind;
    use cryptolens_core::domain::{CoinRecord, ColumnSet, FetchParams, Snapshot};

    fn snapshot() -> Snapshot {
        Snapshot::new(
            SourceKind::CoinGecko,
            FetchParams::default(),
            vec![
                CoinRecord {
                    price: Some(64123.123456789),
                    percent_change_7d: Some(5.2),
                    ..CoinRecord::new("Bitcoin", "btc")
                },
                CoinRecord {
                    price: Some(1.0),
                    ..CoinRecord::new("Tether, USD", "usdt")
                },
            ],
            ColumnSet::full(),
        )
    }

    #[test]
    fn header_uses_column_keys() {
        let snap = snapshot();
        let view = FilterSelection::all(&snap).apply(&snap);
        let csv = export_csv(&view, &TABLE_COLUMNS).unwrap();
        let header = csv.lines().next().unwrap();
        assert_eq!(
            header,
            "name,symbol,price,market_cap,percent_change_1h,percent_change_24h,percent_change_7d"
        );
    }

    #[test]
    fn full_precision_and_empty_absent_values() {
        let snap = snapshot();
        let view = FilterSelection::all(&snap).apply(&snap);
        let csv = export_csv(&view, &[Column::Name, Column::Price, Column::Change7d]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[1], "Bitcoin,64123.123456789,5.2");
        assert_eq!(lines[2], "\"Tether, USD\",1,");
    }

    #[test]
    fn empty_view_writes_header_only() {
        let snap = snapshot();
        let view = FilterSelection::with_symbols(Vec::<String>::new()).apply(&snap);
        let csv = export_csv(&view, &[Column::Symbol]).unwrap();
        assert_eq!(csv, "symbol\n");
    }

    #[test]
    fn empty_snapshot_keeps_requested_header() {
        let snap = Snapshot::new(
            SourceKind::CoinGecko,
            FetchParams::default(),
            vec![],
            ColumnSet::new(),
        );
        let view = FilterSelection::all(&snap).apply(&snap);
        let csv = export_csv(&view, &TABLE_COLUMNS).unwrap();
        assert_eq!(
            csv,
            "name,symbol,price,market_cap,percent_change_1h,percent_change_24h,percent_change_7d\n"
        );
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out").join(DEFAULT_EXPORT_FILE);
        let snap = snapshot();
        let view = FilterSelection::all(&snap).apply(&snap);
        write_csv(&view, &TABLE_COLUMNS, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("name,symbol"));
        assert_eq!(written.lines().count(), 3);
    }
}
