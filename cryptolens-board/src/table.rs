//! Table projection of a View: fixed column allow-list, formatted cells.

use serde::Serialize;

use cryptolens_core::domain::{CoinRecord, Column, Currency};

use crate::selection::View;

/// Columns shown by default, in display order.
pub const TABLE_COLUMNS: [Column; 7] = [
    Column::Name,
    Column::Symbol,
    Column::Price,
    Column::MarketCap,
    Column::Change1h,
    Column::Change24h,
    Column::Change7d,
];

/// Formatted rows ready for a terminal table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<Column>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Project `requested` columns from a view, dropping any the payload lacked.
    pub fn from_view(view: &View<'_>, requested: &[Column]) -> Self {
        let columns = view.columns(requested);
        let headers = columns
            .iter()
            .map(|c| header_for(*c, view.currency))
            .collect();
        let rows = view
            .records
            .iter()
            .map(|r| columns.iter().map(|c| format_cell(r, *c)).collect())
            .collect();
        Self {
            columns,
            headers,
            rows,
        }
    }

    /// `(rows, columns)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn dimension_label(&self) -> String {
        let (rows, cols) = self.dimensions();
        format!("Data Dimension: {rows} rows and {cols} columns")
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Widest cell per column, header included. Used for plain-text output.
    pub fn column_widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Render as aligned plain text. Numeric columns are right-aligned.
    pub fn to_text(&self) -> String {
        let widths = self.column_widths();
        let mut out = String::new();
        let line = |cells: &[String], out: &mut String| {
            let rendered: Vec<String> = cells
                .iter()
                .zip(&widths)
                .zip(&self.columns)
                .map(|((cell, &w), col)| {
                    if col.is_numeric() {
                        format!("{cell:>w$}")
                    } else {
                        format!("{cell:<w$}")
                    }
                })
                .collect();
            out.push_str(rendered.join("  ").trim_end());
            out.push('\n');
        };
        line(self.headers.as_slice(), &mut out);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &self.rows {
            line(row.as_slice(), &mut out);
        }
        out
    }
}

/// Header text, with the quote currency on money columns.
pub fn header_for(column: Column, currency: Currency) -> String {
    match column {
        Column::Price | Column::MarketCap | Column::Volume24h => {
            format!("{} ({})", column.header(), currency.upper_code())
        }
        other => other.header().to_string(),
    }
}

/// Display text for one cell; absent values are blank.
pub fn format_cell(record: &CoinRecord, column: Column) -> String {
    match column {
        Column::Name => record.name.clone(),
        Column::Symbol => record.display_symbol(),
        Column::Rank => record.rank.map(|r| r.to_string()).unwrap_or_default(),
        Column::Price => record.price.map(format_price).unwrap_or_default(),
        Column::MarketCap | Column::Volume24h => record
            .number(column)
            .map(|v| group_thousands(v, 0))
            .unwrap_or_default(),
        Column::Change1h | Column::Change24h | Column::Change7d => record
            .number(column)
            .map(format_percent)
            .unwrap_or_default(),
    }
}

/// Precision scales down with magnitude so sub-cent coins stay readable.
pub fn format_price(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1.0 {
        group_thousands(value, 2)
    } else if abs >= 0.01 {
        format!("{value:.4}")
    } else if abs == 0.0 {
        "0.00".to_string()
    } else {
        format!("{value:.8}")
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{value:+.2}%")
}

/// Fixed decimals with `,` between thousands groups.
pub fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    if value.is_sign_negative() && formatted.chars().any(|c| c != '0' && c != '.') {
        grouped.insert(0, '-');
    }
    grouped
}

// ─── Change table ───────────────────────────────────────────────────

/// Percent changes for one coin, with gain flags for colouring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeRow {
    pub symbol: String,
    pub percent_change_1h: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub percent_change_7d: Option<f64>,
    pub positive_percent_change_1h: bool,
    pub positive_percent_change_24h: bool,
    pub positive_percent_change_7d: bool,
}

/// One row per view record. An absent change is not positive.
pub fn change_table(view: &View<'_>) -> Vec<ChangeRow> {
    let positive = |v: Option<f64>| v.is_some_and(|x| x >= 0.0);
    view.records
        .iter()
        .map(|r| ChangeRow {
            symbol: r.display_symbol(),
            percent_change_1h: r.percent_change_1h,
            percent_change_24h: r.percent_change_24h,
            percent_change_7d: r.percent_change_7d,
            positive_percent_change_1h: positive(r.percent_change_1h),
            positive_percent_change_24h: positive(r.percent_change_24h),
            positive_percent_change_7d: positive(r.percent_change_7d),
        })
        .collect()
}
