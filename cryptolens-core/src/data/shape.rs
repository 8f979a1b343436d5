//! Flatten coin objects into CoinRecords with a fixed rule table.
//!
//! Each source declares where every column lives: either a top-level field
//! (`current_price`) or a field inside the per-currency quote object
//! (`quote.USD.price`). One extractor applies any rule table.
//!
//! Policy:
//! - absent, `null`, or non-numeric optional fields become `None`
//! - coins without a usable `name` or `symbol` are skipped
//! - later coins repeating an earlier symbol (case-insensitive) are skipped
//! - an empty coin array is a valid empty result
//! - `SchemaError` only when `name` or `symbol` is missing from every coin

use std::collections::HashSet;

use serde_json::Value;
use tracing::warn;

use super::provider::DataError;
use crate::domain::{CoinRecord, Column, ColumnSet, Currency};

/// Where a column's value lives inside one coin object.
#[derive(Debug, Clone, Copy)]
pub enum FieldPath {
    /// `coin.{field}`
    Top(&'static str),
    /// `coin.quote.{CURRENCY}.{field}`
    Quote(&'static str),
}

/// One column extraction rule.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub column: Column,
    pub path: FieldPath,
}

impl FieldRule {
    pub const fn top(column: Column, field: &'static str) -> Self {
        Self {
            column,
            path: FieldPath::Top(field),
        }
    }

    pub const fn quote(column: Column, field: &'static str) -> Self {
        Self {
            column,
            path: FieldPath::Quote(field),
        }
    }
}

/// The full extraction rule table of one source.
#[derive(Debug, Clone, Copy)]
pub struct ShapeRules {
    pub name_field: &'static str,
    pub symbol_field: &'static str,
    /// Key of the per-currency quote map, if the source nests quotes.
    pub quote_field: Option<&'static str>,
    pub fields: &'static [FieldRule],
}

/// Shaper output before it is stamped into a Snapshot.
#[derive(Debug, Clone, Default)]
pub struct Shaped {
    pub records: Vec<CoinRecord>,
    pub schema: ColumnSet,
    pub skipped: usize,
    pub duplicates: usize,
}

/// Apply a rule table to an array of coin objects.
pub fn shape_items(items: &[Value], rules: &ShapeRules, currency: Currency) -> Result<Shaped, DataError> {
    let mut out = Shaped::default();
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut any_name = false;
    let mut any_symbol = false;

    for (idx, item) in items.iter().enumerate() {
        let name = text_field(item, rules.name_field);
        let symbol = text_field(item, rules.symbol_field);
        any_name |= name.is_some();
        any_symbol |= symbol.is_some();

        let quote = rules
            .quote_field
            .and_then(|q| item.get(q))
            .and_then(|q| q.get(currency.upper_code()));

        // Schema presence counts every coin, even ones skipped below.
        for rule in rules.fields {
            if lookup(item, quote, rule.path).is_some() {
                out.schema.insert(rule.column);
            }
        }

        let (Some(name), Some(symbol)) = (name, symbol) else {
            warn!(index = idx, "skipping coin without name or symbol");
            out.skipped += 1;
            continue;
        };

        if !seen.insert(symbol.to_uppercase()) {
            warn!(symbol, index = idx, "skipping duplicate symbol");
            out.duplicates += 1;
            continue;
        }

        let mut record = CoinRecord::new(name, symbol);
        for rule in rules.fields {
            let value = lookup(item, quote, rule.path).and_then(as_number);
            record.set_number(rule.column, value);
        }
        out.records.push(record);
    }

    if !items.is_empty() && (!any_name || !any_symbol) {
        let missing = if !any_name {
            rules.name_field
        } else {
            rules.symbol_field
        };
        return Err(DataError::Schema(format!(
            "required field '{missing}' is missing from all {} coins",
            items.len()
        )));
    }

    if any_name {
        out.schema.insert(Column::Name);
    }
    if any_symbol {
        out.schema.insert(Column::Symbol);
    }

    Ok(out)
}

fn lookup<'a>(item: &'a Value, quote: Option<&'a Value>, path: FieldPath) -> Option<&'a Value> {
    match path {
        FieldPath::Top(field) => item.get(field),
        FieldPath::Quote(field) => quote.and_then(|q| q.get(field)),
    }
}

fn text_field<'a>(item: &'a Value, field: &str) -> Option<&'a str> {
    item.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Numbers and numeric strings; everything else (and non-finite) is absent.
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}
