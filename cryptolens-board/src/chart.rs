//! Percent-change bar chart model.
//!
//! The chart is data only: one bar per view record with a tone. The TUI and
//! CLI each draw it their own way.

use std::cmp::Ordering;

use serde::Serialize;

use cryptolens_core::domain::Timeframe;

use crate::selection::View;

/// Bar colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    Gain,
    Loss,
    NoData,
}

impl Tone {
    pub fn of(value: Option<f64>) -> Self {
        match value {
            Some(v) if v >= 0.0 => Tone::Gain,
            Some(_) => Tone::Loss,
            None => Tone::NoData,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBar {
    pub label: String,
    pub value: Option<f64>,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: String,
    pub caption: String,
    pub bars: Vec<ChartBar>,
}

impl BarChart {
    /// Largest absolute value, for scaling. Zero when nothing has data.
    pub fn max_magnitude(&self) -> f64 {
        self.bars
            .iter()
            .filter_map(|b| b.value)
            .map(f64::abs)
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ChartOutcome {
    Bars(BarChart),
    /// The payload never carried the timeframe's column. A warning, not an error.
    Unavailable { timeframe: Timeframe, message: String },
}

/// Build the chart for a timeframe.
///
/// Bars follow view order unless `sort_values` is set, in which case they
/// are ordered ascending by value. Records without a value always come last.
pub fn render_chart(view: &View<'_>, timeframe: Timeframe, sort_values: bool) -> ChartOutcome {
    let column = timeframe.column();
    if view.columns(&[column]).is_empty() {
        return ChartOutcome::Unavailable {
            timeframe,
            message: format!("{} change data is not available from this source", timeframe.label()),
        };
    }

    let (mut with_data, without): (Vec<ChartBar>, Vec<ChartBar>) = view
        .records
        .iter()
        .map(|r| {
            let value = r.number(column);
            ChartBar {
                label: r.display_symbol(),
                value,
                tone: Tone::of(value),
            }
        })
        .partition(|b| b.value.is_some());

    if sort_values {
        with_data.sort_by(|a, b| match (a.value, b.value) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        });
    }
    with_data.extend(without);

    ChartOutcome::Bars(BarChart {
        title: format!("{} Price Change (%)", timeframe.label()),
        caption: timeframe.period().to_string(),
        bars: with_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::FilterSelection;
    use cryptolens_core::data::SourceKind;
    use cryptolens_core::domain::{CoinRecord, Column, ColumnSet, FetchParams, Snapshot};

    fn snapshot(schema: ColumnSet) -> Snapshot {
        let coin = |name: &str, symbol: &str, change: Option<f64>| CoinRecord {
            percent_change_24h: change,
            ..CoinRecord::new(name, symbol)
        };
        Snapshot::new(
            SourceKind::CoinGecko,
            FetchParams::default(),
            vec![
                coin("Bitcoin", "btc", Some(2.0)),
                coin("Tether", "usdt", None),
                coin("Ethereum", "eth", Some(-3.5)),
                coin("Solana", "sol", Some(0.0)),
            ],
            schema,
        )
    }

    fn bars(outcome: ChartOutcome) -> BarChart {
        match outcome {
            ChartOutcome::Bars(chart) => chart,
            other => panic!("expected bars, got {other:?}"),
        }
    }

    #[test]
    fn no_data_bars_come_last_in_view_order() {
        let snap = snapshot(ColumnSet::full());
        let view = FilterSelection::all(&snap).apply(&snap);
        let chart = bars(render_chart(&view, Timeframe::Hour24, false));
        let labels: Vec<_> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["BTC", "ETH", "SOL", "USDT"]);
        let tones: Vec<_> = chart.bars.iter().map(|b| b.tone).collect();
        assert_eq!(tones, vec![Tone::Gain, Tone::Loss, Tone::Gain, Tone::NoData]);
        assert_eq!(chart.title, "24h Price Change (%)");
        assert_eq!(chart.caption, "24 hour period");
        assert_eq!(chart.max_magnitude(), 3.5);
    }

    #[test]
    fn sort_values_orders_ascending() {
        let snap = snapshot(ColumnSet::full());
        let view = FilterSelection::all(&snap).apply(&snap);
        let chart = bars(render_chart(&view, Timeframe::Hour24, true));
        let labels: Vec<_> = chart.bars.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["ETH", "SOL", "BTC", "USDT"]);
    }

    #[test]
    fn empty_snapshot_has_no_bars() {
        let snap = Snapshot::new(
            SourceKind::CoinGecko,
            FetchParams::default(),
            vec![],
            ColumnSet::new(),
        );
        let view = FilterSelection::all(&snap).apply(&snap);
        match render_chart(&view, Timeframe::Day7, false) {
            ChartOutcome::Bars(chart) => assert!(chart.bars.is_empty()),
            other => panic!("expected bars, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_unavailable() {
        let schema: ColumnSet = [Column::Name, Column::Symbol, Column::Change24h]
            .into_iter()
            .collect();
        let snap = snapshot(schema);
        let view = FilterSelection::all(&snap).apply(&snap);
        match render_chart(&view, Timeframe::Hour1, false) {
            ChartOutcome::Unavailable { timeframe, message } => {
                assert_eq!(timeframe, Timeframe::Hour1);
                assert!(message.contains("1h"));
            }
            other => panic!("expected unavailable, got {other:?}"),
        }
    }

    #[test]
    fn empty_view_gives_empty_chart() {
        let snap = snapshot(ColumnSet::full());
        let view = FilterSelection::with_symbols(Vec::<String>::new()).apply(&snap);
        let chart = bars(render_chart(&view, Timeframe::Day7, false));
        assert!(chart.bars.is_empty());
        assert_eq!(chart.max_magnitude(), 0.0);
    }
}
