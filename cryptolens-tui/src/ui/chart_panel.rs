//! Percent-change chart drawn as horizontal text bars.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use cryptolens_board::{render_chart, BarChart, ChartOutcome, Tone};

use crate::app::AppState;
use crate::theme;
use crate::ui::panel_block;

const BAR: &str = "█";

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let outcome = app
        .view()
        .map(|view| render_chart(&view, app.timeframe, app.sort_chart));

    let title = match &outcome {
        Some(ChartOutcome::Bars(chart)) => format!(" {} | {} ", chart.title, chart.caption),
        _ => format!(" {} Price Change (%) ", app.timeframe.label()),
    };
    let block = panel_block(title, false);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = match outcome {
        None => vec![Line::from(Span::styled("No data to chart.", theme::muted()))],
        Some(ChartOutcome::Unavailable { message, .. }) => {
            vec![Line::from(Span::styled(message, theme::warning()))]
        }
        Some(ChartOutcome::Bars(chart)) if chart.bars.is_empty() => {
            vec![Line::from(Span::styled("No coins selected.", theme::muted()))]
        }
        Some(ChartOutcome::Bars(chart)) => bar_lines(&chart, inner.width as usize),
    };

    let visible: Vec<Line> = lines.into_iter().take(inner.height as usize).collect();
    f.render_widget(Paragraph::new(visible), inner);
}

/// One line per bar: label, scaled bar, value.
pub fn bar_lines(chart: &BarChart, width: usize) -> Vec<Line<'static>> {
    let label_w = chart
        .bars
        .iter()
        .map(|b| b.label.chars().count())
        .max()
        .unwrap_or(0);
    let value_w = 9;
    let bar_w = width.saturating_sub(label_w + value_w + 2).max(1);
    let max = chart.max_magnitude();

    chart
        .bars
        .iter()
        .map(|bar| {
            let label = Span::styled(format!("{:<label_w$} ", bar.label), theme::text());
            match bar.value {
                Some(v) => {
                    let len = if max > 0.0 {
                        ((v.abs() / max) * bar_w as f64).round() as usize
                    } else {
                        0
                    };
                    let color = theme::tone_color(bar.tone);
                    Line::from(vec![
                        label,
                        Span::styled(BAR.repeat(len.max(1)), Style::default().fg(color)),
                        Span::styled(format!(" {v:+.2}%"), Style::default().fg(color)),
                    ])
                }
                None => Line::from(vec![
                    label,
                    Span::styled("no data", theme::tone_style(Tone::NoData)),
                ]),
            }
        })
        .collect()
}
