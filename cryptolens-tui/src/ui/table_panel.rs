//! Price table: dimension line, aligned columns, coloured percent changes.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use cryptolens_board::{Table, TABLE_COLUMNS};

use crate::app::AppState;
use crate::theme;
use crate::ui::panel_block;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let title = match &app.snapshot {
        Some(s) => format!(
            " Prices | {} | {} ",
            s.source.display_name(),
            s.params.currency
        ),
        None => " Prices ".to_string(),
    };
    let block = panel_block(title, false);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(view) = app.view() else {
        render_empty(f, inner, app);
        return;
    };

    let table = Table::from_view(&view, &TABLE_COLUMNS);
    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        table.dimension_label(),
        theme::muted(),
    ))];

    if table.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "No coins selected. Press a to select all.",
            theme::muted(),
        )));
        f.render_widget(Paragraph::new(lines), inner);
        return;
    }

    let widths = table.column_widths();
    let cell = |text: &str, i: usize| -> String {
        let w = widths[i];
        if table.columns[i].is_numeric() {
            format!("{text:>w$}  ")
        } else {
            format!("{text:<w$}  ")
        }
    };

    lines.push(Line::from(
        table
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| Span::styled(cell(h, i), theme::accent_bold()))
            .collect::<Vec<_>>(),
    ));

    let visible = (inner.height as usize).saturating_sub(lines.len());
    for (row, record) in table.rows.iter().zip(&view.records).take(visible) {
        let spans: Vec<Span> = row
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let column = table.columns[i];
                let style = if column.is_percent_change() {
                    theme::text().fg(theme::change_color(record.number(column)))
                } else {
                    theme::text()
                };
                Span::styled(cell(text, i), style)
            })
            .collect();
        lines.push(Line::from(spans));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn render_empty(f: &mut Frame, area: Rect, app: &AppState) {
    let hint = if app.pending.is_some() {
        "No data yet. Loading..."
    } else if app.error_history.is_empty() {
        "No data. Press r to refresh."
    } else {
        "No data. Press r to retry, e for error history."
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(hint, theme::muted())),
    ];
    f.render_widget(Paragraph::new(lines), area);
}
