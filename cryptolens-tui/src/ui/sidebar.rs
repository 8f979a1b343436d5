//! Sidebar: fetch and view controls above the coin multi-select.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, Control, Focus};
use crate::theme;
use crate::ui::panel_block;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(Control::ALL.len() as u16 + 2),
            Constraint::Min(3),
        ])
        .split(area);

    render_controls(f, chunks[0], app);
    render_coins(f, chunks[1], app);
}

fn render_controls(f: &mut Frame, area: Rect, app: &AppState) {
    let active = app.focus == Focus::Controls;
    let block = panel_block(" Controls [h/l] ".to_string(), active);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let label_w = 14;
    let lines: Vec<Line> = Control::ALL
        .iter()
        .enumerate()
        .map(|(i, control)| {
            let is_cursor = active && i == app.control_cursor;
            let marker = if is_cursor { "▸ " } else { "  " };
            let value_style = if is_cursor { theme::cursor() } else { theme::text() };
            Line::from(vec![
                Span::styled(marker, theme::accent()),
                Span::styled(format!("{:<label_w$}", control.label()), theme::muted()),
                Span::styled(format!(" {} ", control_value(app, *control)), value_style),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

/// Display text for a control's current value.
pub fn control_value(app: &AppState, control: Control) -> String {
    let yes_no = |b: bool| String::from(if b { "yes" } else { "no" });
    match control {
        Control::Currency => app.params.currency.to_string(),
        Control::PageSize => app.params.page_size().to_string(),
        Control::Order => app.params.sort_order.as_str().to_string(),
        Control::Timeframe => app.timeframe.label().to_string(),
        Control::TopN => app
            .selection
            .top_n
            .min(usize::from(app.params.page_size()))
            .to_string(),
        Control::SortBy => app
            .selection
            .sort_by
            .map_or_else(|| "none".to_string(), |c| c.header().to_string()),
        Control::Ascending => yes_no(app.selection.ascending),
        Control::SortChart => yes_no(app.sort_chart),
    }
}

fn render_coins(f: &mut Frame, area: Rect, app: &AppState) {
    let active = app.focus == Focus::Coins;
    let title = format!(
        " Coins {}/{} [Space] ",
        app.selection.symbol_count(),
        app.coin_count()
    );
    let block = panel_block(title, active);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(snapshot) = app.snapshot.as_ref() else {
        let msg = Paragraph::new(Span::styled("No coins loaded.", theme::muted()));
        f.render_widget(msg, inner);
        return;
    };

    // Keep the cursor row visible.
    let height = inner.height as usize;
    let start = if height == 0 {
        0
    } else {
        app.coin_cursor.saturating_sub(height - 1)
    };

    let lines: Vec<Line> = snapshot
        .records
        .iter()
        .enumerate()
        .skip(start)
        .take(height)
        .map(|(i, record)| {
            let symbol = record.display_symbol();
            let checked = app.selection.contains(&symbol);
            let is_cursor = active && i == app.coin_cursor;
            let style = if is_cursor {
                theme::cursor()
            } else if checked {
                theme::text()
            } else {
                theme::muted()
            };
            Line::from(vec![
                Span::styled(if checked { "[x] " } else { "[ ] " }, theme::accent()),
                Span::styled(format!("{symbol:<6} {}", record.name), style),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}
