//! Top-level layout: sidebar, table over chart, status bar.

pub mod chart_panel;
pub mod overlays;
pub mod sidebar;
pub mod status_bar;
pub mod table_panel;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::app::{AppState, Overlay};
use crate::theme;

const SIDEBAR_WIDTH: u16 = 34;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());
    let main_area = chunks[0];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(main_area);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(columns[1]);

    sidebar::render(f, columns[0], app);
    table_panel::render(f, right[0], app);
    chart_panel::render(f, right[1], app);
    status_bar::render(f, chunks[1], app);

    // Overlays on top.
    match app.overlay {
        Overlay::Help => overlays::render_help(f, main_area),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::None => {}
    }
}

/// Bordered block styled for focus.
pub fn panel_block(title: String, active: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(active))
        .title(title)
        .title_style(theme::panel_title(active))
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptolens_board::AppConfig;
    use cryptolens_core::data::testing::FakeSource;
    use cryptolens_core::data::MarketSession;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(app: &AppState) -> String {
        let backend = TestBackend::new(120, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn renders_loaded_dashboard() {
        let fake = FakeSource::with_coins(&[("Bitcoin", "btc"), ("Ethereum", "eth")]);
        let mut app = AppState::new(MarketSession::new(Box::new(fake), 8), &AppConfig::default());
        app.run_pending();
        let text = screen_text(&app);
        assert!(text.contains("Data Dimension: 2 rows"));
        assert!(text.contains("7d Price Change (%)"));
        assert!(text.contains("BTC"));
    }

    #[test]
    fn renders_empty_state_before_load() {
        let fake = FakeSource::with_coins(&[]);
        let app = AppState::new(MarketSession::new(Box::new(fake), 8), &AppConfig::default());
        let text = screen_text(&app);
        assert!(text.contains("Loading"));
        assert!(text.contains("No data"));
    }

    #[test]
    fn centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
    }
}
