//! Keyboard input dispatch: overlays, then global keys, then the focused list.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::{AppState, Control, Focus, Overlay, Reload};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::Help => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.focus = app.focus.toggle();
            return;
        }
        KeyCode::Char('?') => {
            app.overlay = Overlay::Help;
            return;
        }
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return;
        }
        KeyCode::Char('r') => {
            app.request(Reload::Refresh);
            return;
        }
        KeyCode::Char('c') => {
            app.clear_cache();
            return;
        }
        KeyCode::Char('x') => {
            app.export();
            return;
        }
        KeyCode::Char('a') => {
            app.select_all();
            return;
        }
        KeyCode::Char('d') => {
            app.select_none();
            return;
        }
        _ => {}
    }

    // 3. Focused list.
    match app.focus {
        Focus::Controls => handle_controls_key(app, key),
        Focus::Coins => handle_coins_key(app, key),
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_controls_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.control_cursor + 1 < Control::ALL.len() {
                app.control_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.control_cursor = app.control_cursor.saturating_sub(1);
        }
        KeyCode::Char('h') | KeyCode::Left => app.adjust_control(-1),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ') => {
            app.adjust_control(1)
        }
        _ => {}
    }
}

fn handle_coins_key(app: &mut AppState, key: KeyEvent) {
    let count = app.coin_count();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if count > 0 && app.coin_cursor + 1 < count {
                app.coin_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.coin_cursor = app.coin_cursor.saturating_sub(1);
        }
        KeyCode::Char('g') | KeyCode::Home => app.coin_cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.coin_cursor = count.saturating_sub(1),
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_coin_at_cursor(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use cryptolens_board::AppConfig;
    use cryptolens_core::data::testing::FakeSource;
    use cryptolens_core::data::MarketSession;
    use cryptolens_core::domain::Currency;

    fn press(app: &mut AppState, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn app() -> AppState {
        let fake = FakeSource::with_coins(&[("Bitcoin", "btc"), ("Ethereum", "eth")]);
        let mut app = AppState::new(MarketSession::new(Box::new(fake), 8), &AppConfig::default());
        app.run_pending();
        app
    }

    #[test]
    fn quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn help_overlay_swallows_next_key() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.overlay, Overlay::Help);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.overlay, Overlay::None);
        assert!(app.running);
    }

    #[test]
    fn controls_navigation_and_adjust() {
        let mut app = app();
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.params.currency, Currency::Btc);
        assert!(app.pending.is_some());
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.control_cursor, 0);
        for _ in 0..20 {
            press(&mut app, KeyCode::Char('j'));
        }
        assert_eq!(app.control_cursor, Control::ALL.len() - 1);
    }

    #[test]
    fn coin_focus_toggles_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Coins);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.coin_cursor, 1);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.view().unwrap().symbols(), vec!["BTC"]);
        press(&mut app, KeyCode::Char('d'));
        assert!(app.view().unwrap().is_empty());
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.view().unwrap().len(), 2);
    }

    #[test]
    fn refresh_and_error_overlay() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.pending, Some(Reload::Refresh));
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.overlay, Overlay::ErrorHistory);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = app();
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        handle_key(&mut app, key);
        assert!(app.running);
    }
}
