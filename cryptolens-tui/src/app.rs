//! Application state: single owner, main thread only.
//!
//! Loads are synchronous. A key that changes fetch parameters only marks a
//! reload as pending; the main loop draws a "Loading" frame and then calls
//! [`AppState::run_pending`].

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use cryptolens_board::{write_csv, AppConfig, FilterSelection, View, TABLE_COLUMNS};
use cryptolens_core::data::{DataError, MarketSession};
use cryptolens_core::domain::{Column, FetchParams, Snapshot, Timeframe, PAGE_SIZE_MAX};

pub const ERROR_HISTORY_CAP: usize = 50;
pub const PAGE_SIZE_STEP: i32 = 10;
pub const PAGE_SIZE_SLIDER_MIN: i32 = 10;

/// Which sidebar list receives j/k/h/l.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Controls,
    Coins,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Controls => Focus::Coins,
            Focus::Coins => Focus::Controls,
        }
    }
}

/// Sidebar controls, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Currency,
    PageSize,
    Order,
    Timeframe,
    TopN,
    SortBy,
    Ascending,
    SortChart,
}

impl Control {
    pub const ALL: [Control; 8] = [
        Control::Currency,
        Control::PageSize,
        Control::Order,
        Control::Timeframe,
        Control::TopN,
        Control::SortBy,
        Control::Ascending,
        Control::SortChart,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Control::Currency => "Currency",
            Control::PageSize => "Coins fetched",
            Control::Order => "Sort order",
            Control::Timeframe => "Change window",
            Control::TopN => "Top N",
            Control::SortBy => "Table sort",
            Control::Ascending => "Ascending",
            Control::SortChart => "Sort chart",
        }
    }

    /// Changing this control requires a new fetch.
    pub fn refetches(self) -> bool {
        matches!(self, Control::Currency | Control::PageSize | Control::Order)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: &'static str,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    ErrorHistory,
}

/// A load waiting for the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reload {
    /// Serve from cache when possible.
    Load,
    /// Drop the cached snapshot for these params first.
    Refresh,
}

pub struct AppState {
    pub running: bool,
    pub focus: Focus,
    pub control_cursor: usize,
    pub coin_cursor: usize,

    pub params: FetchParams,
    pub timeframe: Timeframe,
    pub selection: FilterSelection,
    pub sort_chart: bool,

    pub session: MarketSession,
    pub snapshot: Option<Arc<Snapshot>>,
    pub pending: Option<Reload>,

    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub export_path: PathBuf,
}

impl AppState {
    pub fn new(session: MarketSession, config: &AppConfig) -> Self {
        let params = config.fetch_params().unwrap_or_default();
        let defaults = &config.defaults;
        let mut selection = FilterSelection::default()
            .top(defaults.top_n.unwrap_or(usize::from(params.page_size())));
        selection.ascending = defaults.ascending;

        let mut app = Self {
            running: true,
            focus: Focus::Controls,
            control_cursor: 0,
            coin_cursor: 0,
            params,
            timeframe: defaults.timeframe,
            selection,
            sort_chart: false,
            session,
            snapshot: None,
            pending: None,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            export_path: config.export_path.clone(),
        };
        app.request(Reload::Load);
        app
    }

    pub fn active_control(&self) -> Control {
        Control::ALL[self.control_cursor.min(Control::ALL.len() - 1)]
    }

    /// Mark a load for the next frame and say so in the status bar.
    pub fn request(&mut self, reload: Reload) {
        self.pending = Some(reload);
        let verb = match reload {
            Reload::Load => "Loading",
            Reload::Refresh => "Refreshing",
        };
        self.set_status(format!(
            "{verb} {} ({})...",
            self.session.source_kind().display_name(),
            self.params
        ));
    }

    /// Perform the pending load, if any.
    pub fn run_pending(&mut self) {
        let Some(reload) = self.pending.take() else {
            return;
        };
        let result = match reload {
            Reload::Load => self.session.load(&self.params),
            Reload::Refresh => self.session.refresh(&self.params),
        };
        match result {
            Ok(snapshot) => self.apply_snapshot(snapshot),
            Err(err) => {
                self.snapshot = None;
                self.push_data_error(&err);
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: Arc<Snapshot>) {
        self.selection.select_all(&snapshot);
        self.coin_cursor = self.coin_cursor.min(snapshot.len().saturating_sub(1));
        let stats = self.session.cache_stats();
        self.set_status(format!(
            "{} coins from {} ({} cached, {} hits)",
            snapshot.len(),
            snapshot.source.display_name(),
            self.session.cached_len(),
            stats.hits
        ));
        self.snapshot = Some(snapshot);
    }

    /// The current view, if a snapshot is loaded.
    pub fn view(&self) -> Option<View<'_>> {
        self.snapshot.as_deref().map(|s| self.selection.apply(s))
    }

    pub fn coin_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |s| s.len())
    }

    // ─── Controls ───────────────────────────────────────────────────

    /// Step the active control by `delta` (h = -1, l = +1).
    pub fn adjust_control(&mut self, delta: i32) {
        let control = self.active_control();
        match control {
            Control::Currency => {
                self.params.currency = if delta < 0 {
                    self.params.currency.prev()
                } else {
                    self.params.currency.next()
                };
            }
            Control::PageSize => self.step_page_size(delta),
            Control::Order => {
                self.params.sort_order = if delta < 0 {
                    self.params.sort_order.prev()
                } else {
                    self.params.sort_order.next()
                };
            }
            Control::Timeframe => {
                self.timeframe = if delta < 0 {
                    self.timeframe.prev()
                } else {
                    self.timeframe.next()
                };
            }
            Control::TopN => {
                let max = usize::from(self.params.page_size());
                let current = self.selection.top_n.min(max) as i64;
                self.selection.top_n = (current + i64::from(delta)).clamp(1, max as i64) as usize;
            }
            Control::SortBy => self.selection.sort_by = cycle_sort_column(self.selection.sort_by, delta),
            Control::Ascending => self.selection.ascending = !self.selection.ascending,
            Control::SortChart => self.sort_chart = !self.sort_chart,
        }
        if control.refetches() {
            self.request(Reload::Load);
        }
    }

    /// Page size moves on a 10..=250 grid; top N follows when it showed everything.
    fn step_page_size(&mut self, delta: i32) {
        let old = self.params.page_size();
        let current = i32::from(old);
        let next = if delta < 0 {
            // Snap down to the grid first so 55 goes to 50, not 45.
            let snapped = (current - 1) / PAGE_SIZE_STEP * PAGE_SIZE_STEP;
            snapped.max(PAGE_SIZE_SLIDER_MIN)
        } else {
            (current / PAGE_SIZE_STEP + 1) * PAGE_SIZE_STEP
        };
        self.params = self
            .params
            .with_page_size_clamped(next.min(i32::from(PAGE_SIZE_MAX)));
        let new = self.params.page_size();
        if self.selection.top_n >= usize::from(old) || self.selection.top_n > usize::from(new) {
            self.selection.top_n = usize::from(new);
        }
    }

    // ─── Coins ──────────────────────────────────────────────────────

    pub fn toggle_coin_at_cursor(&mut self) {
        let Some(record) = self
            .snapshot
            .as_ref()
            .and_then(|s| s.records.get(self.coin_cursor))
        else {
            return;
        };
        let symbol = record.display_symbol();
        let selected = self.selection.toggle(&symbol);
        self.set_status(format!(
            "{symbol} {}",
            if selected { "selected" } else { "deselected" }
        ));
    }

    pub fn select_all(&mut self) {
        if let Some(snapshot) = self.snapshot.clone() {
            self.selection.select_all(&snapshot);
            self.set_status(format!("All {} coins selected", snapshot.len()));
        }
    }

    pub fn select_none(&mut self) {
        self.selection.clear();
        self.set_status("Selection cleared");
    }

    // ─── Actions ────────────────────────────────────────────────────

    pub fn clear_cache(&mut self) {
        let dropped = self.session.cached_len();
        self.session.clear_cache();
        self.set_status(format!("Cache cleared ({dropped} snapshots)"));
    }

    /// Write the current view to `export_path`.
    pub fn export(&mut self) {
        let Some(snapshot) = self.snapshot.clone() else {
            self.set_warning("Nothing to export: no data loaded");
            return;
        };
        let result = {
            let view = self.selection.apply(&snapshot);
            write_csv(&view, &TABLE_COLUMNS, &self.export_path).map(|_| view.len())
        };
        match result {
            Ok(rows) => {
                let msg = format!("Exported {rows} rows to {}", self.export_path.display());
                self.set_status(msg);
            }
            Err(err) => {
                let context = self.export_path.display().to_string();
                self.push_error("EXPORT", format!("{err:#}"), context);
            }
        }
    }

    // ─── Status and errors ──────────────────────────────────────────

    pub fn push_data_error(&mut self, err: &DataError) {
        warn!(category = err.category(), error = %err, params = %self.params, "load failed");
        let context = format!("{} {}", self.session.source_kind().display_name(), self.params);
        self.push_error(err.category(), err.to_string(), context);
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: &'static str, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        self.error_history.truncate(ERROR_HISTORY_CAP);
        self.status_message = Some((format!("[{category}] {message}"), StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        info!(status = %msg);
        self.status_message = Some((msg, StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

/// `None` then every column, wrapping.
fn cycle_sort_column(current: Option<Column>, delta: i32) -> Option<Column> {
    let options: Vec<Option<Column>> = std::iter::once(None)
        .chain(Column::ALL.into_iter().map(Some))
        .collect();
    let idx = options.iter().position(|o| *o == current).unwrap_or(0) as i32;
    let len = options.len() as i32;
    options[(idx + delta).rem_euclid(len) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptolens_core::data::testing::FakeSource;
    use cryptolens_core::domain::Currency;

    fn app_with(fake: FakeSource) -> AppState {
        let session = MarketSession::new(Box::new(fake), 8);
        AppState::new(session, &AppConfig::default())
    }

    fn app() -> AppState {
        app_with(FakeSource::with_coins(&[
            ("Bitcoin", "btc"),
            ("Ethereum", "eth"),
            ("XRP", "xrp"),
        ]))
    }

    fn select(app: &mut AppState, control: Control) {
        app.control_cursor = Control::ALL.iter().position(|c| *c == control).unwrap();
    }

    #[test]
    fn initial_load_is_pending_until_run() {
        let mut app = app();
        assert_eq!(app.pending, Some(Reload::Load));
        assert!(app.snapshot.is_none());
        app.run_pending();
        assert!(app.pending.is_none());
        assert_eq!(app.coin_count(), 3);
        assert_eq!(app.view().unwrap().len(), 3);
    }

    #[test]
    fn currency_change_requests_reload() {
        let mut app = app();
        app.run_pending();
        select(&mut app, Control::Currency);
        app.adjust_control(1);
        assert_eq!(app.params.currency, Currency::Btc);
        assert_eq!(app.pending, Some(Reload::Load));
    }

    #[test]
    fn view_only_controls_do_not_reload() {
        let mut app = app();
        app.run_pending();
        for control in [Control::Timeframe, Control::TopN, Control::SortBy, Control::Ascending, Control::SortChart] {
            select(&mut app, control);
            app.adjust_control(1);
            assert!(app.pending.is_none(), "{control:?} should not refetch");
        }
    }

    #[test]
    fn page_size_steps_on_grid() {
        let mut app = app();
        select(&mut app, Control::PageSize);
        app.adjust_control(1);
        assert_eq!(app.params.page_size(), 60);
        assert_eq!(app.selection.top_n, 60);
        app.params = app.params.with_page_size_clamped(55);
        app.adjust_control(-1);
        assert_eq!(app.params.page_size(), 50);
        app.params = app.params.with_page_size_clamped(10);
        app.adjust_control(-1);
        assert_eq!(app.params.page_size(), 10);
        app.params = app.params.with_page_size_clamped(250);
        app.adjust_control(1);
        assert_eq!(app.params.page_size(), 250);
    }

    #[test]
    fn top_n_is_clamped() {
        let mut app = app();
        select(&mut app, Control::TopN);
        app.selection.top_n = 1;
        app.adjust_control(-1);
        assert_eq!(app.selection.top_n, 1);
        app.selection.top_n = 50;
        app.adjust_control(1);
        assert_eq!(app.selection.top_n, 50);
    }

    #[test]
    fn sort_column_cycles_through_none() {
        assert_eq!(cycle_sort_column(None, 1), Some(Column::Rank));
        assert_eq!(cycle_sort_column(None, -1), Some(Column::Change7d));
        assert_eq!(cycle_sort_column(Some(Column::Change7d), 1), None);
    }

    #[test]
    fn failed_load_records_error_and_clears_snapshot() {
        let fake = FakeSource::with_coins(&[("Bitcoin", "btc")])
            .fail_when(|p| p.currency == Currency::Eth, 401);
        let mut app = app_with(fake);
        app.run_pending();
        assert!(app.snapshot.is_some());

        app.params.currency = Currency::Eth;
        app.request(Reload::Load);
        app.run_pending();
        assert!(app.snapshot.is_none());
        assert_eq!(app.error_history.len(), 1);
        assert_eq!(app.error_history[0].category, "API");
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Error);

        // Back to USD is served from cache.
        app.params.currency = Currency::Usd;
        app.request(Reload::Load);
        app.run_pending();
        assert_eq!(app.coin_count(), 1);
        assert_eq!(app.session.cache_stats().hits, 1);
    }

    #[test]
    fn error_history_caps_at_50() {
        let mut app = app();
        for i in 0..60 {
            app.push_error("NET", format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), ERROR_HISTORY_CAP);
        assert!(app.error_history[0].message.contains("59"));
    }

    #[test]
    fn coin_toggles() {
        let mut app = app();
        app.run_pending();
        app.coin_cursor = 1;
        app.toggle_coin_at_cursor();
        assert_eq!(app.view().unwrap().symbols(), vec!["BTC", "XRP"]);
        app.select_none();
        assert!(app.view().unwrap().is_empty());
        app.select_all();
        assert_eq!(app.view().unwrap().len(), 3);
    }

    #[test]
    fn export_writes_current_view() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.export_path = dir.path().join("out.csv");
        app.export();
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Warning);

        app.run_pending();
        app.export();
        let written = std::fs::read_to_string(&app.export_path).unwrap();
        assert_eq!(written.lines().count(), 4);
    }
}
