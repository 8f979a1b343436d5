//! Control values saved across restarts as JSON.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use cryptolens_board::AppConfig;
use cryptolens_core::domain::{Column, Currency, FetchParams, SortOrder, Timeframe};

use crate::app::{AppState, Overlay};

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub currency: Currency,
    pub page_size: u16,
    pub order: SortOrder,
    pub timeframe: Timeframe,
    pub top_n: usize,
    pub sort_by: Option<Column>,
    pub ascending: bool,
    pub sort_chart: bool,
    pub help_dismissed: bool,
}

impl PersistedState {
    /// Starting values when nothing was saved yet.
    pub fn from_config(config: &AppConfig) -> Self {
        let d = &config.defaults;
        let page_size = config.page_size();
        Self {
            currency: d.currency,
            page_size,
            order: d.order,
            timeframe: d.timeframe,
            top_n: d.top_n.unwrap_or(usize::from(page_size)),
            sort_by: None,
            ascending: d.ascending,
            sort_chart: false,
            help_dismissed: false,
        }
    }
}

/// `{config_dir}/cryptolens/state.json`.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cryptolens")
        .join("state.json")
}

/// Load persisted state. Returns `fallback` if the file is missing or corrupt.
pub fn load(path: &Path, fallback: PersistedState) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or(fallback),
        Err(_) => fallback,
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        currency: app.params.currency,
        page_size: app.params.page_size(),
        order: app.params.sort_order,
        timeframe: app.timeframe,
        top_n: app.selection.top_n,
        sort_by: app.selection.sort_by,
        ascending: app.selection.ascending,
        sort_chart: app.sort_chart,
        help_dismissed: app.overlay != Overlay::Help,
    }
}

/// Apply persisted state. An out-of-range page size keeps the current params.
pub fn apply(app: &mut AppState, state: PersistedState) {
    if let Ok(params) = FetchParams::new(state.currency, state.page_size, state.order) {
        app.params = params;
    }
    app.timeframe = state.timeframe;
    app.selection.top_n = state.top_n.clamp(1, usize::from(app.params.page_size()));
    app.selection.sort_by = state.sort_by;
    app.selection.ascending = state.ascending;
    app.sort_chart = state.sort_chart;
    if !state.help_dismissed {
        app.overlay = Overlay::Help;
    }
}
