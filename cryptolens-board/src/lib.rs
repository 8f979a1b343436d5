//! CryptoLens board: everything between a snapshot and the screen.
//!
//! - Selection and sorting of a snapshot into a borrowed View
//! - Table and change-table projections with display formatting
//! - Percent-change bar chart model
//! - CSV export
//! - Application configuration (TOML + environment)

pub mod chart;
pub mod config;
pub mod export;
pub mod selection;
pub mod table;

pub use chart::{render_chart, BarChart, ChartBar, ChartOutcome, Tone};
pub use config::AppConfig;
pub use export::{export_csv, write_csv, DEFAULT_EXPORT_FILE};
pub use selection::{FilterSelection, View};
pub use table::{change_table, ChangeRow, Table, TABLE_COLUMNS};
