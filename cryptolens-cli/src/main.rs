//! CryptoLens CLI: fetch, export, and config commands.
//!
//! Commands:
//! - `fetch` prints the price table, optionally a text bar chart or JSON
//! - `export` writes the current view as CSV
//! - `config show` prints the effective configuration, key redacted
//! - `config path` prints where the config file is looked up

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cryptolens_board::{
    change_table, render_chart, write_csv, AppConfig, BarChart, ChartOutcome, FilterSelection,
    Table, Tone, View, TABLE_COLUMNS,
};
use cryptolens_core::data::{DataError, MarketSession, SourceKind};
use cryptolens_core::domain::{Column, Currency, FetchParams, Snapshot, SortOrder, Timeframe};

const CHART_WIDTH: usize = 40;

#[derive(Parser)]
#[command(
    name = "cryptolens",
    version,
    about = "CryptoLens CLI: crypto market snapshots from CoinGecko and CoinMarketCap"
)]
struct Cli {
    /// Config file (TOML). Defaults to the platform config dir.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a snapshot and print the table.
    Fetch {
        #[command(flatten)]
        view: ViewArgs,

        /// Also print a percent-change bar chart.
        #[arg(long, default_value_t = false)]
        chart: bool,

        /// Print the view as JSON instead of a table.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Fetch a snapshot and write the view as CSV.
    Export {
        #[command(flatten)]
        view: ViewArgs,

        /// Output path. Defaults to `export_path` from config.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Configuration commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration with the API key redacted.
    Show,
    /// Print the default config file location.
    Path,
}

/// Fetch and view options shared by `fetch` and `export`. Unset flags fall
/// back to the `[defaults]` config section.
#[derive(Args, Debug, Clone, Default)]
struct ViewArgs {
    /// Data source: coingecko or coinmarketcap.
    #[arg(long)]
    source: Option<SourceKind>,

    /// Quote currency: usd, btc or eth.
    #[arg(long)]
    currency: Option<Currency>,

    /// Number of coins to fetch (1-250).
    #[arg(long = "per-page")]
    per_page: Option<u16>,

    /// Server-side order: market_cap_desc, market_cap_asc, volume_desc, volume_asc.
    #[arg(long)]
    order: Option<SortOrder>,

    /// Comma-separated symbols to keep (default: all).
    #[arg(long, value_delimiter = ',')]
    coins: Vec<String>,

    /// Keep only the first N selected coins.
    #[arg(long)]
    top: Option<usize>,

    /// Sort the table by a column (e.g. price, 24h, name).
    #[arg(long = "sort-by")]
    sort_by: Option<Column>,

    /// Sort descending.
    #[arg(long, default_value_t = false)]
    desc: bool,

    /// Percent-change window for the chart: 1h, 24h or 7d.
    #[arg(long)]
    timeframe: Option<Timeframe>,
}

fn main() -> Result<()> {
    let _ = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Fetch { view, chart, json } => run_fetch(cli.config, &view, chart, json),
        Commands::Export { view, output } => run_export(cli.config, &view, output),
        Commands::Config { action } => match action {
            ConfigAction::Show => run_config_show(cli.config),
            ConfigAction::Path => {
                match AppConfig::default_path() {
                    Some(path) => println!("{}", path.display()),
                    None => println!("(no platform config directory)"),
                }
                Ok(())
            }
        },
    }
}

fn load_config(path: Option<PathBuf>, args: &ViewArgs) -> Result<AppConfig> {
    let mut config = AppConfig::load(path.as_deref())?;
    if let Some(source) = args.source {
        config.source = source;
    }
    Ok(config)
}

/// Resolve fetch parameters from flags over config defaults.
fn fetch_params(config: &AppConfig, args: &ViewArgs) -> Result<FetchParams, DataError> {
    let d = &config.defaults;
    let params = FetchParams::new(
        args.currency.unwrap_or(d.currency),
        args.per_page.unwrap_or_else(|| config.page_size()),
        args.order.unwrap_or(d.order),
    )?;
    Ok(params)
}

fn selection(config: &AppConfig, args: &ViewArgs, snapshot: &Snapshot) -> FilterSelection {
    let mut selection = if args.coins.is_empty() {
        FilterSelection::all(snapshot)
    } else {
        FilterSelection::with_symbols(&args.coins)
    };
    if let Some(n) = args.top.or(config.defaults.top_n) {
        selection = selection.top(n);
    }
    if let Some(column) = args.sort_by {
        let ascending = if args.desc { false } else { config.defaults.ascending };
        selection = selection.sorted_by(column, ascending);
    }
    selection
}

/// Load one snapshot through a fresh session.
fn load_snapshot(config: &AppConfig, args: &ViewArgs) -> Result<Arc<Snapshot>> {
    let params = fetch_params(config, args)?;
    let source = config.build_source()?;
    let mut session = MarketSession::new(source, config.cache_capacity);
    let snapshot = session
        .load(&params)
        .with_context(|| format!("failed to load {} ({params})", config.source.display_name()))?;

    for coin in &args.coins {
        if snapshot.get(coin).is_none() {
            warn!(symbol = %coin.to_uppercase(), "requested coin not in snapshot");
        }
    }
    Ok(snapshot)
}

fn run_fetch(config_path: Option<PathBuf>, args: &ViewArgs, chart: bool, as_json: bool) -> Result<()> {
    let config = load_config(config_path, args)?;
    let snapshot = load_snapshot(&config, args)?;
    let view = selection(&config, args, &snapshot).apply(&snapshot);
    let timeframe = args.timeframe.unwrap_or(config.defaults.timeframe);

    if as_json {
        println!("{}", view_json(&snapshot, &view, timeframe)?);
        return Ok(());
    }

    println!(
        "{} | {} | fetched {}",
        snapshot.source.display_name(),
        snapshot.params,
        snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let table = Table::from_view(&view, &TABLE_COLUMNS);
    println!("{}", table.dimension_label());
    println!();
    print!("{}", table.to_text());

    if chart {
        println!();
        match render_chart(&view, timeframe, false) {
            ChartOutcome::Bars(chart) => print!("{}", chart_text(&chart, CHART_WIDTH)),
            ChartOutcome::Unavailable { message, .. } => println!("warning: {message}"),
        }
    }
    Ok(())
}

fn run_export(config_path: Option<PathBuf>, args: &ViewArgs, output: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path, args)?;
    let snapshot = load_snapshot(&config, args)?;
    let view = selection(&config, args, &snapshot).apply(&snapshot);
    let path = output.unwrap_or_else(|| config.export_path.clone());

    write_csv(&view, &TABLE_COLUMNS, &path)?;
    info!(path = %path.display(), "export complete");
    println!("Wrote {} rows to {}", view.len(), path.display());
    Ok(())
}

fn run_config_show(config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    print!("{}", config.to_redacted_toml()?);
    Ok(())
}

fn view_json(snapshot: &Snapshot, view: &View<'_>, timeframe: Timeframe) -> Result<String> {
    let chart = match render_chart(view, timeframe, false) {
        ChartOutcome::Bars(chart) => serde_json::to_value(chart)?,
        ChartOutcome::Unavailable { message, .. } => json!({ "unavailable": message }),
    };
    let value = json!({
        "source": snapshot.source,
        "params": snapshot.params,
        "fetched_at": snapshot.fetched_at,
        "columns": view.schema.available(&TABLE_COLUMNS),
        "records": view.records,
        "changes": change_table(view),
        "chart": chart,
    });
    serde_json::to_string_pretty(&value).context("failed to serialize view")
}

/// Plain-text bars: `#` for gains, `-` for losses, `?` rows have no data.
fn chart_text(chart: &BarChart, width: usize) -> String {
    let mut out = format!("{} ({})\n", chart.title, chart.caption);
    let label_w = chart
        .bars
        .iter()
        .map(|b| b.label.chars().count())
        .max()
        .unwrap_or(0);
    let max = chart.max_magnitude();

    for bar in &chart.bars {
        let line = match bar.value {
            Some(v) => {
                let len = if max > 0.0 {
                    ((v.abs() / max) * width as f64).round() as usize
                } else {
                    0
                };
                let glyph = if bar.tone == Tone::Loss { "-" } else { "#" };
                format!("{:<label_w$} {} {v:+.2}%", bar.label, glyph.repeat(len.max(1)))
            }
            None => format!("{:<label_w$} ? no data", bar.label),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}
