//! StockSnap CLI — price series, headlines, location and market insights.
//!
//! Commands:
//! - `series` — fetch a symbol and print the selected lookback window
//! - `news` — print the current top business headlines
//! - `locate` — print the approximate location of this machine
//! - `sectors` — print sector performance
//! - `gainers` — print the top daily gainers within a change range

mod output;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use stocksnap_core::config::Settings;
use stocksnap_core::data::{
    AlphaVantageProvider, CircuitBreaker, FileProvider, PriceProvider, SampleProvider,
};
use stocksnap_core::domain::WindowSelector;
use stocksnap_core::geo::{GeoLocator, IpInfoLocator};
use stocksnap_core::insights::{sector_performance, ChangeRange};
use stocksnap_core::news::{NewsApiProvider, NewsProvider};
use stocksnap_core::timeseries::parse_timestamp;
use stocksnap_core::{MarketDataService, PipelineError};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "stocksnap",
    version,
    about = "StockSnap CLI — stock price windows, headlines and market insights"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to <config dir>/stocksnap/config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Where price data comes from. Alpha Vantage unless one of these is set.
#[derive(Args, Debug, Clone, Default)]
struct SourceArgs {
    /// Read `<SYMBOL>_<granularity>.json` files from this directory instead of the network.
    #[arg(long, conflicts_with = "sample")]
    offline: Option<PathBuf>,

    /// Use deterministic synthetic data.
    #[arg(long, default_value_t = false)]
    sample: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a symbol and print the selected lookback window.
    Series {
        /// Ticker symbol (e.g., AAPL).
        symbol: String,

        /// Window: latest, 1m, 6m, ytd, 1y, 5y, 10y or all.
        #[arg(long, short, default_value = "1m")]
        window: WindowSelector,

        /// Output format: table, csv or json.
        #[arg(long, short, default_value = "table")]
        format: OutputFormat,

        /// Evaluate windows as of this instant (YYYY-MM-DD[ HH:MM[:SS]]). Defaults to now.
        #[arg(long)]
        now: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the current top business headlines.
    News {
        /// Maximum number of articles. Defaults to the configured count.
        #[arg(long)]
        limit: Option<usize>,

        /// Print JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the approximate location of this machine.
    Locate {
        /// Print JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print sector performance.
    Sectors {
        /// Print JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the top daily gainers within a percent-change range.
    Gainers {
        /// Symbols to consider. Defaults to the configured list.
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Lower bound of the change range, percent.
        #[arg(long, allow_hyphen_values = true)]
        min: Option<f64>,

        /// Upper bound of the change range, percent.
        #[arg(long, allow_hyphen_values = true)]
        max: Option<f64>,

        /// Number of gainers to show.
        #[arg(long)]
        top: Option<usize>,

        #[command(flatten)]
        source: SourceArgs,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{}", error_line(&e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Series {
            symbol,
            window,
            format,
            now,
            source,
        } => run_series(&settings, &symbol, window, format, now.as_deref(), &source),
        Commands::News { limit, json } => run_news(settings, limit, json),
        Commands::Locate { json } => run_locate(&settings, json),
        Commands::Sectors { json } => run_sectors(json),
        Commands::Gainers {
            symbols,
            min,
            max,
            top,
            source,
        } => run_gainers(&settings, symbols, min, max, top, &source),
    }
}

fn parse_now(raw: Option<&str>) -> Result<NaiveDateTime> {
    match raw {
        Some(raw) => parse_timestamp(&raw.replacen('T', " ", 1))
            .ok_or_else(|| anyhow!("invalid --now '{raw}' (expected YYYY-MM-DD[ HH:MM[:SS]])")),
        None => Ok(Local::now().naive_local()),
    }
}

fn build_provider(
    settings: &Settings,
    source: &SourceArgs,
    now: NaiveDateTime,
) -> Result<Box<dyn PriceProvider>> {
    if let Some(dir) = &source.offline {
        let provider = FileProvider::new(dir.clone())
            .with_intraday_interval(settings.alpha_vantage.intraday_interval.clone());
        return Ok(Box::new(provider));
    }
    if source.sample {
        return Ok(Box::new(SampleProvider::new(now)));
    }

    let api_key = settings.alpha_api_key()?;
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = AlphaVantageProvider::new(&settings.alpha_vantage, api_key, circuit_breaker)?;
    Ok(Box::new(provider))
}

/// `Error: ` plus the context chain joined on one line.
fn error_line(e: &anyhow::Error) -> String {
    let chain = format!("{e:#}");
    let message: Vec<&str> = chain
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    format!("Error: {}", message.join(" "))
}

/// Replace a pipeline error with its user-facing message; details go to the log.
fn pipeline_error(e: PipelineError) -> anyhow::Error {
    debug!(error = %e, "pipeline failed");
    anyhow!(e.user_message())
}

fn run_series(
    settings: &Settings,
    symbol: &str,
    selector: WindowSelector,
    format: OutputFormat,
    now: Option<&str>,
    source: &SourceArgs,
) -> Result<()> {
    let now = parse_now(now)?;
    let service = MarketDataService::new(build_provider(settings, source, now)?);
    info!(symbol, %selector, %now, provider = service.provider().name(), "series request");
    let snapshot = service
        .snapshot(symbol, selector, now)
        .map_err(pipeline_error)?;

    let mut out = io::stdout().lock();
    output::write_snapshot(&mut out, &snapshot, format)?;
    out.flush()?;
    Ok(())
}

fn run_news(mut settings: Settings, limit: Option<usize>, json: bool) -> Result<()> {
    if let Some(limit) = limit {
        anyhow::ensure!(limit > 0, "--limit must be positive");
        settings.news.max_articles = limit;
    }
    let provider = NewsApiProvider::new(&settings.news, settings.news_api_key()?)?;
    let articles = provider
        .top_headlines()
        .context("failed to fetch headlines")?;

    let mut out = io::stdout().lock();
    if json {
        output::write_json(&mut out, &articles)
    } else {
        output::write_news(&mut out, &articles)
    }
}

fn run_locate(settings: &Settings, json: bool) -> Result<()> {
    let locator = IpInfoLocator::new(&settings.geo)?;
    let location = locator.locate().context("failed to determine location")?;

    let mut out = io::stdout().lock();
    if json {
        output::write_json(&mut out, &location)
    } else {
        output::write_location(&mut out, &location)
    }
}

fn run_sectors(json: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if json {
        output::write_json(&mut out, sector_performance())
    } else {
        output::write_sectors(&mut out, sector_performance())
    }
}

fn run_gainers(
    settings: &Settings,
    symbols: Vec<String>,
    min: Option<f64>,
    max: Option<f64>,
    top: Option<usize>,
    source: &SourceArgs,
) -> Result<()> {
    let insights = &settings.insights;
    let symbols = if symbols.is_empty() {
        insights.symbols.clone()
    } else {
        symbols
    };
    let range = ChangeRange::new(
        min.unwrap_or(insights.min_change_pct),
        max.unwrap_or(insights.max_change_pct),
    );
    anyhow::ensure!(
        range.min <= range.max,
        "--min ({}) must not exceed --max ({})",
        range.min,
        range.max
    );
    let top = top.unwrap_or(insights.top_n);

    let now = Local::now().naive_local();
    let service = MarketDataService::new(build_provider(settings, source, now)?);
    let report = service.daily_changes(&symbols);

    for (symbol, err) in &report.failures {
        eprintln!("Skipped {symbol}: {}", err.user_message());
    }
    if report.changes.is_empty() && !report.failures.is_empty() {
        return Err(anyhow!("no daily changes could be computed"));
    }

    let mut out = io::stdout().lock();
    output::write_gainers(&mut out, &report.top(range, top))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use stocksnap_core::timeseries::WindowError;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn series_args_parse() {
        let cli = Cli::try_parse_from([
            "stocksnap", "series", "ibm", "--window", "5y", "--format", "json", "--sample",
        ])
        .unwrap();
        match cli.command {
            Commands::Series {
                symbol,
                window,
                format,
                source,
                ..
            } => {
                assert_eq!(symbol, "ibm");
                assert_eq!(window, WindowSelector::FiveYears);
                assert_eq!(format, OutputFormat::Json);
                assert!(source.sample);
            }
            _ => panic!("expected series"),
        }
    }

    #[test]
    fn offline_and_sample_conflict() {
        let result = Cli::try_parse_from([
            "stocksnap", "series", "IBM", "--sample", "--offline", "data",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn gainers_accept_negative_bounds_and_symbol_lists() {
        let cli = Cli::try_parse_from([
            "stocksnap", "gainers", "--symbols", "AAPL,MSFT", "--min", "-3", "--max", "4",
        ])
        .unwrap();
        match cli.command {
            Commands::Gainers {
                symbols, min, max, ..
            } => {
                assert_eq!(symbols, vec!["AAPL", "MSFT"]);
                assert_eq!(min, Some(-3.0));
                assert_eq!(max, Some(4.0));
            }
            _ => panic!("expected gainers"),
        }
    }

    #[test]
    fn now_accepts_dates_and_rejects_garbage() {
        let parsed = parse_now(Some("2024-06-14")).unwrap();
        assert_eq!(parsed.to_string(), "2024-06-14 00:00:00");
        let parsed = parse_now(Some("2024-06-14T16:00:00")).unwrap();
        assert_eq!(parsed.to_string(), "2024-06-14 16:00:00");
        assert!(parse_now(Some("yesterday")).is_err());
    }

    #[test]
    fn pipeline_errors_render_as_the_user_message() {
        let err = pipeline_error(PipelineError::Symbol(
            stocksnap_core::domain::SymbolError::Empty,
        ));
        assert_eq!(error_line(&err), "Error: Select a valid stock symbol.");
    }

    #[test]
    fn window_errors_render_on_one_line() {
        let at = |y| {
            chrono::NaiveDate::from_ymd_opt(y, 6, 14)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        let err = pipeline_error(PipelineError::Window(WindowError::InsufficientHistory {
            selector: WindowSelector::TenYears,
            cutoff: at(2014),
            earliest: Some(at(2020)),
        }));
        assert_eq!(
            error_line(&err),
            "Error: Time period not available for selected symbol."
        );
    }

    #[test]
    fn context_chains_collapse_to_one_line() {
        let err = anyhow!("connection refused\nretry later").context("failed to fetch headlines");
        let line = error_line(&err);
        assert!(!line.contains('\n'));
        assert_eq!(
            line,
            "Error: failed to fetch headlines: connection refused retry later"
        );
    }
}
