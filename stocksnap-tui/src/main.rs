//! StockSnap TUI — five-panel terminal dashboard.
//!
//! Panels:
//! 1. Home — welcome and instructions
//! 2. Market Data — symbol input, window selector, closing-price chart, data table
//! 3. News — top business headlines and detected location on a world map
//! 4. Insights — sector performance and daily gainers
//! 5. Help — keyboard shortcuts

mod app;
mod input;
mod theme;
mod ui;
mod worker;

#[cfg(test)]
mod test_support;

use std::fs::OpenOptions;
use std::io::{self, stdout};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stocksnap_core::config::Settings;
use stocksnap_core::data::{AlphaVantageProvider, CircuitBreaker, PriceProvider, SampleProvider};
use stocksnap_core::geo::IpInfoLocator;
use stocksnap_core::news::{NewsApiProvider, NewsProvider};
use stocksnap_core::MarketDataService;

use crate::app::{AppState, InsightsPanelState};
use crate::worker::{Providers, WorkerCommand};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    let settings = Settings::load(None).context("failed to load configuration")?;
    let (providers, data_source, startup_warning) = build_providers(&settings)?;

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(cmd_rx, resp_tx, providers)
        .context("failed to spawn worker thread")?;

    let insights = InsightsPanelState::new(
        settings.insights.symbols.clone(),
        settings.insights.change_range(),
        settings.insights.top_n,
    );
    let mut app = AppState::new(cmd_tx.clone(), resp_rx, insights, data_source);
    if let Some(warning) = startup_warning {
        app.set_warning(warning);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Log to `<config_dir>/stocksnap/stocksnap-tui.log`; the terminal belongs to the UI.
fn init_logging() {
    let Some(dir) = dirs::config_dir().map(|d| d.join("stocksnap")) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("stocksnap-tui.log"))
    else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

/// Providers for the worker, a label for the price source, and an optional
/// warning to show at startup.
fn build_providers(settings: &Settings) -> Result<(Providers, String, Option<String>)> {
    let mut warning = None;

    let (price, data_source): (Box<dyn PriceProvider>, String) = match settings.alpha_api_key() {
        Ok(key) => {
            let breaker = Arc::new(CircuitBreaker::default_provider());
            let provider = AlphaVantageProvider::new(&settings.alpha_vantage, key, breaker)?;
            (Box::new(provider), "Alpha Vantage".into())
        }
        Err(e) => {
            warn!(error = %e, "no Alpha Vantage key, using sample data");
            warning = Some(format!("{e}; showing sample data"));
            (
                Box::new(SampleProvider::new(Local::now().naive_local())),
                "Sample data (no Alpha Vantage key)".into(),
            )
        }
    };

    let news: Option<Box<dyn NewsProvider>> = match settings.news_api_key() {
        Ok(key) => Some(Box::new(NewsApiProvider::new(&settings.news, key)?)),
        Err(e) => {
            info!(error = %e, "news disabled");
            None
        }
    };

    let providers = Providers {
        market: MarketDataService::new(price),
        news,
        geo: Box::new(IpInfoLocator::new(&settings.geo)?),
    };
    Ok((providers, data_source, warning))
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            app.apply_response(resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key, Local::now().naive_local());
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}
