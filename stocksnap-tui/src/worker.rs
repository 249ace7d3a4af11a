//! Background worker thread — all network I/O runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. The worker
//! owns the providers and handles one command at a time.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use chrono::NaiveDateTime;
use tracing::{info, warn};

use stocksnap_core::data::PriceProvider;
use stocksnap_core::domain::WindowSelector;
use stocksnap_core::geo::{GeoLocation, GeoLocator};
use stocksnap_core::insights::DailyChange;
use stocksnap_core::news::{NewsArticle, NewsProvider};
use stocksnap_core::{MarketDataService, MarketSnapshot};

/// Providers owned by the worker.
pub struct Providers {
    pub market: MarketDataService<Box<dyn PriceProvider>>,
    /// `None` when no NewsAPI key is configured.
    pub news: Option<Box<dyn NewsProvider>>,
    pub geo: Box<dyn GeoLocator>,
}

/// Commands sent from the TUI to the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerCommand {
    LoadSnapshot {
        request_id: u64,
        symbol: String,
        selector: WindowSelector,
        /// Captured on the UI thread when the request was issued.
        now: NaiveDateTime,
    },
    LoadNews,
    LoadLocation,
    LoadGainers {
        symbols: Vec<String>,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    SnapshotReady {
        request_id: u64,
        snapshot: Box<MarketSnapshot>,
    },
    SnapshotFailed {
        request_id: u64,
        message: String,
    },
    NewsReady {
        articles: Vec<NewsArticle>,
    },
    NewsFailed {
        message: String,
    },
    LocationReady {
        location: GeoLocation,
    },
    LocationFailed {
        message: String,
    },
    GainersReady {
        changes: Vec<DailyChange>,
        /// `(symbol, user-facing message)` per symbol that could not be computed.
        failures: Vec<(String, String)>,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
    providers: Providers,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stocksnap-worker".into())
        .spawn(move || worker_loop(rx, tx, providers))
}

fn worker_loop(rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>, providers: Providers) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => {
                let response = handle_command(cmd, &providers);
                if let Some(response) = response {
                    if tx.send(response).is_err() {
                        // UI is gone.
                        break;
                    }
                }
            }
        }
    }
    info!("worker stopped");
}

fn handle_command(cmd: WorkerCommand, providers: &Providers) -> Option<WorkerResponse> {
    let response = match cmd {
        WorkerCommand::LoadSnapshot {
            request_id,
            symbol,
            selector,
            now,
        } => match providers.market.snapshot(&symbol, selector, now) {
            Ok(snapshot) => WorkerResponse::SnapshotReady {
                request_id,
                snapshot: Box::new(snapshot),
            },
            Err(e) => {
                warn!(%symbol, %selector, error = %e, "snapshot failed");
                WorkerResponse::SnapshotFailed {
                    request_id,
                    message: e.user_message(),
                }
            }
        },
        WorkerCommand::LoadNews => match &providers.news {
            Some(news) => match news.top_headlines() {
                Ok(articles) => WorkerResponse::NewsReady { articles },
                Err(e) => {
                    warn!(error = %e, "headlines failed");
                    WorkerResponse::NewsFailed {
                        message: format!("Failed to fetch news: {e}"),
                    }
                }
            },
            None => WorkerResponse::NewsFailed {
                message: "News disabled: set NEWS_API_KEY or [news].api_key".into(),
            },
        },
        WorkerCommand::LoadLocation => match providers.geo.locate() {
            Ok(location) => WorkerResponse::LocationReady { location },
            Err(e) => {
                warn!(error = %e, "geolocation failed");
                WorkerResponse::LocationFailed {
                    message: format!("Failed to detect location: {e}"),
                }
            }
        },
        WorkerCommand::LoadGainers { symbols } => {
            let report = providers.market.daily_changes(&symbols);
            WorkerResponse::GainersReady {
                changes: report.changes,
                failures: report
                    .failures
                    .into_iter()
                    .map(|(symbol, e)| (symbol, e.user_message()))
                    .collect(),
            }
        }
        WorkerCommand::Shutdown => return None,
    };
    Some(response)
}
