//! Application state — single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDateTime;

use stocksnap_core::domain::{Symbol, WindowSelector};
use stocksnap_core::geo::GeoLocation;
use stocksnap_core::insights::{ChangeRange, DailyChange};
use stocksnap_core::news::NewsArticle;
use stocksnap_core::MarketSnapshot;

use crate::worker::{WorkerCommand, WorkerResponse};

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Home,
    MarketData,
    News,
    Insights,
    Help,
}

impl Panel {
    pub const ALL: [Panel; 5] = [
        Panel::Home,
        Panel::MarketData,
        Panel::News,
        Panel::Insights,
        Panel::Help,
    ];

    pub fn index(self) -> usize {
        match self {
            Panel::Home => 0,
            Panel::MarketData => 1,
            Panel::News => 2,
            Panel::Insights => 3,
            Panel::Help => 4,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Self::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Home => "Home",
            Panel::MarketData => "Market Data",
            Panel::News => "News",
            Panel::Insights => "Insights",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Panel {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Result of a background request as seen by a panel.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Load<T> {
    #[default]
    NotLoaded,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Load<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Load::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Load::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Market Data panel state.
#[derive(Debug)]
pub struct MarketPanelState {
    pub symbol_input: String,
    pub editing: bool,
    pub selector: WindowSelector,
    pub snapshot: Option<MarketSnapshot>,
    /// Id of the request whose response we are waiting for.
    pub pending: Option<u64>,
    /// First visible row of the data table.
    pub table_scroll: usize,
}

impl MarketPanelState {
    pub fn new() -> Self {
        Self {
            symbol_input: String::new(),
            editing: false,
            selector: WindowSelector::OneMonth,
            snapshot: None,
            pending: None,
            table_scroll: 0,
        }
    }

    pub fn row_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |s| s.series.len())
    }
}

/// News panel state.
#[derive(Debug, Default)]
pub struct NewsPanelState {
    pub articles: Load<Vec<NewsArticle>>,
    pub location: Load<GeoLocation>,
    pub cursor: usize,
}

/// Which end of the change range the Insights panel adjusts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Min,
    Max,
}

/// Insights panel state.
#[derive(Debug)]
pub struct InsightsPanelState {
    pub symbols: Vec<String>,
    pub range: ChangeRange,
    pub active_bound: RangeBound,
    pub top_n: usize,
    pub gainers: Load<Vec<DailyChange>>,
    pub failures: Vec<(String, String)>,
}

impl InsightsPanelState {
    pub fn new(symbols: Vec<String>, range: ChangeRange, top_n: usize) -> Self {
        Self {
            symbols,
            range,
            active_bound: RangeBound::Min,
            top_n,
            gainers: Load::NotLoaded,
            failures: Vec::new(),
        }
    }

    /// Gainers inside the current range, best first.
    pub fn visible_gainers(&self) -> Vec<DailyChange> {
        self.gainers
            .ready()
            .map(|changes| stocksnap_core::insights::top_gainers(changes, self.range, self.top_n))
            .unwrap_or_default()
    }

    pub fn shift_active_bound(&mut self, steps: i32) {
        match self.active_bound {
            RangeBound::Min => self.range.shift_min(steps),
            RangeBound::Max => self.range.shift_max(steps),
        }
    }

    pub fn toggle_bound(&mut self) {
        self.active_bound = match self.active_bound {
            RangeBound::Min => RangeBound::Max,
            RangeBound::Max => RangeBound::Min,
        };
    }
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,

    // Panel states
    pub market: MarketPanelState,
    pub news: NewsPanelState,
    pub insights: InsightsPanelState,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
    next_request_id: u64,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    /// Label of the price data source shown on the Home panel.
    pub data_source: String,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        insights: InsightsPanelState,
        data_source: impl Into<String>,
    ) -> Self {
        Self {
            active_panel: Panel::Home,
            running: true,
            market: MarketPanelState::new(),
            news: NewsPanelState::default(),
            insights,
            worker_tx,
            worker_rx,
            next_request_id: 0,
            status_message: None,
            data_source: data_source.into(),
        }
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    /// Set an error status message.
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }

    /// Switch panels, loading the News and Insights data the first time they are shown.
    pub fn select_panel(&mut self, panel: Panel) {
        self.active_panel = panel;
        match panel {
            Panel::News if self.news.articles == Load::NotLoaded => self.request_news(),
            Panel::Insights if self.insights.gainers == Load::NotLoaded => self.request_gainers(),
            _ => {}
        }
    }

    fn send(&mut self, cmd: WorkerCommand) -> bool {
        if self.worker_tx.send(cmd).is_err() {
            self.set_error("Background worker stopped; restart StockSnap.");
            return false;
        }
        true
    }

    /// Ask the worker for a snapshot of the typed symbol over the selected window.
    pub fn request_snapshot(&mut self, now: NaiveDateTime) {
        let symbol = match Symbol::parse(&self.market.symbol_input) {
            Ok(symbol) => symbol,
            Err(_) => {
                self.set_error("Select a valid stock symbol.");
                return;
            }
        };
        self.market.symbol_input = symbol.to_string();

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        let selector = self.market.selector;
        if self.send(WorkerCommand::LoadSnapshot {
            request_id,
            symbol: symbol.to_string(),
            selector,
            now,
        }) {
            self.market.pending = Some(request_id);
            self.set_status(format!("Loading {symbol} ({selector})..."));
        }
    }

    /// Change the window and reload if a symbol has already been charted.
    pub fn cycle_window(&mut self, forward: bool, now: NaiveDateTime) {
        self.market.selector = if forward {
            self.market.selector.next()
        } else {
            self.market.selector.prev()
        };
        if self.market.snapshot.is_some() || self.market.pending.is_some() {
            self.request_snapshot(now);
        }
    }

    pub fn request_news(&mut self) {
        if self.send(WorkerCommand::LoadNews) && self.send(WorkerCommand::LoadLocation) {
            self.news.articles = Load::Loading;
            self.news.location = Load::Loading;
            self.set_status("Loading headlines...");
        }
    }

    pub fn request_gainers(&mut self) {
        let symbols = self.insights.symbols.clone();
        if self.send(WorkerCommand::LoadGainers { symbols }) {
            self.insights.gainers = Load::Loading;
            self.set_status("Loading daily gainers...");
        }
    }

    pub fn scroll_table(&mut self, down: bool) {
        let rows = self.market.row_count();
        if down {
            if self.market.table_scroll + 1 < rows {
                self.market.table_scroll += 1;
            }
        } else {
            self.market.table_scroll = self.market.table_scroll.saturating_sub(1);
        }
    }

    pub fn scroll_articles(&mut self, down: bool) {
        let count = self.news.articles.ready().map_or(0, Vec::len);
        if down {
            if self.news.cursor + 1 < count {
                self.news.cursor += 1;
            }
        } else {
            self.news.cursor = self.news.cursor.saturating_sub(1);
        }
    }

    /// Apply a worker response to the state.
    pub fn apply_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::SnapshotReady {
                request_id,
                snapshot,
            } => {
                if self.market.pending != Some(request_id) {
                    return;
                }
                self.market.pending = None;
                self.market.table_scroll = 0;
                self.set_status(format!(
                    "{}: {} records ({} from {})",
                    snapshot.symbol,
                    snapshot.series.len(),
                    snapshot.selector,
                    snapshot.source.label()
                ));
                self.market.snapshot = Some(*snapshot);
            }
            WorkerResponse::SnapshotFailed {
                request_id,
                message,
            } => {
                if self.market.pending != Some(request_id) {
                    return;
                }
                self.market.pending = None;
                self.market.snapshot = None;
                self.market.table_scroll = 0;
                self.set_error(message);
            }
            WorkerResponse::NewsReady { articles } => {
                self.news.cursor = 0;
                self.set_status(format!("{} headlines loaded", articles.len()));
                self.news.articles = Load::Ready(articles);
            }
            WorkerResponse::NewsFailed { message } => {
                self.set_warning(message.clone());
                self.news.articles = Load::Failed(message);
            }
            WorkerResponse::LocationReady { location } => {
                self.news.location = Load::Ready(location);
            }
            WorkerResponse::LocationFailed { message } => {
                self.news.location = Load::Failed(message);
            }
            WorkerResponse::GainersReady { changes, failures } => {
                if failures.is_empty() {
                    self.set_status(format!("Daily changes for {} symbols", changes.len()));
                } else {
                    self.set_warning(format!(
                        "Daily changes: {} ok, {} failed",
                        changes.len(),
                        failures.len()
                    ));
                }
                self.insights.gainers = Load::Ready(changes);
                self.insights.failures = failures;
            }
        }
    }
}
