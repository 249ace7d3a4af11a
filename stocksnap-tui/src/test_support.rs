//! Shared fixtures for state and input tests.

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::{NaiveDate, NaiveDateTime};
use stocksnap_core::data::SampleProvider;
use stocksnap_core::domain::WindowSelector;
use stocksnap_core::insights::ChangeRange;
use stocksnap_core::{MarketDataService, MarketSnapshot};

use crate::app::{AppState, InsightsPanelState};
use crate::worker::{WorkerCommand, WorkerResponse};

pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 14)
        .unwrap()
        .and_hms_opt(16, 0, 0)
        .unwrap()
}

/// App wired to channels the test holds: the command receiver and the response sender.
pub fn app() -> (AppState, Receiver<WorkerCommand>, Sender<WorkerResponse>) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let insights = InsightsPanelState::new(
        vec!["AAPL".into(), "MSFT".into(), "TSLA".into()],
        ChangeRange::default(),
        5,
    );
    (AppState::new(cmd_tx, resp_rx, insights, "Sample data"), cmd_rx, resp_tx)
}

pub fn snapshot() -> MarketSnapshot {
    MarketDataService::new(SampleProvider::new(now()))
        .snapshot("AAPL", WindowSelector::OneMonth, now())
        .unwrap()
}
