//! Interval tick loops.
//!
//! The scheduler is the only caller of `tick_all`; state-changing commands
//! already trigger their own out-of-cycle heartbeats inside the services.

use gavel_casemanager::ports::CourtApi;
use gavel_casemanager::CaseManager;
use gavel_warden::{Warden, WardenApi};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

/// Spawns the case registry ticker.
pub fn spawn_court_ticker(
    casemanager: Arc<CaseManager>,
    interval_secs: u64,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        // The immediate first tick re-evaluates everything hydration loaded.
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    casemanager.tick_all().await;
                }
                _ = shutdown.changed() => {
                    info!("[runtime] court ticker stopping");
                    break;
                }
            }
        }
    })
}

/// Spawns the warden ledger ticker.
pub fn spawn_warden_ticker(
    warden: Arc<Warden>,
    interval_secs: u64,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    warden.tick_all().await;
                }
                _ = shutdown.changed() => {
                    info!("[runtime] warden ticker stopping");
                    break;
                }
            }
        }
    })
}
