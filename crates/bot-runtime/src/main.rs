//! # Gavel Service Runtime
//!
//! Entry point: logging, configuration, hydration, tick loops, and graceful
//! shutdown.
//!
//! ## Startup Sequence
//!
//! 1. Install the tracing subscriber
//! 2. Load configuration (defaults + environment overrides)
//! 3. Build adapters and wire the services
//! 4. Rehydrate the case and prisoner registries from the store
//! 5. Spawn the tick loops
//! 6. Wait for ctrl-c, then stop the loops

use anyhow::Result;
use bot_runtime::{scheduler, BotConfig, ServiceStack};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = BotConfig::from_env();

    info!("===========================================");
    info!("  Gavel Court Service v0.1.0");
    info!("===========================================");
    info!(
        "case tick: {}s, warden tick: {}s",
        config.case_tick_secs, config.warden_tick_secs
    );

    let stack = ServiceStack::from_config(&config);
    stack.hydrate().await;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let court_ticker = scheduler::spawn_court_ticker(
        stack.casemanager.clone(),
        config.case_tick_secs,
        shutdown_rx.clone(),
    );
    let warden_ticker = scheduler::spawn_warden_ticker(
        stack.warden.clone(),
        config.warden_tick_secs,
        shutdown_rx,
    );

    info!("service is running; press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;

    info!("shutting down...");
    shutdown_tx.send(true)?;
    let _ = tokio::join!(court_ticker, warden_ticker);
    info!("shutdown complete");
    Ok(())
}
