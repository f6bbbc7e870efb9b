mod api;
mod config;
mod cycle;
mod detector;
mod error;
mod feed;
mod matcher;
mod normalizer;
mod poller;
mod scorer;
mod state;
mod types;

#[cfg(test)]
mod testutil;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::api::routes::{router, ApiState};
use crate::config::{Config, SportConfig, CHANNEL_CAPACITY};
use crate::error::Result;
use crate::feed::FeedClient;
use crate::normalizer::TeamDirectory;
use crate::poller::BoardPoller;
use crate::state::BoardStore;
use crate::types::ControlMsg;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Team alias tables: a bad table is fatal ---
    let mut directories = HashMap::new();
    for &sport in &cfg.sports {
        let dir = TeamDirectory::for_sport(sport)?;
        let sc = SportConfig::for_sport(sport);
        info!(
            sport = %sport,
            teams = dir.len(),
            game_series = sc.game_series,
            spread_series = sc.spread_series,
            "[INIT] {sport}: {} teams, series {} / {}",
            dir.len(),
            sc.game_series,
            sc.spread_series,
        );
        directories.insert(sport, dir);
    }

    // --- Shared state ---
    let store = BoardStore::new();
    let health = Arc::new(HealthState::new());
    let latency = Arc::new(LatencyStats::new());
    let (control_tx, control_rx) = mpsc::channel::<ControlMsg>(CHANNEL_CAPACITY);

    // --- Poller ---
    let feed = FeedClient::new(&cfg, Arc::clone(&health))?;
    info!(
        interval_secs = cfg.poll_interval_secs,
        timeout_secs = cfg.http_timeout_secs,
        sniper_max_no_cents = cfg.alerts.sniper_max_no_cents,
        sniper_min_bracket = cfg.alerts.sniper_min_bracket,
        mispricing_min_gap = cfg.alerts.mispricing_min_gap,
        "[INIT] polling every {}s",
        cfg.poll_interval_secs,
    );
    let poller = BoardPoller::new(
        cfg.clone(),
        feed,
        directories,
        Arc::clone(&store),
        Arc::clone(&health),
        Arc::clone(&latency),
        control_rx,
    );
    tokio::spawn(async move { poller.run().await });

    // --- HTTP API server ---
    let app = router(ApiState {
        store,
        health,
        latency,
        control_tx,
    });
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
