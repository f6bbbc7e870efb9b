//! Shared health state for the /health endpoint.
//! Updated by the poller and the feed client.

use std::sync::atomic::{AtomicU64, Ordering};

/// Shared health metrics. Updated by the poll loop, read by the API.
#[derive(Default)]
pub struct HealthState {
    /// Nanosecond timestamp of the last completed poll cycle (0 = none yet).
    pub last_cycle_at_ns: AtomicU64,
    pub cycles_completed: AtomicU64,
    /// Upstream requests that failed and were degraded to empty.
    pub upstream_failures: AtomicU64,
    /// Games on the board after the last cycle.
    pub games_tracked: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cycle(&self, at_ns: u64, games: u64) {
        self.last_cycle_at_ns.store(at_ns, Ordering::Relaxed);
        self.games_tracked.store(games, Ordering::Relaxed);
        self.cycles_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_upstream_failures(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn last_cycle_at_ns(&self) -> u64 {
        self.last_cycle_at_ns.load(Ordering::Relaxed)
    }

    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed.load(Ordering::Relaxed)
    }

    pub fn upstream_failures(&self) -> u64 {
        self.upstream_failures.load(Ordering::Relaxed)
    }

    pub fn games_tracked(&self) -> u64 {
        self.games_tracked.load(Ordering::Relaxed)
    }
}
