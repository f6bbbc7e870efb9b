use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;

use crate::config::MAX_ALERTS_RETAINED;
use crate::error::{AppError, Result};
use crate::types::{
    AlertKind, AlertRecord, ContractSide, GameRow, MarketQuote, Position, PositionView, Sport,
};

/// Request to open a paper position.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct NewPosition {
    pub ticker: String,
    pub side: ContractSide,
    pub contracts: u32,
    /// Cents, 1-99.
    pub entry_price: u32,
}

// ---------------------------------------------------------------------------
// BoardStore
// ---------------------------------------------------------------------------

/// Published board. The poller writes after each cycle; API handlers read.
pub struct BoardStore {
    /// game_id → latest row
    games: DashMap<String, GameRow>,
    /// sequence → alert; higher sequence = newer
    alerts: DashMap<u64, AlertRecord>,
    alert_seq: AtomicU64,
    /// ticker → (sport, latest quote), for marking positions
    quotes: DashMap<String, (Sport, MarketQuote)>,
    positions: DashMap<u64, Position>,
    next_position_id: AtomicU64,
}

impl BoardStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            games: DashMap::new(),
            alerts: DashMap::new(),
            alert_seq: AtomicU64::new(0),
            quotes: DashMap::new(),
            positions: DashMap::new(),
            next_position_id: AtomicU64::new(1),
        })
    }

    /// Replace every row for `sport`. Games no longer on the scoreboard drop
    /// off, and so do their quotes unless a position still references them.
    pub fn publish_games(&self, sport: Sport, rows: Vec<GameRow>) {
        let keep: HashSet<String> = rows.iter().map(|r| r.snapshot.game_id.clone()).collect();
        self.games
            .retain(|id, row| row.snapshot.sport != sport || keep.contains(id));

        let live_tickers: HashSet<String> = rows
            .iter()
            .flat_map(|r| r.winner_quotes.iter().chain(r.spread_quotes.iter()))
            .map(|q| q.ticker.clone())
            .collect();
        let held: HashSet<String> = self.positions.iter().map(|p| p.ticker.clone()).collect();
        self.quotes.retain(|ticker, (quote_sport, _)| {
            *quote_sport != sport || live_tickers.contains(ticker) || held.contains(ticker)
        });

        for row in rows {
            for q in row.winner_quotes.iter().chain(row.spread_quotes.iter()) {
                self.quotes.insert(q.ticker.clone(), (sport, q.clone()));
            }
            self.games.insert(row.snapshot.game_id.clone(), row);
        }
    }

    pub fn quote_count(&self) -> usize {
        self.quotes.len()
    }

    /// Rows ordered by start time, then id.
    pub fn games(&self, sport: Option<Sport>) -> Vec<GameRow> {
        let mut rows: Vec<GameRow> = self
            .games
            .iter()
            .filter(|r| sport.map_or(true, |s| r.snapshot.sport == s))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| {
            a.snapshot
                .start_time
                .cmp(&b.snapshot.start_time)
                .then_with(|| a.snapshot.game_id.cmp(&b.snapshot.game_id))
        });
        rows
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    pub fn push_alert(&self, alert: AlertRecord) {
        let seq = self.alert_seq.fetch_add(1, Ordering::Relaxed);
        self.alerts.insert(seq, alert);
        if let Some(cutoff) = seq.checked_sub(MAX_ALERTS_RETAINED as u64) {
            self.alerts.retain(|&s, _| s > cutoff);
        }
    }

    /// Newest first.
    pub fn alerts(&self, kind: Option<AlertKind>, limit: usize) -> Vec<AlertRecord> {
        let mut entries: Vec<(u64, AlertRecord)> = self
            .alerts
            .iter()
            .filter(|e| kind.map_or(true, |k| e.value().kind() == k))
            .map(|e| (*e.key(), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| b.0.cmp(&a.0));
        entries.into_iter().take(limit).map(|(_, a)| a).collect()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    pub fn clear_alerts(&self) {
        self.alerts.clear();
    }

    pub fn quote(&self, ticker: &str) -> Option<MarketQuote> {
        self.quotes.get(ticker).map(|q| q.value().1.clone())
    }

    // -----------------------------------------------------------------------
    // Paper positions
    // -----------------------------------------------------------------------

    pub fn open_position(&self, req: NewPosition) -> Result<Position> {
        let ticker = req.ticker.trim();
        if ticker.is_empty() {
            return Err(AppError::BadRequest("ticker is required".to_string()));
        }
        if req.contracts == 0 {
            return Err(AppError::BadRequest("contracts must be positive".to_string()));
        }
        if !(1..=99).contains(&req.entry_price) {
            return Err(AppError::BadRequest(
                "entry_price must be between 1 and 99 cents".to_string(),
            ));
        }

        let id = self.next_position_id.fetch_add(1, Ordering::Relaxed);
        let position = Position {
            id,
            ticker: ticker.to_string(),
            side: req.side,
            contracts: req.contracts,
            entry_price: req.entry_price,
            opened_at: Utc::now(),
        };
        self.positions.insert(id, position.clone());
        Ok(position)
    }

    pub fn close_position(&self, id: u64) -> Result<Position> {
        self.positions
            .remove(&id)
            .map(|(_, p)| p)
            .ok_or_else(|| AppError::NotFound(format!("position {id}")))
    }

    /// Open positions marked to the latest quotes, oldest first.
    pub fn positions(&self) -> Vec<PositionView> {
        let mut views: Vec<PositionView> = self
            .positions
            .iter()
            .map(|p| {
                let quote = self.quote(&p.ticker);
                PositionView::mark(p.value().clone(), quote.as_ref())
            })
            .collect();
        views.sort_by_key(|v| v.position.id);
        views
    }
}
