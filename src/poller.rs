use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::{NaiveDate, Utc};
use futures_util::future::join_all;
use tokio::sync::mpsc;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::api::health::HealthState;
use crate::api::latency::LatencyStats;
use crate::config::{Config, SportConfig, SCOREBOARD_DAY_ROLLOVER_HOURS};
use crate::cycle::{assess_game, build_profile, enrich_alert, GameInputs};
use crate::feed::FeedClient;
use crate::matcher::{spread_matches, winner_matches};
use crate::normalizer::summary::{extract, injuries_by_team, SummaryInsights};
use crate::normalizer::{normalize_event, TeamDirectory};
use crate::state::{BoardStore, SessionState};
use crate::types::{AlertRecord, ControlMsg, GameRow, GameSnapshot, GameState, MarketQuote, Sport};

/// Drives the board: one fetch → normalize → assess → publish pass per tick.
/// Owns the session, so alert de-dup and comeback tracking need no locks.
pub struct BoardPoller {
    cfg: Config,
    feed: FeedClient,
    directories: HashMap<Sport, TeamDirectory>,
    store: Arc<BoardStore>,
    health: Arc<HealthState>,
    latency: Arc<LatencyStats>,
    control_rx: mpsc::Receiver<ControlMsg>,
    session: SessionState,
}

impl BoardPoller {
    pub fn new(
        cfg: Config,
        feed: FeedClient,
        directories: HashMap<Sport, TeamDirectory>,
        store: Arc<BoardStore>,
        health: Arc<HealthState>,
        latency: Arc<LatencyStats>,
        control_rx: mpsc::Receiver<ControlMsg>,
    ) -> Self {
        Self {
            cfg,
            feed,
            directories,
            store,
            health,
            latency,
            control_rx,
            session: SessionState::new(),
        }
    }

    pub async fn run(mut self) {
        let mut ticker = interval(Duration::from_secs(self.cfg.poll_interval_secs));

        loop {
            // a cycle runs to completion inside its branch, so control
            // messages only land between cycles
            tokio::select! {
                _ = ticker.tick() => self.cycle().await,
                msg = self.control_rx.recv() => match msg {
                    Some(msg) => self.handle_control(msg),
                    None => {
                        warn!("[POLL] control channel closed, stopping poller");
                        break;
                    }
                },
            }
        }
    }

    fn handle_control(&mut self, msg: ControlMsg) {
        match msg {
            ControlMsg::ResetSession => {
                let cleared = self.session.dedup.len();
                self.session.reset();
                self.store.clear_alerts();
                info!(cleared, "[POLL] session reset: {cleared} alert keys cleared");
            }
        }
    }

    async fn cycle(&mut self) {
        let started = Instant::now();
        let mut games = 0usize;
        let mut alerts = 0usize;

        let sports = self.cfg.sports.clone();
        for sport in sports {
            let (g, a) = self.poll_sport(SportConfig::for_sport(sport)).await;
            games += g;
            alerts += a;
        }

        let elapsed = started.elapsed();
        self.latency.record(elapsed);
        self.health.record_cycle(now_ns(), self.store.game_count() as u64);
        info!(
            games,
            alerts,
            tracked_comebacks = self.session.comeback.tracked(),
            quotes = self.store.quote_count(),
            duration_ms = elapsed.as_millis() as u64,
            "[POLL] cycle complete: {games} games, {alerts} new alerts in {}ms",
            elapsed.as_millis(),
        );
    }

    /// One league's pass. Returns (games published, alerts fired).
    async fn poll_sport(&mut self, sport: &'static SportConfig) -> (usize, usize) {
        let Some(dir) = self.directories.get(&sport.sport) else {
            warn!(sport = %sport.sport, "[POLL] no team directory for {}", sport.sport);
            return (0, 0);
        };

        let today = scoreboard_date();
        let yesterday = today.pred_opt().unwrap_or(today);
        let (events, prior_events, injuries, winner_markets, spread_markets) = tokio::join!(
            self.feed.scoreboard(sport, today),
            self.feed.scoreboard(sport, yesterday),
            self.feed.injuries(sport),
            self.feed.open_markets(sport.game_series),
            self.feed.open_markets(sport.spread_series),
        );

        let games: Vec<GameSnapshot> = events
            .iter()
            .filter_map(|e| normalize_event(e, sport, dir))
            .collect();
        let played_yesterday: HashSet<String> = prior_events
            .iter()
            .filter_map(|e| normalize_event(e, sport, dir))
            .flat_map(|g| [g.home.name, g.away.name])
            .collect();
        let injuries = injuries_by_team(&injuries, dir);

        // pregame model inputs only matter before tip-off
        let scheduled: Vec<&GameSnapshot> =
            games.iter().filter(|g| g.state == GameState::Scheduled).collect();
        let summaries = join_all(scheduled.iter().map(|g| self.feed.summary(sport, &g.game_id))).await;
        let mut insights: HashMap<String, SummaryInsights> = scheduled
            .iter()
            .zip(summaries)
            .filter_map(|(g, raw)| raw.map(|raw| (g.game_id.clone(), extract(&raw, g))))
            .collect();

        let now = Utc::now();
        let mut rows: Vec<GameRow> = Vec::with_capacity(games.len());
        let mut fired: Vec<AlertRecord> = Vec::new();

        for game in games {
            let summary = insights.get(&game.game_id);
            let no_injuries = Vec::new();
            let injuries_for = |name: &str| injuries.get(name).unwrap_or(&no_injuries).clone();
            let home = build_profile(
                summary.map(|s| &s.home),
                &injuries_for(&game.home.name),
                played_yesterday.contains(&game.home.name),
            );
            let away = build_profile(
                summary.map(|s| &s.away),
                &injuries_for(&game.away.name),
                played_yesterday.contains(&game.away.name),
            );

            let inputs = GameInputs {
                winner_quotes: winner_matches(&winner_markets, &game),
                spread_quotes: spread_matches(&spread_markets, &game),
                predictor_home_prob: summary.and_then(|s| s.predictor_home_prob),
                config: sport,
                thresholds: &self.cfg.alerts,
                home,
                away,
                game,
            };
            let assessment = assess_game(inputs, &mut self.session, now);
            debug!(
                game_id = %assessment.row.snapshot.game_id,
                state = %assessment.row.snapshot.state,
                favorite = %assessment.row.favorite,
                edge = assessment.row.edge.as_ref().map(|e| e.score),
                "[POLL] {} assessed",
                assessment.row.snapshot.matchup(),
            );
            fired.extend(assessment.alerts);
            rows.push(assessment.row);
        }

        // live win probability is only fetched for games that just alerted
        let live_ids: Vec<String> = fired
            .iter()
            .filter(|a| !matches!(a, AlertRecord::Mispricing(_)))
            .map(|a| a.game_id().to_string())
            .filter(|id| !insights.contains_key(id))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let live = join_all(live_ids.iter().map(|id| self.feed.summary(sport, id))).await;
        for (id, raw) in live_ids.into_iter().zip(live) {
            if let (Some(raw), Some(row)) = (raw, rows.iter().find(|r| r.snapshot.game_id == id)) {
                insights.insert(id, extract(&raw, &row.snapshot));
            }
        }

        for alert in &mut fired {
            let id = alert.game_id().to_string();
            let quotes: &[MarketQuote] = rows
                .iter()
                .find(|r| r.snapshot.game_id == id)
                .map(|r| r.winner_quotes.as_slice())
                .unwrap_or(&[]);
            if let Some(i) = insights.get(&id) {
                enrich_alert(alert, i, quotes);
            }
        }

        let (game_count, alert_count) = (rows.len(), fired.len());
        self.store.publish_games(sport.sport, rows);
        for alert in fired {
            log_alert(&alert);
            self.store.push_alert(alert);
        }
        (game_count, alert_count)
    }
}

/// The scoreboard's "today" lags UTC so late US tip-offs stay on the right date.
fn scoreboard_date() -> NaiveDate {
    (Utc::now() - chrono::Duration::hours(SCOREBOARD_DAY_ROLLOVER_HOURS)).date_naive()
}

fn log_alert(alert: &AlertRecord) {
    match alert {
        AlertRecord::Sniper(a) => info!(
            event = "SNIPER",
            game_id = %a.game_id,
            sport = %a.sport,
            lead = a.lead,
            threshold = a.threshold,
            period = a.period,
            brackets = a.brackets.len(),
            win_prob_edge = a.win_prob_edge,
            "[SNIPER] {} | {} up {} on {} in P{} ({}) | {} actionable brackets",
            a.matchup, a.underdog, a.lead, a.favorite, a.period, a.clock, a.brackets.len(),
        ),
        AlertRecord::Comeback(a) => info!(
            event = "COMEBACK",
            game_id = %a.game_id,
            sport = %a.sport,
            max_deficit = a.max_deficit,
            margin = a.margin,
            period = a.period,
            win_prob_edge = a.win_prob_edge,
            "[COMEBACK] {} | {} back to {:+} from -{} in P{} ({})",
            a.matchup, a.favorite, a.margin, a.max_deficit, a.period, a.clock,
        ),
        AlertRecord::Mispricing(a) => info!(
            event = "MISPRICING",
            game_id = %a.game_id,
            sport = %a.sport,
            ticker = %a.ticker,
            gap = a.gap,
            corroborated = a.corroborated,
            "[MISPRICING] {} | {} book {:.1}% vs market {:.1}% (gap {:.1} pts){}",
            a.matchup,
            a.team,
            a.moneyline_prob * 100.0,
            a.market_prob * 100.0,
            a.gap * 100.0,
            if a.corroborated { " | model agrees" } else { "" },
        ),
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
