use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::health::HealthState;
use crate::config::{Config, SportConfig, MARKET_PAGE_LIMIT};
use crate::error::{AppError, Result};
use crate::feed::messages::{
    RawEvent, RawInjuries, RawMarket, RawMarketsPage, RawScoreboard, RawSummary,
};

/// Upper bound on cursor pages pulled per series per cycle.
const MAX_MARKET_PAGES: usize = 5;

/// HTTP boundary for both upstreams. Every public method fails soft: errors
/// are logged, counted in health, and turned into an empty result so one dead
/// upstream never stalls the rest of the cycle.
pub struct FeedClient {
    http: reqwest::Client,
    espn_base: String,
    kalshi_base: String,
    health: Arc<HealthState>,
}

impl FeedClient {
    pub fn new(cfg: &Config, health: Arc<HealthState>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            espn_base: cfg.espn_api_url.trim_end_matches('/').to_string(),
            kalshi_base: cfg.kalshi_api_url.trim_end_matches('/').to_string(),
            health,
        })
    }

    /// Scoreboard events for one calendar date.
    pub async fn scoreboard(&self, sport: &SportConfig, date: NaiveDate) -> Vec<RawEvent> {
        let url = format!("{}/{}/scoreboard", self.espn_base, sport.espn_path);
        let mut query = vec![("dates", date.format("%Y%m%d").to_string())];
        if sport.ranking_top_tier.is_some() {
            // college scoreboards default to ranked games only
            query.push(("groups", "50".to_string()));
            query.push(("limit", "400".to_string()));
        }
        match self.get_json::<RawScoreboard>(&url, &query).await {
            Ok(sb) => {
                debug!(sport = %sport.sport, events = sb.events.len(), "scoreboard fetched");
                sb.events
            }
            Err(e) => {
                self.record_failure("scoreboard", &e);
                Vec::new()
            }
        }
    }

    /// Predictor, live win probability, leaders and team stats for one game.
    pub async fn summary(&self, sport: &SportConfig, event_id: &str) -> Option<RawSummary> {
        let url = format!("{}/{}/summary", self.espn_base, sport.espn_path);
        match self
            .get_json::<RawSummary>(&url, &[("event", event_id.to_string())])
            .await
        {
            Ok(s) => Some(s),
            Err(e) => {
                self.record_failure("summary", &e);
                None
            }
        }
    }

    pub async fn injuries(&self, sport: &SportConfig) -> RawInjuries {
        let url = format!("{}/{}/injuries", self.espn_base, sport.espn_path);
        match self.get_json::<RawInjuries>(&url, &[]).await {
            Ok(i) => i,
            Err(e) => {
                self.record_failure("injuries", &e);
                RawInjuries::default()
            }
        }
    }

    /// All open instruments in a series, following the cursor.
    pub async fn open_markets(&self, series: &str) -> Vec<RawMarket> {
        let url = format!("{}/markets", self.kalshi_base);
        let mut markets = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_MARKET_PAGES {
            let mut query = vec![
                ("series_ticker", series.to_string()),
                ("status", "open".to_string()),
                ("limit", MARKET_PAGE_LIMIT.to_string()),
            ];
            if let Some(c) = &cursor {
                query.push(("cursor", c.clone()));
            }

            let page = match self.get_json::<RawMarketsPage>(&url, &query).await {
                Ok(p) => p,
                Err(e) => {
                    self.record_failure("markets", &e);
                    break;
                }
            };

            let page_len = page.markets.len();
            markets.extend(page.markets);
            match page.cursor {
                Some(c) if !c.is_empty() && page_len >= MARKET_PAGE_LIMIT => cursor = Some(c),
                _ => break,
            }
        }

        debug!(series, markets = markets.len(), "open markets fetched");
        markets
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let resp = self.http.get(url).query(query).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn record_failure(&self, feed: &str, e: &AppError) {
        self.health.inc_upstream_failures();
        warn!(feed, "[FETCH] {feed} unavailable, degrading to empty: {e}");
    }
}
