use crate::error::{AppError, Result};
use crate::types::Sport;

pub const ESPN_API_URL: &str = "https://site.api.espn.com/apis/site/v2/sports";
pub const KALSHI_API_URL: &str = "https://api.elections.kalshi.com/trade-api/v2";

/// Channel capacity for poller control messages.
pub const CHANNEL_CAPACITY: usize = 64;

/// Poll cycle interval (seconds). Dashboards refresh every 20-30s.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 25;

/// Per-request timeout for every upstream call (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// Alerts kept on the published board; oldest are dropped first.
pub const MAX_ALERTS_RETAINED: usize = 500;

/// Hours subtracted from UTC before picking the scoreboard date.
pub const SCOREBOARD_DAY_ROLLOVER_HOURS: i64 = 6;

/// Kalshi page size for open-market listings.
pub const MARKET_PAGE_LIMIT: usize = 200;

/// Strength label cutoffs on |score|.
pub mod edge_thresholds {
    pub const STRONG: f64 = 8.0;
    pub const MODERATE: f64 = 4.0;
    pub const LEAN: f64 = 1.5;
}

/// Scale constants for the pregame composite model.
/// The strength label is a function of the summed score, so these ratios matter.
pub mod pregame_weights {
    /// (p_home - 0.5) * scale → ±10 at the extremes.
    pub const PREDICTOR_SCALE: f64 = 20.0;
    /// Predictor vs market gap, only counted at or above MIN_DIVERGENCE.
    pub const DIVERGENCE_SCALE: f64 = 30.0;
    pub const MIN_DIVERGENCE: f64 = 0.05;
    pub const WIN_PCT_SCALE: f64 = 10.0;
    pub const RANK_TIER_SCALE: f64 = 1.0;
    pub const FATIGUE_PENALTY: f64 = 2.0;
    pub const SCORING_AVG_SCALE: f64 = 0.15;
    pub const STAR_OUT_PENALTY: f64 = 4.0;
    pub const PLAYER_OUT_PENALTY: f64 = 1.5;
    pub const QUESTIONABLE_PENALTY: f64 = 0.5;
    pub const THREE_PCT_SCALE: f64 = 0.2;
    pub const THREE_VOLUME_SCALE: f64 = 0.05;
    /// Leaders considered "stars" for injury impact.
    pub const STAR_LEADER_COUNT: usize = 3;
}

/// Comeback tracker constants.
pub mod comeback {
    /// Favorite deficit at which per-game tracking starts.
    pub const TRACK_DEFICIT: i32 = 10;
    /// Alert once the favorite is within this many points of even.
    pub const RECOVERY_MARGIN: i32 = 3;
}

// ---------------------------------------------------------------------------
// Per-sport constants
// ---------------------------------------------------------------------------

/// Everything that differs between the basketball leagues we scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SportConfig {
    pub sport: Sport,
    /// ESPN site API path segment, e.g. `basketball/nba`.
    pub espn_path: &'static str,
    /// Kalshi series ticker for game-winner markets.
    pub game_series: &'static str,
    /// Kalshi series ticker for spread-bracket markets.
    pub spread_series: &'static str,
    pub period_minutes: f64,
    pub regulation_periods: u32,
    pub overtime_minutes: f64,
    pub league_avg_total: f64,
    /// Projection clamp (min, max) for combined points.
    pub total_range: (f64, f64),
    /// Minimum underdog lead per period (index 0 = period 1). Overtime uses the last entry.
    pub sniper_thresholds: &'static [i32],
    pub home_court: f64,
    /// Ranking factor only applies when a side is ranked at or inside this tier.
    pub ranking_top_tier: Option<u32>,
}

pub const NBA: SportConfig = SportConfig {
    sport: Sport::Nba,
    espn_path: "basketball/nba",
    game_series: "KXNBAGAME",
    spread_series: "KXNBASPREAD",
    period_minutes: 12.0,
    regulation_periods: 4,
    overtime_minutes: 5.0,
    league_avg_total: 228.0,
    total_range: (170.0, 300.0),
    sniper_thresholds: &[5, 6, 8, 10],
    home_court: 1.5,
    ranking_top_tier: None,
};

pub const WNBA: SportConfig = SportConfig {
    sport: Sport::Wnba,
    espn_path: "basketball/wnba",
    game_series: "KXWNBAGAME",
    spread_series: "KXWNBASPREAD",
    period_minutes: 10.0,
    regulation_periods: 4,
    overtime_minutes: 5.0,
    league_avg_total: 164.0,
    total_range: (120.0, 220.0),
    sniper_thresholds: &[5, 6, 8, 10],
    home_court: 1.5,
    ranking_top_tier: None,
};

pub const NCAAM: SportConfig = SportConfig {
    sport: Sport::Ncaam,
    espn_path: "basketball/mens-college-basketball",
    game_series: "KXNCAAMBGAME",
    spread_series: "KXNCAAMBSPREAD",
    period_minutes: 20.0,
    regulation_periods: 2,
    overtime_minutes: 5.0,
    league_avg_total: 145.0,
    total_range: (100.0, 200.0),
    sniper_thresholds: &[6, 10],
    home_court: 2.5,
    ranking_top_tier: Some(25),
};

pub const NCAAW: SportConfig = SportConfig {
    sport: Sport::Ncaaw,
    espn_path: "basketball/womens-college-basketball",
    game_series: "KXNCAAWBGAME",
    spread_series: "KXNCAAWBSPREAD",
    period_minutes: 10.0,
    regulation_periods: 4,
    overtime_minutes: 5.0,
    league_avg_total: 132.0,
    total_range: (90.0, 190.0),
    sniper_thresholds: &[5, 6, 8, 10],
    home_court: 2.5,
    ranking_top_tier: Some(25),
};

impl SportConfig {
    pub fn for_sport(sport: Sport) -> &'static SportConfig {
        match sport {
            Sport::Nba => &NBA,
            Sport::Wnba => &WNBA,
            Sport::Ncaam => &NCAAM,
            Sport::Ncaaw => &NCAAW,
        }
    }

    pub fn regulation_minutes(&self) -> f64 {
        self.period_minutes * self.regulation_periods as f64
    }

    /// Underdog lead needed for a sniper alert in `period`. None before tip-off.
    pub fn sniper_threshold(&self, period: u32) -> Option<i32> {
        if period == 0 {
            return None;
        }
        let idx = (period as usize).min(self.sniper_thresholds.len()) - 1;
        self.sniper_thresholds.get(idx).copied()
    }
}

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

/// Alert filters that operators tune from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertThresholds {
    /// Sniper brackets priced above this (effective "no", cents) are dropped (SNIPER_MAX_NO_CENTS)
    pub sniper_max_no_cents: u32,
    /// Sniper brackets narrower than this line are dropped (SNIPER_MIN_BRACKET)
    pub sniper_min_bracket: f64,
    /// Moneyline vs market gap that counts as a mispricing (MISPRICING_MIN_GAP)
    pub mispricing_min_gap: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            sniper_max_no_cents: 85,
            sniper_min_bracket: 3.0,
            mispricing_min_gap: 0.05,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub espn_api_url: String,
    pub kalshi_api_url: String,
    pub log_level: String,
    pub api_port: u16,
    pub poll_interval_secs: u64,
    pub http_timeout_secs: u64,
    /// Leagues to poll (SPORTS, comma-separated: nba,wnba,ncaam,ncaaw)
    pub sports: Vec<Sport>,
    pub alerts: AlertThresholds,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = AlertThresholds::default();
        Ok(Self {
            espn_api_url: std::env::var("ESPN_API_URL")
                .unwrap_or_else(|_| ESPN_API_URL.to_string()),
            kalshi_api_url: std::env::var("KALSHI_API_URL")
                .unwrap_or_else(|_| KALSHI_API_URL.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            poll_interval_secs: std::env::var("POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|&s| s > 0)
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(HTTP_TIMEOUT_SECS),
            sports: parse_sports(
                &std::env::var("SPORTS").unwrap_or_else(|_| "nba,wnba,ncaam,ncaaw".to_string()),
            )?,
            alerts: AlertThresholds {
                sniper_max_no_cents: std::env::var("SNIPER_MAX_NO_CENTS")
                    .ok()
                    .and_then(|s| s.parse::<u32>().ok())
                    .unwrap_or(defaults.sniper_max_no_cents),
                sniper_min_bracket: std::env::var("SNIPER_MIN_BRACKET")
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok())
                    .unwrap_or(defaults.sniper_min_bracket),
                mispricing_min_gap: std::env::var("MISPRICING_MIN_GAP")
                    .ok()
                    .and_then(|s| s.parse::<f64>().ok())
                    .unwrap_or(defaults.mispricing_min_gap),
            },
        })
    }
}

/// Parse a comma-separated sport list. Unknown entries are a config error.
pub fn parse_sports(raw: &str) -> Result<Vec<Sport>> {
    let mut sports = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let sport = Sport::parse(part)
            .ok_or_else(|| AppError::Config(format!("unknown sport in SPORTS: {part}")))?;
        if !sports.contains(&sport) {
            sports.push(sport);
        }
    }
    if sports.is_empty() {
        return Err(AppError::Config("SPORTS must name at least one league".to_string()));
    }
    Ok(sports)
}
