use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Nba,
    Wnba,
    Ncaam,
    Ncaaw,
}

impl Sport {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "nba" => Some(Sport::Nba),
            "wnba" => Some(Sport::Wnba),
            "ncaam" | "ncaamb" | "cbb" => Some(Sport::Ncaam),
            "ncaaw" | "ncaawb" | "wcbb" => Some(Sport::Ncaaw),
            _ => None,
        }
    }
}

impl std::fmt::Display for Sport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Sport::Nba => "nba",
            Sport::Wnba => "wnba",
            Sport::Ncaam => "ncaam",
            Sport::Ncaaw => "ncaaw",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Game snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Scheduled,
    Live,
    Final,
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            GameState::Scheduled => "scheduled",
            GameState::Live => "live",
            GameState::Final => "final",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
    Unknown,
}

impl TeamSide {
    pub fn opponent(self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
            TeamSide::Unknown => TeamSide::Unknown,
        }
    }
}

impl std::fmt::Display for TeamSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
            TeamSide::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// One side of a game as reported by the scoreboard feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    /// Canonical short form from the alias table, or the raw feed name when unknown.
    pub name: String,
    /// Abbreviation as the scoreboard feed spells it (used to join summary data).
    pub abbrev: String,
    /// Prediction-market ticker code. None for teams missing from the alias table.
    pub market_code: Option<String>,
    pub score: i32,
    /// "W-L" summary.
    pub record: Option<String>,
    pub rank: Option<u32>,
    pub moneyline: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub game_id: String,
    pub sport: Sport,
    pub home: TeamEntry,
    pub away: TeamEntry,
    pub period: u32,
    pub clock: String,
    pub state: GameState,
    /// Home-perspective point spread (negative = home favored).
    pub spread: Option<f64>,
    pub over_under: Option<f64>,
    pub start_time: Option<DateTime<Utc>>,
    pub minutes_elapsed: f64,
}

impl GameSnapshot {
    pub fn team(&self, side: TeamSide) -> Option<&TeamEntry> {
        match side {
            TeamSide::Home => Some(&self.home),
            TeamSide::Away => Some(&self.away),
            TeamSide::Unknown => None,
        }
    }

    /// Score margin from `side`'s perspective (positive = leading).
    pub fn margin(&self, side: TeamSide) -> i32 {
        match side {
            TeamSide::Home => self.home.score - self.away.score,
            TeamSide::Away => self.away.score - self.home.score,
            TeamSide::Unknown => 0,
        }
    }

    pub fn total_points(&self) -> i32 {
        self.home.score + self.away.score
    }

    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away.name, self.home.name)
    }
}

// ---------------------------------------------------------------------------
// Market quotes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub ticker: String,
    pub title: String,
    pub subtitle: String,
    /// Cents, 0-100.
    pub yes_price: u32,
    /// Cents, 0-100. Zero when the book has no "no" side.
    pub no_price: u32,
    pub side: TeamSide,
    /// Spread bracket parsed from the title; None for winner markets.
    pub line: Option<f64>,
    pub volume: u64,
}

impl MarketQuote {
    /// Market-implied probability for the "yes" outcome.
    pub fn implied_probability(&self) -> f64 {
        self.yes_price as f64 / 100.0
    }

    /// Cost of buying "no": the quoted no price, else the complement of yes.
    pub fn effective_no_price(&self) -> u32 {
        if self.no_price > 0 {
            self.no_price
        } else {
            100u32.saturating_sub(self.yes_price)
        }
    }
}

// ---------------------------------------------------------------------------
// Edge results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strength {
    #[serde(rename = "STRONG")]
    Strong,
    #[serde(rename = "MODERATE")]
    Moderate,
    #[serde(rename = "LEAN")]
    Lean,
    #[serde(rename = "TOSS-UP")]
    TossUp,
}

impl Strength {
    pub fn from_score(score: f64) -> Self {
        use crate::config::edge_thresholds::*;
        let magnitude = score.abs();
        if magnitude >= STRONG {
            Strength::Strong
        } else if magnitude >= MODERATE {
            Strength::Moderate
        } else if magnitude >= LEAN {
            Strength::Lean
        } else {
            Strength::TossUp
        }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Strength::Strong => "STRONG",
            Strength::Moderate => "MODERATE",
            Strength::Lean => "LEAN",
            Strength::TossUp => "TOSS-UP",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeResult {
    /// Signed composite; positive favors home.
    pub score: f64,
    pub strength: Strength,
    /// Human-readable factor explanations, in evaluation order.
    pub factors: Vec<String>,
    pub side: TeamSide,
}

/// Live pace reading for a game in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionReading {
    pub projected_total: f64,
    pub over_under: Option<f64>,
    /// projected_total - over_under.
    pub cushion: Option<f64>,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Sniper,
    Comeback,
    Mispricing,
}

impl AlertKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "sniper" => Some(AlertKind::Sniper),
            "comeback" => Some(AlertKind::Comeback),
            "mispricing" => Some(AlertKind::Mispricing),
            _ => None,
        }
    }
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertKind::Sniper => "sniper",
            AlertKind::Comeback => "comeback",
            AlertKind::Mispricing => "mispricing",
        };
        write!(f, "{s}")
    }
}

/// Underdog is out in front of the pregame favorite by a period-scaled margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SniperAlert {
    pub game_id: String,
    pub sport: Sport,
    pub matchup: String,
    pub favorite: String,
    pub underdog: String,
    pub underdog_side: TeamSide,
    pub lead: i32,
    pub period: u32,
    pub clock: String,
    pub threshold: i32,
    pub min_bracket: f64,
    pub max_no_cents: u32,
    /// Favorite spread brackets worth buying "no" on, cheapest first.
    pub brackets: Vec<MarketQuote>,
    /// Live win probability for the underdog, when the feed has one.
    pub win_probability: Option<f64>,
    /// win_probability minus the underdog's market-implied probability.
    pub win_prob_edge: Option<f64>,
    pub fired_at: DateTime<Utc>,
}

/// Pregame favorite has clawed back from a double-digit hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComebackAlert {
    pub game_id: String,
    pub sport: Sport,
    pub matchup: String,
    pub favorite: String,
    pub favorite_side: TeamSide,
    pub max_deficit: i32,
    pub margin: i32,
    pub period: u32,
    pub clock: String,
    pub win_probability: Option<f64>,
    pub win_prob_edge: Option<f64>,
    pub ticker: Option<String>,
    pub fired_at: DateTime<Utc>,
}

/// Sportsbook moneyline and prediction market disagree before tip-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MispricingAlert {
    pub game_id: String,
    pub sport: Sport,
    pub matchup: String,
    pub team: String,
    pub side: TeamSide,
    pub ticker: String,
    pub moneyline_prob: f64,
    pub market_prob: f64,
    pub model_prob: Option<f64>,
    pub gap: f64,
    pub corroborated: bool,
    pub fired_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertRecord {
    Sniper(SniperAlert),
    Comeback(ComebackAlert),
    Mispricing(MispricingAlert),
}

impl AlertRecord {
    pub fn kind(&self) -> AlertKind {
        match self {
            AlertRecord::Sniper(_) => AlertKind::Sniper,
            AlertRecord::Comeback(_) => AlertKind::Comeback,
            AlertRecord::Mispricing(_) => AlertKind::Mispricing,
        }
    }

    pub fn game_id(&self) -> &str {
        match self {
            AlertRecord::Sniper(a) => &a.game_id,
            AlertRecord::Comeback(a) => &a.game_id,
            AlertRecord::Mispricing(a) => &a.game_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Injuries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjuryStatus {
    Out,
    Doubtful,
    DayToDay,
    Other,
}

impl InjuryStatus {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        if s == "out" || s.starts_with("out ") || s.contains("injured reserve") || s == "suspension" {
            InjuryStatus::Out
        } else if s == "doubtful" {
            InjuryStatus::Doubtful
        } else if s.contains("day-to-day") || s.contains("day to day") || s == "questionable" {
            InjuryStatus::DayToDay
        } else {
            InjuryStatus::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryReport {
    pub player: String,
    pub status: InjuryStatus,
}

// ---------------------------------------------------------------------------
// Paper trading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractSide {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: u64,
    pub ticker: String,
    pub side: ContractSide,
    pub contracts: u32,
    /// Cents, 1-99.
    pub entry_price: u32,
    pub opened_at: DateTime<Utc>,
}

/// Position marked against the latest quote for its ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionView {
    #[serde(flatten)]
    pub position: Position,
    /// Current price of the held side, cents.
    pub mark: Option<u32>,
    pub unrealized_pnl_cents: Option<i64>,
}

impl PositionView {
    pub fn mark(position: Position, quote: Option<&MarketQuote>) -> Self {
        let mark = quote
            .map(|q| match position.side {
                ContractSide::Yes => q.yes_price,
                ContractSide::No => q.effective_no_price(),
            })
            .filter(|&m| m > 0);
        let unrealized_pnl_cents =
            mark.map(|m| (m as i64 - position.entry_price as i64) * position.contracts as i64);
        Self {
            position,
            mark,
            unrealized_pnl_cents,
        }
    }
}

// ---------------------------------------------------------------------------
// Published board
// ---------------------------------------------------------------------------

/// One game as the board shows it after a poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRow {
    pub snapshot: GameSnapshot,
    pub favorite: TeamSide,
    pub edge: Option<EdgeResult>,
    pub projection: Option<ProjectionReading>,
    pub winner_quotes: Vec<MarketQuote>,
    pub spread_quotes: Vec<MarketQuote>,
}

/// Control messages for the poller.
#[derive(Debug)]
pub enum ControlMsg {
    /// Clear alert de-dup and comeback tracking; published alerts are dropped too.
    ResetSession,
}
