//! Raw upstream shapes. Every field the scorer does not strictly need is
//! optional so a partial payload still deserializes.

use serde::Deserialize;
use serde_json::Value;

/// Numbers arrive as JSON numbers or strings depending on the endpoint.
pub fn value_as_f64(v: &Value) -> Option<f64> {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().trim_end_matches('%').parse().ok()))
}

// ---------------------------------------------------------------------------
// Scoreboard feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawScoreboard {
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    pub id: String,
    /// ISO start time, e.g. `2025-10-21T23:30Z`.
    pub date: Option<String>,
    #[serde(default)]
    pub competitions: Vec<RawCompetition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCompetition {
    #[serde(default)]
    pub competitors: Vec<RawCompetitor>,
    pub status: Option<RawStatus>,
    #[serde(default)]
    pub odds: Vec<RawOdds>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCompetitor {
    #[serde(rename = "homeAway")]
    pub home_away: String,
    pub score: Option<Value>,
    pub team: RawTeam,
    #[serde(default)]
    pub records: Vec<RawRecord>,
    #[serde(rename = "curatedRank")]
    pub curated_rank: Option<RawRank>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawTeam {
    pub abbreviation: Option<String>,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(rename = "shortDisplayName")]
    pub short_display_name: Option<String>,
    /// Nickname, e.g. "Celtics".
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "type")]
    pub record_type: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawRank {
    pub current: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStatus {
    pub period: Option<u32>,
    #[serde(rename = "displayClock")]
    pub display_clock: Option<String>,
    #[serde(rename = "type")]
    pub status_type: Option<RawStatusType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStatusType {
    /// "pre" | "in" | "post"
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOdds {
    pub details: Option<String>,
    #[serde(rename = "overUnder")]
    pub over_under: Option<f64>,
    pub spread: Option<f64>,
    #[serde(rename = "homeTeamOdds")]
    pub home_team_odds: Option<RawTeamOdds>,
    #[serde(rename = "awayTeamOdds")]
    pub away_team_odds: Option<RawTeamOdds>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeamOdds {
    #[serde(rename = "moneyLine")]
    pub money_line: Option<f64>,
}

// ---------------------------------------------------------------------------
// Game summary feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSummary {
    pub predictor: Option<RawPredictor>,
    #[serde(default)]
    pub winprobability: Vec<RawWinProbability>,
    #[serde(default)]
    pub leaders: Vec<RawTeamLeaders>,
    pub boxscore: Option<RawBoxscore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPredictor {
    #[serde(rename = "homeTeam")]
    pub home_team: Option<RawPredictorTeam>,
    #[serde(rename = "awayTeam")]
    pub away_team: Option<RawPredictorTeam>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPredictorTeam {
    /// Win chance in percent, usually a string like "61.3".
    #[serde(rename = "gameProjection")]
    pub game_projection: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawWinProbability {
    #[serde(rename = "homeWinPercentage")]
    pub home_win_percentage: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeamLeaders {
    pub team: Option<RawTeam>,
    #[serde(default)]
    pub leaders: Vec<RawLeaderCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLeaderCategory {
    pub name: Option<String>,
    #[serde(default)]
    pub leaders: Vec<RawLeader>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLeader {
    pub athlete: Option<RawAthlete>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAthlete {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBoxscore {
    #[serde(default)]
    pub teams: Vec<RawBoxscoreTeam>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBoxscoreTeam {
    pub team: Option<RawTeam>,
    #[serde(rename = "homeAway")]
    pub home_away: Option<String>,
    #[serde(default)]
    pub statistics: Vec<RawStat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStat {
    pub name: Option<String>,
    #[serde(rename = "displayValue")]
    pub display_value: Option<String>,
}

// ---------------------------------------------------------------------------
// Injuries feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawInjuries {
    #[serde(default)]
    pub injuries: Vec<RawTeamInjuries>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeamInjuries {
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub injuries: Vec<RawInjury>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInjury {
    pub status: Option<String>,
    pub athlete: Option<RawAthlete>,
}

// ---------------------------------------------------------------------------
// Prediction-market feed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawMarketsPage {
    #[serde(default)]
    pub markets: Vec<RawMarket>,
    pub cursor: Option<String>,
}

/// Open instrument. Prices are integer cents.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawMarket {
    pub ticker: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub yes_sub_title: String,
    pub last_price: Option<i64>,
    pub yes_bid: Option<i64>,
    pub yes_ask: Option<i64>,
    pub no_bid: Option<i64>,
    pub no_ask: Option<i64>,
    pub volume: Option<i64>,
}
