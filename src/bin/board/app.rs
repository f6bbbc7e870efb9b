use serde::Deserialize;

// ---------------------------------------------------------------------------
// API response types (mirror the server's JSON shapes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct TeamView {
    pub name: String,
    pub score: i32,
    pub rank: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotView {
    pub game_id: String,
    pub sport: String,
    pub home: TeamView,
    pub away: TeamView,
    pub period: u32,
    pub clock: String,
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeView {
    pub score: f64,
    pub strength: String,
    pub side: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionView {
    pub projected_total: f64,
    pub cushion: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameRowView {
    pub snapshot: SnapshotView,
    pub favorite: String,
    pub edge: Option<EdgeView>,
    pub projection: Option<ProjectionView>,
}

/// Alerts arrive tagged by `kind`; the board only needs a few common fields
/// plus whatever detail the kind carries.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertView {
    pub kind: String,
    pub matchup: String,
    pub fired_at: String,
    // sniper
    pub underdog: Option<String>,
    pub lead: Option<i32>,
    pub brackets: Option<Vec<serde_json::Value>>,
    // comeback
    pub favorite: Option<String>,
    pub max_deficit: Option<i32>,
    pub margin: Option<i32>,
    // mispricing
    pub team: Option<String>,
    pub gap: Option<f64>,
    pub corroborated: Option<bool>,
    // live alerts
    pub win_prob_edge: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct HealthView {
    pub status: String,
    pub cycles_completed: u64,
    pub upstream_failures: u64,
    pub games_tracked: u64,
    pub alerts_published: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LatencyView {
    pub p50_ms: Option<u64>,
    pub p99_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Error(String),
    Connecting,
}

/// Sport filter cycled with `s`. None = all leagues.
pub const SPORT_FILTERS: [Option<&str>; 5] =
    [None, Some("nba"), Some("wnba"), Some("ncaam"), Some("ncaaw")];

#[derive(Debug, Clone)]
pub struct AppState {
    pub status: ConnectionStatus,
    pub games: Vec<GameRowView>,
    pub alerts: Vec<AlertView>,
    pub health: HealthView,
    pub latency: LatencyView,
    pub sport_filter: usize,
    pub base_url: String,
}

impl AppState {
    pub fn new(base_url: String) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            games: Vec::new(),
            alerts: Vec::new(),
            health: HealthView::default(),
            latency: LatencyView::default(),
            sport_filter: 0,
            base_url,
        }
    }

    pub fn sport(&self) -> Option<&'static str> {
        SPORT_FILTERS[self.sport_filter % SPORT_FILTERS.len()]
    }

    pub fn next_sport(&mut self) {
        self.sport_filter = (self.sport_filter + 1) % SPORT_FILTERS.len();
    }

    pub async fn refresh(&mut self, client: &reqwest::Client) {
        let games_url = match self.sport() {
            Some(s) => format!("{}/games?sport={s}", self.base_url),
            None => format!("{}/games", self.base_url),
        };
        let alerts_url = format!("{}/alerts?limit=100", self.base_url);
        let health_url = format!("{}/health", self.base_url);
        let latency_url = format!("{}/stats/latency", self.base_url);

        let (games_res, alerts_res, health_res, latency_res) = tokio::join!(
            client.get(&games_url).send(),
            client.get(&alerts_url).send(),
            client.get(&health_url).send(),
            client.get(&latency_url).send(),
        );

        let (games_resp, alerts_resp) = match (games_res, alerts_res) {
            (Ok(g), Ok(a)) => (g, a),
            (Err(e), _) | (_, Err(e)) => {
                self.status = ConnectionStatus::Error(format!("{e}"));
                return;
            }
        };

        let (games, alerts) = tokio::join!(
            games_resp.json::<Vec<GameRowView>>(),
            alerts_resp.json::<Vec<AlertView>>(),
        );

        match (games, alerts) {
            (Ok(g), Ok(a)) => {
                self.games = g;
                self.alerts = a;
                self.status = ConnectionStatus::Connected;

                if let Ok(h) = health_res {
                    if let Ok(health) = h.json::<HealthView>().await {
                        self.health = health;
                    }
                }
                if let Ok(l) = latency_res {
                    if let Ok(latency) = l.json::<LatencyView>().await {
                        self.latency = latency;
                    }
                }
            }
            (Err(e), _) | (_, Err(e)) => {
                self.status = ConnectionStatus::Error(format!("parse error: {e}"));
            }
        }
    }

    /// Ask the server to clear alert de-dup and comeback tracking.
    pub async fn reset_session(&mut self, client: &reqwest::Client) {
        let url = format!("{}/session/reset", self.base_url);
        match client.post(&url).send().await {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => {
                self.status = ConnectionStatus::Error(format!("reset failed: {}", resp.status()));
            }
            Err(e) => self.status = ConnectionStatus::Error(format!("{e}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn format_team(t: &TeamView) -> String {
    match t.rank {
        Some(r) => format!("#{r} {}", t.name),
        None => t.name.clone(),
    }
}

pub fn format_status(s: &SnapshotView) -> String {
    match s.state.as_str() {
        "live" => format!("P{} {}", s.period, s.clock),
        "final" => "FINAL".to_string(),
        _ => "pre".to_string(),
    }
}

/// Edge for pregame rows, pace projection for live rows.
pub fn format_signal(row: &GameRowView) -> String {
    if let Some(e) = &row.edge {
        return format!("{} {:+.1} {}", e.strength, e.score, e.side);
    }
    if let Some(p) = &row.projection {
        return match p.cushion {
            Some(c) => format!("proj {:.0} ({c:+.1})", p.projected_total),
            None => format!("proj {:.0}", p.projected_total),
        };
    }
    "—".to_string()
}

pub fn format_alert_detail(a: &AlertView) -> String {
    let wp = a
        .win_prob_edge
        .map(|e| format!(" | wp edge {:+.1}", e * 100.0))
        .unwrap_or_default();
    match a.kind.as_str() {
        "sniper" => format!(
            "{} +{} | {} brackets{wp}",
            a.underdog.as_deref().unwrap_or("?"),
            a.lead.unwrap_or(0),
            a.brackets.as_ref().map_or(0, Vec::len),
        ),
        "comeback" => format!(
            "{} {:+} from -{}{wp}",
            a.favorite.as_deref().unwrap_or("?"),
            a.margin.unwrap_or(0),
            a.max_deficit.unwrap_or(0),
        ),
        "mispricing" => format!(
            "{} gap {:.1}{}",
            a.team.as_deref().unwrap_or("?"),
            a.gap.unwrap_or(0.0) * 100.0,
            if a.corroborated == Some(true) { " ✓" } else { "" },
        ),
        other => other.to_string(),
    }
}

/// `2025-10-21T23:31:05.123Z` → `23:31:05`.
pub fn format_time(ts: &str) -> String {
    ts.split('T')
        .nth(1)
        .map(|t| t.chars().take(8).collect())
        .unwrap_or_else(|| "—".to_string())
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_server_alert_shape() {
        let json = r#"[{"kind": "comeback", "game_id": "1", "sport": "nba", "matchup": "Lakers @ Celtics",
            "favorite": "Celtics", "favorite_side": "home", "max_deficit": 15, "margin": -3,
            "period": 3, "clock": "4:00", "win_probability": 0.41, "win_prob_edge": 0.06,
            "ticker": null, "fired_at": "2025-10-21T23:31:05.123Z"}]"#;
        let alerts: Vec<AlertView> = serde_json::from_str(json).unwrap();
        assert_eq!(format_alert_detail(&alerts[0]), "Celtics -3 from -15 | wp edge +6.0");
        assert_eq!(format_time(&alerts[0].fired_at), "23:31:05");
    }

    #[test]
    fn signal_prefers_edge_then_projection() {
        let json = r#"{"snapshot": {"game_id": "1", "sport": "nba",
            "home": {"name": "Celtics", "score": 50, "rank": null},
            "away": {"name": "Lakers", "score": 48, "rank": 4},
            "period": 2, "clock": "3:10", "state": "live"},
            "favorite": "home", "edge": null,
            "projection": {"projected_total": 221.4, "over_under": 224.5, "cushion": -3.1}}"#;
        let row: GameRowView = serde_json::from_str(json).unwrap();
        assert_eq!(format_signal(&row), "proj 221 (-3.1)");
        assert_eq!(format_status(&row.snapshot), "P2 3:10");
        assert_eq!(format_team(&row.snapshot.away), "#4 Lakers");
    }

    #[test]
    fn sport_filter_cycles() {
        let mut app = AppState::new("http://x".into());
        assert_eq!(app.sport(), None);
        app.next_sport();
        assert_eq!(app.sport(), Some("nba"));
        for _ in 0..4 {
            app.next_sport();
        }
        assert_eq!(app.sport(), None);
    }

    #[test]
    fn truncate_is_char_safe() {
        assert_eq!(truncate("Trail Blazers", 6), "Trail…");
        assert_eq!(truncate("Heat", 6), "Heat");
    }
}
