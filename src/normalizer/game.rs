use chrono::{DateTime, NaiveDateTime, Utc};

use crate::config::SportConfig;
use crate::feed::messages::{value_as_f64, RawCompetitor, RawEvent, RawTeamOdds};
use crate::normalizer::teams::TeamDirectory;
use crate::types::{GameSnapshot, GameState, TeamEntry};

/// Remaining time on a period clock, in minutes.
/// Accepts "MM:SS" (seconds may carry a decimal) or a bare "M".
pub fn parse_clock_minutes(clock: &str) -> Option<f64> {
    let clock = clock.trim();
    if clock.is_empty() {
        return None;
    }
    let minutes = match clock.split_once(':') {
        Some((m, s)) => {
            let mins: f64 = m.trim().parse().ok()?;
            let secs: f64 = s.trim().parse().ok()?;
            if !(0.0..60.0).contains(&secs) {
                return None;
            }
            mins + secs / 60.0
        }
        None => clock.parse().ok()?,
    };
    if minutes.is_finite() && minutes >= 0.0 {
        Some(minutes)
    } else {
        None
    }
}

/// Game minutes played so far.
///
/// Completed regulation periods count at full length, completed overtimes at
/// overtime length, and the current period contributes `length - remaining`.
/// An unreadable clock contributes nothing for the current period.
pub fn minutes_elapsed(state: GameState, period: u32, clock: &str, cfg: &SportConfig) -> f64 {
    let reg = cfg.regulation_periods;
    match state {
        GameState::Scheduled => 0.0,
        GameState::Final => {
            let overtimes = period.saturating_sub(reg) as f64;
            cfg.regulation_minutes() + overtimes * cfg.overtime_minutes
        }
        GameState::Live => {
            if period == 0 {
                return 0.0;
            }
            let (completed, length) = if period <= reg {
                ((period - 1) as f64 * cfg.period_minutes, cfg.period_minutes)
            } else {
                let overtimes_done = (period - reg - 1) as f64;
                (
                    cfg.regulation_minutes() + overtimes_done * cfg.overtime_minutes,
                    cfg.overtime_minutes,
                )
            };
            let partial = parse_clock_minutes(clock)
                .map(|remaining| length - remaining.min(length))
                .unwrap_or(0.0);
            completed + partial
        }
    }
}

fn parse_state(raw: Option<&str>) -> GameState {
    match raw {
        Some("in") => GameState::Live,
        Some("post") => GameState::Final,
        _ => GameState::Scheduled,
    }
}

/// ESPN start times come as `2025-10-21T23:30Z` (no seconds) or full RFC 3339.
pub fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|naive| naive.and_utc())
}

fn team_entry(c: &RawCompetitor, dir: &TeamDirectory, moneyline: Option<i32>) -> TeamEntry {
    let candidates = [
        c.team.display_name.as_deref().unwrap_or(""),
        c.team.short_display_name.as_deref().unwrap_or(""),
        c.team.name.as_deref().unwrap_or(""),
        c.team.abbreviation.as_deref().unwrap_or(""),
    ];
    let (name, alias) = dir.resolve_any(candidates);

    let score = c
        .score
        .as_ref()
        .and_then(value_as_f64)
        .map(|s| s.round() as i32)
        .unwrap_or(0);

    let record = c
        .records
        .iter()
        .find(|r| r.record_type.as_deref() == Some("total"))
        .or_else(|| c.records.first())
        .and_then(|r| r.summary.clone());

    // 99 is the feed's "unranked" sentinel
    let rank = c
        .curated_rank
        .as_ref()
        .and_then(|r| r.current)
        .filter(|&r| (1..99).contains(&r));

    TeamEntry {
        name,
        abbrev: c.team.abbreviation.clone().unwrap_or_default(),
        market_code: alias.map(|a| a.code.to_string()),
        score,
        record,
        rank,
        moneyline,
    }
}

/// Raw scoreboard event → canonical snapshot.
/// Returns None only when the event has no usable home/away pair.
pub fn normalize_event(
    event: &RawEvent,
    cfg: &SportConfig,
    dir: &TeamDirectory,
) -> Option<GameSnapshot> {
    let comp = event.competitions.first()?;
    let home = comp.competitors.iter().find(|c| c.home_away == "home")?;
    let away = comp.competitors.iter().find(|c| c.home_away == "away")?;

    let status = comp.status.as_ref();
    let state = parse_state(
        status
            .and_then(|s| s.status_type.as_ref())
            .and_then(|t| t.state.as_deref()),
    );
    let period = status.and_then(|s| s.period).unwrap_or(0);
    let clock = status
        .and_then(|s| s.display_clock.clone())
        .unwrap_or_default();

    let odds = comp.odds.first();
    let moneyline = |side: Option<&RawTeamOdds>| {
        side.and_then(|o| o.money_line)
            .filter(|ml| ml.is_finite() && *ml != 0.0)
            .map(|ml| ml.round() as i32)
    };
    let home_ml = moneyline(odds.and_then(|o| o.home_team_odds.as_ref()));
    let away_ml = moneyline(odds.and_then(|o| o.away_team_odds.as_ref()));

    Some(GameSnapshot {
        game_id: event.id.clone(),
        sport: cfg.sport,
        home: team_entry(home, dir, home_ml),
        away: team_entry(away, dir, away_ml),
        period,
        minutes_elapsed: minutes_elapsed(state, period, &clock, cfg),
        clock,
        state,
        spread: odds.and_then(|o| o.spread),
        over_under: odds.and_then(|o| o.over_under),
        start_time: event.date.as_deref().and_then(parse_start_time),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NBA, NCAAM};
    use crate::feed::messages::RawScoreboard;
    use crate::types::Sport;

    #[test]
    fn clock_formats() {
        assert!((parse_clock_minutes("5:42").unwrap() - 5.7).abs() < 1e-9);
        assert!((parse_clock_minutes("0:30.5").unwrap() - (30.5 / 60.0)).abs() < 1e-9);
        assert_eq!(parse_clock_minutes("12"), Some(12.0));
        assert_eq!(parse_clock_minutes("12:00"), Some(12.0));
        assert_eq!(parse_clock_minutes(""), None);
        assert_eq!(parse_clock_minutes("halftime"), None);
        assert_eq!(parse_clock_minutes("5:75"), None);
        assert_eq!(parse_clock_minutes("-3"), None);
    }

    #[test]
    fn elapsed_in_regulation() {
        // Q3 with 5:42 left: two full quarters + 6.3 minutes
        let m = minutes_elapsed(GameState::Live, 3, "5:42", &NBA);
        assert!((m - 30.3).abs() < 1e-9);
        assert_eq!(minutes_elapsed(GameState::Live, 1, "12:00", &NBA), 0.0);
        assert_eq!(minutes_elapsed(GameState::Live, 4, "0:00", &NBA), 48.0);
    }

    #[test]
    fn elapsed_in_overtime_uses_shorter_periods() {
        // second OT with 2:00 left: 48 + 5 + 3
        let m = minutes_elapsed(GameState::Live, 6, "2:00", &NBA);
        assert!((m - 56.0).abs() < 1e-9);
        // college halves
        let m = minutes_elapsed(GameState::Live, 3, "1:00", &NCAAM);
        assert!((m - 44.0).abs() < 1e-9);
    }

    #[test]
    fn elapsed_final_and_scheduled() {
        assert_eq!(minutes_elapsed(GameState::Final, 4, "0:00", &NBA), 48.0);
        assert_eq!(minutes_elapsed(GameState::Final, 5, "0:00", &NBA), 53.0);
        assert_eq!(minutes_elapsed(GameState::Scheduled, 0, "", &NBA), 0.0);
    }

    #[test]
    fn malformed_clock_contributes_zero_for_current_period() {
        assert_eq!(minutes_elapsed(GameState::Live, 2, "End of 2nd", &NBA), 12.0);
        // clock larger than the period is clamped, not negative
        assert_eq!(minutes_elapsed(GameState::Live, 5, "12:00", &NBA), 48.0);
    }

    #[test]
    fn start_time_formats() {
        let a = parse_start_time("2025-10-21T23:30Z").unwrap();
        let b = parse_start_time("2025-10-21T23:30:00Z").unwrap();
        assert_eq!(a, b);
        assert!(parse_start_time("tonight").is_none());
    }

    fn scoreboard_json() -> &'static str {
        r#"{
            "events": [{
                "id": "401584701",
                "date": "2025-10-21T23:30Z",
                "competitions": [{
                    "competitors": [
                        {
                            "homeAway": "home",
                            "score": "89",
                            "team": {"abbreviation": "BOS", "displayName": "Boston Celtics", "name": "Celtics"},
                            "records": [{"type": "total", "summary": "45-20"}, {"type": "home", "summary": "25-7"}]
                        },
                        {
                            "homeAway": "away",
                            "score": "82",
                            "team": {"abbreviation": "SEA", "displayName": "Seattle SuperSonics"},
                            "records": [{"summary": "30-35"}],
                            "curatedRank": {"current": 99}
                        }
                    ],
                    "status": {"period": 3, "displayClock": "5:42", "type": {"state": "in"}},
                    "odds": [{
                        "details": "BOS -5.5",
                        "spread": -5.5,
                        "overUnder": 221.5,
                        "homeTeamOdds": {"moneyLine": -220},
                        "awayTeamOdds": {"moneyLine": 180}
                    }]
                }]
            }]
        }"#
    }

    #[test]
    fn normalizes_scoreboard_event() {
        let sb: RawScoreboard = serde_json::from_str(scoreboard_json()).unwrap();
        let dir = TeamDirectory::for_sport(Sport::Nba).unwrap();
        let game = normalize_event(&sb.events[0], &NBA, &dir).unwrap();

        assert_eq!(game.game_id, "401584701");
        assert_eq!(game.state, GameState::Live);
        assert_eq!(game.home.name, "Celtics");
        assert_eq!(game.home.market_code.as_deref(), Some("BOS"));
        assert_eq!(game.home.record.as_deref(), Some("45-20"));
        assert_eq!(game.home.moneyline, Some(-220));
        assert_eq!(game.away.moneyline, Some(180));
        assert_eq!(game.away.rank, None);
        assert_eq!(game.spread, Some(-5.5));
        assert_eq!(game.over_under, Some(221.5));
        assert!((game.minutes_elapsed - 30.3).abs() < 1e-9);
        assert!(game.start_time.is_some());
    }

    #[test]
    fn unknown_team_passes_through_without_market_code() {
        let sb: RawScoreboard = serde_json::from_str(scoreboard_json()).unwrap();
        let dir = TeamDirectory::for_sport(Sport::Nba).unwrap();
        let game = normalize_event(&sb.events[0], &NBA, &dir).unwrap();
        assert_eq!(game.away.name, "Seattle SuperSonics");
        assert!(game.away.market_code.is_none());
        assert_eq!(game.away.abbrev, "SEA");
    }

    #[test]
    fn missing_odds_leave_lines_absent() {
        let json = r#"{"events": [{"id": "1", "competitions": [{"competitors": [
            {"homeAway": "home", "team": {"displayName": "Miami Heat"}},
            {"homeAway": "away", "team": {"displayName": "Orlando Magic"}}
        ], "status": {"type": {"state": "pre"}}}]}]}"#;
        let sb: RawScoreboard = serde_json::from_str(json).unwrap();
        let dir = TeamDirectory::for_sport(Sport::Nba).unwrap();
        let game = normalize_event(&sb.events[0], &NBA, &dir).unwrap();
        assert_eq!(game.state, GameState::Scheduled);
        assert!(game.home.moneyline.is_none());
        assert!(game.spread.is_none());
        assert_eq!(game.minutes_elapsed, 0.0);
    }

    #[test]
    fn event_without_both_sides_is_skipped() {
        let json = r#"{"events": [{"id": "1", "competitions": [{"competitors": [
            {"homeAway": "home", "team": {"displayName": "Miami Heat"}}
        ]}]}]}"#;
        let sb: RawScoreboard = serde_json::from_str(json).unwrap();
        let dir = TeamDirectory::for_sport(Sport::Nba).unwrap();
        assert!(normalize_event(&sb.events[0], &NBA, &dir).is_none());
    }
}
