//! Fixture builders shared by unit tests.

use crate::types::{GameSnapshot, GameState, MarketQuote, Sport, TeamEntry, TeamSide};

pub fn team(name: &str, code: &str, score: i32) -> TeamEntry {
    TeamEntry {
        name: name.to_string(),
        abbrev: code.to_string(),
        market_code: Some(code.to_string()),
        score,
        record: None,
        rank: None,
        moneyline: None,
    }
}

/// Celtics (home) vs Lakers (away), NBA, scheduled.
pub fn game() -> GameSnapshot {
    GameSnapshot {
        game_id: "401".to_string(),
        sport: Sport::Nba,
        home: team("Celtics", "BOS", 0),
        away: team("Lakers", "LAL", 0),
        period: 0,
        clock: String::new(),
        state: GameState::Scheduled,
        spread: None,
        over_under: None,
        start_time: None,
        minutes_elapsed: 0.0,
    }
}

/// `game()` in progress with the given scores.
pub fn live_game(period: u32, home_score: i32, away_score: i32) -> GameSnapshot {
    let mut g = game();
    g.state = GameState::Live;
    g.period = period;
    g.clock = "6:00".to_string();
    g.home.score = home_score;
    g.away.score = away_score;
    g
}

pub fn quote(ticker: &str, side: TeamSide, yes: u32, no: u32, line: Option<f64>) -> MarketQuote {
    MarketQuote {
        ticker: ticker.to_string(),
        title: String::new(),
        subtitle: String::new(),
        yes_price: yes,
        no_price: no,
        side,
        line,
        volume: 100,
    }
}
