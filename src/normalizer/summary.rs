use std::collections::HashMap;

use crate::feed::messages::{
    value_as_f64, RawBoxscoreTeam, RawInjuries, RawPredictorTeam, RawSummary,
};
use crate::normalizer::teams::TeamDirectory;
use crate::types::{GameSnapshot, InjuryReport, InjuryStatus, TeamSide};

/// Per-team numbers pulled from a game summary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamSummary {
    /// Statistical leaders, deduplicated, in the order the feed lists them.
    pub leaders: Vec<String>,
    pub points_per_game: Option<f64>,
    pub three_pt_pct: Option<f64>,
    pub three_pt_attempts: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryInsights {
    /// Pregame model's home win chance, as a fraction.
    pub predictor_home_prob: Option<f64>,
    /// Most recent in-game home win probability, as a fraction.
    pub live_home_win_prob: Option<f64>,
    pub home: TeamSummary,
    pub away: TeamSummary,
}

impl SummaryInsights {
    /// Live win probability for `side`, if the feed has one.
    pub fn live_win_prob(&self, side: TeamSide) -> Option<f64> {
        let home = self.live_home_win_prob?;
        match side {
            TeamSide::Home => Some(home),
            TeamSide::Away => Some(1.0 - home),
            TeamSide::Unknown => None,
        }
    }
}

/// Percent or fraction → fraction in [0, 1].
fn as_fraction(v: f64) -> Option<f64> {
    if !v.is_finite() || v < 0.0 {
        return None;
    }
    let p = if v > 1.0 { v / 100.0 } else { v };
    (p <= 1.0).then_some(p)
}

fn predictor_home_prob(raw: &RawSummary) -> Option<f64> {
    let predictor = raw.predictor.as_ref()?;
    let projection = |t: Option<&RawPredictorTeam>| {
        t.and_then(|t| t.game_projection.as_ref())
            .and_then(value_as_f64)
            .and_then(as_fraction)
    };
    projection(predictor.home_team.as_ref())
        .or_else(|| projection(predictor.away_team.as_ref()).map(|away| 1.0 - away))
}

fn leaders_for(raw: &RawSummary, abbrev: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let Some(team) = raw.leaders.iter().find(|t| {
        t.team
            .as_ref()
            .and_then(|team| team.abbreviation.as_deref())
            .is_some_and(|a| a.eq_ignore_ascii_case(abbrev))
    }) else {
        return names;
    };

    for category in &team.leaders {
        for leader in &category.leaders {
            let Some(name) = leader.athlete.as_ref().and_then(|a| a.display_name.as_deref()) else {
                continue;
            };
            let name = name.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}

fn stat(team: &RawBoxscoreTeam, name: &str) -> Option<f64> {
    team.statistics
        .iter()
        .find(|s| s.name.as_deref() == Some(name))
        .and_then(|s| s.display_value.as_deref())
        .and_then(|v| v.trim().trim_end_matches('%').parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn boxscore_team<'a>(raw: &'a RawSummary, side: &str, abbrev: &str) -> Option<&'a RawBoxscoreTeam> {
    let teams = &raw.boxscore.as_ref()?.teams;
    teams
        .iter()
        .find(|t| t.home_away.as_deref() == Some(side))
        .or_else(|| {
            teams.iter().find(|t| {
                t.team
                    .as_ref()
                    .and_then(|team| team.abbreviation.as_deref())
                    .is_some_and(|a| a.eq_ignore_ascii_case(abbrev))
            })
        })
}

fn team_summary(raw: &RawSummary, side: &str, abbrev: &str) -> TeamSummary {
    let box_team = boxscore_team(raw, side, abbrev);
    TeamSummary {
        leaders: leaders_for(raw, abbrev),
        points_per_game: box_team.and_then(|t| stat(t, "avgPoints")),
        three_pt_pct: box_team.and_then(|t| stat(t, "threePointFieldGoalPct")),
        three_pt_attempts: box_team.and_then(|t| stat(t, "avgThreePointFieldGoalsAttempted")),
    }
}

/// Pull the scoring inputs out of a game summary. Missing sections stay None.
pub fn extract(raw: &RawSummary, game: &GameSnapshot) -> SummaryInsights {
    SummaryInsights {
        predictor_home_prob: predictor_home_prob(raw),
        live_home_win_prob: raw
            .winprobability
            .iter()
            .rev()
            .find_map(|w| w.home_win_percentage)
            .and_then(as_fraction),
        home: team_summary(raw, "home", &game.home.abbrev),
        away: team_summary(raw, "away", &game.away.abbrev),
    }
}

/// League injury report keyed by canonical team name.
pub fn injuries_by_team(
    raw: &RawInjuries,
    dir: &TeamDirectory,
) -> HashMap<String, Vec<InjuryReport>> {
    let mut out: HashMap<String, Vec<InjuryReport>> = HashMap::new();
    for team in &raw.injuries {
        let Some(display) = team.display_name.as_deref() else {
            continue;
        };
        let (name, _) = dir.resolve_any([display]);
        let reports = team.injuries.iter().filter_map(|i| {
            let player = i.athlete.as_ref()?.display_name.clone()?;
            Some(InjuryReport {
                player,
                status: InjuryStatus::parse(i.status.as_deref().unwrap_or("")),
            })
        });
        out.entry(name).or_default().extend(reports);
    }
    out
}
