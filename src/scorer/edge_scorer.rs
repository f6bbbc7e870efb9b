use crate::config::pregame_weights::*;
use crate::config::SportConfig;
use crate::matcher::market_matcher::win_pct;
use crate::types::{EdgeResult, GameSnapshot, InjuryReport, InjuryStatus, Strength, TeamSide};

/// Pre-game context for one team beyond what the scoreboard carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamProfile {
    /// Days since the team's previous game. Some(0) = back-to-back.
    pub rest_days: Option<u32>,
    pub points_per_game: Option<f64>,
    pub three_pt_pct: Option<f64>,
    pub three_pt_attempts: Option<f64>,
    pub injuries: Vec<InjuryReport>,
    /// Statistical leaders in listed order; the first few count as stars.
    pub leaders: Vec<String>,
}

pub struct PregameInputs<'a> {
    pub game: &'a GameSnapshot,
    pub config: &'a SportConfig,
    /// Pregame model's home win chance.
    pub predictor_home_prob: Option<f64>,
    /// Home win chance implied by the prediction market.
    pub market_home_prob: Option<f64>,
    pub home: &'a TeamProfile,
    pub away: &'a TeamProfile,
}

const NAME_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv"];

fn last_name(name: &str) -> String {
    name.split_whitespace()
        .rev()
        .map(|t| t.trim_end_matches('.').to_lowercase())
        .find(|t| !NAME_SUFFIXES.contains(&t.as_str()))
        .unwrap_or_default()
}

/// Whether `player` is one of the team's leading players. Loose on purpose:
/// same last name or either name containing the other's last name counts.
pub fn is_star(player: &str, leaders: &[String]) -> bool {
    let player_full = player.trim().to_lowercase();
    let player_last = last_name(player);
    if player_last.is_empty() {
        return false;
    }
    leaders.iter().take(STAR_LEADER_COUNT).any(|leader| {
        let leader_full = leader.trim().to_lowercase();
        let leader_last = last_name(leader);
        !leader_last.is_empty()
            && (leader_last == player_last
                || leader_full.contains(&player_last)
                || player_full.contains(&leader_last))
    })
}

fn injury_impact(profile: &TeamProfile) -> (f64, Vec<String>) {
    let mut total = 0.0;
    let mut notes = Vec::new();
    for injury in &profile.injuries {
        let star = is_star(&injury.player, &profile.leaders);
        let impact = match injury.status {
            InjuryStatus::Out | InjuryStatus::Doubtful if star => STAR_OUT_PENALTY,
            InjuryStatus::Out => PLAYER_OUT_PENALTY,
            InjuryStatus::Doubtful | InjuryStatus::DayToDay => QUESTIONABLE_PENALTY,
            InjuryStatus::Other => 0.0,
        };
        if impact > 0.0 {
            total += impact;
            let tag = if star { " (star)" } else { "" };
            notes.push(format!("{}{tag}", injury.player));
        }
    }
    (total, notes)
}

fn rank_tier(rank: Option<u32>, top_tier: u32) -> u32 {
    match rank {
        Some(r @ 1..=5) if r <= top_tier => 3,
        Some(r @ 6..=15) if r <= top_tier => 2,
        Some(r) if (1..=top_tier).contains(&r) => 1,
        _ => 0,
    }
}

/// Pregame composite edge. Positive favors home. Pure: same inputs, same result.
pub fn compute_edge(inputs: &PregameInputs<'_>) -> EdgeResult {
    let game = inputs.game;
    let (home, away) = (&game.home, &game.away);
    let mut score = 0.0;
    let mut factors = Vec::new();

    if let Some(p) = inputs.predictor_home_prob {
        let c = (p - 0.5) * PREDICTOR_SCALE;
        score += c;
        factors.push(format!("Predictor {:.1}% {} ({c:+.1})", p * 100.0, home.name));

        if let Some(m) = inputs.market_home_prob {
            let gap = p - m;
            if gap.abs() >= MIN_DIVERGENCE {
                let c = gap * DIVERGENCE_SCALE;
                score += c;
                factors.push(format!(
                    "Predictor vs market {:+.1} pts on {} ({c:+.1})",
                    gap * 100.0,
                    home.name
                ));
            }
        }
    }

    let hca = inputs.config.home_court;
    score += hca;
    factors.push(format!("Home court {} ({hca:+.1})", home.name));

    if home.record.is_some() || away.record.is_some() {
        let wp_home = home.record.as_deref().map(win_pct).unwrap_or(0.5);
        let wp_away = away.record.as_deref().map(win_pct).unwrap_or(0.5);
        let c = (wp_home - wp_away) * WIN_PCT_SCALE;
        if c != 0.0 {
            score += c;
            factors.push(format!("Win pct {wp_home:.3} vs {wp_away:.3} ({c:+.1})"));
        }
    }

    if let Some(top) = inputs.config.ranking_top_tier {
        let (th, ta) = (rank_tier(home.rank, top), rank_tier(away.rank, top));
        if th > 0 || ta > 0 {
            let c = (th as f64 - ta as f64) * RANK_TIER_SCALE;
            if c != 0.0 {
                score += c;
                let label = |r: Option<u32>| r.map_or("NR".to_string(), |r| format!("#{r}"));
                factors.push(format!("Ranking {} vs {} ({c:+.1})", label(home.rank), label(away.rank)));
            }
        }
    }

    if inputs.home.rest_days == Some(0) {
        score -= FATIGUE_PENALTY;
        factors.push(format!("{} on back-to-back ({:+.1})", home.name, -FATIGUE_PENALTY));
    }
    if inputs.away.rest_days == Some(0) {
        score += FATIGUE_PENALTY;
        factors.push(format!("{} on back-to-back ({FATIGUE_PENALTY:+.1})", away.name));
    }

    if let (Some(h), Some(a)) = (inputs.home.points_per_game, inputs.away.points_per_game) {
        let c = (h - a) * SCORING_AVG_SCALE;
        score += c;
        factors.push(format!("Scoring avg {h:.1} vs {a:.1} ({c:+.1})"));
    }

    let (home_inj, home_notes) = injury_impact(inputs.home);
    if home_inj > 0.0 {
        score -= home_inj;
        factors.push(format!("{} injuries: {} ({:+.1})", home.name, home_notes.join(", "), -home_inj));
    }
    let (away_inj, away_notes) = injury_impact(inputs.away);
    if away_inj > 0.0 {
        score += away_inj;
        factors.push(format!("{} injuries: {} ({away_inj:+.1})", away.name, away_notes.join(", ")));
    }

    let pct = match (inputs.home.three_pt_pct, inputs.away.three_pt_pct) {
        (Some(h), Some(a)) => (h - a) * THREE_PCT_SCALE,
        _ => 0.0,
    };
    let volume = match (inputs.home.three_pt_attempts, inputs.away.three_pt_attempts) {
        (Some(h), Some(a)) => (h - a) * THREE_VOLUME_SCALE,
        _ => 0.0,
    };
    if pct != 0.0 || volume != 0.0 {
        let c = pct + volume;
        score += c;
        factors.push(format!("Three-point shooting ({c:+.1})"));
    }

    let side = if score > 0.0 {
        TeamSide::Home
    } else if score < 0.0 {
        TeamSide::Away
    } else {
        TeamSide::Unknown
    };

    EdgeResult {
        score,
        strength: Strength::from_score(score),
        factors,
        side,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NBA, NCAAM};
    use crate::testutil::game;

    fn inputs<'a>(
        g: &'a GameSnapshot,
        cfg: &'a SportConfig,
        home: &'a TeamProfile,
        away: &'a TeamProfile,
    ) -> PregameInputs<'a> {
        PregameInputs {
            game: g,
            config: cfg,
            predictor_home_prob: None,
            market_home_prob: None,
            home,
            away,
        }
    }

    fn injured(player: &str, status: InjuryStatus) -> InjuryReport {
        InjuryReport { player: player.into(), status }
    }

    #[test]
    fn home_court_alone_is_a_lean() {
        let g = game();
        let p = TeamProfile::default();
        let edge = compute_edge(&inputs(&g, &NBA, &p, &p));
        assert_eq!(edge.score, 1.5);
        assert_eq!(edge.strength, Strength::Lean);
        assert_eq!(edge.side, TeamSide::Home);
        assert_eq!(edge.factors.len(), 1);
    }

    #[test]
    fn predictor_and_divergence_stack() {
        let g = game();
        let p = TeamProfile::default();
        let mut i = inputs(&g, &NBA, &p, &p);
        i.predictor_home_prob = Some(0.70);
        i.market_home_prob = Some(0.60);
        // 0.2*20 + 0.1*30 + 1.5
        let edge = compute_edge(&i);
        assert!((edge.score - 8.5).abs() < 1e-9);
        assert_eq!(edge.strength, Strength::Strong);

        // gap under 5 points adds nothing
        i.market_home_prob = Some(0.68);
        let edge = compute_edge(&i);
        assert!((edge.score - 5.5).abs() < 1e-9);
        assert_eq!(edge.strength, Strength::Moderate);
    }

    #[test]
    fn away_edge_goes_negative() {
        let mut g = game();
        g.home.record = Some("5-15".into());
        g.away.record = Some("15-5".into());
        let rested = TeamProfile::default();
        let tired = TeamProfile { rest_days: Some(0), ..Default::default() };
        // (0.25 - 0.75) * 10 - 2 + 1.5
        let edge = compute_edge(&inputs(&g, &NBA, &tired, &rested));
        assert!((edge.score - -5.5).abs() < 1e-9);
        assert_eq!(edge.side, TeamSide::Away);
        assert_eq!(edge.strength, Strength::Moderate);
    }

    #[test]
    fn ranking_only_counts_in_college() {
        let mut g = game();
        g.home.rank = Some(3);
        g.away.rank = Some(20);
        let p = TeamProfile::default();
        let college = compute_edge(&inputs(&g, &NCAAM, &p, &p));
        assert!((college.score - (2.5 + 2.0)).abs() < 1e-9);
        let pro = compute_edge(&inputs(&g, &NBA, &p, &p));
        assert_eq!(pro.score, 1.5);

        g.home.rank = None;
        g.away.rank = Some(30);
        let unranked = compute_edge(&inputs(&g, &NCAAM, &p, &p));
        assert_eq!(unranked.score, 2.5);
    }

    #[test]
    fn injuries_weighted_by_star_status() {
        let g = game();
        let home = TeamProfile {
            leaders: vec!["Jayson Tatum".into(), "Jaylen Brown".into(), "Derrick White".into()],
            injuries: vec![
                injured("Jayson Tatum", InjuryStatus::Out),
                injured("Luke Kornet", InjuryStatus::Out),
                injured("Sam Hauser", InjuryStatus::DayToDay),
                injured("Neemias Queta", InjuryStatus::Other),
            ],
            ..Default::default()
        };
        let away = TeamProfile::default();
        // 1.5 - (4 + 1.5 + 0.5)
        let edge = compute_edge(&inputs(&g, &NBA, &home, &away));
        assert!((edge.score - -4.5).abs() < 1e-9);
        assert!(edge.factors.iter().any(|f| f.contains("Jayson Tatum (star)")));
    }

    #[test]
    fn star_match_is_fuzzy_on_last_name() {
        let leaders = vec!["Jalen Williams".to_string(), "Shai Gilgeous-Alexander".to_string()];
        assert!(is_star("jalen williams", &leaders));
        // shared surname is an accepted false positive
        assert!(is_star("Jaylin Williams", &leaders));
        assert!(is_star("S. Gilgeous-Alexander", &leaders));
        assert!(!is_star("Chet Holmgren", &leaders));
        assert!(!is_star("", &leaders));
        let leaders = vec!["Jaren Jackson Jr.".to_string()];
        assert!(is_star("Jaren Jackson", &leaders));
        assert!(!is_star("Jrue Holiday", &leaders));
    }

    #[test]
    fn only_first_three_leaders_are_stars() {
        let leaders: Vec<String> = ["A One", "B Two", "C Three", "D Four"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(is_star("X Three", &leaders));
        assert!(!is_star("X Four", &leaders));
    }

    #[test]
    fn doubtful_star_counts_as_star_out() {
        let g = game();
        let home = TeamProfile::default();
        let away = TeamProfile {
            leaders: vec!["LeBron James".into()],
            injuries: vec![injured("LeBron James", InjuryStatus::Doubtful)],
            ..Default::default()
        };
        let edge = compute_edge(&inputs(&g, &NBA, &home, &away));
        assert!((edge.score - 5.5).abs() < 1e-9);
    }

    #[test]
    fn scoring_and_shooting_factors() {
        let g = game();
        let home = TeamProfile {
            points_per_game: Some(120.0),
            three_pt_pct: Some(38.0),
            three_pt_attempts: Some(40.0),
            ..Default::default()
        };
        let away = TeamProfile {
            points_per_game: Some(110.0),
            three_pt_pct: Some(35.0),
            three_pt_attempts: Some(30.0),
            ..Default::default()
        };
        // 1.5 + 10*0.15 + 3*0.2 + 10*0.05
        let edge = compute_edge(&inputs(&g, &NBA, &home, &away));
        assert!((edge.score - 4.1).abs() < 1e-9);
    }

    #[test]
    fn scoring_is_idempotent() {
        let mut g = game();
        g.home.record = Some("30-10".into());
        g.away.record = Some("22-18".into());
        let home = TeamProfile {
            rest_days: Some(1),
            points_per_game: Some(115.3),
            leaders: vec!["Jayson Tatum".into()],
            injuries: vec![injured("Jayson Tatum", InjuryStatus::Doubtful)],
            ..Default::default()
        };
        let away = TeamProfile { rest_days: Some(0), points_per_game: Some(112.8), ..Default::default() };
        let mut i = inputs(&g, &NBA, &home, &away);
        i.predictor_home_prob = Some(0.58);
        i.market_home_prob = Some(0.51);

        let a = serde_json::to_string(&compute_edge(&i)).unwrap();
        let b = serde_json::to_string(&compute_edge(&i)).unwrap();
        assert_eq!(a, b);
    }
}
