//! One game's pass through the scoring pipeline for a single poll cycle.

use chrono::{DateTime, Utc};

use crate::config::{AlertThresholds, SportConfig};
use crate::detector::{mispricing, sniper};
use crate::normalizer::summary::{SummaryInsights, TeamSummary};
use crate::scorer::{compute_edge, projection_reading, PregameInputs, TeamProfile};
use crate::state::SessionState;
use crate::types::{
    AlertKind, AlertRecord, ComebackAlert, GameRow, GameSnapshot, GameState, InjuryReport,
    MarketQuote, MispricingAlert, SniperAlert, TeamSide,
};

/// Everything known about one game this cycle.
pub struct GameInputs<'a> {
    pub game: GameSnapshot,
    pub config: &'a SportConfig,
    pub thresholds: &'a AlertThresholds,
    pub winner_quotes: Vec<MarketQuote>,
    pub spread_quotes: Vec<MarketQuote>,
    pub predictor_home_prob: Option<f64>,
    pub home: TeamProfile,
    pub away: TeamProfile,
}

#[derive(Debug)]
pub struct Assessment {
    pub row: GameRow,
    /// Newly qualified alerts, already marked in the session.
    pub alerts: Vec<AlertRecord>,
}

pub fn build_profile(
    summary: Option<&TeamSummary>,
    injuries: &[InjuryReport],
    played_yesterday: bool,
) -> TeamProfile {
    TeamProfile {
        rest_days: played_yesterday.then_some(0),
        points_per_game: summary.and_then(|s| s.points_per_game),
        three_pt_pct: summary.and_then(|s| s.three_pt_pct),
        three_pt_attempts: summary.and_then(|s| s.three_pt_attempts),
        injuries: injuries.to_vec(),
        leaders: summary.map(|s| s.leaders.clone()).unwrap_or_default(),
    }
}

/// Highest-volume winner quote for `side`.
fn winner_quote(quotes: &[MarketQuote], side: TeamSide) -> Option<&MarketQuote> {
    quotes
        .iter()
        .filter(|q| q.side == side && q.yes_price > 0)
        .max_by_key(|q| q.volume)
}

fn team_name(game: &GameSnapshot, side: TeamSide) -> String {
    game.team(side).map(|t| t.name.clone()).unwrap_or_default()
}

/// Score one game and collect any alerts that qualify for the first time
/// this session. Live win probability is filled in later by `enrich_alert`.
pub fn assess_game(
    inputs: GameInputs<'_>,
    session: &mut SessionState,
    now: DateTime<Utc>,
) -> Assessment {
    let GameInputs {
        game,
        config,
        thresholds,
        winner_quotes,
        spread_quotes,
        predictor_home_prob,
        home,
        away,
    } = inputs;

    let favorite = session.favorite(&game);
    let mut alerts = Vec::new();

    let edge = (game.state == GameState::Scheduled).then(|| {
        compute_edge(&PregameInputs {
            game: &game,
            config,
            predictor_home_prob,
            market_home_prob: winner_quote(&winner_quotes, TeamSide::Home)
                .map(MarketQuote::implied_probability),
            home: &home,
            away: &away,
        })
    });

    let projection = (game.state == GameState::Live).then(|| projection_reading(&game, config));

    if game.state == GameState::Live && favorite != TeamSide::Unknown {
        if !session.dedup.has_fired(&game.game_id, AlertKind::Sniper) {
            if let Some(signal) = sniper::evaluate(&game, favorite, config) {
                session.dedup.mark_fired(&game.game_id, AlertKind::Sniper);
                alerts.push(AlertRecord::Sniper(SniperAlert {
                    game_id: game.game_id.clone(),
                    sport: game.sport,
                    matchup: game.matchup(),
                    favorite: team_name(&game, favorite),
                    underdog: team_name(&game, signal.underdog_side),
                    underdog_side: signal.underdog_side,
                    lead: signal.lead,
                    period: game.period,
                    clock: game.clock.clone(),
                    threshold: signal.threshold,
                    min_bracket: thresholds.sniper_min_bracket,
                    max_no_cents: thresholds.sniper_max_no_cents,
                    brackets: sniper::actionable_brackets(&spread_quotes, favorite, thresholds),
                    win_probability: None,
                    win_prob_edge: None,
                    fired_at: now,
                }));
            }
        }

        // tracker sees every poll so the max deficit stays current
        let recovered = session.comeback.observe(&game.game_id, game.margin(favorite));
        if let Some(max_deficit) = recovered {
            if session.dedup.mark_fired(&game.game_id, AlertKind::Comeback) {
                alerts.push(AlertRecord::Comeback(ComebackAlert {
                    game_id: game.game_id.clone(),
                    sport: game.sport,
                    matchup: game.matchup(),
                    favorite: team_name(&game, favorite),
                    favorite_side: favorite,
                    max_deficit,
                    margin: game.margin(favorite),
                    period: game.period,
                    clock: game.clock.clone(),
                    win_probability: None,
                    win_prob_edge: None,
                    ticker: winner_quote(&winner_quotes, favorite).map(|q| q.ticker.clone()),
                    fired_at: now,
                }));
            }
        }
    }

    if game.state == GameState::Scheduled
        && !session.dedup.has_fired(&game.game_id, AlertKind::Mispricing)
    {
        let signals = mispricing::scan(
            &game,
            &winner_quotes,
            predictor_home_prob,
            thresholds.mispricing_min_gap,
        );
        if let Some(top) = signals.into_iter().next() {
            session.dedup.mark_fired(&game.game_id, AlertKind::Mispricing);
            alerts.push(AlertRecord::Mispricing(MispricingAlert {
                game_id: game.game_id.clone(),
                sport: game.sport,
                matchup: game.matchup(),
                team: team_name(&game, top.side),
                side: top.side,
                ticker: top.ticker,
                moneyline_prob: top.moneyline_prob,
                market_prob: top.market_prob,
                model_prob: top.model_prob,
                gap: top.gap,
                corroborated: top.corroborated,
                fired_at: now,
            }));
        }
    }

    Assessment {
        row: GameRow {
            snapshot: game,
            favorite,
            edge,
            projection,
            winner_quotes,
            spread_quotes,
        },
        alerts,
    }
}

/// Attach live win probability and its edge over the market to a live alert.
/// No live probability leaves both fields empty.
pub fn enrich_alert(alert: &mut AlertRecord, insights: &SummaryInsights, winner_quotes: &[MarketQuote]) {
    let (side, win_probability, win_prob_edge) = match alert {
        AlertRecord::Sniper(a) => (a.underdog_side, &mut a.win_probability, &mut a.win_prob_edge),
        AlertRecord::Comeback(a) => (a.favorite_side, &mut a.win_probability, &mut a.win_prob_edge),
        AlertRecord::Mispricing(_) => return,
    };
    let Some(p) = insights.live_win_prob(side) else {
        return;
    };
    *win_probability = Some(p);
    *win_prob_edge = winner_quote(winner_quotes, side).map(|q| p - q.implied_probability());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NBA;
    use crate::testutil::{game, live_game, quote};

    fn inputs<'a>(g: GameSnapshot, thresholds: &'a AlertThresholds) -> GameInputs<'a> {
        GameInputs {
            game: g,
            config: &NBA,
            thresholds,
            winner_quotes: Vec::new(),
            spread_quotes: Vec::new(),
            predictor_home_prob: None,
            home: TeamProfile::default(),
            away: TeamProfile::default(),
        }
    }

    /// Home favored by moneyline, live in `period`.
    fn favored_home(period: u32, home: i32, away: i32) -> GameSnapshot {
        let mut g = live_game(period, home, away);
        g.home.moneyline = Some(-200);
        g.away.moneyline = Some(170);
        g
    }

    fn kinds(a: &Assessment) -> Vec<AlertKind> {
        a.alerts.iter().map(AlertRecord::kind).collect()
    }

    #[test]
    fn sniper_fires_once_past_period_threshold() {
        let t = AlertThresholds::default();
        let mut session = SessionState::new();
        let now = Utc::now();

        let a = assess_game(inputs(favored_home(3, 50, 57), &t), &mut session, now);
        assert!(a.alerts.is_empty());

        let mut i = inputs(favored_home(3, 50, 59), &t);
        i.spread_quotes = vec![
            quote("KXNBASPREAD-X-BOS5", TeamSide::Home, 30, 72, Some(5.5)),
            quote("KXNBASPREAD-X-BOS2", TeamSide::Home, 60, 41, Some(2.5)),
        ];
        let a = assess_game(i, &mut session, now);
        assert_eq!(kinds(&a), vec![AlertKind::Sniper]);
        let AlertRecord::Sniper(s) = &a.alerts[0] else { panic!("expected sniper") };
        assert_eq!((s.lead, s.threshold), (9, 8));
        assert_eq!(s.underdog, "Lakers");
        assert_eq!(s.brackets.len(), 1);
        assert_eq!(s.brackets[0].ticker, "KXNBASPREAD-X-BOS5");

        let a = assess_game(inputs(favored_home(3, 50, 62), &t), &mut session, now);
        assert!(a.alerts.is_empty());
    }

    #[test]
    fn comeback_sequence_fires_once() {
        let t = AlertThresholds::default();
        let mut session = SessionState::new();
        let now = Utc::now();
        let mut fired = Vec::new();

        // favorite (home) trails by 12, 15, 15, 3 then keeps hovering
        for (step, away) in [62, 65, 65, 53, 52, 51].into_iter().enumerate() {
            let a = assess_game(inputs(favored_home(2, 50, away), &t), &mut session, now);
            if step >= 1 {
                assert_eq!(session.comeback.max_deficit("401"), Some(15));
            }
            fired.extend(a.alerts.into_iter().filter(|a| a.kind() == AlertKind::Comeback));
            if step == 3 {
                assert_eq!(fired.len(), 1);
            }
        }
        assert_eq!(fired.len(), 1);
        let AlertRecord::Comeback(c) = &fired[0] else { panic!("expected comeback") };
        assert_eq!((c.max_deficit, c.margin), (15, -3));
        assert_eq!(c.favorite, "Celtics");
    }

    #[test]
    fn favorite_holds_when_odds_drop_mid_game() {
        let t = AlertThresholds::default();
        let mut session = SessionState::new();
        let now = Utc::now();

        // odds favor home, records favor away
        let mut first = favored_home(2, 50, 62);
        first.home.record = Some("5-15".into());
        first.away.record = Some("15-5".into());
        let a = assess_game(inputs(first.clone(), &t), &mut session, now);
        assert_eq!(kinds(&a), vec![AlertKind::Sniper]);

        let mut second = first;
        second.home.moneyline = None;
        second.away.moneyline = None;
        let a = assess_game(inputs(second, &t), &mut session, now);
        assert_eq!(a.row.favorite, TeamSide::Home);
        assert!(a.alerts.is_empty(), "{:?}", kinds(&a));
        assert_eq!(session.comeback.max_deficit("401"), Some(12));
    }

    #[test]
    fn mispricing_reported_above_gap_only() {
        let t = AlertThresholds::default();
        let now = Utc::now();

        let mut g = game();
        g.home.moneyline = Some(-150);
        let mut i = inputs(g.clone(), &t);
        i.winner_quotes = vec![quote("KXNBAGAME-X-BOS", TeamSide::Home, 50, 52, None)];
        let mut session = SessionState::new();
        let a = assess_game(i, &mut session, now);
        assert_eq!(kinds(&a), vec![AlertKind::Mispricing]);
        assert!(a.row.edge.is_some());
        assert!(a.row.projection.is_none());

        let mut i = inputs(g, &t);
        i.winner_quotes = vec![quote("KXNBAGAME-X-BOS", TeamSide::Home, 57, 45, None)];
        let a = assess_game(i, &mut SessionState::new(), now);
        assert!(a.alerts.is_empty());
    }

    #[test]
    fn live_row_has_projection_not_edge() {
        let t = AlertThresholds::default();
        let mut g = favored_home(2, 40, 38);
        g.minutes_elapsed = 18.0;
        let a = assess_game(inputs(g, &t), &mut SessionState::new(), Utc::now());
        assert!(a.row.edge.is_none());
        assert!(a.row.projection.is_some());
        assert_eq!(a.row.favorite, TeamSide::Home);
    }

    #[test]
    fn reset_session_allows_refire() {
        let t = AlertThresholds::default();
        let mut session = SessionState::new();
        let now = Utc::now();
        let a = assess_game(inputs(favored_home(1, 10, 16), &t), &mut session, now);
        assert_eq!(a.alerts.len(), 1);
        session.reset();
        let a = assess_game(inputs(favored_home(1, 10, 16), &t), &mut session, now);
        assert_eq!(a.alerts.len(), 1);
    }

    #[test]
    fn enrich_uses_live_probability_for_alerted_side() {
        let quotes = vec![quote("KXNBAGAME-X-LAL", TeamSide::Away, 30, 72, None)];
        let t = AlertThresholds::default();
        let mut a = assess_game(inputs(favored_home(3, 50, 60), &t), &mut SessionState::new(), Utc::now());
        let insights = SummaryInsights {
            live_home_win_prob: Some(0.55),
            ..Default::default()
        };
        enrich_alert(&mut a.alerts[0], &insights, &quotes);
        let AlertRecord::Sniper(s) = &a.alerts[0] else { panic!("expected sniper") };
        assert!((s.win_probability.unwrap() - 0.45).abs() < 1e-9);
        assert!((s.win_prob_edge.unwrap() - 0.15).abs() < 1e-9);

        let mut b = a.alerts[0].clone();
        if let AlertRecord::Sniper(s) = &mut b {
            s.win_probability = None;
            s.win_prob_edge = None;
        }
        enrich_alert(&mut b, &SummaryInsights::default(), &quotes);
        let AlertRecord::Sniper(s) = &b else { panic!("expected sniper") };
        assert_eq!(s.win_probability, None);
    }

    #[test]
    fn profile_from_summary() {
        let summary = TeamSummary {
            leaders: vec!["Jayson Tatum".into()],
            points_per_game: Some(117.0),
            ..Default::default()
        };
        let p = build_profile(Some(&summary), &[], true);
        assert_eq!(p.rest_days, Some(0));
        assert_eq!(p.points_per_game, Some(117.0));
        assert_eq!(build_profile(None, &[], false), TeamProfile::default());
    }
}
