use crate::matcher::moneyline_probability;
use crate::types::{GameSnapshot, GameState, MarketQuote, TeamSide};

/// Sportsbook and prediction market disagree on one side of a game.
#[derive(Debug, Clone, PartialEq)]
pub struct MispricingSignal {
    pub side: TeamSide,
    pub ticker: String,
    pub moneyline_prob: f64,
    pub market_prob: f64,
    pub model_prob: Option<f64>,
    pub gap: f64,
    /// Model sits on the same side of the market as the moneyline.
    pub corroborated: bool,
}

// float noise: 0.60 - 0.50 is 0.0999..
const GAP_EPSILON: f64 = 1e-9;

fn best_quote(quotes: &[MarketQuote], side: TeamSide) -> Option<&MarketQuote> {
    quotes
        .iter()
        .filter(|q| q.side == side && q.yes_price > 0)
        .max_by_key(|q| q.volume)
}

/// Scheduled games only. Sides whose gap meets `min_gap`, widest gap first.
pub fn scan(
    game: &GameSnapshot,
    winner_quotes: &[MarketQuote],
    predictor_home_prob: Option<f64>,
    min_gap: f64,
) -> Vec<MispricingSignal> {
    if game.state != GameState::Scheduled {
        return Vec::new();
    }

    let mut signals: Vec<MispricingSignal> = [TeamSide::Home, TeamSide::Away]
        .into_iter()
        .filter_map(|side| {
            let moneyline_prob = moneyline_probability(game.team(side)?.moneyline?)?;
            let quote = best_quote(winner_quotes, side)?;
            let market_prob = quote.implied_probability();
            let gap = (moneyline_prob - market_prob).abs();
            if gap + GAP_EPSILON < min_gap {
                return None;
            }
            let model_prob = predictor_home_prob.map(|p| match side {
                TeamSide::Away => 1.0 - p,
                _ => p,
            });
            let corroborated = model_prob.is_some_and(|m| {
                let book = moneyline_prob - market_prob;
                let model = m - market_prob;
                book * model > 0.0
            });
            Some(MispricingSignal {
                side,
                ticker: quote.ticker.clone(),
                moneyline_prob,
                market_prob,
                model_prob,
                gap,
                corroborated,
            })
        })
        .collect();

    signals.sort_by(|a, b| b.gap.partial_cmp(&a.gap).unwrap_or(std::cmp::Ordering::Equal));
    signals
}
