use crate::config::{AlertThresholds, SportConfig};
use crate::types::{GameSnapshot, GameState, MarketQuote, TeamSide};

/// Underdog lead that met the period threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SniperSignal {
    pub underdog_side: TeamSide,
    pub lead: i32,
    pub threshold: i32,
}

/// Live game where the pregame underdog leads by at least the period's bar.
pub fn evaluate(game: &GameSnapshot, favorite: TeamSide, cfg: &SportConfig) -> Option<SniperSignal> {
    if game.state != GameState::Live || favorite == TeamSide::Unknown {
        return None;
    }
    let threshold = cfg.sniper_threshold(game.period)?;
    let underdog_side = favorite.opponent();
    let lead = game.margin(underdog_side);
    (lead >= threshold).then_some(SniperSignal {
        underdog_side,
        lead,
        threshold,
    })
}

/// Favorite-side brackets wide enough and cheap enough to buy "no" on,
/// cheapest first.
pub fn actionable_brackets(
    spread_quotes: &[MarketQuote],
    favorite: TeamSide,
    thresholds: &AlertThresholds,
) -> Vec<MarketQuote> {
    let mut brackets: Vec<MarketQuote> = spread_quotes
        .iter()
        .filter(|q| q.side == favorite)
        .filter(|q| q.line.is_some_and(|l| l >= thresholds.sniper_min_bracket))
        .filter(|q| {
            let no = q.effective_no_price();
            no > 0 && no <= thresholds.sniper_max_no_cents
        })
        .cloned()
        .collect();
    brackets.sort_by_key(|q| q.effective_no_price());
    brackets
}
