use std::collections::{HashMap, HashSet};

use crate::detector::ComebackTracker;
use crate::matcher::favorite_side;
use crate::types::{AlertKind, GameSnapshot, TeamSide};

/// At most one alert per (game, kind) per session.
#[derive(Debug, Default)]
pub struct AlertDeduplicator {
    fired: HashSet<(String, AlertKind)>,
}

impl AlertDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_fired(&self, game_id: &str, kind: AlertKind) -> bool {
        self.fired.contains(&(game_id.to_string(), kind))
    }

    /// Returns false when the pair was already marked.
    pub fn mark_fired(&mut self, game_id: &str, kind: AlertKind) -> bool {
        self.fired.insert((game_id.to_string(), kind))
    }

    pub fn len(&self) -> usize {
        self.fired.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }

    pub fn reset(&mut self) {
        self.fired.clear();
    }
}

/// Everything that survives between poll cycles. Owned by the poller;
/// tests build their own.
#[derive(Debug, Default)]
pub struct SessionState {
    pub dedup: AlertDeduplicator,
    pub comeback: ComebackTracker,
    /// game_id → favorite as first seen this session
    favorites: HashMap<String, TeamSide>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Favorite for `game`, fixed on first sight. Later polls reuse it even
    /// if the odds move or vanish mid-game.
    pub fn favorite(&mut self, game: &GameSnapshot) -> TeamSide {
        *self
            .favorites
            .entry(game.game_id.clone())
            .or_insert_with(|| favorite_side(game))
    }

    pub fn reset(&mut self) {
        self.dedup.reset();
        self.comeback.reset();
        self.favorites.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::game;

    #[test]
    fn marks_per_game_and_kind() {
        let mut d = AlertDeduplicator::new();
        assert!(!d.has_fired("g1", AlertKind::Sniper));
        assert!(d.mark_fired("g1", AlertKind::Sniper));
        assert!(!d.mark_fired("g1", AlertKind::Sniper));
        assert!(d.has_fired("g1", AlertKind::Sniper));
        assert!(!d.has_fired("g1", AlertKind::Comeback));
        assert!(!d.has_fired("g2", AlertKind::Sniper));
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn favorite_fixed_on_first_sight() {
        let mut s = SessionState::new();
        let mut g = game();
        g.home.moneyline = Some(-200);
        g.away.moneyline = Some(170);
        assert_eq!(s.favorite(&g), TeamSide::Home);

        g.home.moneyline = Some(150);
        g.away.moneyline = Some(-180);
        assert_eq!(s.favorite(&g), TeamSide::Home);
        assert_eq!(favorite_side(&g), TeamSide::Away);
    }

    #[test]
    fn reset_clears_everything() {
        let mut s = SessionState::new();
        let mut g = game();
        g.home.moneyline = Some(-200);
        s.favorite(&g);
        s.dedup.mark_fired("g1", AlertKind::Mispricing);
        s.comeback.observe("g1", -14);
        s.reset();
        assert!(s.dedup.is_empty());
        assert_eq!(s.comeback.max_deficit("g1"), None);

        g.home.moneyline = Some(200);
        g.away.moneyline = Some(-240);
        assert_eq!(s.favorite(&g), TeamSide::Away);
    }

    #[test]
    fn sessions_do_not_share_state() {
        let mut a = SessionState::new();
        let b = SessionState::new();
        a.dedup.mark_fired("g1", AlertKind::Sniper);
        assert!(!b.dedup.has_fired("g1", AlertKind::Sniper));
    }
}
