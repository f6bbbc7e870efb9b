use std::collections::HashMap;

use crate::config::comeback::{RECOVERY_MARGIN, TRACK_DEFICIT};

/// Per-game deepest deficit suffered by the pregame favorite.
///
/// A game enters tracking once the favorite trails by `TRACK_DEFICIT`; from
/// then on the recorded maximum only grows.
#[derive(Debug, Default)]
pub struct ComebackTracker {
    max_deficit: HashMap<String, i32>,
}

impl ComebackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the favorite's current margin. Returns the recorded max deficit
    /// when the favorite has clawed back to within `RECOVERY_MARGIN`.
    pub fn observe(&mut self, game_id: &str, favorite_margin: i32) -> Option<i32> {
        let deficit = -favorite_margin;
        let max = match self.max_deficit.get_mut(game_id) {
            Some(max) => {
                *max = (*max).max(deficit);
                *max
            }
            None if deficit >= TRACK_DEFICIT => {
                self.max_deficit.insert(game_id.to_string(), deficit);
                deficit
            }
            None => return None,
        };
        (max >= TRACK_DEFICIT && favorite_margin >= -RECOVERY_MARGIN).then_some(max)
    }

    #[cfg(test)]
    pub fn max_deficit(&self, game_id: &str) -> Option<i32> {
        self.max_deficit.get(game_id).copied()
    }

    pub fn tracked(&self) -> usize {
        self.max_deficit.len()
    }

    pub fn reset(&mut self) {
        self.max_deficit.clear();
    }
}
