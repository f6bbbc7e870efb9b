use crate::config::SportConfig;
use crate::types::{GameSnapshot, ProjectionReading};

/// Weight on the observed pace. Starts at 0.2, climbs to 0.4 by the end of
/// the first quarter of the game, to 0.8 by three quarters, and tops out at 0.9.
fn pace_weight(fraction: f64) -> f64 {
    let f = fraction.clamp(0.0, 1.0);
    if f <= 0.25 {
        0.2 + (f / 0.25) * 0.2
    } else if f <= 0.75 {
        0.4 + ((f - 0.25) / 0.5) * 0.4
    } else {
        (0.8 + ((f - 0.75) / 0.25) * 0.1).min(0.9)
    }
}

/// Final combined points, blending the live scoring pace with league pace.
pub fn project_total(current_total: f64, minutes_elapsed: f64, cfg: &SportConfig) -> f64 {
    if minutes_elapsed <= 0.0 {
        return cfg.league_avg_total;
    }
    let regulation = cfg.regulation_minutes();
    let remaining = (regulation - minutes_elapsed).max(0.0);
    let w = pace_weight(minutes_elapsed / regulation);

    let current_pace = current_total / minutes_elapsed;
    let league_pace = cfg.league_avg_total / regulation;
    let projected = current_total + remaining * (w * current_pace + (1.0 - w) * league_pace);

    let (lo, hi) = cfg.total_range;
    projected.clamp(lo, hi)
}

pub fn projection_reading(game: &GameSnapshot, cfg: &SportConfig) -> ProjectionReading {
    let projected_total = project_total(game.total_points() as f64, game.minutes_elapsed, cfg);
    ProjectionReading {
        projected_total,
        over_under: game.over_under,
        cushion: game.over_under.map(|ou| projected_total - ou),
    }
}
