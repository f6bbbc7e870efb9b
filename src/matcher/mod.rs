pub mod market_matcher;

pub use market_matcher::{
    favorite_side, moneyline_probability, parse_spread_line, spread_matches, winner_matches,
};
