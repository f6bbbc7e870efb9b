use std::sync::LazyLock;

use regex::Regex;

use crate::feed::messages::RawMarket;
use crate::types::{GameSnapshot, MarketQuote, TeamEntry, TeamSide};

static RE_OVER_BY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:over|more than|by)\s+(\d+(?:\.\d+)?)").unwrap());
static RE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+(?:\.\d+)?)\s*-\s*(\d+(?:\.\d+)?)\b").unwrap());
static RE_BARE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,2})\b").unwrap());
static RE_EVENT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}[A-Z]{3}\d{2,6}").unwrap());

// ---------------------------------------------------------------------------
// Line parsing
// ---------------------------------------------------------------------------

/// Spread bracket from market text. Tries "over/more than/by N", then an
/// "A-B" range (midpoint), then a bare 1-2 digit number in [1, 50].
pub fn parse_spread_line(text: &str) -> Option<f64> {
    if let Some(c) = RE_OVER_BY.captures(text) {
        if let Ok(v) = c[1].parse::<f64>() {
            return Some(v);
        }
    }
    if let Some(c) = RE_RANGE.captures(text) {
        if let (Ok(a), Ok(b)) = (c[1].parse::<f64>(), c[2].parse::<f64>()) {
            return Some((a + b) / 2.0);
        }
    }
    RE_BARE
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .find(|v| (1..=50).contains(v))
        .map(f64::from)
}

// ---------------------------------------------------------------------------
// Quote construction
// ---------------------------------------------------------------------------

fn cents(v: Option<i64>) -> Option<u32> {
    v.filter(|&c| c > 0).map(|c| c.min(100) as u32)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn code_of(team: &TeamEntry) -> Option<String> {
    team.market_code.as_deref().map(str::to_uppercase)
}

/// Which team a quote's "yes" belongs to.
fn assign_side(raw: &RawMarket, home: &TeamEntry, away: &TeamEntry) -> TeamSide {
    let last = raw.ticker.rsplit('-').next().unwrap_or("").to_uppercase();
    // longest code wins so "NY" never shadows "NYK"
    let mut by_code: Option<(usize, TeamSide)> = None;
    for (side, team) in [(TeamSide::Home, home), (TeamSide::Away, away)] {
        if let Some(code) = code_of(team) {
            let longer = by_code.map_or(true, |(len, _)| code.len() > len);
            if !code.is_empty() && last.starts_with(&code) && longer {
                by_code = Some((code.len(), side));
            }
        }
    }
    if let Some((_, side)) = by_code {
        return side;
    }

    let subtitle = if raw.subtitle.trim().is_empty() {
        &raw.yes_sub_title
    } else {
        &raw.subtitle
    };
    match (contains_ci(subtitle, &home.name), contains_ci(subtitle, &away.name)) {
        (true, false) => TeamSide::Home,
        (false, true) => TeamSide::Away,
        _ => TeamSide::Unknown,
    }
}

/// Normalize one open instrument. Yes = ask, else last trade.
/// No = ask, else the complement of the yes bid; zero when neither exists.
pub fn to_quote(raw: &RawMarket, home: &TeamEntry, away: &TeamEntry) -> MarketQuote {
    let yes_price = cents(raw.yes_ask).or(cents(raw.last_price)).unwrap_or(0);
    let no_price = cents(raw.no_ask)
        .or_else(|| cents(raw.yes_bid).map(|bid| 100 - bid))
        .unwrap_or(0);
    MarketQuote {
        ticker: raw.ticker.clone(),
        title: raw.title.clone(),
        subtitle: if raw.subtitle.is_empty() {
            raw.yes_sub_title.clone()
        } else {
            raw.subtitle.clone()
        },
        yes_price,
        no_price,
        side: assign_side(raw, home, away),
        line: None,
        volume: raw.volume.unwrap_or(0).max(0) as u64,
    }
}

// ---------------------------------------------------------------------------
// Game matching
// ---------------------------------------------------------------------------

/// Team codes of the event segment: `KXNBAGAME-25OCT21LALBOS-BOS` → `LALBOS`.
fn event_codes(ticker: &str) -> Option<String> {
    let segment = ticker.split('-').nth(1)?.to_uppercase();
    Some(RE_EVENT_DATE.replace(&segment, "").into_owned())
}

/// Codes are matched at either end of the event segment, so `SC` does not
/// hit a `USCLSU` event.
fn team_in_market(raw: &RawMarket, team: &TeamEntry) -> bool {
    let in_title = contains_ci(&raw.title, &team.name);
    let in_ticker = match (code_of(team), event_codes(&raw.ticker)) {
        (Some(code), Some(codes)) if !code.is_empty() => {
            codes.starts_with(&code) || codes.ends_with(&code)
        }
        _ => false,
    };
    in_title || in_ticker
}

fn matches_game(raw: &RawMarket, game: &GameSnapshot) -> bool {
    team_in_market(raw, &game.home) && team_in_market(raw, &game.away)
}

/// Winner-market quotes for this game.
pub fn winner_matches(markets: &[RawMarket], game: &GameSnapshot) -> Vec<MarketQuote> {
    markets
        .iter()
        .filter(|m| matches_game(m, game))
        .map(|m| to_quote(m, &game.home, &game.away))
        .collect()
}

/// Spread-bracket quotes for this game with a parsed line, widest first.
pub fn spread_matches(markets: &[RawMarket], game: &GameSnapshot) -> Vec<MarketQuote> {
    let mut quotes: Vec<MarketQuote> = markets
        .iter()
        .filter(|m| matches_game(m, game))
        .filter_map(|m| {
            let line = parse_spread_line(&m.title)
                .or_else(|| parse_spread_line(&m.subtitle))
                .or_else(|| parse_spread_line(&m.yes_sub_title))?;
            let mut q = to_quote(m, &game.home, &game.away);
            q.line = Some(line);
            Some(q)
        })
        .collect();
    quotes.sort_by(|a, b| b.line.partial_cmp(&a.line).unwrap_or(std::cmp::Ordering::Equal));
    quotes
}

// ---------------------------------------------------------------------------
// Favorites and implied probability
// ---------------------------------------------------------------------------

/// American odds → implied win probability. Zero is not a valid line.
pub fn moneyline_probability(ml: i32) -> Option<f64> {
    match ml {
        0 => None,
        ml if ml < 0 => {
            let risk = -(ml as f64);
            Some(risk / (risk + 100.0))
        }
        ml => Some(100.0 / (ml as f64 + 100.0)),
    }
}

/// "W-L" → win fraction. Malformed or 0-0 records count as .500.
pub fn win_pct(record: &str) -> f64 {
    let Some((w, l)) = record.trim().split_once('-') else {
        return 0.5;
    };
    match (w.trim().parse::<u32>(), l.trim().parse::<u32>()) {
        (Ok(w), Ok(l)) if w + l > 0 => w as f64 / (w + l) as f64,
        _ => 0.5,
    }
}

/// Pregame favorite. Moneylines decide when present, then records; ties go home.
pub fn favorite_side(game: &GameSnapshot) -> TeamSide {
    match (game.home.moneyline, game.away.moneyline) {
        (Some(h), Some(a)) => {
            if a < h {
                TeamSide::Away
            } else {
                TeamSide::Home
            }
        }
        (Some(h), None) => {
            if h > 0 {
                TeamSide::Away
            } else {
                TeamSide::Home
            }
        }
        (None, Some(a)) => {
            if a < 0 {
                TeamSide::Away
            } else {
                TeamSide::Home
            }
        }
        (None, None) => {
            let home = game.home.record.as_deref().map(win_pct).unwrap_or(0.5);
            let away = game.away.record.as_deref().map(win_pct).unwrap_or(0.5);
            if away > home {
                TeamSide::Away
            } else {
                TeamSide::Home
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::game;

    fn market(ticker: &str, title: &str, subtitle: &str) -> RawMarket {
        RawMarket {
            ticker: ticker.to_string(),
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            yes_ask: Some(40),
            yes_bid: Some(38),
            ..Default::default()
        }
    }

    #[test]
    fn spread_line_parse_order() {
        assert_eq!(parse_spread_line("Boston wins by 7.5"), Some(7.5));
        assert_eq!(parse_spread_line("Wins by over 4.5 points"), Some(4.5));
        assert_eq!(parse_spread_line("More than 12 points"), Some(12.0));
        assert_eq!(parse_spread_line("Margin 10-12"), Some(11.0));
        assert_eq!(parse_spread_line("Boston -9 spread"), Some(9.0));
        assert_eq!(parse_spread_line("Boston wins the game"), None);
        // 76ers has no word boundary inside, 99 is outside [1, 50]
        assert_eq!(parse_spread_line("76ers margin 99"), None);
    }

    #[test]
    fn spread_matches_excludes_lineless_and_sorts_widest_first() {
        let g = game();
        let markets = vec![
            market("KXNBASPREAD-25OCT21LALBOS-BOS3", "Boston wins by over 3.5 points?", ""),
            market("KXNBASPREAD-25OCT21LALBOS-BOS12", "Boston wins by over 12.5 points?", ""),
            market("KXNBASPREAD-25OCT21LALBOS-BOS", "Boston wins?", ""),
            market("KXNBASPREAD-25OCT21LALBOS-LAL7", "Los Angeles wins by over 7.5 points?", ""),
            market("KXNBASPREAD-25OCT21MIAORL-MIA5", "Miami wins by over 5.5 points?", ""),
        ];
        let quotes = spread_matches(&markets, &g);
        let lines: Vec<f64> = quotes.iter().filter_map(|q| q.line).collect();
        assert_eq!(lines, vec![12.5, 7.5, 3.5]);
        assert_eq!(quotes[0].side, TeamSide::Home);
        assert_eq!(quotes[1].side, TeamSide::Away);
    }

    #[test]
    fn codes_match_only_at_event_segment_edges() {
        let mut g = game();
        g.sport = crate::types::Sport::Ncaaw;
        g.home = crate::testutil::team("Tigers", "LSU", 0);
        g.away = crate::testutil::team("Gamecocks", "SC", 0);
        let markets = vec![
            market("KXNCAAWBGAME-25NOV10USCLSU-USC", "USC at LSU Winner?", ""),
            market("KXNCAAWBGAME-25NOV10SCLSU-SC", "South Carolina at LSU Winner?", ""),
            market("KXNCAAWBGAME-25NOV10SCLSU-LSU", "South Carolina at LSU Winner?", ""),
        ];
        let tickers: Vec<String> = winner_matches(&markets, &g).into_iter().map(|q| q.ticker).collect();
        assert_eq!(
            tickers,
            vec!["KXNCAAWBGAME-25NOV10SCLSU-SC", "KXNCAAWBGAME-25NOV10SCLSU-LSU"]
        );
    }

    #[test]
    fn side_from_subtitle_when_ticker_is_silent() {
        let g = game();
        let raw = market("KXNBAGAME-25OCT21LALBOS-X", "Lakers at Celtics", "Celtics");
        assert_eq!(to_quote(&raw, &g.home, &g.away).side, TeamSide::Home);
        let raw = market("KXNBAGAME-25OCT21LALBOS-X", "Lakers at Celtics", "Celtics or Lakers");
        assert_eq!(to_quote(&raw, &g.home, &g.away).side, TeamSide::Unknown);
    }

    #[test]
    fn quote_prices_fall_back() {
        let g = game();
        let mut raw = market("KXNBAGAME-25OCT21LALBOS-BOS", "", "");
        raw.no_ask = Some(63);
        let q = to_quote(&raw, &g.home, &g.away);
        assert_eq!((q.yes_price, q.no_price), (40, 63));

        raw.yes_ask = None;
        raw.no_ask = None;
        raw.last_price = Some(41);
        let q = to_quote(&raw, &g.home, &g.away);
        assert_eq!((q.yes_price, q.no_price), (41, 62));
    }

    #[test]
    fn moneyline_conversion() {
        assert!((moneyline_probability(-150).unwrap() - 0.6).abs() < 1e-9);
        assert!((moneyline_probability(150).unwrap() - 0.4).abs() < 1e-9);
        assert_eq!(moneyline_probability(100), Some(0.5));
        assert_eq!(moneyline_probability(0), None);
    }

    #[test]
    fn favorite_detection() {
        let mut g = game();
        g.home.moneyline = Some(130);
        g.away.moneyline = Some(-150);
        assert_eq!(favorite_side(&g), TeamSide::Away);

        g.away.moneyline = None;
        assert_eq!(favorite_side(&g), TeamSide::Away);

        g.home.moneyline = None;
        g.home.record = Some("10-5".into());
        g.away.record = Some("12-3".into());
        assert_eq!(favorite_side(&g), TeamSide::Away);

        g.away.record = Some("garbage".into());
        assert_eq!(favorite_side(&g), TeamSide::Home);

        // equal records go to home
        g.home.record = Some("8-8".into());
        g.away.record = Some("0-0".into());
        assert_eq!(favorite_side(&g), TeamSide::Home);
    }

    #[test]
    fn win_pct_handles_malformed() {
        assert_eq!(win_pct("3-1"), 0.75);
        assert_eq!(win_pct("0-0"), 0.5);
        assert_eq!(win_pct("x-y"), 0.5);
        assert_eq!(win_pct(""), 0.5);
    }
}
