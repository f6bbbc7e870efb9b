use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::types::Sport;

/// One team: the canonical short form the board displays, the code the
/// prediction market uses in tickers, and every spelling the feeds use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamAlias {
    pub canonical: &'static str,
    pub code: &'static str,
    pub aliases: &'static [&'static str],
}

const fn team(
    canonical: &'static str,
    code: &'static str,
    aliases: &'static [&'static str],
) -> TeamAlias {
    TeamAlias { canonical, code, aliases }
}

pub static NBA_TEAMS: &[TeamAlias] = &[
    team("Hawks", "ATL", &["Atlanta Hawks", "Atlanta"]),
    team("Celtics", "BOS", &["Boston Celtics", "Boston"]),
    team("Nets", "BKN", &["Brooklyn Nets", "Brooklyn", "BRK"]),
    team("Hornets", "CHA", &["Charlotte Hornets", "Charlotte"]),
    team("Bulls", "CHI", &["Chicago Bulls", "Chicago"]),
    team("Cavaliers", "CLE", &["Cleveland Cavaliers", "Cleveland", "Cavs"]),
    team("Mavericks", "DAL", &["Dallas Mavericks", "Dallas", "Mavs"]),
    team("Nuggets", "DEN", &["Denver Nuggets", "Denver"]),
    team("Pistons", "DET", &["Detroit Pistons", "Detroit"]),
    team("Warriors", "GSW", &["Golden State Warriors", "Golden State", "GS"]),
    team("Rockets", "HOU", &["Houston Rockets", "Houston"]),
    team("Pacers", "IND", &["Indiana Pacers", "Indiana"]),
    team("Clippers", "LAC", &["LA Clippers", "Los Angeles Clippers"]),
    team("Lakers", "LAL", &["Los Angeles Lakers"]),
    team("Grizzlies", "MEM", &["Memphis Grizzlies", "Memphis"]),
    team("Heat", "MIA", &["Miami Heat", "Miami"]),
    team("Bucks", "MIL", &["Milwaukee Bucks", "Milwaukee"]),
    team("Timberwolves", "MIN", &["Minnesota Timberwolves", "Minnesota", "Wolves"]),
    team("Pelicans", "NOP", &["New Orleans Pelicans", "New Orleans", "NO"]),
    team("Knicks", "NYK", &["New York Knicks", "New York", "NY"]),
    team("Thunder", "OKC", &["Oklahoma City Thunder", "Oklahoma City"]),
    team("Magic", "ORL", &["Orlando Magic", "Orlando"]),
    team("76ers", "PHI", &["Philadelphia 76ers", "Philadelphia", "Sixers"]),
    team("Suns", "PHX", &["Phoenix Suns", "Phoenix"]),
    team("Trail Blazers", "POR", &["Portland Trail Blazers", "Portland", "Blazers"]),
    team("Kings", "SAC", &["Sacramento Kings", "Sacramento"]),
    team("Spurs", "SAS", &["San Antonio Spurs", "San Antonio", "SA"]),
    team("Raptors", "TOR", &["Toronto Raptors", "Toronto"]),
    team("Jazz", "UTA", &["Utah Jazz", "Utah", "UTAH"]),
    team("Wizards", "WAS", &["Washington Wizards", "Washington", "WSH"]),
];

pub static WNBA_TEAMS: &[TeamAlias] = &[
    team("Dream", "ATL", &["Atlanta Dream", "Atlanta"]),
    team("Sky", "CHI", &["Chicago Sky", "Chicago"]),
    team("Sun", "CON", &["Connecticut Sun", "Connecticut", "CONN"]),
    team("Wings", "DAL", &["Dallas Wings", "Dallas"]),
    team("Valkyries", "GSV", &["Golden State Valkyries", "Golden State", "GS"]),
    team("Fever", "IND", &["Indiana Fever", "Indiana"]),
    team("Aces", "LVA", &["Las Vegas Aces", "Las Vegas", "LV"]),
    team("Sparks", "LAS", &["Los Angeles Sparks", "LA"]),
    team("Lynx", "MIN", &["Minnesota Lynx", "Minnesota"]),
    team("Liberty", "NYL", &["New York Liberty", "New York", "NY"]),
    team("Mercury", "PHX", &["Phoenix Mercury", "Phoenix", "PHO"]),
    team("Storm", "SEA", &["Seattle Storm", "Seattle"]),
    team("Mystics", "WAS", &["Washington Mystics", "Washington", "WSH"]),
];

/// College tables only carry programs that regularly list markets;
/// everything else passes through under its feed name.
pub static NCAAM_TEAMS: &[TeamAlias] = &[
    team("Duke", "DUKE", &["Duke Blue Devils"]),
    team("North Carolina", "UNC", &["North Carolina Tar Heels", "Tar Heels"]),
    team("Kentucky", "UK", &["Kentucky Wildcats"]),
    team("Kansas", "KU", &["Kansas Jayhawks", "KAN"]),
    team("Gonzaga", "GONZ", &["Gonzaga Bulldogs", "GONZAGA"]),
    team("UConn", "CONN", &["UConn Huskies", "Connecticut Huskies", "Connecticut"]),
    team("Houston", "HOU", &["Houston Cougars"]),
    team("Purdue", "PUR", &["Purdue Boilermakers"]),
    team("Auburn", "AUB", &["Auburn Tigers"]),
    team("Alabama", "ALA", &["Alabama Crimson Tide", "BAMA"]),
    team("Tennessee", "TENN", &["Tennessee Volunteers", "TN"]),
    team("Michigan State", "MSU", &["Michigan State Spartans", "MICHST"]),
    team("Arizona", "ARIZ", &["Arizona Wildcats", "ARIZONA"]),
    team("Baylor", "BAY", &["Baylor Bears", "BAYLOR"]),
    team("Florida", "FLA", &["Florida Gators", "UF"]),
    team("Marquette", "MARQ", &["Marquette Golden Eagles"]),
];

pub static NCAAW_TEAMS: &[TeamAlias] = &[
    team("South Carolina", "SC", &["South Carolina Gamecocks", "SCAR"]),
    team("UConn", "CONN", &["UConn Huskies", "Connecticut Huskies", "Connecticut"]),
    team("LSU", "LSU", &["LSU Tigers"]),
    team("Iowa", "IOWA", &["Iowa Hawkeyes"]),
    team("Texas", "TEX", &["Texas Longhorns", "TX"]),
    team("Notre Dame", "ND", &["Notre Dame Fighting Irish"]),
    team("UCLA", "UCLA", &["UCLA Bruins"]),
    team("Stanford", "STAN", &["Stanford Cardinal"]),
    team("USC", "USC", &["USC Trojans"]),
    team("Ohio State", "OSU", &["Ohio State Buckeyes"]),
    team("NC State", "NCST", &["NC State Wolfpack", "NCSU"]),
    team("Duke", "DUKE", &["Duke Blue Devils"]),
];

fn alias_key(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Case-insensitive alias lookup for one league.
#[derive(Debug, Clone)]
pub struct TeamDirectory {
    teams: &'static [TeamAlias],
    lookup: HashMap<String, usize>,
}

impl TeamDirectory {
    /// Index a table. A blank canonical/code or an alias claimed by two
    /// different teams is a defect in the table, not a runtime condition.
    pub fn build(teams: &'static [TeamAlias]) -> Result<Self> {
        let mut lookup: HashMap<String, usize> = HashMap::new();

        for (idx, t) in teams.iter().enumerate() {
            if t.canonical.trim().is_empty() || t.code.trim().is_empty() {
                return Err(AppError::Config(format!(
                    "team alias entry #{idx} has an empty canonical name or market code"
                )));
            }
            let keys = std::iter::once(t.canonical)
                .chain(std::iter::once(t.code))
                .chain(t.aliases.iter().copied());
            for alias in keys {
                let key = alias_key(alias);
                if key.is_empty() {
                    return Err(AppError::Config(format!(
                        "team alias entry '{}' has a blank alias",
                        t.canonical
                    )));
                }
                match lookup.get(&key) {
                    Some(&existing) if existing != idx => {
                        return Err(AppError::Config(format!(
                            "alias '{alias}' maps to both '{}' and '{}'",
                            teams[existing].canonical, t.canonical
                        )));
                    }
                    Some(_) => {}
                    None => {
                        lookup.insert(key, idx);
                    }
                }
            }
        }

        Ok(Self { teams, lookup })
    }

    pub fn for_sport(sport: Sport) -> Result<Self> {
        Self::build(match sport {
            Sport::Nba => NBA_TEAMS,
            Sport::Wnba => WNBA_TEAMS,
            Sport::Ncaam => NCAAM_TEAMS,
            Sport::Ncaaw => NCAAW_TEAMS,
        })
    }

    pub fn resolve(&self, raw: &str) -> Option<&'static TeamAlias> {
        let teams = self.teams;
        self.lookup.get(&alias_key(raw)).map(|&idx| &teams[idx])
    }

    /// First spelling that resolves wins; otherwise the first non-empty raw name.
    pub fn resolve_any<'a, I>(&self, candidates: I) -> (String, Option<&'static TeamAlias>)
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        for c in candidates.clone() {
            if let Some(t) = self.resolve(c) {
                return (t.canonical.to_string(), Some(t));
            }
        }
        let raw = candidates
            .into_iter()
            .find(|c| !c.trim().is_empty())
            .unwrap_or("")
            .trim()
            .to_string();
        (raw, None)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}
