use serde::Serialize;

/// Which side of the matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Favorite {
    pub side: Side,
    pub team: String,
    /// `max(p_home, 1 - p_home)`
    pub probability: f64,
    /// True when `p_home == 0.5` and the home team was picked by convention.
    pub tossup: bool,
}

/// Favorite for a binary matchup. An exact 50/50 goes to the home team and is
/// flagged as a toss-up so the display layer can say so.
pub fn favorite(home_team: &str, away_team: &str, p_home: f64) -> Favorite {
    if p_home >= 0.5 {
        Favorite {
            side: Side::Home,
            team: home_team.to_string(),
            probability: p_home,
            tossup: p_home == 0.5,
        }
    } else {
        Favorite {
            side: Side::Away,
            team: away_team.to_string(),
            probability: 1.0 - p_home,
            tossup: false,
        }
    }
}
