use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::counterfactual::CounterfactualDelta;

/// Rolling efficiency profile for one team.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamRollingStats {
    #[serde(alias = "off_ypp")]
    pub offensive_yards_per_play: f64,
    /// Yards allowed per play; lower is better.
    #[serde(alias = "def_ypp")]
    pub defensive_yards_per_play: f64,
    #[serde(alias = "to_margin")]
    pub turnover_margin: f64,
}

impl TeamRollingStats {
    /// The stat line the counterfactual describes.
    pub fn with_delta(&self, delta: &CounterfactualDelta) -> Self {
        Self {
            offensive_yards_per_play: self.offensive_yards_per_play + delta.delta_offensive_ypp,
            defensive_yards_per_play: self.defensive_yards_per_play + delta.delta_defensive_ypp,
            turnover_margin: self.turnover_margin + f64::from(delta.delta_turnover_margin),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatsTable {
    stats: HashMap<String, TeamRollingStats>,
}

impl StatsTable {
    pub fn new(stats: HashMap<String, TeamRollingStats>) -> Self {
        Self { stats }
    }

    pub fn get(&self, team: &str) -> Option<&TeamRollingStats> {
        self.stats.get(team)
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn delta_moves_each_stat() {
        let base = TeamRollingStats {
            offensive_yards_per_play: 5.6,
            defensive_yards_per_play: 5.1,
            turnover_margin: 0.4,
        };
        let after = base.with_delta(&CounterfactualDelta::new(-2, 0.3, -0.5));
        assert_relative_eq!(after.offensive_yards_per_play, 5.9, epsilon = 1e-9);
        assert_relative_eq!(after.defensive_yards_per_play, 4.6, epsilon = 1e-9);
        assert_relative_eq!(after.turnover_margin, -1.6, epsilon = 1e-9);
    }

    #[test]
    fn short_field_names_deserialize() {
        let s: TeamRollingStats =
            serde_json::from_str(r#"{"off_ypp": 6.1, "def_ypp": 4.9, "to_margin": 1.0}"#).unwrap();
        assert_relative_eq!(s.offensive_yards_per_play, 6.1);
        assert_relative_eq!(s.defensive_yards_per_play, 4.9);
        assert_relative_eq!(s.turnover_margin, 1.0);
    }

    #[test]
    fn missing_team_is_none() {
        assert!(StatsTable::default().get("KC").is_none());
    }
}
