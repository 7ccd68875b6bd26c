//! Rating-to-probability model and the counterfactual adjustment engine.
//!
//! Everything in here is a pure function of its inputs: no I/O, no logging,
//! no shared mutable state. The heuristic weight table is carried in a
//! [`ModelConfig`] value built once at startup and passed in explicitly.

pub mod counterfactual;
pub mod elo;
pub mod error;
pub mod favorite;
pub mod ratings;
pub mod stats;

pub use counterfactual::{AdjustmentEngine, AdjustmentResult, CounterfactualDelta};
pub use elo::MatchContext;
pub use error::ModelError;
pub use favorite::{favorite, Favorite};
pub use ratings::RatingTable;
pub use stats::{StatsTable, TeamRollingStats};

use serde::Serialize;

/// Home-field advantage in Elo points.
pub const HOME_FIELD_ADVANTAGE: f64 = 55.0;
/// Elo points per unit of turnover margin.
pub const WEIGHT_TURNOVER: f64 = 45.0;
/// Elo points per offensive yard-per-play.
pub const WEIGHT_OFFENSE: f64 = 120.0;
/// Elo points per defensive yard-per-play allowed (applied with a sign flip).
pub const WEIGHT_DEFENSE: f64 = 120.0;
/// Rating assumed for a team missing from the snapshot.
pub const DEFAULT_RATING: f64 = 1500.0;

/// Heuristic weight table shared by the probability model and the
/// adjustment engine.
///
/// These are fixed sensitivity constants, not fitted parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelConfig {
    pub home_field_advantage: f64,
    pub weight_turnover: f64,
    pub weight_offense: f64,
    pub weight_defense: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            home_field_advantage: HOME_FIELD_ADVANTAGE,
            weight_turnover: WEIGHT_TURNOVER,
            weight_offense: WEIGHT_OFFENSE,
            weight_defense: WEIGHT_DEFENSE,
        }
    }
}

impl ModelConfig {
    /// Rating points added to the home side: zero on a neutral site.
    pub fn home_offset(&self, neutral_site: bool) -> f64 {
        if neutral_site {
            0.0
        } else {
            self.home_field_advantage
        }
    }
}
