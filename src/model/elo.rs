//! Elo logistic win-probability law.
//!
//! A 400-point rating gap corresponds to 10:1 odds. Venue effects are kept out
//! of this module: callers shift the home rating by
//! [`ModelConfig::home_offset`](super::ModelConfig::home_offset) first.

use serde::Serialize;

use super::error::ModelError;

/// Rating gap that corresponds to a tenfold change in odds.
pub const ELO_SCALE: f64 = 400.0;

/// Smallest probability [`probability`] reports.
pub const PROB_FLOOR: f64 = f64::MIN_POSITIVE;
/// Largest probability [`probability`] reports.
pub const PROB_CEIL: f64 = 1.0 - f64::EPSILON;

/// Probability that the home side wins given both (venue-adjusted) ratings.
///
/// `p = 1 / (1 + 10^((rating_away - rating_home) / 400))`, kept inside
/// `[PROB_FLOOR, PROB_CEIL]` so huge finite gaps never saturate to 0 or 1.
pub fn probability(rating_home: f64, rating_away: f64) -> Result<f64, ModelError> {
    ensure_finite_rating("home", rating_home)?;
    ensure_finite_rating("away", rating_away)?;
    let p = 1.0 / (1.0 + 10.0_f64.powf((rating_away - rating_home) / ELO_SCALE));
    Ok(p.clamp(PROB_FLOOR, PROB_CEIL))
}

/// Rating gap (home minus away) that the logistic maps onto `p`.
///
/// Inverse of [`probability`]. Only an exact 0 or 1 (or the single
/// representable value above `PROB_CEIL`) is moved, onto the range
/// [`probability`] can produce, so the gap is always finite.
pub fn implied_rating_gap(p: f64) -> f64 {
    let p = p.clamp(PROB_FLOOR, PROB_CEIL);
    ELO_SCALE * (p / (1.0 - p)).log10()
}

fn ensure_finite_rating(side: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::InvalidRating { side, value })
    }
}

/// Which teams meet, and whether home-field advantage applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchContext {
    pub home_team: String,
    pub away_team: String,
    pub neutral_site: bool,
}

impl MatchContext {
    pub fn new(home_team: impl Into<String>, away_team: impl Into<String>, neutral_site: bool) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            neutral_site,
        }
    }

    /// Display title, e.g. `"KC @ BUF"` or `"KC vs BUF (Neutral)"`.
    pub fn title(&self) -> String {
        if self.neutral_site {
            format!("{} vs {} (Neutral)", self.away_team, self.home_team)
        } else {
            format!("{} @ {}", self.away_team, self.home_team)
        }
    }
}

/// Binary, zero-sum outcome estimate. There is no draw state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbabilityResult {
    pub home_win_probability: f64,
}

impl ProbabilityResult {
    pub fn away_win_probability(&self) -> f64 {
        1.0 - self.home_win_probability
    }
}
