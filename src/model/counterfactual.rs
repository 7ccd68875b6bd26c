//! Counterfactual adjustment engine.
//!
//! Translates hypothetical changes to the home team's turnover margin and
//! yards-per-play into an equivalent Elo shift, then re-runs the logistic.
//! This is a linear sensitivity tool, not a causal model: the weights are
//! heuristic constants from [`ModelConfig`].
//!
//! ```text
//! adj_elo = W_TO·Δto + W_OFF·Δoff + W_DEF·(−Δdef)
//! ```
//!
//! The defensive term is sign-flipped because fewer yards allowed is an
//! improvement.

use serde::Serialize;

use super::elo::{implied_rating_gap, probability, MatchContext, ProbabilityResult};
use super::error::ModelError;
use super::ratings::RatingTable;
use super::ModelConfig;

/// Largest turnover-margin change offered to callers, in either direction.
pub const TURNOVER_DELTA_LIMIT: i32 = 3;
/// Largest yards-per-play change offered to callers, in either direction.
pub const YPP_DELTA_LIMIT: f64 = 1.0;
/// Granularity of yards-per-play changes.
pub const YPP_DELTA_STEP: f64 = 0.1;

/// Hypothetical change to the home team's underlying stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CounterfactualDelta {
    pub delta_turnover_margin: i32,
    pub delta_offensive_ypp: f64,
    /// Positive means more yards allowed (worse defense).
    pub delta_defensive_ypp: f64,
}

impl CounterfactualDelta {
    pub fn new(delta_turnover_margin: i32, delta_offensive_ypp: f64, delta_defensive_ypp: f64) -> Self {
        Self {
            delta_turnover_margin,
            delta_offensive_ypp,
            delta_defensive_ypp,
        }
    }

    /// Snap to the documented ranges: turnovers to `[-3, 3]`, yards-per-play
    /// to `[-1.0, 1.0]` on a 0.1 grid. NaN passes through untouched so the
    /// engine can still reject it.
    pub fn clamped(self) -> Self {
        Self {
            delta_turnover_margin: self
                .delta_turnover_margin
                .clamp(-TURNOVER_DELTA_LIMIT, TURNOVER_DELTA_LIMIT),
            delta_offensive_ypp: snap_ypp(self.delta_offensive_ypp),
            delta_defensive_ypp: snap_ypp(self.delta_defensive_ypp),
        }
    }

    /// Equivalent Elo shift for the home team under `config`'s weights.
    pub fn rating_shift(&self, config: &ModelConfig) -> Result<f64, ModelError> {
        ensure_finite_delta("delta_offensive_ypp", self.delta_offensive_ypp)?;
        ensure_finite_delta("delta_defensive_ypp", self.delta_defensive_ypp)?;
        Ok(config.weight_turnover * f64::from(self.delta_turnover_margin)
            + config.weight_offense * self.delta_offensive_ypp
            + config.weight_defense * -self.delta_defensive_ypp)
    }
}

fn snap_ypp(v: f64) -> f64 {
    let stepped = (v / YPP_DELTA_STEP).round() * YPP_DELTA_STEP;
    stepped.clamp(-YPP_DELTA_LIMIT, YPP_DELTA_LIMIT)
}

fn ensure_finite_delta(field: &'static str, value: f64) -> Result<(), ModelError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ModelError::InvalidDelta { field, value })
    }
}

/// Before/after view of one counterfactual scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AdjustmentResult {
    pub base_probability: f64,
    pub adjusted_probability: f64,
    /// `(adjusted - base) * 100`
    pub delta_percentage_points: f64,
    /// Elo points the deltas translated into.
    pub rating_shift: f64,
}

/// Applies counterfactual deltas on top of a baseline win probability.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjustmentEngine {
    config: ModelConfig,
}

impl AdjustmentEngine {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Home win probability from raw ratings, home-field advantage applied
    /// unless `neutral`.
    pub fn base_probability(
        &self,
        home_rating: f64,
        away_rating: f64,
        neutral: bool,
    ) -> Result<f64, ModelError> {
        probability(home_rating + self.config.home_offset(neutral), away_rating)
    }

    /// Baseline and adjusted probabilities computed from raw ratings.
    pub fn adjust(
        &self,
        home_rating: f64,
        away_rating: f64,
        neutral: bool,
        delta: CounterfactualDelta,
    ) -> Result<AdjustmentResult, ModelError> {
        let shift = delta.rating_shift(&self.config)?;
        let home_effective = home_rating + self.config.home_offset(neutral);
        let base_probability = probability(home_effective, away_rating)?;
        let adjusted_probability = probability(home_effective + shift, away_rating)?;
        Ok(result(base_probability, adjusted_probability, shift))
    }

    /// Adjust an externally supplied baseline (e.g. a weekly model's
    /// `home_win_prob`). The baseline is passed through untouched as
    /// `base_probability`; the deltas shift its implied rating gap.
    pub fn adjust_baseline(
        &self,
        base_probability: f64,
        delta: CounterfactualDelta,
    ) -> Result<AdjustmentResult, ModelError> {
        if !base_probability.is_finite() || !(0.0..=1.0).contains(&base_probability) {
            return Err(ModelError::InvalidBaseline(base_probability));
        }
        let shift = delta.rating_shift(&self.config)?;
        if shift == 0.0 {
            return Ok(result(base_probability, base_probability, shift));
        }
        let gap = implied_rating_gap(base_probability);
        let shifted = probability(gap + shift, 0.0)?;
        // A baseline of exactly 0 or 1 cannot move further in the direction
        // of the shift; never report movement against its sign.
        let adjusted_probability = if shift > 0.0 {
            shifted.max(base_probability)
        } else {
            shifted.min(base_probability)
        };
        Ok(result(base_probability, adjusted_probability, shift))
    }

    /// Probability for a named matchup, resolving ratings through `ratings`.
    pub fn predict(
        &self,
        ratings: &RatingTable,
        context: &MatchContext,
    ) -> Result<ProbabilityResult, ModelError> {
        let home = ratings.rating(&context.home_team)?;
        let away = ratings.rating(&context.away_team)?;
        Ok(ProbabilityResult {
            home_win_probability: self.base_probability(home, away, context.neutral_site)?,
        })
    }

    /// [`adjust`](Self::adjust) for a named matchup.
    pub fn adjust_match(
        &self,
        ratings: &RatingTable,
        context: &MatchContext,
        delta: CounterfactualDelta,
    ) -> Result<AdjustmentResult, ModelError> {
        let home = ratings.rating(&context.home_team)?;
        let away = ratings.rating(&context.away_team)?;
        self.adjust(home, away, context.neutral_site, delta)
    }
}

fn result(base_probability: f64, adjusted_probability: f64, rating_shift: f64) -> AdjustmentResult {
    AdjustmentResult {
        base_probability,
        adjusted_probability,
        delta_percentage_points: (adjusted_probability - base_probability) * 100.0,
        rating_shift,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn engine() -> AdjustmentEngine {
        AdjustmentEngine::new(ModelConfig::default())
    }

    #[test]
    fn zero_delta_is_identity_from_ratings() {
        for neutral in [true, false] {
            let r = engine()
                .adjust(1612.3, 1544.8, neutral, CounterfactualDelta::default())
                .unwrap();
            assert_eq!(r.adjusted_probability, r.base_probability);
            assert_eq!(r.delta_percentage_points, 0.0);
        }
    }

    #[test]
    fn zero_delta_is_identity_from_baseline() {
        for p in [0.0, 0.137, 0.5, 0.55, 0.999, 1.0] {
            let r = engine()
                .adjust_baseline(p, CounterfactualDelta::default())
                .unwrap();
            assert_eq!(r.base_probability, p);
            assert_eq!(r.adjusted_probability, p);
        }
    }

    #[test]
    fn home_field_advantage_lifts_base_probability() {
        let e = engine();
        let neutral = e.base_probability(1600.0, 1500.0, true).unwrap();
        let home = e.base_probability(1600.0, 1500.0, false).unwrap();
        assert_relative_eq!(neutral, 0.6401, epsilon = 5e-5);
        // Effective 1655 vs 1500.
        assert_relative_eq!(home, probability(1655.0, 1500.0).unwrap(), epsilon = 1e-12);
        assert_relative_eq!(home, 0.7094, epsilon = 5e-5);
        assert!(home > neutral);
    }

    #[test]
    fn extra_turnover_on_weekly_baseline() {
        let delta = CounterfactualDelta::new(1, 0.0, 0.0);
        let r = engine().adjust_baseline(0.55, delta).unwrap();
        assert_relative_eq!(r.rating_shift, 45.0, epsilon = 1e-12);
        assert_eq!(r.base_probability, 0.55);
        assert!(r.adjusted_probability > 0.55);
        assert!(r.delta_percentage_points > 0.0);
        assert_relative_eq!(
            r.delta_percentage_points,
            (r.adjusted_probability - 0.55) * 100.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn baseline_near_certainty_moves_with_the_shift() {
        let e = engine();
        let gain = CounterfactualDelta::new(1, 0.0, 0.0);
        let loss = CounterfactualDelta::new(-1, 0.0, 0.0);

        let up = e.adjust_baseline(0.9999999, gain).unwrap();
        assert!(up.adjusted_probability > 0.9999999);
        assert!(up.delta_percentage_points > 0.0);
        let down = e.adjust_baseline(0.9999999, loss).unwrap();
        assert!(down.adjusted_probability < 0.9999999);
        assert!(down.delta_percentage_points < 0.0);

        let up = e.adjust_baseline(1.0, gain).unwrap();
        assert_eq!(up.adjusted_probability, 1.0);
        assert_eq!(up.delta_percentage_points, 0.0);
        let down = e.adjust_baseline(1.0, loss).unwrap();
        assert!(down.adjusted_probability < 1.0);
        assert!(down.delta_percentage_points <= 0.0);

        let up = e.adjust_baseline(0.0, gain).unwrap();
        assert!(up.adjusted_probability > 0.0);
        assert!(up.delta_percentage_points >= 0.0);
        let down = e.adjust_baseline(0.0, loss).unwrap();
        assert_eq!(down.adjusted_probability, 0.0);
        assert_eq!(down.delta_percentage_points, 0.0);
    }

    #[test]
    fn rating_shift_uses_weights_with_defensive_sign_flip() {
        let cfg = ModelConfig::default();
        let shift = CounterfactualDelta::new(2, 0.5, 0.3).rating_shift(&cfg).unwrap();
        assert_relative_eq!(shift, 2.0 * 45.0 + 0.5 * 120.0 - 0.3 * 120.0, epsilon = 1e-9);
    }

    #[test]
    fn turnover_margin_is_monotonic() {
        let e = engine();
        let mut last = 0.0;
        for to in -3..=3 {
            let r = e
                .adjust(1500.0, 1520.0, false, CounterfactualDelta::new(to, 0.2, -0.1))
                .unwrap();
            assert!(r.adjusted_probability > last, "to={} did not increase", to);
            last = r.adjusted_probability;
        }
    }

    #[test]
    fn more_yards_allowed_lowers_probability() {
        let e = engine();
        let mut last = 1.0;
        for step in -10..=10 {
            let def = step as f64 / 10.0;
            let r = e
                .adjust(1540.0, 1500.0, true, CounterfactualDelta::new(1, 0.0, def))
                .unwrap();
            assert!(r.adjusted_probability < last, "def={} did not decrease", def);
            last = r.adjusted_probability;
        }
    }

    #[test]
    fn range_limits_produce_valid_probability() {
        let e = engine();
        for delta in [
            CounterfactualDelta::new(3, 1.0, -1.0),
            CounterfactualDelta::new(-3, -1.0, 1.0),
        ] {
            let r = e.adjust(1500.0, 1500.0, false, delta).unwrap();
            assert!(r.adjusted_probability.is_finite());
            assert!(r.adjusted_probability > 0.0 && r.adjusted_probability < 1.0);
            let b = e.adjust_baseline(0.97, delta).unwrap();
            assert!(b.adjusted_probability > 0.0 && b.adjusted_probability < 1.0);
        }
    }

    #[test]
    fn non_finite_deltas_are_rejected() {
        let e = engine();
        let err = e
            .adjust(1500.0, 1500.0, false, CounterfactualDelta::new(0, f64::NAN, 0.0))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidDelta { field: "delta_offensive_ypp", .. }));
        let err = e
            .adjust_baseline(0.5, CounterfactualDelta::new(0, 0.0, f64::INFINITY))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidDelta { field: "delta_defensive_ypp", .. }));
    }

    #[test]
    fn out_of_range_deltas_are_not_revalidated() {
        let r = engine()
            .adjust(1500.0, 1500.0, true, CounterfactualDelta::new(10, 5.0, 0.0))
            .unwrap();
        assert_relative_eq!(r.rating_shift, 450.0 + 600.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_baselines_are_rejected() {
        let e = engine();
        for p in [-0.01, 1.2, f64::NAN] {
            assert!(matches!(
                e.adjust_baseline(p, CounterfactualDelta::default()),
                Err(ModelError::InvalidBaseline(_))
            ));
        }
    }

    #[test]
    fn invalid_ratings_propagate() {
        assert!(matches!(
            engine().adjust(f64::NAN, 1500.0, false, CounterfactualDelta::default()),
            Err(ModelError::InvalidRating { side: "home", .. })
        ));
    }

    #[test]
    fn custom_weights_are_honoured() {
        let cfg = ModelConfig {
            weight_turnover: 0.0,
            ..ModelConfig::default()
        };
        let r = AdjustmentEngine::new(cfg)
            .adjust(1500.0, 1500.0, false, CounterfactualDelta::new(3, 0.0, 0.0))
            .unwrap();
        assert_eq!(r.adjusted_probability, r.base_probability);
    }

    #[test]
    fn clamped_snaps_to_documented_grid() {
        let d = CounterfactualDelta::new(7, 0.34, -2.5).clamped();
        assert_eq!(d.delta_turnover_margin, 3);
        assert_relative_eq!(d.delta_offensive_ypp, 0.3, epsilon = 1e-12);
        assert_relative_eq!(d.delta_defensive_ypp, -1.0, epsilon = 1e-12);
        assert!(CounterfactualDelta::new(0, f64::NAN, 0.0)
            .clamped()
            .delta_offensive_ypp
            .is_nan());
    }

    #[test]
    fn predict_uses_table_defaults() {
        let table = RatingTable::new(
            HashMap::from([("BUF".to_string(), 1600.0)]),
            1500.0,
            false,
        );
        let ctx = MatchContext::new("BUF", "NYJ", true);
        let r = engine().predict(&table, &ctx).unwrap();
        assert_relative_eq!(r.home_win_probability, 0.6401, epsilon = 5e-5);
    }

    #[test]
    fn strict_table_surfaces_missing_team() {
        let table = RatingTable::new(HashMap::from([("BUF".to_string(), 1600.0)]), 1500.0, true);
        let ctx = MatchContext::new("BUF", "NYJ", false);
        assert_eq!(
            engine().adjust_match(&table, &ctx, CounterfactualDelta::default()),
            Err(ModelError::MissingTeamRating("NYJ".into()))
        );
    }
}
