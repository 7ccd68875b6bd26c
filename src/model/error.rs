use thiserror::Error;

/// Failure of a single probability or adjustment computation.
///
/// Errors never carry a partial result; the caller decides whether to fall
/// back to a default, log, or abort.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Invalid {side} rating: {value} (ratings must be finite)")]
    InvalidRating { side: &'static str, value: f64 },

    #[error("Invalid counterfactual delta {field}: {value} (deltas must be finite)")]
    InvalidDelta { field: &'static str, value: f64 },

    #[error("No rating for team '{0}'")]
    MissingTeamRating(String),

    #[error("Invalid baseline probability: {0} (expected a value in [0, 1])")]
    InvalidBaseline(f64),
}
