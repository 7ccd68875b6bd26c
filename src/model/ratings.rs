use std::collections::HashMap;

use super::error::ModelError;
use super::DEFAULT_RATING;

/// Read-only Elo snapshot with an explicit default-on-miss policy.
///
/// All lookups go through [`RatingTable::rating`] so the default (or the
/// strict-mode error) is applied in one place.
#[derive(Debug, Clone)]
pub struct RatingTable {
    ratings: HashMap<String, f64>,
    default_rating: f64,
    strict: bool,
}

impl Default for RatingTable {
    fn default() -> Self {
        Self::new(HashMap::new(), DEFAULT_RATING, false)
    }
}

impl RatingTable {
    pub fn new(ratings: HashMap<String, f64>, default_rating: f64, strict: bool) -> Self {
        Self {
            ratings,
            default_rating,
            strict,
        }
    }

    /// Rating for `team`; the default rating when absent, or
    /// [`ModelError::MissingTeamRating`] in strict mode.
    pub fn rating(&self, team: &str) -> Result<f64, ModelError> {
        match self.ratings.get(team) {
            Some(r) => Ok(*r),
            None if self.strict => Err(ModelError::MissingTeamRating(team.to_string())),
            None => Ok(self.default_rating),
        }
    }

    /// Team codes in alphabetical order.
    pub fn teams(&self) -> Vec<String> {
        let mut teams: Vec<String> = self.ratings.keys().cloned().collect();
        teams.sort();
        teams
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    pub fn default_rating(&self) -> f64 {
        self.default_rating
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}
