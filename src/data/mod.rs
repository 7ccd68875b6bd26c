use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub mod predictions;

pub use predictions::WeeklySlate;

use crate::model::{RatingTable, StatsTable, TeamRollingStats};

/// Load an Elo snapshot (`{"TEAM": 1532.4, ...}`) from disk.
pub fn load_ratings(path: &Path, default_rating: f64, strict: bool) -> Result<RatingTable> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read Elo ratings from {}", path.display()))?;
    let table = parse_ratings(&raw, default_rating, strict)
        .with_context(|| format!("Invalid Elo ratings file {}", path.display()))?;
    info!("Loaded {} team ratings from {}", table.len(), path.display());
    Ok(table)
}

pub fn parse_ratings(raw: &str, default_rating: f64, strict: bool) -> Result<RatingTable> {
    let ratings: HashMap<String, f64> =
        serde_json::from_str(raw).context("Expected a JSON object of team -> numeric rating")?;
    Ok(RatingTable::new(ratings, default_rating, strict))
}

/// Load rolling team stats (`{"TEAM": {"off_ypp": .., "def_ypp": .., "to_margin": ..}}`).
pub fn load_stats(path: &Path) -> Result<StatsTable> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read team stats from {}", path.display()))?;
    let table = parse_stats(&raw)
        .with_context(|| format!("Invalid team stats file {}", path.display()))?;
    info!("Loaded rolling stats for {} teams from {}", table.len(), path.display());
    Ok(table)
}

pub fn parse_stats(raw: &str) -> Result<StatsTable> {
    let stats: HashMap<String, TeamRollingStats> = serde_json::from_str(raw)?;
    Ok(StatsTable::new(stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn ratings_parse_from_json_object() {
        let t = parse_ratings(r#"{"KC": 1688.4, "DET": 1640}"#, 1500.0, false).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.rating("DET").unwrap(), 1640.0);
        assert_eq!(t.rating("CHI").unwrap(), 1500.0);
    }

    #[test]
    fn non_numeric_rating_is_an_error() {
        assert!(parse_ratings(r#"{"KC": "high"}"#, 1500.0, false).is_err());
        assert!(parse_ratings(r#"[1500, 1600]"#, 1500.0, false).is_err());
    }

    #[test]
    fn ratings_load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"SF": 1610.0}}"#).unwrap();
        let t = load_ratings(f.path(), 1500.0, true).unwrap();
        assert_eq!(t.rating("SF").unwrap(), 1610.0);
        assert!(t.rating("SEA").is_err());
    }

    #[test]
    fn missing_ratings_file_names_the_path() {
        let err = load_ratings(Path::new("/nonexistent/elo.json"), 1500.0, false).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/elo.json"));
    }

    #[test]
    fn stats_parse_short_keys() {
        let t = parse_stats(
            r#"{"GB": {"off_ypp": 5.8, "def_ypp": 5.2, "to_margin": 0.6},
                "MIN": {"offensive_yards_per_play": 5.4, "defensive_yards_per_play": 5.0, "turnover_margin": -0.2}}"#,
        )
        .unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.get("GB").unwrap().offensive_yards_per_play, 5.8);
        assert_eq!(t.get("MIN").unwrap().turnover_margin, -0.2);
    }
}
