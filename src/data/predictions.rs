//! Weekly baseline predictions produced by the offline model.
//!
//! The table must carry `home_team`, `away_team` and `home_win_prob`.
//! `kickoff_mx`, `gameday` and `gametime` are optional and only feed the
//! matchup label.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const REQUIRED_COLUMNS: [&str; 3] = ["home_team", "away_team", "home_win_prob"];

/// One upcoming game and its precomputed home win probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPrediction {
    pub home_team: String,
    pub away_team: String,
    pub home_win_prob: f64,
    /// Kickoff in Mexico City local time
    #[serde(default)]
    pub kickoff_mx: Option<String>,
    #[serde(default)]
    pub gameday: Option<String>,
    #[serde(default)]
    pub gametime: Option<String>,
}

impl WeeklyPrediction {
    /// `"AWAY @ HOME — <kickoff>"`, falling back to game day and time (both
    /// required), then to the bare matchup.
    pub fn matchup_label(&self) -> String {
        let matchup = format!("{} @ {}", self.away_team, self.home_team);
        if let Some(kickoff) = &self.kickoff_mx {
            return format!("{} — {}", matchup, kickoff);
        }
        match (&self.gameday, &self.gametime) {
            (Some(day), Some(time)) => format!("{} — {} {}", matchup, day, time),
            _ => matchup,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeeklySlate {
    pub source: PathBuf,
    pub games: Vec<WeeklyPrediction>,
}

impl WeeklySlate {
    /// First of `candidates` that exists on disk, in order of preference.
    pub fn find_source(candidates: &[PathBuf]) -> Option<&Path> {
        candidates.iter().map(PathBuf::as_path).find(|p| {
            let exists = p.is_file();
            debug!("Predictions candidate {}: exists={}", p.display(), exists);
            exists
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open predictions CSV {}", path.display()))?;
        let games = parse_predictions(file)
            .with_context(|| format!("Invalid predictions CSV {}", path.display()))?;
        info!("Loaded {} weekly predictions from {}", games.len(), path.display());
        Ok(WeeklySlate {
            source: path.to_path_buf(),
            games,
        })
    }

    pub fn get(&self, index: usize) -> Option<&WeeklyPrediction> {
        self.games.get(index)
    }
}

/// Parse a predictions table, checking the required columns up front.
pub fn parse_predictions<R: Read>(reader: R) -> Result<Vec<WeeklyPrediction>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let missing: BTreeSet<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !headers.iter().any(|h| h == *c))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!("Predictions CSV is missing columns: {:?}", missing);
    }

    let mut games = Vec::new();
    for (i, row) in rdr.deserialize::<WeeklyPrediction>().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let game = row.with_context(|| format!("Malformed predictions row at line {}", line))?;
        if !game.home_win_prob.is_finite() || !(0.0..=1.0).contains(&game.home_win_prob) {
            anyhow::bail!(
                "home_win_prob {} at line {} is outside [0, 1]",
                game.home_win_prob,
                line
            );
        }
        games.push(game);
    }
    Ok(games)
}
