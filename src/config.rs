use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::model::ModelConfig;

/// Elo matchup predictor with counterfactual adjustments
#[derive(Parser, Debug, Clone)]
#[command(name = "matchup-predictor", version, about)]
pub struct Config {
    /// Elo ratings snapshot (JSON object of team code -> rating)
    #[arg(long, env = "ELO_RATINGS_PATH", default_value = "elo_ratings.json")]
    pub elo_ratings_path: PathBuf,

    /// Weekly predictions CSV locations, in order of preference
    #[arg(
        long,
        env = "PREDICTIONS_PATHS",
        value_delimiter = ',',
        default_value = "data/predictions_this_weekend.csv,notebooks/predictions_this_weekend.csv"
    )]
    pub predictions_paths: Vec<PathBuf>,

    /// Rolling team stats (JSON object of team code -> {off_ypp, def_ypp, to_margin})
    #[arg(long, env = "TEAM_STATS_PATH")]
    pub team_stats_path: Option<PathBuf>,

    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
    pub dashboard_addr: String,

    /// Home-field advantage in Elo points
    #[arg(long, env = "HOME_FIELD_ADVANTAGE", default_value = "55.0")]
    pub home_field_advantage: f64,

    /// Elo points per unit of turnover margin
    #[arg(long, env = "WEIGHT_TURNOVER", default_value = "45.0")]
    pub weight_turnover: f64,

    /// Elo points per offensive yard per play
    #[arg(long, env = "WEIGHT_OFFENSE", default_value = "120.0")]
    pub weight_offense: f64,

    /// Elo points per defensive yard per play allowed
    #[arg(long, env = "WEIGHT_DEFENSE", default_value = "120.0")]
    pub weight_defense: f64,

    /// Rating assumed for teams missing from the snapshot
    #[arg(long, env = "DEFAULT_RATING", default_value = "1500.0")]
    pub default_rating: f64,

    /// Treat teams missing from the snapshot as an error instead of defaulting
    #[arg(long, env = "STRICT_TEAMS", default_value = "false")]
    pub strict_teams: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let weights = [
            ("home_field_advantage", self.home_field_advantage),
            ("weight_turnover", self.weight_turnover),
            ("weight_offense", self.weight_offense),
            ("weight_defense", self.weight_defense),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("{} must be a finite, non-negative number (got {})", name, value);
            }
        }
        if !self.default_rating.is_finite() {
            anyhow::bail!("default_rating must be finite");
        }
        if self.predictions_paths.is_empty() {
            anyhow::bail!("at least one predictions path is required");
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.dashboard_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid dashboard_addr '{}': {}", self.dashboard_addr, e))
    }

    /// The weight table handed to the model.
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            home_field_advantage: self.home_field_advantage,
            weight_turnover: self.weight_turnover,
            weight_offense: self.weight_offense,
            weight_defense: self.weight_defense,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["matchup-predictor"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_model_constants() {
        let cfg = parse(&[]);
        cfg.validate().unwrap();
        assert_eq!(cfg.model_config(), ModelConfig::default());
        assert_eq!(cfg.default_rating, crate::model::DEFAULT_RATING);
        assert!(!cfg.strict_teams);
        assert_eq!(cfg.predictions_paths.len(), 2);
        assert_eq!(
            cfg.predictions_paths[0],
            PathBuf::from("data/predictions_this_weekend.csv")
        );
    }

    #[test]
    fn weights_are_overridable() {
        let cfg = parse(&["--weight-turnover", "30", "--home-field-advantage", "0"]);
        let m = cfg.model_config();
        assert_eq!(m.weight_turnover, 30.0);
        assert_eq!(m.home_field_advantage, 0.0);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let cfg = parse(&["--weight-defense=-5"]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bad_listen_address_is_rejected() {
        let cfg = parse(&["--dashboard-addr", "localhost"]);
        assert!(cfg.validate().is_err());
    }
}
