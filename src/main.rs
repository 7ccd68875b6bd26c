use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};

mod config;
mod dashboard;
mod data;
mod model;

use config::Config;
use dashboard::AppState;
use data::WeeklySlate;
use model::AdjustmentEngine;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let model_config = config.model_config();
    info!(
        "Model weights: HFA={} TO={} OFF={} DEF={}",
        model_config.home_field_advantage,
        model_config.weight_turnover,
        model_config.weight_offense,
        model_config.weight_defense
    );

    let ratings = data::load_ratings(
        &config.elo_ratings_path,
        config.default_rating,
        config.strict_teams,
    )?;
    if ratings.is_empty() {
        warn!("Elo snapshot is empty; every team will use the default rating");
    }
    if config.strict_teams {
        info!("Strict team mode: unknown team codes are rejected");
    }

    let slate = match WeeklySlate::find_source(&config.predictions_paths) {
        Some(path) => Some(WeeklySlate::load(path)?),
        None => {
            warn!(
                "No weekly predictions found (looked in {:?}); /api/week is unavailable",
                config.predictions_paths
            );
            None
        }
    };

    let stats = match &config.team_stats_path {
        Some(path) => Some(data::load_stats(path)?),
        None => None,
    };

    let state = AppState {
        engine: AdjustmentEngine::new(model_config),
        ratings,
        ratings_source: config.elo_ratings_path.clone(),
        slate,
        predictions_candidates: config.predictions_paths.clone(),
        stats,
        loaded_at: Utc::now(),
    };

    let app = dashboard::router(state);
    let addr = config.listen_addr()?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
