//! JSON payloads served by the dashboard, built from the shared state.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::model::{
    favorite, AdjustmentResult, CounterfactualDelta, Favorite, MatchContext, ModelConfig,
    ModelError, TeamRollingStats,
};

use super::AppState;

pub type ApiError = (StatusCode, String);

pub fn model_error(err: ModelError) -> ApiError {
    let status = match err {
        ModelError::MissingTeamRating(_) => StatusCode::NOT_FOUND,
        ModelError::InvalidRating { .. }
        | ModelError::InvalidDelta { .. }
        | ModelError::InvalidBaseline(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, err.to_string())
}

/// Counterfactual query parameters: `to`, `off`, `def`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DeltaParams {
    pub to: Option<i32>,
    pub off: Option<f64>,
    pub def: Option<f64>,
}

impl DeltaParams {
    /// `None` when no delta was requested; otherwise clamped to the slider ranges.
    pub fn delta(&self) -> Option<CounterfactualDelta> {
        if self.to.is_none() && self.off.is_none() && self.def.is_none() {
            return None;
        }
        Some(
            CounterfactualDelta::new(
                self.to.unwrap_or(0),
                self.off.unwrap_or(0.0),
                self.def.unwrap_or(0.0),
            )
            .clamped(),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchupParams {
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub neutral: bool,
    pub to: Option<i32>,
    pub off: Option<f64>,
    pub def: Option<f64>,
}

impl MatchupParams {
    fn delta_params(&self) -> DeltaParams {
        DeltaParams {
            to: self.to,
            off: self.off,
            def: self.def,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub ratings_source: String,
    pub team_count: usize,
    pub default_rating: f64,
    pub strict_teams: bool,
    pub predictions_source: Option<String>,
    pub game_count: usize,
    pub stats_team_count: usize,
    pub weights: ModelConfig,
    pub loaded_at: String,
}

#[derive(Debug, Serialize)]
pub struct GameRow {
    pub index: usize,
    pub label: String,
    pub home_team: String,
    pub away_team: String,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub favorite: Favorite,
    pub kickoff_mx: Option<String>,
    pub gameday: Option<String>,
    pub gametime: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CounterfactualView {
    pub delta: CounterfactualDelta,
    #[serde(flatten)]
    pub result: AdjustmentResult,
    pub adjusted_favorite: Favorite,
    pub home_stats_before: Option<TeamRollingStats>,
    pub home_stats_after: Option<TeamRollingStats>,
}

#[derive(Debug, Serialize)]
pub struct GameView {
    #[serde(flatten)]
    pub game: GameRow,
    pub counterfactual: Option<CounterfactualView>,
}

#[derive(Debug, Serialize)]
pub struct MatchupView {
    pub title: String,
    pub context: MatchContext,
    pub home_rating: f64,
    pub away_rating: f64,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub favorite: Favorite,
    pub counterfactual: Option<CounterfactualView>,
}

pub fn status_view(state: &AppState) -> StatusView {
    StatusView {
        ratings_source: state.ratings_source.display().to_string(),
        team_count: state.ratings.len(),
        default_rating: state.ratings.default_rating(),
        strict_teams: state.ratings.is_strict(),
        predictions_source: state
            .slate
            .as_ref()
            .map(|s| s.source.display().to_string()),
        game_count: state.slate.as_ref().map_or(0, |s| s.games.len()),
        stats_team_count: state.stats.as_ref().map_or(0, |s| s.len()),
        weights: *state.engine.config(),
        loaded_at: state.loaded_at.to_rfc3339(),
    }
}

pub fn week_rows(state: &AppState) -> Result<Vec<GameRow>, ApiError> {
    let slate = state.slate.as_ref().ok_or_else(|| missing_slate(state))?;
    Ok(slate
        .games
        .iter()
        .enumerate()
        .map(|(index, g)| GameRow {
            index,
            label: g.matchup_label(),
            home_team: g.home_team.clone(),
            away_team: g.away_team.clone(),
            home_win_probability: g.home_win_prob,
            away_win_probability: 1.0 - g.home_win_prob,
            favorite: favorite(&g.home_team, &g.away_team, g.home_win_prob),
            kickoff_mx: g.kickoff_mx.clone(),
            gameday: g.gameday.clone(),
            gametime: g.gametime.clone(),
        })
        .collect())
}

/// One weekly game; deltas, when present, adjust the weekly baseline.
pub fn game_view(state: &AppState, index: usize, params: &DeltaParams) -> Result<GameView, ApiError> {
    let game = week_rows(state)?
        .into_iter()
        .nth(index)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("No game at index {}", index)))?;

    let counterfactual = match params.delta() {
        Some(delta) => {
            let result = state
                .engine
                .adjust_baseline(game.home_win_probability, delta)
                .map_err(model_error)?;
            Some(counterfactual_view(state, &game.home_team, &game.away_team, delta, result))
        }
        None => None,
    };

    Ok(GameView {
        game,
        counterfactual,
    })
}

/// Hypothetical matchup from the Elo snapshot.
pub fn matchup_view(state: &AppState, params: &MatchupParams) -> Result<MatchupView, ApiError> {
    let context = MatchContext::new(params.home.trim(), params.away.trim(), params.neutral);
    let home_rating = state.ratings.rating(&context.home_team).map_err(model_error)?;
    let away_rating = state.ratings.rating(&context.away_team).map_err(model_error)?;
    let outcome = state
        .engine
        .predict(&state.ratings, &context)
        .map_err(model_error)?;

    let counterfactual = match params.delta_params().delta() {
        Some(delta) => {
            let result = state
                .engine
                .adjust_match(&state.ratings, &context, delta)
                .map_err(model_error)?;
            Some(counterfactual_view(
                state,
                &context.home_team,
                &context.away_team,
                delta,
                result,
            ))
        }
        None => None,
    };

    Ok(MatchupView {
        title: context.title(),
        favorite: favorite(
            &context.home_team,
            &context.away_team,
            outcome.home_win_probability,
        ),
        home_rating,
        away_rating,
        home_win_probability: outcome.home_win_probability,
        away_win_probability: outcome.away_win_probability(),
        counterfactual,
        context,
    })
}

fn counterfactual_view(
    state: &AppState,
    home_team: &str,
    away_team: &str,
    delta: CounterfactualDelta,
    result: AdjustmentResult,
) -> CounterfactualView {
    let home_stats = state.stats.as_ref().and_then(|s| s.get(home_team)).copied();
    CounterfactualView {
        delta,
        adjusted_favorite: favorite(home_team, away_team, result.adjusted_probability),
        result,
        home_stats_before: home_stats,
        home_stats_after: home_stats.map(|s| s.with_delta(&delta)),
    }
}

fn missing_slate(state: &AppState) -> ApiError {
    let expected: Vec<String> = state
        .predictions_candidates
        .iter()
        .map(|p| format!("- {}", p.display()))
        .collect();
    (
        StatusCode::NOT_FOUND,
        format!(
            "Missing predictions CSV. Expected one of:\n{}",
            expected.join("\n")
        ),
    )
}
