use axum::{
    extract::{Path, Query, State},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::debug;

pub mod views;

use crate::data::WeeklySlate;
use crate::model::{AdjustmentEngine, RatingTable, StatsTable};
use views::{ApiError, DeltaParams, MatchupParams};

/// Read-only inputs loaded once at startup and shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub engine: AdjustmentEngine,
    pub ratings: RatingTable,
    pub ratings_source: PathBuf,
    pub slate: Option<WeeklySlate>,
    /// Where the weekly slate was looked for, reported when it is missing.
    pub predictions_candidates: Vec<PathBuf>,
    pub stats: Option<StatsTable>,
    pub loaded_at: DateTime<Utc>,
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/status", get(status_handler))
        .route("/api/teams", get(teams_handler))
        .route("/api/week", get(week_handler))
        .route("/api/week/:index", get(game_handler))
        .route("/api/matchup", get(matchup_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(views::status_view(&state))
}

/// GET /api/teams
async fn teams_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.ratings.teams())
}

/// GET /api/week
async fn week_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    views::week_rows(&state).map(Json)
}

/// GET /api/week/:index?to=1&off=0.2&def=-0.1
async fn game_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Query(params): Query<DeltaParams>,
) -> Result<impl IntoResponse, ApiError> {
    debug!("Weekly game {} requested with {:?}", index, params);
    views::game_view(&state, index, &params).map(Json)
}

/// GET /api/matchup?home=BUF&away=KC&neutral=false&to=1&off=0.2&def=-0.1
async fn matchup_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MatchupParams>,
) -> Result<impl IntoResponse, ApiError> {
    debug!("Matchup requested: {:?}", params);
    views::matchup_view(&state, &params).map(Json)
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Matchup Predictor</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #6c63ff;
    --green: #00c896;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  nav button { background: none; border: 1px solid var(--border); color: var(--muted); padding: .3rem .8rem; border-radius: 6px; cursor: pointer; }
  nav button.active { border-color: var(--accent); color: var(--accent); }
  main { padding: 1.5rem 2rem; display: grid; gap: 1.5rem; }
  .panel { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1.2rem; display: grid; gap: .8rem; }
  .row { display: flex; gap: 1rem; flex-wrap: wrap; align-items: center; }
  .metric .label { color: var(--muted); font-size: .8rem; text-transform: uppercase; }
  .metric .value { font-size: 1.7rem; font-weight: 700; }
  .bar { height: 10px; background: var(--border); border-radius: 5px; overflow: hidden; }
  .bar > div { height: 100%; background: var(--accent); }
  .pos { color: var(--green); }
  .neg { color: var(--red); }
  select, input { background: var(--bg); color: var(--text); border: 1px solid var(--border); border-radius: 6px; padding: .3rem; }
  .muted { color: var(--muted); font-size: .85rem; }
  .hidden { display: none; }
</style>
</head>
<body>
<header>
  <h1>Matchup Predictor</h1>
  <nav>
    <button id="tab-week" class="active" onclick="show('week')">This Week</button>
    <button id="tab-matchup" onclick="show('matchup')">Hypothetical Matchup</button>
  </nav>
  <span class="muted" style="margin-left:auto" id="source"></span>
</header>

<main>
  <section id="page-week" class="panel">
    <div class="row"><label>Game <select id="game"></select></label></div>
    <div class="row">
      <label>Δ turnover margin <input type="range" id="wto" min="-3" max="3" step="1" value="0"></label>
      <label>Δ offense YPP <input type="range" id="woff" min="-1" max="1" step="0.1" value="0"></label>
      <label>Δ defense YPP allowed <input type="range" id="wdef" min="-1" max="1" step="0.1" value="0"></label>
      <button onclick="adjustGame()">Apply</button>
    </div>
    <div id="week-result"></div>
    <div id="week-adjusted"></div>
  </section>

  <section id="page-matchup" class="panel hidden">
    <div class="row">
      <label>Home <select id="home"></select></label>
      <label>Away <select id="away"></select></label>
      <label><input type="checkbox" id="neutral"> Neutral site (no home-field advantage)</label>
    </div>
    <div class="row">
      <label>Δ turnover margin <input type="range" id="to" min="-3" max="3" step="1" value="0"></label>
      <label>Δ offense YPP <input type="range" id="off" min="-1" max="1" step="0.1" value="0"></label>
      <label>Δ defense YPP allowed <input type="range" id="def" min="-1" max="1" step="0.1" value="0"></label>
      <button onclick="predict()">Predict</button>
    </div>
    <div id="matchup-result"></div>
    <p class="muted">Hypothetical uses Elo only. Counterfactual deltas are a linear sensitivity heuristic, not a causal model.</p>
  </section>
</main>

<script>
const pct = p => (p * 100).toFixed(1) + '%';
const signed = x => (x >= 0 ? '+' : '') + x.toFixed(1);

function show(page) {
  for (const p of ['week', 'matchup']) {
    document.getElementById('page-' + p).classList.toggle('hidden', p !== page);
    document.getElementById('tab-' + p).classList.toggle('active', p === page);
  }
}

function block(home, away, pHome, fav) {
  return `<div class="row">
      <div class="metric"><div class="label">${home} win probability (home)</div><div class="value">${pct(pHome)}</div></div>
      <div class="metric"><div class="label">${away} win probability (away)</div><div class="value">${pct(1 - pHome)}</div></div>
    </div>
    <div class="bar"><div style="width:${(pHome * 100).toFixed(1)}%"></div></div>
    <div><b>Favorite:</b> ${fav.team} (${pct(fav.probability)})${fav.tossup ? ' — toss-up' : ''}</div>`;
}

function counterfactual(cf) {
  if (!cf) return '';
  const cls = cf.delta_percentage_points >= 0 ? 'pos' : 'neg';
  return `<div><b>Adjusted:</b> ${pct(cf.adjusted_probability)}
    <span class="${cls}">(${signed(cf.delta_percentage_points)} pts, ${signed(cf.rating_shift)} Elo)</span></div>`;
}

async function getJson(url) {
  const r = await fetch(url);
  if (!r.ok) throw new Error(await r.text());
  return r.json();
}

async function loadWeek() {
  const out = document.getElementById('week-result');
  try {
    const rows = await getJson('/api/week');
    const sel = document.getElementById('game');
    sel.innerHTML = rows.map(g => `<option value="${g.index}">${g.label}</option>`).join('');
    sel.onchange = () => { renderGame(rows[sel.value]); adjustGame(); };
    if (rows.length) renderGame(rows[0]);
  } catch (e) {
    out.innerHTML = `<pre class="neg">${e.message}</pre>`;
  }
}

function renderGame(g) {
  let when = '';
  if (g.kickoff_mx) when = `<div><b>Kickoff (Mexico City):</b> ${g.kickoff_mx}</div>`;
  else if (g.gameday) when = `<div><b>Game day:</b> ${g.gameday} ${g.gametime || ''}</div>`;
  document.getElementById('week-result').innerHTML =
    `<h3>${g.away_team} @ ${g.home_team}</h3>` + block(g.home_team, g.away_team, g.home_win_probability, g.favorite) + when;
}

async function adjustGame() {
  const index = document.getElementById('game').value;
  const out = document.getElementById('week-adjusted');
  if (index === '') return;
  const q = new URLSearchParams({
    to: document.getElementById('wto').value,
    off: document.getElementById('woff').value,
    def: document.getElementById('wdef').value,
  });
  try {
    const g = await getJson(`/api/week/${index}?` + q);
    out.innerHTML = counterfactual(g.counterfactual);
  } catch (e) {
    out.innerHTML = `<pre class="neg">${e.message}</pre>`;
  }
}

async function loadTeams() {
  const teams = await getJson('/api/teams');
  const opts = teams.map(t => `<option>${t}</option>`).join('');
  document.getElementById('home').innerHTML = opts;
  document.getElementById('away').innerHTML = opts;
  if (teams.length > 1) document.getElementById('away').selectedIndex = 1;
}

async function predict() {
  const q = new URLSearchParams({
    home: document.getElementById('home').value,
    away: document.getElementById('away').value,
    neutral: document.getElementById('neutral').checked,
    to: document.getElementById('to').value,
    off: document.getElementById('off').value,
    def: document.getElementById('def').value,
  });
  const out = document.getElementById('matchup-result');
  try {
    const m = await getJson('/api/matchup?' + q);
    out.innerHTML = `<h3>${m.title}</h3>` + block(m.context.home_team, m.context.away_team, m.home_win_probability, m.favorite)
      + counterfactual(m.counterfactual);
  } catch (e) {
    out.innerHTML = `<pre class="neg">${e.message}</pre>`;
  }
}

async function loadStatus() {
  const s = await getJson('/api/status');
  document.getElementById('source').textContent =
    `Ratings: ${s.ratings_source} · Predictions: ${s.predictions_source || 'none'}`;
}

loadStatus();
loadTeams();
loadWeek();
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelConfig;
    use std::collections::HashMap;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            engine: AdjustmentEngine::new(ModelConfig::default()),
            ratings: RatingTable::new(
                HashMap::from([("KC".to_string(), 1680.0), ("LV".to_string(), 1420.0)]),
                1500.0,
                false,
            ),
            ratings_source: PathBuf::from("elo_ratings.json"),
            slate: None,
            predictions_candidates: vec![PathBuf::from("data/predictions_this_weekend.csv")],
            stats: None,
            loaded_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn matchup_handler_returns_json() {
        let params = MatchupParams {
            home: "KC".into(),
            away: "LV".into(),
            neutral: false,
            to: None,
            off: None,
            def: None,
        };
        let resp = matchup_handler(State(state()), Query(params))
            .await
            .map(IntoResponse::into_response)
            .unwrap();
        assert!(resp.status().is_success());
    }

    #[tokio::test]
    async fn week_handler_without_slate_is_not_found() {
        let Err((status, _)) = week_handler(State(state())).await else {
            panic!("expected missing slate error");
        };
        assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn router_builds() {
        let _ = router((*state()).clone());
    }

    #[test]
    fn week_page_sends_deltas_to_game_route() {
        for id in [r#"id="wto""#, r#"id="woff""#, r#"id="wdef""#] {
            assert!(DASHBOARD_HTML.contains(id), "missing slider {}", id);
        }
        assert!(DASHBOARD_HTML.contains("/api/week/${index}?"));
    }
}
