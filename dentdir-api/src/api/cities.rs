//! City listings: hub, states and related cities
//!
//! Only indexable pages are listed, largest cities first.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use dentdir_common::db::CitySummary;

use crate::error::ApiResult;
use crate::AppState;

/// Default number of cities on the hub page
pub const DEFAULT_HUB_LIMIT: i64 = 12;

/// Default number of related-city links on a city page
pub const DEFAULT_RELATED_LIMIT: i64 = 6;

#[derive(Debug, Deserialize)]
pub struct HubQuery {
    #[serde(default = "default_hub_limit")]
    pub limit: i64,
}

fn default_hub_limit() -> i64 {
    DEFAULT_HUB_LIMIT
}

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    /// City to leave out, usually the page being rendered
    #[serde(default)]
    pub exclude: String,
    #[serde(default = "default_related_limit")]
    pub limit: i64,
}

fn default_related_limit() -> i64 {
    DEFAULT_RELATED_LIMIT
}

/// GET /api/hub/top-cities?limit=N
pub async fn get_top_cities(
    State(state): State<AppState>,
    Query(query): Query<HubQuery>,
) -> ApiResult<Json<Vec<CitySummary>>> {
    let cities = state.reader.top_cities_for_hub(query.limit).await?;
    Ok(Json(cities))
}

/// GET /api/states
pub async fn get_cities_by_state(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, Vec<CitySummary>>>> {
    let grouped = state.reader.cities_by_state().await?;
    Ok(Json(grouped))
}

/// GET /api/states/:state/related?exclude=City&limit=N
pub async fn get_related_cities(
    State(state): State<AppState>,
    Path(state_abbr): Path<String>,
    Query(query): Query<RelatedQuery>,
) -> ApiResult<Json<Vec<CitySummary>>> {
    let cities = state
        .reader
        .related_cities(&state_abbr, &query.exclude, query.limit)
        .await?;
    Ok(Json(cities))
}

/// Build city listing routes
pub fn city_routes() -> Router<AppState> {
    Router::new()
        .route("/api/hub/top-cities", get(get_top_cities))
        .route("/api/states", get(get_cities_by_state))
        .route("/api/states/:state/related", get(get_related_cities))
}
