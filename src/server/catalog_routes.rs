//! Upstream catalog routes: search, popular and player lookup

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{popular, rank, Album, Track};

use super::state::ServerState;
use super::ApiError;

#[derive(Deserialize)]
struct SearchParams {
    pub q: Option<String>,
    /// Upstream page size, defaults to the configured search limit.
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
struct PlayerParams {
    pub track_id: Option<String>,
}

#[derive(Serialize)]
struct PlayerResponse {
    track: Track,
    is_favorite: bool,
}

fn required_param(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

async fn search(
    State(state): State<ServerState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Track>>, ApiError> {
    let Query(params) = params.map_err(|err| ApiError::BadRequest(err.body_text()))?;
    let query = required_param(params.q, "No search query provided")?;
    let limit = params.limit.unwrap_or(state.config.search_limit);

    let tracks = state.catalog.search_tracks(&query, limit).await?;
    debug!("Search '{}' returned {} tracks", query, tracks.len());
    Ok(Json(rank(tracks, &query)))
}

async fn get_popular(State(state): State<ServerState>) -> Result<Json<Vec<Album>>, ApiError> {
    let albums = popular(state.catalog.as_ref(), state.config.popular_page_size).await?;
    Ok(Json(albums))
}

async fn player(
    State(state): State<ServerState>,
    params: Result<Query<PlayerParams>, QueryRejection>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let Query(params) = params.map_err(|err| ApiError::BadRequest(err.body_text()))?;
    let track_id = required_param(params.track_id, "No track id provided")?;

    let track = state.catalog.track_by_id(&track_id).await?;
    let is_favorite = state.library.get_favorite(&track_id)?.is_some();
    Ok(Json(PlayerResponse { track, is_favorite }))
}

pub fn make_catalog_routes(state: ServerState) -> Router {
    Router::new()
        .route("/search", get(search))
        .route("/popular", get(get_popular))
        .route("/player", get(player))
        .with_state(state)
}
