//! Favorites and search history routes

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::library::{FavoriteRecord, NewFavorite, RECENT_QUERIES_LIMIT};

use super::state::{GuardedLibraryStore, ServerState};
use super::ApiError;

/// Track as the client shows it, posted when favoriting.
#[derive(Deserialize, Debug)]
struct FavoriteBody {
    pub id: Option<String>,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
    pub image: Option<String>,
}

#[derive(Deserialize, Debug)]
struct SearchHistoryBody {
    pub query: String,
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|err| ApiError::BadRequest(err.body_text()))
}

async fn add_favorite(
    State(library): State<GuardedLibraryStore>,
    payload: Result<Json<FavoriteBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(payload)?;
    let track_id = body
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("No track id provided".to_string()))?;

    let outcome = library.add_favorite(NewFavorite {
        track_id,
        name: body.name,
        artist: body.artist,
        preview_url: body.preview_url,
        external_url: body.external_url,
        image_url: body.image,
    })?;

    let status = if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.into_record())).into_response())
}

async fn list_favorites(
    State(library): State<GuardedLibraryStore>,
) -> Result<Json<Vec<FavoriteRecord>>, ApiError> {
    Ok(Json(library.list_favorites()?))
}

async fn delete_favorite(
    State(library): State<GuardedLibraryStore>,
    Path(track_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let track_id = track_id.trim();
    if library.remove_favorite(track_id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Favorite {} not found", track_id)))
    }
}

async fn add_search_history(
    State(library): State<GuardedLibraryStore>,
    payload: Result<Json<SearchHistoryBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(payload)?;
    library.record_query(&body.query)?;
    Ok((StatusCode::CREATED, Json(json!({ "status": "ok" }))).into_response())
}

async fn get_search_history(
    State(library): State<GuardedLibraryStore>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(library.recent_queries(RECENT_QUERIES_LIMIT)?))
}

pub fn make_library_routes(state: ServerState) -> Router {
    Router::new()
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/{track_id}", delete(delete_favorite))
        .route(
            "/search_history",
            get(get_search_history).post(add_search_history),
        )
        .with_state(state)
}
