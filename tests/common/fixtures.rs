//! Fake upstream catalog for end-to-end tests
//!
//! Serves the token endpoint and the handful of catalog endpoints the server
//! calls, with canned data described in `constants.rs`. Every request URI is
//! recorded so tests can assert on upstream traffic.

use super::constants::*;
use axum::{
    extract::{Form, Path, Query, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
pub struct FakeUpstreamOptions {
    /// New releases endpoint answers with an empty page
    pub empty_new_releases: bool,
    /// Token endpoint answers with an `expires_in` of `u64::MAX`
    pub huge_token_expiry: bool,
}

#[derive(Clone)]
struct FakeState {
    options: FakeUpstreamOptions,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeState {
    fn record(&self, uri: &Uri) {
        self.requests.lock().unwrap().push(uri.to_string());
    }
}

pub struct FakeUpstream {
    /// e.g. "http://127.0.0.1:12345/v1"
    pub api_base_url: String,
    /// e.g. "http://127.0.0.1:12345/api/token"
    pub token_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl FakeUpstream {
    pub async fn spawn() -> Self {
        Self::spawn_with(FakeUpstreamOptions::default()).await
    }

    pub async fn spawn_with(options: FakeUpstreamOptions) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            options,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/search", get(search))
            .route("/v1/browse/new-releases", get(new_releases))
            .route("/v1/albums", get(albums))
            .route("/v1/tracks/{id}", get(track))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake upstream");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake upstream failed");
        });

        Self {
            api_base_url: format!("http://127.0.0.1:{}/v1", port),
            token_url: format!("http://127.0.0.1:{}/api/token", port),
            requests,
            _shutdown_tx: Some(shutdown_tx),
        }
    }

    /// All request URIs received so far, in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests whose path starts with `prefix`
    pub fn request_count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|uri| uri.starts_with(prefix))
            .count()
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

// ============================================================================
// Canned catalog
// ============================================================================

fn images_full() -> Value {
    json!([
        { "url": "https://img.example/640.jpg", "height": 640, "width": 640 },
        { "url": MEDIUM_IMAGE_URL, "height": 300, "width": 300 },
        { "url": "https://img.example/64.jpg", "height": 64, "width": 64 }
    ])
}

fn track_love_story() -> Value {
    json!({
        "id": TRACK_LOVE_STORY_ID,
        "name": "Love Story",
        "artists": [{ "name": "Taylor Swift" }, { "name": "Someone Else" }],
        "preview_url": "https://p.example/love-story.mp3",
        "external_urls": { "spotify": "https://open.example/track/trk-love-story" },
        "album": { "images": [{ "url": "https://img.example/only.jpg" }] }
    })
}

fn track_true_love() -> Value {
    json!({
        "id": TRACK_TRUE_LOVE_ID,
        "name": "True Love",
        "artists": [{ "name": "Pink" }],
        "preview_url": null,
        "external_urls": { "spotify": "https://open.example/track/trk-true-love" },
        "album": { "images": images_full() }
    })
}

fn track_lovers() -> Value {
    json!({
        "id": TRACK_LOVERS_ID,
        "name": "Song",
        "artists": [{ "name": "Lovers" }],
        "external_urls": {},
        "album": {}
    })
}

fn album_stub(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "artists": [{ "name": "The Band" }],
        "images": images_full(),
        "external_urls": { "spotify": format!("https://open.example/album/{}", id) }
    })
}

fn full_album(id: &str) -> Option<Value> {
    let mut album = match id {
        ALBUM_1_ID => album_stub(ALBUM_1_ID, "First Light"),
        ALBUM_2_ID => album_stub(ALBUM_2_ID, "Second Wind"),
        _ => return None,
    };
    let tracks = match id {
        ALBUM_2_ID => json!({ "items": [{ "id": ALBUM_2_TRACK_ID }, { "id": "trk-second-wind-2" }] }),
        _ => json!({ "items": [] }),
    };
    album["tracks"] = tracks;
    Some(album)
}

// ============================================================================
// Handlers
// ============================================================================

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({ "error": { "status": status.as_u16(), "message": message } })),
    )
        .into_response()
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", ACCESS_TOKEN))
        .unwrap_or(false)
}

async fn token(
    State(state): State<FakeState>,
    uri: Uri,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.record(&uri);
    let basic_ok = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == BASIC_AUTH_HEADER)
        .unwrap_or(false);
    let grant_ok = form.get("grant_type").map(String::as_str) == Some("client_credentials");
    if !basic_ok || !grant_ok {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_client" })))
            .into_response();
    }
    let expires_in = if state.options.huge_token_expiry {
        u64::MAX
    } else {
        3600
    };
    Json(json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": expires_in
    }))
    .into_response()
}

async fn search(
    State(state): State<FakeState>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.record(&uri);
    if !is_authorized(&headers) {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid access token");
    }
    if params.get("type").map(String::as_str) != Some("track") {
        return error_response(StatusCode::BAD_REQUEST, "Missing type");
    }

    let query = params.get("q").cloned().unwrap_or_default();
    let items = match query.as_str() {
        QUERY_LOVE => vec![track_true_love(), track_love_story(), track_lovers()],
        QUERY_SERVER_ERROR => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
        QUERY_RATE_LIMITED => {
            return error_response(StatusCode::TOO_MANY_REQUESTS, "Rate limited")
        }
        QUERY_FORBIDDEN => return error_response(StatusCode::FORBIDDEN, "Forbidden"),
        QUERY_MALFORMED => vec![json!({
            "id": "trk-nobody",
            "name": "Nobody",
            "artists": [],
            "external_urls": {},
            "album": { "images": [] }
        })],
        QUERY_GARBAGE => return (StatusCode::OK, "<html>oops</html>").into_response(),
        _ => vec![],
    };

    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(20);
    let items: Vec<Value> = items.into_iter().take(limit).collect();
    let total = items.len();
    Json(json!({ "tracks": { "items": items, "total": total } })).into_response()
}

async fn new_releases(
    State(state): State<FakeState>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.record(&uri);
    if !is_authorized(&headers) {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid access token");
    }

    let items = if state.options.empty_new_releases {
        vec![]
    } else {
        vec![
            album_stub(ALBUM_1_ID, "First Light"),
            album_stub(ALBUM_2_ID, "Second Wind"),
        ]
    };
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(20);
    let items: Vec<Value> = items.into_iter().take(limit).collect();
    Json(json!({ "albums": { "items": items } })).into_response()
}

async fn albums(
    State(state): State<FakeState>,
    uri: Uri,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.record(&uri);
    if !is_authorized(&headers) {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid access token");
    }

    let ids = params.get("ids").cloned().unwrap_or_default();
    // Answered in reverse request order, unknown ids as null entries
    let albums: Vec<Value> = ids
        .split(',')
        .filter(|id| !id.is_empty())
        .map(|id| full_album(id).unwrap_or(Value::Null))
        .rev()
        .collect();
    Json(json!({ "albums": albums })).into_response()
}

async fn track(
    State(state): State<FakeState>,
    uri: Uri,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.record(&uri);
    if !is_authorized(&headers) {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid access token");
    }

    match id.as_str() {
        TRACK_LOVE_STORY_ID => Json(track_love_story()).into_response(),
        TRACK_TRUE_LOVE_ID => Json(track_true_love()).into_response(),
        TRACK_LOVERS_ID => Json(track_lovers()).into_response(),
        _ => error_response(StatusCode::NOT_FOUND, "Non existing id"),
    }
}
