//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per server endpoint. When API routes or
//! request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }

    // ========================================================================
    // Catalog Endpoints
    // ========================================================================

    /// GET /
    pub async fn home(&self) -> Response {
        self.get("/").await
    }

    /// GET /search?q=
    pub async fn search(&self, query: &str) -> Response {
        self.get(&format!("/search?q={}", urlencoding::encode(query)))
            .await
    }

    /// GET /search?q=&limit=
    pub async fn search_with_limit(&self, query: &str, limit: usize) -> Response {
        self.get(&format!(
            "/search?q={}&limit={}",
            urlencoding::encode(query),
            limit
        ))
        .await
    }

    /// GET /popular
    pub async fn popular(&self) -> Response {
        self.get("/popular").await
    }

    /// GET /player?track_id=
    pub async fn player(&self, track_id: &str) -> Response {
        self.get(&format!("/player?track_id={}", urlencoding::encode(track_id)))
            .await
    }

    // ========================================================================
    // Favorites Endpoints
    // ========================================================================

    /// POST /favorites with the full track shape returned by /search
    pub async fn add_favorite(&self, track: &Value) -> Response {
        self.client
            .post(format!("{}/favorites", self.base_url))
            .json(track)
            .send()
            .await
            .expect("Add favorite request failed")
    }

    /// POST /favorites with a minimal track
    pub async fn add_favorite_by_id(&self, track_id: &str, name: &str) -> Response {
        self.add_favorite(&json!({
            "id": track_id,
            "name": name,
            "artist": "Test Artist",
            "preview_url": null,
            "external_url": format!("https://open.example/track/{}", track_id),
            "image": MEDIUM_IMAGE_URL
        }))
        .await
    }

    /// GET /favorites
    pub async fn list_favorites(&self) -> Response {
        self.get("/favorites").await
    }

    /// DELETE /favorites/{track_id}
    pub async fn delete_favorite(&self, track_id: &str) -> Response {
        self.client
            .delete(format!(
                "{}/favorites/{}",
                self.base_url,
                urlencoding::encode(track_id)
            ))
            .send()
            .await
            .expect("Delete favorite request failed")
    }

    // ========================================================================
    // Search History Endpoints
    // ========================================================================

    /// POST /search_history
    pub async fn record_search(&self, query: &str) -> Response {
        self.client
            .post(format!("{}/search_history", self.base_url))
            .json(&json!({ "query": query }))
            .send()
            .await
            .expect("Record search request failed")
    }

    /// GET /search_history
    pub async fn search_history(&self) -> Response {
        self.get("/search_history").await
    }
}
