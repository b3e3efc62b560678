//! HTTP client for the upstream music catalog API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::models::{
    Album, AlbumStub, AlbumsResponse, NewReleasesResponse, SearchResponse, Track, UpstreamTrack,
};
use super::token::{Token, TokenProvider};
use super::CatalogError;

/// Largest page the search and browse endpoints accept.
pub const MAX_PAGE_LIMIT: usize = 50;

/// Largest id list the batch album endpoint accepts.
pub const MAX_ALBUMS_PER_BATCH: usize = 20;

/// Read operations against the upstream catalog.
///
/// Implementations never retry; every failure is returned to the caller.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Track search, `limit` in `1..=MAX_PAGE_LIMIT`. No matches is an empty vector.
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>, CatalogError>;

    async fn new_releases(&self, limit: usize) -> Result<Vec<AlbumStub>, CatalogError>;

    /// Full albums for at most `MAX_ALBUMS_PER_BATCH` ids, in upstream order.
    /// Ids the upstream does not know are left out.
    async fn albums_batch(&self, ids: &[String]) -> Result<Vec<Album>, CatalogError>;

    /// Any non-success upstream status is reported as `NotFound`.
    async fn track_by_id(&self, id: &str) -> Result<Track, CatalogError>;
}

fn check_page_limit(limit: usize) -> Result<(), CatalogError> {
    if limit == 0 || limit > MAX_PAGE_LIMIT {
        return Err(CatalogError::Validation(format!(
            "limit must be between 1 and {}, got {}",
            MAX_PAGE_LIMIT, limit
        )));
    }
    Ok(())
}

pub struct SpotifyCatalogClient {
    client: reqwest::Client,
    api_base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SpotifyCatalogClient {
    /// # Arguments
    /// * `api_base_url` - Base URL of the catalog API (e.g., "https://api.spotify.com/v1")
    /// * `timeout_sec` - Request timeout in seconds
    /// * `tokens` - Where bearer tokens come from
    pub fn new(
        api_base_url: String,
        timeout_sec: u64,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            api_base_url,
            tokens,
        })
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let token = self.tokens.get_token().await?;
        self.get_json_with_token(&token, path, query).await
    }

    async fn get_json_with_token<T: DeserializeOwned>(
        &self,
        token: &Token,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{}", self.api_base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token.access_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!("Upstream {} answered {}", url, status);
            return Err(CatalogError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl CatalogApi for SpotifyCatalogClient {
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<Track>, CatalogError> {
        if query.trim().is_empty() {
            return Err(CatalogError::Validation("empty search query".to_string()));
        }
        check_page_limit(limit)?;

        let response: SearchResponse = self
            .get_json(
                "search",
                &[
                    ("q", query.to_string()),
                    ("type", "track".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        response
            .tracks
            .map(|page| page.into_items().map(UpstreamTrack::into_track).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn new_releases(&self, limit: usize) -> Result<Vec<AlbumStub>, CatalogError> {
        check_page_limit(limit)?;

        let response: NewReleasesResponse = self
            .get_json("browse/new-releases", &[("limit", limit.to_string())])
            .await?;

        response
            .albums
            .map(|page| page.into_items().map(|album| album.into_stub()).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn albums_batch(&self, ids: &[String]) -> Result<Vec<Album>, CatalogError> {
        if ids.len() > MAX_ALBUMS_PER_BATCH {
            return Err(CatalogError::Validation(format!(
                "at most {} album ids per batch, got {}",
                MAX_ALBUMS_PER_BATCH,
                ids.len()
            )));
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let response: AlbumsResponse = self
            .get_json("albums", &[("ids", ids.join(","))])
            .await?;

        response
            .albums
            .into_iter()
            .flatten()
            .map(|album| album.into_album())
            .collect()
    }

    async fn track_by_id(&self, id: &str) -> Result<Track, CatalogError> {
        if id.is_empty() {
            return Err(CatalogError::Validation("empty track id".to_string()));
        }

        // Token failures must not read as a missing track
        let token = self.tokens.get_token().await?;
        let path = format!("tracks/{}", urlencoding::encode(id));
        let track: UpstreamTrack = match self.get_json_with_token(&token, &path, &[]).await {
            Ok(track) => track,
            Err(CatalogError::Upstream { status, .. }) => {
                debug!("Track {} lookup failed with status {}", id, status);
                return Err(CatalogError::NotFound(format!("track {}", id)));
            }
            Err(err) => return Err(err),
        };
        track.into_track()
    }
}
