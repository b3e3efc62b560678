//! Bearer tokens for the upstream catalog API.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

use super::CatalogError;

#[derive(Clone, Debug)]
pub struct Token {
    pub access_token: String,
    pub expires_at: Instant,
}

/// Source of bearer tokens. Callers ask for a token before every upstream
/// request; whether anything is reused between calls is up to the provider.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_token(&self) -> Result<Token, CatalogError>;
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

impl TokenResponse {
    fn into_token(self, now: Instant) -> Result<Token, CatalogError> {
        let expires_at = now
            .checked_add(Duration::from_secs(self.expires_in))
            .ok_or_else(|| {
                CatalogError::MalformedItem(format!(
                    "token expires_in out of range: {}",
                    self.expires_in
                ))
            })?;
        Ok(Token {
            access_token: self.access_token,
            expires_at,
        })
    }
}

/// OAuth client-credentials grant against the provider's token endpoint.
pub struct ClientCredentialsTokenProvider {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientCredentialsTokenProvider {
    pub fn new(
        token_url: String,
        client_id: String,
        client_secret: String,
        timeout_sec: u64,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;
        Ok(Self {
            client,
            token_url,
            client_id,
            client_secret,
        })
    }
}

#[async_trait]
impl TokenProvider for ClientCredentialsTokenProvider {
    async fn get_token(&self) -> Result<Token, CatalogError> {
        debug!("Requesting client credentials token from {}", self.token_url);
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CatalogError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        token.into_token(Instant::now())
    }
}

/// Hands out the same token forever. Used against local fake upstreams.
pub struct StaticTokenProvider {
    access_token: String,
}

impl StaticTokenProvider {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> Result<Token, CatalogError> {
        Ok(Token {
            access_token: self.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        })
    }
}
