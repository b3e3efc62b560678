mod file_config;

pub use file_config::{FileConfig, UpstreamConfig};

use crate::catalog::MAX_PAGE_LIMIT;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_UPSTREAM_TIMEOUT_SEC: u64 = 10;
pub const DEFAULT_SEARCH_LIMIT: usize = 5;
pub const DEFAULT_POPULAR_PAGE_SIZE: usize = 10;
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

/// Largest popular page; every new release is fetched again in one album batch.
pub const MAX_POPULAR_PAGE_SIZE: usize = crate::catalog::MAX_ALBUMS_PER_BATCH;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub read_pool_size: usize,
    pub search_limit: usize,
    pub popular_page_size: usize,
    pub api_base_url: String,
    pub token_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub static_token: Option<String>,
    pub upstream_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            port: DEFAULT_PORT,
            logging_level: RequestsLoggingLevel::default(),
            frontend_dir_path: None,
            read_pool_size: DEFAULT_READ_POOL_SIZE,
            search_limit: DEFAULT_SEARCH_LIMIT,
            popular_page_size: DEFAULT_POPULAR_PAGE_SIZE,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            client_id: None,
            client_secret: None,
            static_token: None,
            upstream_timeout_sec: DEFAULT_UPSTREAM_TIMEOUT_SEC,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_dir: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub read_pool_size: usize,
    pub search_limit: usize,
    pub popular_page_size: usize,
    pub upstream: UpstreamSettings,
}

#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub api_base_url: String,
    pub token_url: String,
    pub credentials: UpstreamCredentials,
    pub timeout_sec: u64,
}

#[derive(Clone, PartialEq, Eq)]
pub enum UpstreamCredentials {
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    StaticToken(String),
}

// Secrets stay out of logs
impl std::fmt::Debug for UpstreamCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamCredentials::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .finish_non_exhaustive(),
            UpstreamCredentials::StaticToken(_) => f.write_str("StaticToken(..)"),
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let port = file.port.unwrap_or(cli.port);

        let logging_level = match file.logging_level {
            Some(s) => parse_logging_level(&s)
                .ok_or_else(|| anyhow::anyhow!("Invalid logging_level in config file: {}", s))?,
            None => cli.logging_level.clone(),
        };

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());
        let read_pool_size = file.read_pool_size.unwrap_or(cli.read_pool_size);

        let search_limit = file.search_limit.unwrap_or(cli.search_limit);
        if !(1..=MAX_PAGE_LIMIT).contains(&search_limit) {
            bail!(
                "search_limit must be between 1 and {}, got {}",
                MAX_PAGE_LIMIT,
                search_limit
            );
        }

        let popular_page_size = file.popular_page_size.unwrap_or(cli.popular_page_size);
        if !(1..=MAX_POPULAR_PAGE_SIZE).contains(&popular_page_size) {
            bail!(
                "popular_page_size must be between 1 and {}, got {}",
                MAX_POPULAR_PAGE_SIZE,
                popular_page_size
            );
        }

        let upstream_file = file.upstream.unwrap_or_default();
        let client_id = upstream_file.client_id.or_else(|| cli.client_id.clone());
        let client_secret = upstream_file
            .client_secret
            .or_else(|| cli.client_secret.clone());
        let static_token = upstream_file
            .static_token
            .or_else(|| cli.static_token.clone());

        let credentials = match (static_token, client_id, client_secret) {
            (Some(token), _, _) => UpstreamCredentials::StaticToken(token),
            (None, Some(client_id), Some(client_secret)) => {
                UpstreamCredentials::ClientCredentials {
                    client_id,
                    client_secret,
                }
            }
            _ => bail!(
                "Upstream credentials missing: set --client-id and --client-secret \
                 (or SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET), or a static token"
            ),
        };

        let upstream = UpstreamSettings {
            api_base_url: upstream_file
                .api_base_url
                .unwrap_or_else(|| cli.api_base_url.clone()),
            token_url: upstream_file
                .token_url
                .unwrap_or_else(|| cli.token_url.clone()),
            credentials,
            timeout_sec: upstream_file.timeout_sec.unwrap_or(cli.upstream_timeout_sec),
        };

        Ok(Self {
            db_dir,
            port,
            logging_level,
            frontend_dir_path,
            read_pool_size,
            search_limit,
            popular_page_size,
            upstream,
        })
    }

    pub fn library_db_path(&self) -> PathBuf {
        self.db_dir.join("library.db")
    }
}

fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
