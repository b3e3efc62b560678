use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tunedeck_server::catalog::{
    ClientCredentialsTokenProvider, SpotifyCatalogClient, StaticTokenProvider, TokenProvider,
};
use tunedeck_server::config::{self, AppConfig, CliConfig, FileConfig, UpstreamCredentials};
use tunedeck_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use tunedeck_server::SqliteLibraryStore;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding the library database (library.db).
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = config::DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Base URL of the upstream catalog API.
    #[clap(long, default_value = config::DEFAULT_API_BASE_URL)]
    pub api_base_url: String,

    /// OAuth token endpoint of the upstream catalog.
    #[clap(long, default_value = config::DEFAULT_TOKEN_URL)]
    pub token_url: String,

    #[clap(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: Option<String>,

    #[clap(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Fixed bearer token used instead of the client-credentials exchange.
    #[clap(long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
    pub static_token: Option<String>,

    /// Timeout in seconds for upstream requests.
    #[clap(long, default_value_t = config::DEFAULT_UPSTREAM_TIMEOUT_SEC)]
    pub upstream_timeout_sec: u64,

    /// Number of tracks requested from upstream per search.
    #[clap(long, default_value_t = config::DEFAULT_SEARCH_LIMIT)]
    pub search_limit: usize,

    /// Number of new releases shown by /popular.
    #[clap(long, default_value_t = config::DEFAULT_POPULAR_PAGE_SIZE)]
    pub popular_page_size: usize,

    /// Number of read-only database connections.
    #[clap(long, default_value_t = config::DEFAULT_READ_POOL_SIZE)]
    pub read_pool_size: usize,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_dir: self.db_dir.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            frontend_dir_path: self.frontend_dir_path.clone(),
            read_pool_size: self.read_pool_size,
            search_limit: self.search_limit,
            popular_page_size: self.popular_page_size,
            api_base_url: self.api_base_url.clone(),
            token_url: self.token_url.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            static_token: self.static_token.clone(),
            upstream_timeout_sec: self.upstream_timeout_sec,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;
    info!("Resolved config: {:?}", app_config);

    let library_db_path = app_config.library_db_path();
    info!("Opening library database at {:?}...", library_db_path);
    let library = Arc::new(
        SqliteLibraryStore::new(&library_db_path, app_config.read_pool_size)
            .context("Failed to open library database")?,
    );

    let upstream = &app_config.upstream;
    let tokens: Arc<dyn TokenProvider> = match &upstream.credentials {
        UpstreamCredentials::ClientCredentials {
            client_id,
            client_secret,
        } => Arc::new(
            ClientCredentialsTokenProvider::new(
                upstream.token_url.clone(),
                client_id.clone(),
                client_secret.clone(),
                upstream.timeout_sec,
            )
            .context("Failed to build token client")?,
        ),
        UpstreamCredentials::StaticToken(token) => Arc::new(StaticTokenProvider::new(token.clone())),
    };
    let catalog = Arc::new(
        SpotifyCatalogClient::new(upstream.api_base_url.clone(), upstream.timeout_sec, tokens)
            .context("Failed to build catalog client")?,
    );
    info!("Using upstream catalog at {}", catalog.api_base_url());

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        frontend_dir_path: app_config.frontend_dir_path.clone(),
        search_limit: app_config.search_limit,
        popular_page_size: app_config.popular_page_size,
    };

    info!("Ready to serve at port {}!", app_config.port);
    run_server(server_config, catalog, library).await
}
