//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own fake upstream and library
//! database.

use super::constants::*;
use super::fixtures::{FakeUpstream, FakeUpstreamOptions};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tunedeck_server::catalog::{ClientCredentialsTokenProvider, SpotifyCatalogClient};
use tunedeck_server::library::{LibraryStore, SqliteLibraryStore};
use tunedeck_server::server::{make_app, RequestsLoggingLevel, ServerConfig};

/// Test server instance with isolated upstream and database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Library store for direct database access in tests
    pub library: Arc<dyn LibraryStore>,

    /// The fake upstream the server talks to
    pub upstream: FakeUpstream,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        Self::spawn_with(FakeUpstreamOptions::default()).await
    }

    /// Spawns a new test server on a random port
    ///
    /// The server uses the real catalog client and client-credentials token
    /// provider, both pointed at a freshly spawned fake upstream.
    ///
    /// # Panics
    ///
    /// Panics if any resource cannot be created or the server doesn't become
    /// ready within timeout.
    pub async fn spawn_with(options: FakeUpstreamOptions) -> Self {
        let upstream = FakeUpstream::spawn_with(options).await;

        let temp_db_dir = TempDir::new().expect("Failed to create temp db dir");
        let library: Arc<dyn LibraryStore> = Arc::new(
            SqliteLibraryStore::new(temp_db_dir.path().join("library.db"), 2)
                .expect("Failed to open library store"),
        );

        let tokens = Arc::new(
            ClientCredentialsTokenProvider::new(
                upstream.token_url.clone(),
                CLIENT_ID.to_string(),
                CLIENT_SECRET.to_string(),
                REQUEST_TIMEOUT_SECS,
            )
            .expect("Failed to build token provider"),
        );
        let catalog = Arc::new(
            SpotifyCatalogClient::new(upstream.api_base_url.clone(), REQUEST_TIMEOUT_SECS, tokens)
                .expect("Failed to build catalog client"),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };
        let app = make_app(config, catalog, library.clone());

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            library,
            upstream,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
