use axum::extract::FromRef;

use crate::catalog::CatalogApi;
use crate::library::LibraryStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedCatalogApi = Arc<dyn CatalogApi>;
pub type GuardedLibraryStore = Arc<dyn LibraryStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog: GuardedCatalogApi,
    pub library: GuardedLibraryStore,
}

impl ServerState {
    pub fn new(config: ServerConfig, catalog: GuardedCatalogApi, library: GuardedLibraryStore) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            catalog,
            library,
        }
    }
}

impl FromRef<ServerState> for GuardedCatalogApi {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog.clone()
    }
}

impl FromRef<ServerState> for GuardedLibraryStore {
    fn from_ref(input: &ServerState) -> Self {
        input.library.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
