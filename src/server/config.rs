use super::RequestsLoggingLevel;
use crate::config::{DEFAULT_POPULAR_PAGE_SIZE, DEFAULT_PORT, DEFAULT_SEARCH_LIMIT};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub frontend_dir_path: Option<String>,
    /// Upstream page size for `/search` when the request has no `limit`.
    pub search_limit: usize,
    pub popular_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: DEFAULT_PORT,
            frontend_dir_path: None,
            search_limit: DEFAULT_SEARCH_LIMIT,
            popular_page_size: DEFAULT_POPULAR_PAGE_SIZE,
        }
    }
}
