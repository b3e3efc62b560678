//! Upstream music catalog: client, normalization, ranking and the popular view.

mod client;
mod error;
pub mod models;
mod popular;
mod ranking;
mod token;

pub use client::{CatalogApi, SpotifyCatalogClient, MAX_ALBUMS_PER_BATCH, MAX_PAGE_LIMIT};
pub use error::CatalogError;
pub use models::{Album, AlbumStub, Track};
pub use popular::popular;
pub use ranking::rank;
pub use token::{ClientCredentialsTokenProvider, StaticTokenProvider, Token, TokenProvider};
