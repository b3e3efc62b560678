mod error;
pub mod library_models;
mod library_store;
mod sqlite_library_store;

pub use error::LibraryError;
pub use library_models::{
    FavoriteInsert, FavoriteRecord, NewFavorite, RECENT_QUERIES_LIMIT,
};
pub use library_store::{FavoritesStore, HistoryStore, LibraryStore};
pub use sqlite_library_store::SqliteLibraryStore;
