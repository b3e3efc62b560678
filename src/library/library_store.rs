use super::library_models::{FavoriteInsert, FavoriteRecord, NewFavorite};
use super::LibraryError;

pub trait FavoritesStore: Send + Sync {
    /// Stores a favorite keyed by its track id.
    /// Returns `Existing` with the stored record, unchanged, if the track id is
    /// already a favorite. Returns a `Validation` error if the track id is empty.
    fn add_favorite(&self, favorite: NewFavorite) -> Result<FavoriteInsert, LibraryError>;

    /// All favorites, most recently added first.
    fn list_favorites(&self) -> Result<Vec<FavoriteRecord>, LibraryError>;

    /// Returns Ok(None) if the track is not a favorite.
    fn get_favorite(&self, track_id: &str) -> Result<Option<FavoriteRecord>, LibraryError>;

    /// Returns whether a favorite was actually removed.
    fn remove_favorite(&self, track_id: &str) -> Result<bool, LibraryError>;
}

pub trait HistoryStore: Send + Sync {
    /// Records a search query, moving it to the top if it was already there.
    /// The query is trimmed; an empty query is a `Validation` error.
    fn record_query(&self, query: &str) -> Result<(), LibraryError>;

    /// The `limit` most recent queries, newest first.
    fn recent_queries(&self, limit: usize) -> Result<Vec<String>, LibraryError>;
}

pub trait LibraryStore: FavoritesStore + HistoryStore {}

// Blanket implementation for any type that implements both stores
impl<T: FavoritesStore + HistoryStore> LibraryStore for T {}
