use serde::{Deserialize, Serialize};

/// Most recent history entries handed out to clients.
pub const RECENT_QUERIES_LIMIT: usize = 5;

/// Track details as posted by the client when favoriting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewFavorite {
    pub track_id: String,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteRecord {
    /// Store-assigned surrogate key.
    pub id: i64,
    pub track_id: String,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub preview_url: Option<String>,
    pub external_url: Option<String>,
    #[serde(rename = "image")]
    pub image_url: Option<String>,
    /// Unix seconds, store clock.
    pub created_at: i64,
}

/// Outcome of favoriting a track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FavoriteInsert {
    Created(FavoriteRecord),
    /// The track was already a favorite; the stored record is returned untouched.
    Existing(FavoriteRecord),
}

impl FavoriteInsert {
    pub fn is_created(&self) -> bool {
        matches!(self, FavoriteInsert::Created(_))
    }

    pub fn record(&self) -> &FavoriteRecord {
        match self {
            FavoriteInsert::Created(record) | FavoriteInsert::Existing(record) => record,
        }
    }

    pub fn into_record(self) -> FavoriteRecord {
        match self {
            FavoriteInsert::Created(record) | FavoriteInsert::Existing(record) => record,
        }
    }
}
