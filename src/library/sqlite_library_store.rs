use super::library_models::{FavoriteInsert, FavoriteRecord, NewFavorite};
use super::library_store::{FavoritesStore, HistoryStore};
use super::LibraryError;
use crate::sqlite_persistence::{prepare_schema, Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};
use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// V 0
const FAVORITE_TRACK_TABLE_V_0: Table = Table {
    name: "favorite_track",
    columns: &[
        crate::sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        crate::sqlite_column!("track_id", &SqlType::Text, non_null = true),
        crate::sqlite_column!("name", &SqlType::Text),
        crate::sqlite_column!("artist", &SqlType::Text),
        crate::sqlite_column!("preview_url", &SqlType::Text),
        crate::sqlite_column!("external_url", &SqlType::Text),
        crate::sqlite_column!("image", &SqlType::Text),
        crate::sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["track_id"]],
};
const SEARCH_HISTORY_TABLE_V_0: Table = Table {
    name: "search_history",
    columns: &[
        crate::sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        crate::sqlite_column!("query", &SqlType::Text, non_null = true),
        crate::sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[],
};

/// V 1
const SEARCH_HISTORY_TABLE_V_1: Table = Table {
    name: "search_history",
    columns: SEARCH_HISTORY_TABLE_V_0.columns,
    indices: &[("idx_search_history_query", "query")],
    unique_constraints: &[],
};

/// V 2
const FAVORITE_TRACK_TABLE_V_2: Table = Table {
    name: "favorite_track",
    columns: &[
        crate::sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_autoincrement = true
        ),
        crate::sqlite_column!("track_id", &SqlType::Text, non_null = true),
        crate::sqlite_column!("name", &SqlType::Text),
        crate::sqlite_column!("artist", &SqlType::Text),
        crate::sqlite_column!("preview_url", &SqlType::Text),
        crate::sqlite_column!("external_url", &SqlType::Text),
        crate::sqlite_column!("image", &SqlType::Text),
        crate::sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[],
    unique_constraints: &[&["track_id"]],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[FAVORITE_TRACK_TABLE_V_0, SEARCH_HISTORY_TABLE_V_0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[FAVORITE_TRACK_TABLE_V_0, SEARCH_HISTORY_TABLE_V_1],
        migration: Some(|conn: &Connection| {
            SEARCH_HISTORY_TABLE_V_1.create_index(conn, "idx_search_history_query", "query")
        }),
    },    VersionedSchema {
        version: 2,
        tables: &[FAVORITE_TRACK_TABLE_V_2, SEARCH_HISTORY_TABLE_V_1],
        migration: Some(migrate_favorite_ids_to_autoincrement),
    },
];

/// Rebuilds `favorite_track` so ids of removed favorites are never handed
/// out again. Existing ids are copied as they are.
fn migrate_favorite_ids_to_autoincrement(conn: &Connection) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("ALTER TABLE favorite_track RENAME TO favorite_track_v1", [])?;
    FAVORITE_TRACK_TABLE_V_2.create(&tx)?;
    tx.execute(
        &format!(
            "INSERT INTO favorite_track ({cols}) SELECT {cols} FROM favorite_track_v1",
            cols = FAVORITE_COLUMNS
        ),
        [],
    )?;
    tx.execute("DROP TABLE favorite_track_v1", [])?;
    tx.commit()?;
    Ok(())
}

const FAVORITE_COLUMNS: &str =
    "id, track_id, name, artist, preview_url, external_url, image, created";

fn favorite_from_row(row: &Row) -> rusqlite::Result<FavoriteRecord> {
    Ok(FavoriteRecord {
        id: row.get(0)?,
        track_id: row.get(1)?,
        name: row.get(2)?,
        artist: row.get(3)?,
        preview_url: row.get(4)?,
        external_url: row.get(5)?,
        image_url: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, LibraryError> {
    conn.lock().map_err(|_| LibraryError::ConnectionPoisoned)
}

/// SQLite-backed favorites and search history.
#[derive(Clone)]
pub struct SqliteLibraryStore {
    write_conn: Arc<Mutex<Connection>>,
    read_pool: Vec<Arc<Mutex<Connection>>>,
    read_index: Arc<AtomicUsize>,
}

impl SqliteLibraryStore {
    /// Opens (or creates) the library database at `db_path`.
    ///
    /// The schema is created or migrated before any read connection is opened.
    /// A `read_pool_size` of 0 makes reads share the write connection.
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self, LibraryError> {
        let db_path = db_path.as_ref();

        let write_conn = Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open library database {}", db_path.display()))?;
        write_conn.busy_timeout(BUSY_TIMEOUT)?;
        let journal_mode: String =
            write_conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("Library database journal mode: {}", journal_mode);

        let version = prepare_schema(&write_conn, VERSIONED_SCHEMAS)?;

        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.busy_timeout(BUSY_TIMEOUT)?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        info!(
            "Opened library database {} at schema version {} with {} read connections",
            db_path.display(),
            version,
            read_pool_size
        );

        Ok(SqliteLibraryStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn get_read_conn(&self) -> &Mutex<Connection> {
        if self.read_pool.is_empty() {
            return &self.write_conn;
        }
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        &self.read_pool[index]
    }

    fn find_favorite(
        conn: &Connection,
        track_id: &str,
    ) -> Result<Option<FavoriteRecord>, LibraryError> {
        let record = conn
            .query_row(
                &format!("SELECT {} FROM favorite_track WHERE track_id = ?1", FAVORITE_COLUMNS),
                params![track_id],
                favorite_from_row,
            )
            .optional()?;
        Ok(record)
    }
}

impl FavoritesStore for SqliteLibraryStore {
    fn add_favorite(&self, favorite: NewFavorite) -> Result<FavoriteInsert, LibraryError> {
        let track_id = favorite.track_id.trim();
        if track_id.is_empty() {
            return Err(LibraryError::Validation("track id must not be empty".to_string()));
        }

        let mut conn = lock(&self.write_conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.execute(
            "INSERT INTO favorite_track (track_id, name, artist, preview_url, external_url, image) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                track_id,
                favorite.name,
                favorite.artist,
                favorite.preview_url,
                favorite.external_url,
                favorite.image_url,
            ],
        );

        let outcome = match inserted {
            Ok(_) => {
                let id = tx.last_insert_rowid();
                let record = tx.query_row(
                    &format!("SELECT {} FROM favorite_track WHERE id = ?1", FAVORITE_COLUMNS),
                    params![id],
                    favorite_from_row,
                )?;
                FavoriteInsert::Created(record)
            }
            Err(err) if is_unique_violation(&err) => {
                debug!("Track {} already favorited, reading it back", track_id);
                match Self::find_favorite(&tx, track_id)? {
                    Some(record) => FavoriteInsert::Existing(record),
                    None => return Err(LibraryError::ReadbackMissing(track_id.to_string())),
                }
            }
            Err(err) => return Err(err.into()),
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn list_favorites(&self) -> Result<Vec<FavoriteRecord>, LibraryError> {
        let conn = lock(self.get_read_conn())?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM favorite_track ORDER BY created DESC, id DESC",
            FAVORITE_COLUMNS
        ))?;
        let records = stmt
            .query_map([], favorite_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn get_favorite(&self, track_id: &str) -> Result<Option<FavoriteRecord>, LibraryError> {
        let conn = lock(self.get_read_conn())?;
        Self::find_favorite(&conn, track_id)
    }

    fn remove_favorite(&self, track_id: &str) -> Result<bool, LibraryError> {
        let conn = lock(&self.write_conn)?;
        let removed = conn.execute(
            "DELETE FROM favorite_track WHERE track_id = ?1",
            params![track_id.trim()],
        )?;
        Ok(removed > 0)
    }
}

impl HistoryStore for SqliteLibraryStore {
    fn record_query(&self, query: &str) -> Result<(), LibraryError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LibraryError::Validation("query must not be empty".to_string()));
        }

        let mut conn = lock(&self.write_conn)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let replaced = tx.execute("DELETE FROM search_history WHERE query = ?1", params![query])?;
        tx.execute("INSERT INTO search_history (query) VALUES (?1)", params![query])?;
        tx.commit()?;

        if replaced > 0 {
            debug!("Promoted history query '{}'", query);
        }
        Ok(())
    }

    fn recent_queries(&self, limit: usize) -> Result<Vec<String>, LibraryError> {
        // A negative LIMIT means no limit to sqlite
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = lock(self.get_read_conn())?;
        let mut stmt = conn
            .prepare("SELECT query FROM search_history ORDER BY created DESC, id DESC LIMIT ?1")?;
        let queries = stmt
            .query_map(params![limit], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(queries)
    }
}
