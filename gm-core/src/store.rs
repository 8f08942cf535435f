//! SQLite backing store for encounter and character records.
//!
//! Each record is serialised to JSON and stored in a per-campaign SQLite
//! database, one table per record kind:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS encounters (
//!     encounter_id TEXT PRIMARY KEY,
//!     data         BLOB NOT NULL,
//!     version      INTEGER NOT NULL,
//!     updated_at   TEXT NOT NULL
//! );
//! -- characters: identical shape, keyed by character_id
//! ```
//!
//! - WAL mode for concurrent reads during play.
//! - JSON inside a BLOB column keeps the schema stable as the record shapes
//!   grow (unknown fields round-trip through the flattened `extra` maps).
//! - Every row carries a `version` counter. [`SessionStore::save_encounter`]
//!   and [`SessionStore::save_character`] only write when the row still has
//!   the version the caller read, closing the lost-update window between
//!   concurrent read-modify-write cycles.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OpenFlags};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::character::Character;
use crate::config::StoreConfig;
use crate::encounter::Encounter;
use crate::error::{GmError, Result};
use crate::types::{CharacterId, EncounterId};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS encounters (
        encounter_id TEXT PRIMARY KEY,
        data         BLOB NOT NULL,
        version      INTEGER NOT NULL,
        updated_at   TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS characters (
        character_id TEXT PRIMARY KEY,
        data         BLOB NOT NULL,
        version      INTEGER NOT NULL,
        updated_at   TEXT NOT NULL
    );
";

/// A record together with the row version it was read at.
///
/// The version is the token for conditional saves: pass it back to the
/// matching `save_*` call to assert the row has not changed in between.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    /// The deserialised record.
    pub record: T,
    /// Row version at read time.
    pub version: u64,
}

/// Handle to an open SQLite database holding session-state records.
pub struct SessionStore {
    conn: Connection,
    db_path: PathBuf,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Open (or create) an SQLite database at `path`.
    ///
    /// The schema is created if it does not exist. WAL mode is enabled when
    /// `config.wal_mode` is true.
    ///
    /// # Errors
    ///
    /// Returns [`GmError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &StoreConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch(&format!(
            "PRAGMA busy_timeout = {};",
            config.busy_timeout_ms
        ))?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "session store opened"
        );

        Ok(Self { conn, db_path })
    }

    /// Open an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`GmError::Database`] on SQLite failures.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ------------------------------------------------------------------
    // Encounters
    // ------------------------------------------------------------------

    /// Unconditionally save (upsert) an encounter, bumping its version.
    ///
    /// This is the seeding/overwrite path used by record-lifecycle owners;
    /// the operations in [`crate::ops`] use the conditional
    /// [`save_encounter`](Self::save_encounter) instead.
    ///
    /// # Errors
    ///
    /// Returns [`GmError::Serialization`] or [`GmError::Database`].
    pub fn put_encounter(&self, id: &EncounterId, encounter: &Encounter) -> Result<u64> {
        self.put_row("encounters", "encounter_id", id.as_str(), encounter)
    }

    /// Load an encounter and the version it was read at.
    ///
    /// Returns `None` if no row exists for the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GmError::Serialization`] or [`GmError::Database`].
    pub fn load_encounter(&self, id: &EncounterId) -> Result<Option<Versioned<Encounter>>> {
        self.load_row("encounters", "encounter_id", id.as_str())
    }

    /// Conditionally save an encounter: succeeds only if the row still has
    /// `read_version`. Returns the new version.
    ///
    /// # Errors
    ///
    /// Returns [`GmError::VersionConflict`] if the row changed (or vanished)
    /// since it was read, [`GmError::Serialization`], or [`GmError::Database`].
    pub fn save_encounter(
        &self,
        id: &EncounterId,
        encounter: &Encounter,
        read_version: u64,
    ) -> Result<u64> {
        self.save_row(
            "encounters",
            "encounter_id",
            "encounter",
            id.as_str(),
            encounter,
            read_version,
        )
    }

    /// Delete an encounter. Returns `true` if a row was actually deleted.
    ///
    /// # Errors
    ///
    /// Returns [`GmError::Database`] on SQLite failures.
    pub fn delete_encounter(&self, id: &EncounterId) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM encounters WHERE encounter_id = ?1",
            params![id.as_str()],
        )?;
        Ok(deleted > 0)
    }

    /// Number of stored encounters.
    ///
    /// # Errors
    ///
    /// Returns [`GmError::Database`] on SQLite failures.
    pub fn encounter_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM encounters", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    // ------------------------------------------------------------------
    // Characters
    // ------------------------------------------------------------------

    /// Unconditionally save (upsert) a character, bumping its version.
    ///
    /// # Errors
    ///
    /// Returns [`GmError::Serialization`] or [`GmError::Database`].
    pub fn put_character(&self, id: &CharacterId, character: &Character) -> Result<u64> {
        self.put_row("characters", "character_id", id.as_str(), character)
    }

    /// Load a character and the version it was read at.
    ///
    /// Returns `None` if no row exists for the given id.
    ///
    /// # Errors
    ///
    /// Returns [`GmError::Serialization`] or [`GmError::Database`].
    pub fn load_character(&self, id: &CharacterId) -> Result<Option<Versioned<Character>>> {
        self.load_row("characters", "character_id", id.as_str())
    }

    /// Conditionally save a character: succeeds only if the row still has
    /// `read_version`. Returns the new version.
    ///
    /// # Errors
    ///
    /// Returns [`GmError::VersionConflict`] if the row changed (or vanished)
    /// since it was read, [`GmError::Serialization`], or [`GmError::Database`].
    pub fn save_character(
        &self,
        id: &CharacterId,
        character: &Character,
        read_version: u64,
    ) -> Result<u64> {
        self.save_row(
            "characters",
            "character_id",
            "character",
            id.as_str(),
            character,
            read_version,
        )
    }

    /// Delete a character. Returns `true` if a row was actually deleted.
    ///
    /// # Errors
    ///
    /// Returns [`GmError::Database`] on SQLite failures.
    pub fn delete_character(&self, id: &CharacterId) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM characters WHERE character_id = ?1",
            params![id.as_str()],
        )?;
        Ok(deleted > 0)
    }

    /// Number of stored characters.
    ///
    /// # Errors
    ///
    /// Returns [`GmError::Database`] on SQLite failures.
    pub fn character_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM characters", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    // ------------------------------------------------------------------
    // Shared row plumbing
    // ------------------------------------------------------------------

    fn put_row<T: Serialize>(&self, table: &str, key_col: &str, id: &str, record: &T) -> Result<u64> {
        let json =
            serde_json::to_vec(record).map_err(|e| GmError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        // RETURNING keeps the version read in the same statement as the
        // write; a separate SELECT could observe a concurrent writer's bump.
        let sql = format!(
            "INSERT INTO {table} ({key_col}, data, version, updated_at)
             VALUES (?1, ?2, 1, ?3)
             ON CONFLICT({key_col}) DO UPDATE SET
                data = excluded.data,
                version = {table}.version + 1,
                updated_at = excluded.updated_at
             RETURNING version"
        );
        let version: i64 = self
            .conn
            .prepare_cached(&sql)?
            .query_row(params![id, json, now], |row| row.get(0))?;

        debug!(table, id, version, bytes = json.len(), "record stored");
        Ok(u64::try_from(version).unwrap_or(0))
    }

    fn load_row<T: DeserializeOwned>(
        &self,
        table: &str,
        key_col: &str,
        id: &str,
    ) -> Result<Option<Versioned<T>>> {
        let sql = format!("SELECT data, version FROM {table} WHERE {key_col} = ?1");
        let row: Option<(Vec<u8>, i64)> = self
            .conn
            .prepare_cached(&sql)?
            .query_row(params![id], |row| Ok((row.get(0)?, row.get(1)?)))
            .optional()?;

        let Some((data, version)) = row else {
            return Ok(None);
        };

        let record: T = serde_json::from_slice(&data)
            .map_err(|e| GmError::Serialization(e.to_string()))?;

        debug!(table, id, version, "record loaded");
        Ok(Some(Versioned {
            record,
            version: u64::try_from(version).unwrap_or(0),
        }))
    }

    fn save_row<T: Serialize>(
        &self,
        table: &str,
        key_col: &str,
        entity: &'static str,
        id: &str,
        record: &T,
        read_version: u64,
    ) -> Result<u64> {
        let json =
            serde_json::to_vec(record).map_err(|e| GmError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        let sql = format!(
            "UPDATE {table}
             SET data = ?1, version = version + 1, updated_at = ?2
             WHERE {key_col} = ?3 AND version = ?4"
        );
        let updated = self.conn.prepare_cached(&sql)?.execute(params![
            json,
            now,
            id,
            i64::try_from(read_version).unwrap_or(i64::MAX)
        ])?;

        if updated == 0 {
            return Err(GmError::VersionConflict {
                entity,
                id: id.to_owned(),
                read_version,
            });
        }

        debug!(table, id, version = read_version + 1, "record saved");
        Ok(read_version + 1)
    }
}

/// Extension trait that adds an `.optional()` combinator to `rusqlite::Result`.
///
/// Converts `Err(QueryReturnedNoRows)` into `Ok(None)`.
trait OptionalExt<T> {
    /// Convert `QueryReturnedNoRows` into `Ok(None)`.
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> std::result::Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
