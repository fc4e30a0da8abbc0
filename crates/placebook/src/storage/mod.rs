//! Storage layer for placebook.
//!
//! This module provides the `SQLite`-backed local store for places. The store
//! is an explicit object: open it, pass it by reference to whoever needs it,
//! and close it when done.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::place::{Location, Place, PlaceId, PlaceInput};

/// Durable single-table store of places.
///
/// `list_all` is a full-table scan. There is no caching and no index beyond
/// the primary key.
#[derive(Debug)]
pub struct PlaceStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl PlaceStore {
    /// Open or create a place database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self { path, conn };
        store.initialize()?;

        info!("Place store opened at {}", store.path.display());
        Ok(store)
    }

    /// Create an in-memory store, mostly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        let store = Self {
            path: PathBuf::from(":memory:"),
            conn,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Ensure the places table exists. Idempotent.
    ///
    /// `open` already calls this; calling it again is harmless.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created or migrated.
    pub fn initialize(&self) -> Result<()> {
        migrations::initialize_schema(&self.conn)
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the store, reporting any error from the underlying connection.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` refuses to close the connection.
    pub fn close(self) -> Result<()> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, source)| Error::DatabaseClose(source))?;
        debug!("Closed place store at {}", path.display());
        Ok(())
    }

    /// Insert a place and return the identity the store assigned to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write is rejected. Nothing is stored in that case.
    pub fn insert(&self, place: &PlaceInput) -> Result<PlaceId> {
        let location = place.location();
        self.conn.execute(
            schema::INSERT_PLACE,
            params![
                place.title(),
                place.image_uri(),
                location.address,
                location.lat,
                location.long,
            ],
        )?;

        let id = PlaceId::from_raw(self.conn.last_insert_rowid());
        debug!("Inserted place {} with id {}", place.title(), id);
        Ok(id)
    }

    /// Read every stored place, in storage order.
    ///
    /// An empty table gives an empty vector; a failed read is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_all(&self) -> Result<Vec<Place>> {
        let mut stmt = self.conn.prepare(schema::SELECT_ALL_PLACES)?;
        let places = stmt
            .query_map([], Self::row_to_place)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Read {} places from store", places.len());
        Ok(places)
    }

    /// Get a place by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: PlaceId) -> Result<Option<Place>> {
        let place = self
            .conn
            .query_row(schema::SELECT_PLACE_BY_ID, [id.get()], Self::row_to_place)
            .optional()?;
        Ok(place)
    }

    /// Delete a place by id.
    ///
    /// Returns `true` if a place was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete(&self, id: PlaceId) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM places WHERE id = ?1", [id.get()])?;
        if affected > 0 {
            info!("Deleted place {}", id);
        }
        Ok(affected > 0)
    }

    /// Count stored places.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM places", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Drop the places table so later reads and writes fail.
    #[cfg(test)]
    pub(crate) fn break_schema_for_test(&self) {
        self.conn
            .execute_batch("DROP TABLE places")
            .expect("failed to drop places table");
    }

    /// Convert a database row to a Place.
    fn row_to_place(row: &rusqlite::Row) -> rusqlite::Result<Place> {
        let id: i64 = row.get(0)?;
        let title: String = row.get(1)?;
        let image_uri: String = row.get(2)?;
        let address: String = row.get(3)?;
        let lat: f64 = row.get(4)?;
        let long: f64 = row.get(5)?;

        Ok(Place::from_parts(
            PlaceId::from_raw(id),
            title,
            image_uri,
            Location { lat, long, address },
        ))
    }
}
