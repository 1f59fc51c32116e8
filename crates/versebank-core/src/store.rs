//! Unified storage facade
//!
//! The `Store` owns the single process-wide SQLite connection and composes
//! the schema manager with the user and verse repositories behind one
//! interface. Construct it once and pass it by reference; there is no
//! global instance.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open()?;
//!
//! let user = store.create_user(&NewUser::new("Jane", "+15550001111"))?;
//! let verses = store.list_verses_by_user(&user.id)?;
//! ```

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::warn;

use crate::config::Config;
use crate::models::{NewUser, NewVerse, User, UserPatch, Verse, VersePatch};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::{schema, users, verses};

/// Storage facade for user accounts and collected verses
pub struct Store {
    /// The single open handle; the engine serializes access internally
    conn: Connection,
}

impl Store {
    /// Open the store at the configured location
    ///
    /// Loads configuration, creates the data directory on first run, and
    /// brings the schema up to date.
    pub fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Ok(Self::open_with_config(&config)?)
    }

    /// Open the store with a specific configuration
    pub fn open_with_config(config: &Config) -> StorageResult<Self> {
        let path = config.sqlite_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path).map_err(|source| StorageError::Unavailable {
            path: path.clone(),
            source,
        })?;

        Self::initialize(conn)
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn)
    }

    fn initialize(mut conn: Connection) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        if schema::needs_init(&conn) {
            schema::init_schema(&conn)?;
        }

        // Deliberately lenient: an un-migrated schema only carries an extra
        // column that nothing reads, so serve it rather than refuse to start.
        if let Err(err) = schema::run_migrations(&mut conn) {
            warn!(error = %err, "schema migration failed; continuing on previous schema");
        }

        Ok(Self { conn })
    }

    // ==================== User Operations ====================

    /// Register a new user; fails with `Constraint` on a duplicate phone
    pub fn create_user(&self, input: &NewUser) -> StorageResult<User> {
        users::create_user(&self.conn, input)
    }

    /// Look up a user by phone number (the login mechanism)
    pub fn get_user_by_phone(&self, phone: &str) -> StorageResult<Option<User>> {
        users::get_user_by_phone(&self.conn, phone)
    }

    /// Look up a user by id
    pub fn get_user_by_id(&self, id: &str) -> StorageResult<Option<User>> {
        users::get_user_by_id(&self.conn, id)
    }

    /// Apply a partial update to a user
    pub fn update_user(&self, id: &str, patch: &UserPatch) -> StorageResult<()> {
        users::update_user(&self.conn, id, patch)
    }

    /// List every user, most recently registered first
    pub fn list_users(&self) -> StorageResult<Vec<User>> {
        users::list_users(&self.conn)
    }

    // ==================== Verse Operations ====================

    /// Add a verse to its owner's collection
    pub fn add_verse(&self, input: &NewVerse) -> StorageResult<Verse> {
        verses::add_verse(&self.conn, input)
    }

    /// Fetch a verse by id
    pub fn get_verse(&self, id: &str) -> StorageResult<Option<Verse>> {
        verses::get_verse(&self.conn, id)
    }

    /// List a user's verses, most recently added first
    pub fn list_verses_by_user(&self, user_id: &str) -> StorageResult<Vec<Verse>> {
        verses::list_verses_by_user(&self.conn, user_id)
    }

    /// Global verse listing across all users (debug only)
    pub fn list_all_verses(&self) -> StorageResult<Vec<Verse>> {
        verses::list_all_verses(&self.conn)
    }

    /// Apply a partial update to a verse; refreshes its updated time
    pub fn update_verse(&self, id: &str, patch: &VersePatch) -> StorageResult<()> {
        verses::update_verse(&self.conn, id, patch)
    }

    /// Remove a verse; missing ids are a no-op
    pub fn delete_verse(&self, id: &str) -> StorageResult<()> {
        verses::delete_verse(&self.conn, id)
    }

    // ==================== Debug / Reset ====================

    /// Number of registered users
    pub fn user_count(&self) -> StorageResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?)
    }

    /// Number of collected verses across all users
    pub fn verse_count(&self) -> StorageResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM verses", [], |row| row.get(0))?)
    }

    /// Names of the tables present in the database file
    pub fn table_names(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Remove every verse and every user as one atomic unit
    ///
    /// Debug/reset flows only; a failure partway through rolls back.
    pub fn reset(&mut self) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        verses::delete_all_verses(&tx)?;
        users::delete_all_users(&tx)?;
        tx.commit()?;
        Ok(())
    }
}
