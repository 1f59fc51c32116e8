//! SQLite schema for users and verses
//!
//! `init_schema` is safe to call on every process start. Shape changes are
//! expressed as an ordered list of versioned migration steps; each step is
//! idempotent and runs in its own transaction, so a failed step leaves the
//! previous shape fully intact.

use rusqlite::{Connection, Result, Transaction};
use tracing::debug;

use crate::storage::error::{StorageError, StorageResult};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Columns of the current `users` shape, in declaration order
const USER_COLUMNS: &[&str] = &[
    "id",
    "name",
    "phone",
    "denomination",
    "preferredTranslation",
    "createdAt",
];

/// Initialize the database schema
///
/// Creates the tables if absent. A fresh database is stamped with the
/// current version; a database that predates version bookkeeping is stamped
/// at version 1 so pending migrations still run against it.
pub fn init_schema(conn: &Connection) -> StorageResult<()> {
    let legacy = table_exists(conn, "users")? && !table_exists(conn, "schema_info")?;

    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- User accounts; phone is the login credential
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            phone TEXT NOT NULL UNIQUE,
            denomination TEXT,
            preferredTranslation TEXT NOT NULL DEFAULT 'NIV',
            createdAt TEXT NOT NULL
        );

        -- Collected verses, many per user
        CREATE TABLE IF NOT EXISTS verses (
            id TEXT PRIMARY KEY,
            book TEXT NOT NULL,
            chapter INTEGER NOT NULL,
            verse INTEGER NOT NULL,
            content TEXT NOT NULL,
            reference TEXT NOT NULL,
            translation TEXT NOT NULL,
            userId TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            createdAt TEXT NOT NULL,
            updatedAt TEXT NOT NULL
        );

        -- Indexes for the two ordered list queries
        CREATE INDEX IF NOT EXISTS idx_verses_userId ON verses(userId);
        CREATE INDEX IF NOT EXISTS idx_verses_createdAt ON verses(createdAt);
        "#,
    )?;

    if get_schema_version(conn)?.is_none() {
        let version = if legacy { 1 } else { SCHEMA_VERSION };
        set_schema_version(conn, version)?;
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    let mut stmt = conn.prepare("SELECT value FROM schema_info WHERE key = 'version'")?;
    let result: Result<String> = stmt.query_row([], |row| row.get(0));

    match result {
        Ok(version_str) => Ok(version_str.parse().ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check if schema needs initialization or migration
pub fn needs_init(conn: &Connection) -> bool {
    if !table_exists(conn, "schema_info").unwrap_or(false) {
        return true;
    }

    match get_schema_version(conn) {
        Ok(Some(v)) => v < SCHEMA_VERSION,
        _ => true,
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?1)",
        [version.to_string()],
    )?;
    Ok(())
}

/// A single versioned schema change
struct Migration {
    version: i32,
    name: &'static str,
    apply: fn(&Transaction) -> Result<()>,
}

/// Ordered migration steps; each entry's version is the version the database
/// is at after the step succeeds.
const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    name: "drop-users-email",
    apply: migrate_drop_users_email,
}];

/// Apply every migration step above the stored version, in order
///
/// Each step runs in one transaction together with its version stamp, so the
/// caller observes either the old shape or the new one, never a partial
/// rebuild. A failing step stops the walk and surfaces `Migration`.
pub fn run_migrations(conn: &mut Connection) -> StorageResult<()> {
    let current = get_schema_version(conn)?.unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        // Table rebuilds cannot run with foreign-key enforcement active;
        // the pragma is a no-op inside a transaction, so toggle it outside.
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        let applied = apply_migration(conn, migration);
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        applied.map_err(|err| StorageError::Migration {
            version: migration.version,
            name: migration.name,
            message: err.to_string(),
        })?;

        debug!(
            version = migration.version,
            name = migration.name,
            "applied schema migration"
        );
    }

    Ok(())
}

fn apply_migration(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let tx = conn.transaction()?;
    (migration.apply)(&tx)?;
    tx.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?1)",
        [migration.version.to_string()],
    )?;
    tx.commit()
}

/// Version 2: rebuild `users` without the obsolete `email` column
///
/// Early builds staged an email column on `users` for cloud sync that never
/// shipped. Create the correct shape, copy rows across the columns that
/// still exist, drop the old table, rename the new one into place.
fn migrate_drop_users_email(tx: &Transaction) -> Result<()> {
    if !table_has_column(tx, "users", "email")? {
        return Ok(());
    }

    let existing = table_columns(tx, "users")?;
    let surviving: Vec<&str> = USER_COLUMNS
        .iter()
        .copied()
        .filter(|col| existing.iter().any(|have| have == col))
        .collect();
    let column_list = surviving.join(", ");

    tx.execute_batch(&format!(
        r#"
        CREATE TABLE users_migrated (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            phone TEXT NOT NULL UNIQUE,
            denomination TEXT,
            preferredTranslation TEXT NOT NULL DEFAULT 'NIV',
            createdAt TEXT NOT NULL
        );
        INSERT INTO users_migrated ({columns}) SELECT {columns} FROM users;
        DROP TABLE users;
        ALTER TABLE users_migrated RENAME TO users;
        "#,
        columns = column_list
    ))
}

/// Check whether a table exists
fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?
        .exists([name])
}

/// List a table's column names via PRAGMA table_info
fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<String>>>()?;
    Ok(columns)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    Ok(table_columns(conn, table)?.iter().any(|c| c == column))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Legacy shape from before version bookkeeping: extra email column,
    /// no schema_info table.
    fn create_legacy_users(conn: &Connection) {
        conn.execute_batch(
            r#"
            CREATE TABLE users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                phone TEXT NOT NULL UNIQUE,
                denomination TEXT,
                preferredTranslation TEXT NOT NULL DEFAULT 'NIV',
                createdAt TEXT NOT NULL,
                email TEXT
            );
            INSERT INTO users VALUES
                ('u1', 'Jane', '+15550001111', 'Baptist', 'NIV',
                 '2024-03-01T10:00:00+00:00', 'jane@example.com'),
                ('u2', 'Sam', '+15550002222', NULL, 'ESV',
                 '2024-03-02T11:30:00+00:00', NULL);
            "#,
        )
        .unwrap();
    }

    #[test]
    fn test_init_schema() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"verses".to_string()));
        assert!(tables.contains(&"schema_info".to_string()));
    }

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_schema_version() {
        let conn = Connection::open_in_memory().unwrap();

        // Before init, needs init
        assert!(needs_init(&conn));

        init_schema(&conn).unwrap();

        // A fresh database is created at the current version
        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
        assert!(!needs_init(&conn));
    }

    #[test]
    fn test_indexes_exist() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let indexes: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' AND name LIKE 'idx_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(indexes.contains(&"idx_verses_userId".to_string()));
        assert!(indexes.contains(&"idx_verses_createdAt".to_string()));
    }

    #[test]
    fn test_legacy_database_stamped_below_current() {
        let conn = Connection::open_in_memory().unwrap();
        create_legacy_users(&conn);

        init_schema(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), Some(1));
        assert!(needs_init(&conn));
    }

    #[test]
    fn test_migration_drops_email_and_preserves_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        create_legacy_users(&conn);
        init_schema(&conn).unwrap();

        run_migrations(&mut conn).unwrap();

        assert!(!table_has_column(&conn, "users", "email").unwrap());
        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));

        let rows: Vec<(String, String, String, Option<String>, String, String)> = conn
            .prepare(
                "SELECT id, name, phone, denomination, preferredTranslation, createdAt
                 FROM users ORDER BY id",
            )
            .unwrap()
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                ))
            })
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            (
                "u1".to_string(),
                "Jane".to_string(),
                "+15550001111".to_string(),
                Some("Baptist".to_string()),
                "NIV".to_string(),
                "2024-03-01T10:00:00+00:00".to_string(),
            )
        );
        assert_eq!(rows[1].3, None);
        assert_eq!(rows[1].4, "ESV");
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        create_legacy_users(&conn);
        init_schema(&conn).unwrap();

        run_migrations(&mut conn).unwrap();
        run_migrations(&mut conn).unwrap();

        assert!(!table_has_column(&conn, "users", "email").unwrap());
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_migration_on_fresh_database_is_noop() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        run_migrations(&mut conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_failed_migration_leaves_old_table_untouched() {
        let mut conn = Connection::open_in_memory().unwrap();
        // Duplicate ids make the copy into the rebuilt table violate its
        // primary key, forcing the step to fail partway through.
        conn.execute_batch(
            r#"
            CREATE TABLE users (
                id TEXT,
                name TEXT NOT NULL,
                phone TEXT NOT NULL,
                denomination TEXT,
                preferredTranslation TEXT NOT NULL,
                createdAt TEXT NOT NULL,
                email TEXT
            );
            INSERT INTO users VALUES
                ('dup', 'Jane', '+15550001111', NULL, 'NIV', '2024-03-01T10:00:00+00:00', 'a@b.c'),
                ('dup', 'Sam', '+15550002222', NULL, 'NIV', '2024-03-02T10:00:00+00:00', NULL);
            "#,
        )
        .unwrap();
        init_schema(&conn).unwrap();

        let err = run_migrations(&mut conn).unwrap_err();
        assert!(matches!(err, StorageError::Migration { version: 2, .. }));

        // Old shape preserved, rows intact, version not advanced
        assert!(table_has_column(&conn, "users", "email").unwrap());
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(get_schema_version(&conn).unwrap(), Some(1));
    }
}
