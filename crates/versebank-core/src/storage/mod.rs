//! Storage layer
//!
//! Schema management and the user/verse repositories over a single SQLite
//! connection. Repository functions take `&Connection` and never cache
//! entities; every read hits the store. The `Store` facade in the crate root
//! owns the connection and composes these modules.

use chrono::{DateTime, Utc};

pub mod error;
pub mod schema;
pub mod users;
pub mod verses;

pub use error::{StorageError, StorageResult};
pub use schema::{init_schema, needs_init, run_migrations, SCHEMA_VERSION};

/// Parse a persisted ISO-8601 timestamp back into a date value
pub(crate) fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| StorageError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_roundtrip() {
        let now = Utc::now();
        let parsed = parse_timestamp(&now.to_rfc3339()).unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(matches!(err, StorageError::InvalidTimestamp { .. }));
    }
}
