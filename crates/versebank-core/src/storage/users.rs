//! User repository
//!
//! Create, fetch, partial-update, list, and bulk-delete for user records.
//! Lookup by phone is the sole login mechanism; the phone column carries a
//! UNIQUE constraint and duplicates surface as `Constraint`.

use chrono::Utc;
use rusqlite::{params, Connection, ToSql};

use crate::models::{generate_id, NewUser, Patch, User, UserPatch};
use crate::storage::error::{classify_write_error, StorageError, StorageResult};
use crate::storage::parse_timestamp;

/// Raw row as stored; timestamps still ISO-8601 text
struct UserRow {
    id: String,
    name: String,
    phone: String,
    denomination: Option<String>,
    preferred_translation: String,
    created_at: String,
}

fn read_user_row(row: &rusqlite::Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        denomination: row.get(3)?,
        preferred_translation: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn hydrate_user(row: UserRow) -> StorageResult<User> {
    Ok(User {
        created_at: parse_timestamp(&row.created_at)?,
        id: row.id,
        name: row.name,
        phone: row.phone,
        denomination: row.denomination,
        preferred_translation: row.preferred_translation,
    })
}

/// Insert a new user record, generating id and creation time
///
/// Fails with `Constraint` when the phone number is already registered.
pub fn create_user(conn: &Connection, input: &NewUser) -> StorageResult<User> {
    let user = User {
        id: generate_id(),
        name: input.name.clone(),
        phone: input.phone.clone(),
        denomination: input.denomination.clone(),
        preferred_translation: input.preferred_translation.clone(),
        created_at: Utc::now(),
    };

    conn.execute(
        "INSERT INTO users (id, name, phone, denomination, preferredTranslation, createdAt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id,
            user.name,
            user.phone,
            user.denomination,
            user.preferred_translation,
            user.created_at.to_rfc3339(),
        ],
    )
    .map_err(classify_write_error)?;

    Ok(user)
}

/// Fetch a user by id; absence is `Ok(None)`
pub fn get_user_by_id(conn: &Connection, id: &str) -> StorageResult<Option<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, denomination, preferredTranslation, createdAt
         FROM users WHERE id = ?1",
    )?;

    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(row) => Ok(Some(hydrate_user(read_user_row(row)?)?)),
        None => Ok(None),
    }
}

/// Fetch a user by phone number; absence is `Ok(None)`
pub fn get_user_by_phone(conn: &Connection, phone: &str) -> StorageResult<Option<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, denomination, preferredTranslation, createdAt
         FROM users WHERE phone = ?1",
    )?;

    let mut rows = stmt.query(params![phone])?;
    match rows.next()? {
        Some(row) => Ok(Some(hydrate_user(read_user_row(row)?)?)),
        None => Ok(None),
    }
}

/// Apply a partial update to a user record
///
/// Only `Set` fields are written. An empty patch still routes to the target
/// row, so a missing id fails with `NotFound` either way.
pub fn update_user(conn: &Connection, id: &str, patch: &UserPatch) -> StorageResult<()> {
    let mut assignments: Vec<&'static str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Patch::Set(name) = &patch.name {
        assignments.push("name = ?");
        values.push(Box::new(name.clone()));
    }
    if let Patch::Set(denomination) = &patch.denomination {
        assignments.push("denomination = ?");
        values.push(Box::new(denomination.clone()));
    }
    if let Patch::Set(translation) = &patch.preferred_translation {
        assignments.push("preferredTranslation = ?");
        values.push(Box::new(translation.clone()));
    }

    if assignments.is_empty() {
        let exists = conn
            .prepare("SELECT 1 FROM users WHERE id = ?1")?
            .exists([id])?;
        if !exists {
            return Err(StorageError::NotFound {
                entity: "user",
                id: id.to_string(),
            });
        }
        return Ok(());
    }

    values.push(Box::new(id.to_string()));
    let sql = format!("UPDATE users SET {} WHERE id = ?", assignments.join(", "));

    let affected = conn
        .execute(&sql, rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())))
        .map_err(classify_write_error)?;

    if affected == 0 {
        return Err(StorageError::NotFound {
            entity: "user",
            id: id.to_string(),
        });
    }
    Ok(())
}

/// List every user, most recently created first
pub fn list_users(conn: &Connection) -> StorageResult<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, denomination, preferredTranslation, createdAt
         FROM users ORDER BY createdAt DESC",
    )?;

    let rows = stmt
        .query_map([], read_user_row)?
        .collect::<rusqlite::Result<Vec<UserRow>>>()?;

    rows.into_iter().map(hydrate_user).collect()
}

/// Remove every user row, returning how many were deleted
///
/// Debug/reset flows only. Cascade removes the users' verses with them.
pub fn delete_all_users(conn: &Connection) -> StorageResult<usize> {
    Ok(conn.execute("DELETE FROM users", [])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::init_schema;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn jane() -> NewUser {
        NewUser::new("Jane", "+15550001111")
    }

    #[test]
    fn test_create_then_get_by_id() {
        let conn = test_conn();
        let created = create_user(&conn, &jane()).unwrap();

        let fetched = get_user_by_id(&conn, &created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_created_at_monotonic() {
        let conn = test_conn();
        let first = create_user(&conn, &jane()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = create_user(&conn, &NewUser::new("Sam", "+15550002222")).unwrap();
        assert!(second.created_at > first.created_at);
    }

    #[test]
    fn test_duplicate_phone_rejected() {
        let conn = test_conn();
        create_user(&conn, &jane()).unwrap();

        let err = create_user(&conn, &NewUser::new("Impostor", "+15550001111")).unwrap_err();
        assert!(matches!(err, StorageError::Constraint(_)));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_get_by_phone() {
        let conn = test_conn();
        let created = create_user(&conn, &jane()).unwrap();

        let found = get_user_by_phone(&conn, "+15550001111").unwrap().unwrap();
        assert_eq!(found.id, created.id);

        assert!(get_user_by_phone(&conn, "+15559999999").unwrap().is_none());
    }

    #[test]
    fn test_update_touches_only_set_fields() {
        let conn = test_conn();
        let created = create_user(
            &conn,
            &NewUser {
                denomination: Some("Baptist".to_string()),
                ..jane()
            },
        )
        .unwrap();

        let patch = UserPatch {
            name: Patch::Set("Jane Doe".to_string()),
            ..Default::default()
        };
        update_user(&conn, &created.id, &patch).unwrap();

        let after = get_user_by_id(&conn, &created.id).unwrap().unwrap();
        assert_eq!(after.name, "Jane Doe");
        assert_eq!(after.phone, created.phone);
        assert_eq!(after.denomination, created.denomination);
        assert_eq!(after.preferred_translation, created.preferred_translation);
        assert_eq!(after.created_at, created.created_at);
    }

    #[test]
    fn test_update_distinguishes_clear_from_keep() {
        let conn = test_conn();
        let created = create_user(
            &conn,
            &NewUser {
                denomination: Some("Baptist".to_string()),
                ..jane()
            },
        )
        .unwrap();

        // Keep leaves the stored value alone
        update_user(
            &conn,
            &created.id,
            &UserPatch {
                name: Patch::Set("J".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        let after = get_user_by_id(&conn, &created.id).unwrap().unwrap();
        assert_eq!(after.denomination, Some("Baptist".to_string()));

        // Set(None) is an explicit clear
        update_user(
            &conn,
            &created.id,
            &UserPatch {
                denomination: Patch::Set(None),
                ..Default::default()
            },
        )
        .unwrap();
        let after = get_user_by_id(&conn, &created.id).unwrap().unwrap();
        assert_eq!(after.denomination, None);
    }

    #[test]
    fn test_update_missing_user() {
        let conn = test_conn();

        let err = update_user(
            &conn,
            "nope",
            &UserPatch {
                name: Patch::Set("X".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "user", .. }));

        // Empty patch still routes to the target row
        let err = update_user(&conn, "nope", &UserPatch::default()).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_update_empty_patch_on_existing_user() {
        let conn = test_conn();
        let created = create_user(&conn, &jane()).unwrap();
        update_user(&conn, &created.id, &UserPatch::default()).unwrap();
        let after = get_user_by_id(&conn, &created.id).unwrap().unwrap();
        assert_eq!(after, created);
    }

    #[test]
    fn test_list_users_most_recent_first() {
        let conn = test_conn();
        create_user(&conn, &jane()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let newer = create_user(&conn, &NewUser::new("Sam", "+15550002222")).unwrap();

        let users = list_users(&conn).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, newer.id);
    }

    #[test]
    fn test_delete_all_users() {
        let conn = test_conn();
        create_user(&conn, &jane()).unwrap();
        create_user(&conn, &NewUser::new("Sam", "+15550002222")).unwrap();

        assert_eq!(delete_all_users(&conn).unwrap(), 2);
        assert!(list_users(&conn).unwrap().is_empty());
    }
}
