//! Verse repository
//!
//! Create, fetch, per-user listing, partial-update, and delete for verse
//! records. Ownership is enforced at the schema level: `userId` must
//! reference an existing user, and deleting a user cascades to their verses.

use chrono::Utc;
use rusqlite::{params, Connection, ToSql};

use crate::models::{generate_id, NewVerse, Patch, Verse, VersePatch};
use crate::storage::error::{classify_write_error, StorageError, StorageResult};
use crate::storage::parse_timestamp;

const VERSE_COLUMNS: &str =
    "id, book, chapter, verse, content, reference, translation, userId, createdAt, updatedAt";

/// Raw row as stored; timestamps still ISO-8601 text
struct VerseRow {
    id: String,
    book: String,
    chapter: i64,
    verse: i64,
    content: String,
    reference: String,
    translation: String,
    user_id: String,
    created_at: String,
    updated_at: String,
}

fn read_verse_row(row: &rusqlite::Row) -> rusqlite::Result<VerseRow> {
    Ok(VerseRow {
        id: row.get(0)?,
        book: row.get(1)?,
        chapter: row.get(2)?,
        verse: row.get(3)?,
        content: row.get(4)?,
        reference: row.get(5)?,
        translation: row.get(6)?,
        user_id: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn hydrate_verse(row: VerseRow) -> StorageResult<Verse> {
    Ok(Verse {
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
        id: row.id,
        book: row.book,
        chapter: row.chapter,
        verse: row.verse,
        content: row.content,
        reference: row.reference,
        translation: row.translation,
        user_id: row.user_id,
    })
}

/// Insert a new verse, generating id and timestamps
///
/// `updated_at` starts equal to `created_at`. Fails with `Constraint` when
/// `user_id` does not reference an existing user.
pub fn add_verse(conn: &Connection, input: &NewVerse) -> StorageResult<Verse> {
    let now = Utc::now();
    let verse = Verse {
        id: generate_id(),
        book: input.book.clone(),
        chapter: input.chapter,
        verse: input.verse,
        content: input.content.clone(),
        reference: input.reference.clone(),
        translation: input.translation.clone(),
        user_id: input.user_id.clone(),
        created_at: now,
        updated_at: now,
    };

    conn.execute(
        "INSERT INTO verses (id, book, chapter, verse, content, reference, translation, userId, createdAt, updatedAt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            verse.id,
            verse.book,
            verse.chapter,
            verse.verse,
            verse.content,
            verse.reference,
            verse.translation,
            verse.user_id,
            verse.created_at.to_rfc3339(),
            verse.updated_at.to_rfc3339(),
        ],
    )
    .map_err(classify_write_error)?;

    Ok(verse)
}

/// Fetch a verse by id; absence is `Ok(None)`
pub fn get_verse(conn: &Connection, id: &str) -> StorageResult<Option<Verse>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM verses WHERE id = ?1",
        VERSE_COLUMNS
    ))?;

    let mut rows = stmt.query(params![id])?;
    match rows.next()? {
        Some(row) => Ok(Some(hydrate_verse(read_verse_row(row)?)?)),
        None => Ok(None),
    }
}

/// List a user's verses, most recently added first
///
/// A user with no verses yields an empty vec, not an error.
pub fn list_verses_by_user(conn: &Connection, user_id: &str) -> StorageResult<Vec<Verse>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM verses WHERE userId = ?1 ORDER BY createdAt DESC",
        VERSE_COLUMNS
    ))?;

    let rows = stmt
        .query_map(params![user_id], read_verse_row)?
        .collect::<rusqlite::Result<Vec<VerseRow>>>()?;

    rows.into_iter().map(hydrate_verse).collect()
}

/// Global listing across all users, most recently added first (debug only)
pub fn list_all_verses(conn: &Connection) -> StorageResult<Vec<Verse>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM verses ORDER BY createdAt DESC",
        VERSE_COLUMNS
    ))?;

    let rows = stmt
        .query_map([], read_verse_row)?
        .collect::<rusqlite::Result<Vec<VerseRow>>>()?;

    rows.into_iter().map(hydrate_verse).collect()
}

/// Apply a partial update to a verse record
///
/// Only `Set` fields are written; `updatedAt` refreshes on every update
/// regardless of which fields changed. Fails with `NotFound` when no row
/// matches `id`.
pub fn update_verse(conn: &Connection, id: &str, patch: &VersePatch) -> StorageResult<()> {
    let mut assignments: Vec<&'static str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Patch::Set(book) = &patch.book {
        assignments.push("book = ?");
        values.push(Box::new(book.clone()));
    }
    if let Patch::Set(chapter) = &patch.chapter {
        assignments.push("chapter = ?");
        values.push(Box::new(*chapter));
    }
    if let Patch::Set(verse) = &patch.verse {
        assignments.push("verse = ?");
        values.push(Box::new(*verse));
    }
    if let Patch::Set(content) = &patch.content {
        assignments.push("content = ?");
        values.push(Box::new(content.clone()));
    }
    if let Patch::Set(reference) = &patch.reference {
        assignments.push("reference = ?");
        values.push(Box::new(reference.clone()));
    }
    if let Patch::Set(translation) = &patch.translation {
        assignments.push("translation = ?");
        values.push(Box::new(translation.clone()));
    }
    if let Patch::Set(user_id) = &patch.user_id {
        assignments.push("userId = ?");
        values.push(Box::new(user_id.clone()));
    }

    assignments.push("updatedAt = ?");
    values.push(Box::new(Utc::now().to_rfc3339()));
    values.push(Box::new(id.to_string()));

    let sql = format!("UPDATE verses SET {} WHERE id = ?", assignments.join(", "));

    let affected = conn
        .execute(&sql, rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())))
        .map_err(classify_write_error)?;

    if affected == 0 {
        return Err(StorageError::NotFound {
            entity: "verse",
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Remove a verse; a missing id is a no-op, not an error
pub fn delete_verse(conn: &Connection, id: &str) -> StorageResult<()> {
    conn.execute("DELETE FROM verses WHERE id = ?1", params![id])?;
    Ok(())
}

/// Remove every verse row, returning how many were deleted
pub fn delete_all_verses(conn: &Connection) -> StorageResult<usize> {
    Ok(conn.execute("DELETE FROM verses", [])?)
}
