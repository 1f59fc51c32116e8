//! Data models for Versebank
//!
//! Defines the core data structures: User, Verse, and the patch types used
//! for partial updates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Translation code used when a user does not pick one at registration.
pub const DEFAULT_TRANSLATION: &str = "NIV";

/// A registered user account
///
/// The phone number is the login credential and is unique across users.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Opaque unique identifier, generated at creation
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact number; unique, acts as the login credential
    pub phone: String,
    /// Optional denomination free text
    pub denomination: Option<String>,
    /// Preferred translation code (e.g. "NIV")
    pub preferred_translation: String,
    /// When this account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user; id and created_at are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub phone: String,
    pub denomination: Option<String>,
    pub preferred_translation: String,
}

impl NewUser {
    /// Create a registration input with the default translation
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            denomination: None,
            preferred_translation: DEFAULT_TRANSLATION.to_string(),
        }
    }
}

/// A collected verse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verse {
    /// Opaque unique identifier, generated at creation
    pub id: String,
    /// Book name (e.g. "John")
    pub book: String,
    /// Chapter number
    pub chapter: i64,
    /// Verse number within the chapter
    pub verse: i64,
    /// The verse text
    pub content: String,
    /// Human-readable citation (e.g. "John 3:16")
    pub reference: String,
    /// Translation code the content was taken from
    pub translation: String,
    /// Owning user's identifier
    pub user_id: String,
    /// When this verse was added
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation; equals created_at until then
    pub updated_at: DateTime<Utc>,
}

/// Input for adding a verse; id and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVerse {
    pub book: String,
    pub chapter: i64,
    pub verse: i64,
    pub content: String,
    pub reference: String,
    pub translation: String,
    pub user_id: String,
}

/// A present/absent tagged value for partial updates
///
/// `Set(value)` writes the field; `Keep` leaves it untouched. For optional
/// fields this keeps "set to empty" (`Set(None)`) distinct from "leave
/// unchanged" (`Keep`).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    /// Leave the field as stored
    #[default]
    Keep,
    /// Write this value
    Set(T),
}

impl<T> Patch<T> {
    /// Whether this patch writes the field
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    /// The value to write, if any
    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Keep => None,
        }
    }
}

/// Partial update for a user record
///
/// The phone number is immutable after creation and has no patch field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Patch<String>,
    pub denomination: Patch<Option<String>>,
    pub preferred_translation: Patch<String>,
}

impl UserPatch {
    /// Whether the patch writes no fields at all
    pub fn is_empty(&self) -> bool {
        !self.name.is_set() && !self.denomination.is_set() && !self.preferred_translation.is_set()
    }
}

/// Partial update for a verse record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersePatch {
    pub book: Patch<String>,
    pub chapter: Patch<i64>,
    pub verse: Patch<i64>,
    pub content: Patch<String>,
    pub reference: Patch<String>,
    pub translation: Patch<String>,
    pub user_id: Patch<String>,
}

impl VersePatch {
    /// Whether the patch writes no fields at all
    pub fn is_empty(&self) -> bool {
        !self.book.is_set()
            && !self.chapter.is_set()
            && !self.verse.is_set()
            && !self.content.is_set()
            && !self.reference.is_set()
            && !self.translation.is_set()
            && !self.user_id.is_set()
    }
}

/// Generate an opaque record identifier
///
/// Millisecond timestamp plus a random suffix. Practically unique within a
/// single installation, not globally.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", millis, &suffix[..9])
}
