//! Versebank Core Library
//!
//! This crate provides the core functionality for Versebank, a local-first
//! collection manager for Bible verses with phone-number-keyed user accounts.
//!
//! # Architecture
//!
//! - **SQLite**: the single store; one connection per process, owned by the
//!   `Store` facade and passed by reference to everything that needs it
//!
//! Repositories never cache entities; every read hits the store directly.
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open()?;
//!
//! // Register an account
//! let user = store.create_user(&NewUser::new("Jane", "+15550001111"))?;
//!
//! // Collect a verse
//! let verse = store.add_verse(&NewVerse { /* ... */ })?;
//!
//! // Browse the library
//! let verses = store.list_verses_by_user(&user.id)?;
//! ```
//!
//! # Modules
//!
//! - `store`: unified storage facade (main entry point)
//! - `models`: data structures for users, verses, and partial-update patches
//! - `storage`: schema management and the two repositories
//! - `session`: caller-owned auth session (phone login, placeholder tokens)
//! - `config`: application configuration

pub mod config;
pub mod models;
pub mod session;
pub mod storage;
pub mod store;

pub use config::Config;
pub use models::{
    generate_id, NewUser, NewVerse, Patch, User, UserPatch, Verse, VersePatch,
    DEFAULT_TRANSLATION,
};
pub use session::{AuthTokens, Session};
pub use storage::{StorageError, StorageResult};
pub use store::Store;
