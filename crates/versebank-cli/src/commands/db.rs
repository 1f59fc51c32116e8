//! Database inspection and reset handlers
//!
//! Debug flows: inspect table shapes and counts, dump everything, seed a
//! test account, or wipe the store.

use anyhow::{Context, Result};

use versebank_core::{NewUser, NewVerse, Store};

use crate::commands::confirm;
use crate::output::Output;

/// Show tables and row counts
pub fn info(store: &Store, output: &Output) -> Result<()> {
    let tables = store.table_names()?;
    let users = store.user_count()?;
    let verses = store.verse_count()?;

    output.print_db_info(&tables, users, verses);
    Ok(())
}

/// Dump every user and every verse
pub fn dump(store: &Store, output: &Output) -> Result<()> {
    let users = store.list_users()?;
    let verses = store.list_all_verses()?;

    output.success(&format!("Users ({})", users.len()));
    output.print_users(&users);
    output.success(&format!("Verses ({})", verses.len()));
    output.print_verses(&verses);
    Ok(())
}

/// Insert a test account with one verse
pub fn seed(store: &Store, output: &Output) -> Result<()> {
    let user = store
        .create_user(&NewUser {
            name: "Debug User".to_string(),
            phone: "+1234567890".to_string(),
            denomination: Some("Christian".to_string()),
            preferred_translation: "NIV".to_string(),
        })
        .context("Failed to create test account (already seeded?)")?;

    let verse = store
        .add_verse(&NewVerse {
            book: "John".to_string(),
            chapter: 3,
            verse: 16,
            content: "For God so loved the world that he gave his one and only Son, \
                      that whoever believes in him shall not perish but have eternal life."
                .to_string(),
            reference: "John 3:16".to_string(),
            translation: "NIV".to_string(),
            user_id: user.id.clone(),
        })
        .context("Failed to create test verse")?;

    output.success("Seeded test data");
    output.print_user(&user);
    output.print_verse(&verse);
    Ok(())
}

/// Delete all users and verses
pub fn reset(store: &mut Store, yes: bool, output: &Output) -> Result<()> {
    if !yes && output.should_prompt() {
        println!("This deletes every account and verse.");
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.reset().context("Failed to reset database")?;

    output.success("Database reset complete");
    Ok(())
}
