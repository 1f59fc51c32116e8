//! Verse command handlers

use anyhow::{bail, Context, Result};

use versebank_core::{NewVerse, Patch, Store, VersePatch};

use crate::commands::confirm;
use crate::output::Output;

/// Add a verse to an account's collection
#[allow(clippy::too_many_arguments)]
pub fn add(
    store: &Store,
    phone: String,
    book: String,
    chapter: i64,
    verse: i64,
    content: String,
    reference: Option<String>,
    translation: Option<String>,
    output: &Output,
) -> Result<()> {
    let owner = match store.get_user_by_phone(&phone)? {
        Some(user) => user,
        None => bail!("No account registered for {}", phone),
    };

    let input = NewVerse {
        reference: reference.unwrap_or_else(|| default_reference(&book, chapter, verse)),
        translation: translation.unwrap_or_else(|| owner.preferred_translation.clone()),
        book,
        chapter,
        verse,
        content,
        user_id: owner.id,
    };

    let created = store.add_verse(&input).context("Failed to add verse")?;

    output.success(&format!("Added {}", created.reference));
    output.print_verse(&created);
    Ok(())
}

/// List an account's verses, most recent first
pub fn list(store: &Store, phone: String, output: &Output) -> Result<()> {
    let owner = match store.get_user_by_phone(&phone)? {
        Some(user) => user,
        None => bail!("No account registered for {}", phone),
    };

    let verses = store.list_verses_by_user(&owner.id)?;
    output.print_verses(&verses);
    Ok(())
}

/// Show a single verse
pub fn show(store: &Store, id: String, output: &Output) -> Result<()> {
    let verse = store
        .get_verse(&id)?
        .with_context(|| format!("Verse not found: {}", id))?;

    output.print_verse(&verse);
    Ok(())
}

/// Edit verse fields
#[allow(clippy::too_many_arguments)]
pub fn edit(
    store: &Store,
    id: String,
    book: Option<String>,
    chapter: Option<i64>,
    verse: Option<i64>,
    content: Option<String>,
    reference: Option<String>,
    translation: Option<String>,
    output: &Output,
) -> Result<()> {
    let patch = VersePatch {
        book: book.map(Patch::Set).unwrap_or_default(),
        chapter: chapter.map(Patch::Set).unwrap_or_default(),
        verse: verse.map(Patch::Set).unwrap_or_default(),
        content: content.map(Patch::Set).unwrap_or_default(),
        reference: reference.map(Patch::Set).unwrap_or_default(),
        translation: translation.map(Patch::Set).unwrap_or_default(),
        user_id: Patch::Keep,
    };
    if patch.is_empty() {
        bail!("Nothing to update; pass at least one field");
    }

    store
        .update_verse(&id, &patch)
        .context("Failed to update verse")?;

    let updated = store
        .get_verse(&id)?
        .with_context(|| format!("Verse not found: {}", id))?;

    output.success("Verse updated");
    output.print_verse(&updated);
    Ok(())
}

/// Delete a verse
pub fn delete(store: &Store, id: String, output: &Output) -> Result<()> {
    let verse = store
        .get_verse(&id)?
        .with_context(|| format!("Verse not found: {}", id))?;

    if output.should_prompt() {
        println!("Delete {} ({})", verse.reference, verse.translation);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    store.delete_verse(&id).context("Failed to delete verse")?;

    output.success(&format!("Deleted {}", verse.reference));
    Ok(())
}

/// Citation used when the caller does not supply one
fn default_reference(book: &str, chapter: i64, verse: i64) -> String {
    format!("{} {}:{}", book, chapter, verse)
}
