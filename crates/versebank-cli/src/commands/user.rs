//! Account command handlers

use anyhow::{bail, Context, Result};

use versebank_core::{NewUser, Patch, Session, Store, User, UserPatch, DEFAULT_TRANSLATION};

use crate::output::Output;

/// Register a new account and authenticate as it
pub fn register(
    store: &Store,
    name: String,
    phone: String,
    denomination: Option<String>,
    translation: Option<String>,
    output: &Output,
) -> Result<()> {
    let input = NewUser {
        name,
        phone,
        denomination,
        preferred_translation: translation.unwrap_or_else(|| DEFAULT_TRANSLATION.to_string()),
    };

    let mut session = Session::new();
    let user = session
        .register(store, &input)
        .context("Failed to register account")?;

    output.success(&format!("Registered {}", user.name));
    output.print_user(&user);
    Ok(())
}

/// Log in by phone number and show the profile
pub fn login(store: &Store, phone: String, output: &Output) -> Result<()> {
    let mut session = Session::new();
    match session.login(store, &phone)? {
        Some(user) => {
            output.success(&format!("Welcome back, {}", user.name));
            output.print_user(&user);
            Ok(())
        }
        None => bail!("No account registered for {}", phone),
    }
}

/// Show a profile by phone number
pub fn show(store: &Store, phone: String, output: &Output) -> Result<()> {
    let user = find_by_phone(store, &phone)?;
    output.print_user(&user);
    Ok(())
}

/// Update profile fields
pub fn update(
    store: &Store,
    phone: String,
    name: Option<String>,
    denomination: Option<String>,
    clear_denomination: bool,
    translation: Option<String>,
    output: &Output,
) -> Result<()> {
    let user = find_by_phone(store, &phone)?;

    let patch = build_patch(name, denomination, clear_denomination, translation);
    if patch.is_empty() {
        bail!("Nothing to update; pass at least one field");
    }

    store
        .update_user(&user.id, &patch)
        .context("Failed to update profile")?;

    let updated = store
        .get_user_by_id(&user.id)?
        .context("Profile vanished during update")?;

    output.success("Profile updated");
    output.print_user(&updated);
    Ok(())
}

fn find_by_phone(store: &Store, phone: &str) -> Result<User> {
    match store.get_user_by_phone(phone)? {
        Some(user) => Ok(user),
        None => bail!("No account registered for {}", phone),
    }
}

fn build_patch(
    name: Option<String>,
    denomination: Option<String>,
    clear_denomination: bool,
    translation: Option<String>,
) -> UserPatch {
    UserPatch {
        name: name.map(Patch::Set).unwrap_or_default(),
        denomination: if clear_denomination {
            Patch::Set(None)
        } else {
            denomination.map(|d| Patch::Set(Some(d))).unwrap_or_default()
        },
        preferred_translation: translation.map(Patch::Set).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_patch_distinguishes_clear_from_omitted() {
        let omitted = build_patch(None, None, false, None);
        assert!(omitted.is_empty());

        let cleared = build_patch(None, None, true, None);
        assert_eq!(cleared.denomination, Patch::Set(None));

        let set = build_patch(None, Some("Baptist".to_string()), false, None);
        assert_eq!(set.denomination, Patch::Set(Some("Baptist".to_string())));
    }
}
