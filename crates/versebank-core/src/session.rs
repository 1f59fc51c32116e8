//! Auth session management
//!
//! Phone lookup is the sole login mechanism; there is no password. The
//! session is an explicit object owned by the caller and takes the store as
//! an argument, so lifecycle and test isolation stay visible.
//!
//! Tokens are in-memory development placeholders, not a real credential
//! scheme; a production deployment would obtain them from an auth server.

use chrono::{DateTime, Duration, Utc};

use crate::models::{NewUser, User, UserPatch};
use crate::storage::StorageResult;
use crate::store::Store;

/// How long placeholder tokens stay valid
const TOKEN_TTL_HOURS: i64 = 24;

/// Placeholder access/refresh token pair
#[derive(Debug, Clone, PartialEq)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// An authenticated (or signed-out) session
#[derive(Debug, Default)]
pub struct Session {
    current_user: Option<User>,
    tokens: Option<AuthTokens>,
}

impl Session {
    /// Create a signed-out session
    pub fn new() -> Self {
        Self::default()
    }

    /// Log in by phone number
    ///
    /// Returns `Ok(None)` and stays signed out when no account matches.
    pub fn login(&mut self, store: &Store, phone: &str) -> StorageResult<Option<User>> {
        match store.get_user_by_phone(phone)? {
            Some(user) => {
                self.tokens = Some(issue_tokens(&user));
                self.current_user = Some(user.clone());
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    /// Register a new account and authenticate as it
    pub fn register(&mut self, store: &Store, input: &NewUser) -> StorageResult<User> {
        let user = store.create_user(input)?;
        self.tokens = Some(issue_tokens(&user));
        self.current_user = Some(user.clone());
        Ok(user)
    }

    /// Sign out, dropping the current user and tokens
    pub fn logout(&mut self) {
        self.current_user = None;
        self.tokens = None;
    }

    /// Update the current user's profile and reload it from the store
    pub fn update_profile(&mut self, store: &Store, patch: &UserPatch) -> StorageResult<User> {
        let id = match &self.current_user {
            Some(user) => user.id.clone(),
            None => {
                return Err(crate::storage::StorageError::NotFound {
                    entity: "user",
                    id: "(signed out)".to_string(),
                })
            }
        };

        store.update_user(&id, patch)?;
        let reloaded = store.get_user_by_id(&id)?;
        if let Some(user) = &reloaded {
            self.current_user = Some(user.clone());
        }
        reloaded.ok_or(crate::storage::StorageError::NotFound {
            entity: "user",
            id,
        })
    }

    /// The signed-in user, if any
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Whether the session holds unexpired tokens
    pub fn is_authenticated(&self) -> bool {
        match &self.tokens {
            Some(tokens) => Utc::now() < tokens.expires_at,
            None => false,
        }
    }

    /// The current token pair, if signed in
    pub fn tokens(&self) -> Option<&AuthTokens> {
        self.tokens.as_ref()
    }

    /// Reissue tokens for the signed-in user
    ///
    /// Returns false when signed out; callers treat that as a forced logout.
    pub fn refresh(&mut self) -> bool {
        match &self.current_user {
            Some(user) => {
                self.tokens = Some(issue_tokens(user));
                true
            }
            None => false,
        }
    }
}

fn issue_tokens(user: &User) -> AuthTokens {
    let now = Utc::now();
    let millis = now.timestamp_millis();
    AuthTokens {
        access_token: format!("dev_token_{}_{}", user.id, millis),
        refresh_token: format!("dev_refresh_{}_{}", user.id, millis),
        expires_at: now + Duration::hours(TOKEN_TTL_HOURS),
    }
}
