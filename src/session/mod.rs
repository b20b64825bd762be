//! Persisted session: the bearer token and the JSON-encoded user record under
//! two keys of a durable key-value store. Created on login, overwritten after
//! each onboarding step, removed on logout.

pub mod store;

pub use self::store::{FileStore, KeyValueStore, MemoryStore};

use crate::{api::ApiError, features::auth::UserRecord};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use thiserror::Error;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session data is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("session store lock poisoned")]
    Poisoned,
}

#[derive(Clone)]
pub struct Session {
    pub token: SecretString,
    pub user: UserRecord,
}

impl Session {
    #[must_use]
    pub fn new(token: SecretString, user: UserRecord) -> Self {
        Self { token, user }
    }

    /// Usable for dashboard access: email verified and no temporary password.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.user.email_verified && !self.user.temporal_password
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.token.expose_secret() == other.token.expose_secret() && self.user == other.user
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"***")
            .field("user", &self.user)
            .finish()
    }
}

/// Owner of the persisted session. One instance is passed to whatever needs it.
pub trait SessionRepository: Send + Sync {
    /// # Errors
    /// Returns an error if the store cannot be read or holds a corrupt user.
    fn get(&self) -> Result<Option<Session>, SessionError>;

    /// # Errors
    /// Returns an error if the store cannot be written.
    fn set(&self, token: &SecretString, user: &UserRecord) -> Result<(), SessionError>;

    /// # Errors
    /// Returns an error if the store cannot be written.
    fn clear(&self) -> Result<(), SessionError>;
}

/// `SessionRepository` over any `KeyValueStore`.
#[derive(Debug, Default)]
pub struct SessionStore<S> {
    store: S,
}

pub type FileSessionStore = SessionStore<FileStore>;
pub type MemorySessionStore = SessionStore<MemoryStore>;

impl<S: KeyValueStore> SessionStore<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl FileSessionStore {
    #[must_use]
    pub fn open(path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(FileStore::new(path))
    }
}

impl MemorySessionStore {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: KeyValueStore> SessionRepository for SessionStore<S> {
    fn get(&self) -> Result<Option<Session>, SessionError> {
        let Some(token) = self.store.get_item(TOKEN_KEY)? else {
            return Ok(None);
        };
        let Some(user) = self.store.get_item(USER_KEY)? else {
            return Ok(None);
        };

        let user: UserRecord = serde_json::from_str(&user)?;
        Ok(Some(Session::new(SecretString::from(token), user)))
    }

    fn set(&self, token: &SecretString, user: &UserRecord) -> Result<(), SessionError> {
        let user = serde_json::to_string(user)?;
        self.store.set_item(TOKEN_KEY, token.expose_secret())?;
        self.store.set_item(USER_KEY, &user)
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.store.remove_item(TOKEN_KEY)?;
        self.store.remove_item(USER_KEY)
    }
}

impl<R: SessionRepository + ?Sized> SessionRepository for &R {
    fn get(&self) -> Result<Option<Session>, SessionError> {
        (**self).get()
    }

    fn set(&self, token: &SecretString, user: &UserRecord) -> Result<(), SessionError> {
        (**self).set(token, user)
    }

    fn clear(&self) -> Result<(), SessionError> {
        (**self).clear()
    }
}

/// Stored session for an authenticated call.
///
/// # Errors
/// Returns `ApiError::Unauthenticated` when nobody is signed in.
pub fn require_session<R: SessionRepository + ?Sized>(sessions: &R) -> Result<Session, ApiError> {
    sessions.get()?.ok_or(ApiError::Unauthenticated)
}
