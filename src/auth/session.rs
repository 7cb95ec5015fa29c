//! In-memory session state, mirrored to durable storage.
//!
//! The store is the only owner of the authenticated state; the rest of the
//! crate mutates it exclusively through the operations here. Mirror writes
//! are best-effort: a failing disk does not block login or logout, it only
//! costs the restore on next start.

use crate::auth::storage::SessionStorage;
use crate::auth::types::{TokenPair, User};
use tracing::{debug, warn};

pub struct SessionStore {
    user: Option<User>,
    tokens: Option<TokenPair>,
    storage: SessionStorage,
}

impl SessionStore {
    /// Creates an empty store backed by `storage`, without touching the
    /// mirror.
    #[must_use]
    pub fn new(storage: SessionStorage) -> Self {
        Self {
            user: None,
            tokens: None,
            storage,
        }
    }

    /// Creates a store and hydrates it from the mirror. A missing or corrupt
    /// mirror silently degrades to a logged-out session.
    #[must_use]
    pub fn restore(storage: SessionStorage) -> Self {
        let mut store = Self::new(storage);

        if let Some((tokens, user)) = store.storage.load() {
            debug!("restored session for {}", user.username);
            store.tokens = Some(tokens);
            store.user = Some(user);
        }

        store
    }

    /// Replaces both fields, in memory and in the mirror.
    pub fn set_session(&mut self, user: User, tokens: TokenPair) {
        if let Err(err) = self.storage.save_session(&tokens, &user) {
            warn!("failed to persist session: {err:#}");
        }
        self.user = Some(user);
        self.tokens = Some(tokens);
    }

    /// Replaces only the token pair, after a refresh. The user record is
    /// untouched.
    pub fn set_tokens(&mut self, tokens: TokenPair) {
        if let Err(err) = self.storage.save_tokens(&tokens) {
            warn!("failed to persist tokens: {err:#}");
        }
        self.tokens = Some(tokens);
    }

    /// Replaces only the user record, after a profile refresh. Tokens are
    /// untouched.
    pub fn set_user(&mut self, user: User) {
        if let Err(err) = self.storage.save_user(&user) {
            warn!("failed to persist user: {err:#}");
        }
        self.user = Some(user);
    }

    /// Removes both fields from memory and from the mirror.
    pub fn clear(&mut self) {
        self.user = None;
        self.tokens = None;
        if let Err(err) = self.storage.clear() {
            warn!("failed to clear session mirror: {err:#}");
        }
    }

    /// True iff both the user record and the token pair are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.tokens.is_some()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn tokens(&self) -> Option<&TokenPair> {
        self.tokens.as_ref()
    }

    /// Refresh token for the backend logout call: the in-memory value when
    /// present, otherwise whatever the mirror still holds.
    #[must_use]
    pub fn refresh_token_with_fallback(&self) -> Option<String> {
        if let Some(tokens) = &self.tokens {
            return Some(tokens.refresh.clone());
        }
        self.storage.stored_tokens().map(|tokens| tokens.refresh)
    }
}
