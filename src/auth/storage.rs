//! Durable mirror of the authentication session.
//!
//! Two JSON entries under a fixed directory, one for the token pair and one
//! for the user record. Both are written on session establishment and removed
//! together on logout, matching the in-memory both-or-none invariant. The
//! mirror is best-effort: a copy that fails to parse on restore is discarded
//! and the session starts empty.

use crate::auth::types::{TokenPair, User};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const TOKENS_FILE: &str = "auth_tokens.json";
const USER_FILE: &str = "auth_user.json";

pub struct SessionStorage {
    base_dir: PathBuf,
}

impl SessionStorage {
    /// Creates a mirror rooted at `base_dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir)
            .with_context(|| format!("Failed to create session directory: {base_dir:?}"))?;

        Ok(Self { base_dir })
    }

    /// Creates the mirror at the default location (`~/.securemed`).
    ///
    /// # Errors
    /// Returns an error if the home directory cannot be determined or the
    /// directory cannot be created.
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        Self::new(home_dir.join(".securemed"))
    }

    /// Restores the persisted session. Returns the pair only when both
    /// entries exist and parse; any other state clears the mirror and yields
    /// `None`. Never raises to the caller.
    pub fn load(&self) -> Option<(TokenPair, User)> {
        let tokens = self.read_json::<TokenPair>(TOKENS_FILE);
        let user = self.read_json::<User>(USER_FILE);

        match (tokens, user) {
            (Some(tokens), Some(user)) => Some((tokens, user)),
            (None, None) => None,
            _ => {
                warn!("discarding partial persisted session");
                if let Err(err) = self.clear() {
                    warn!("failed to clear session mirror: {err:#}");
                }
                None
            }
        }
    }

    /// Writes both entries.
    ///
    /// # Errors
    /// Returns an error if either entry cannot be serialized or written.
    pub fn save_session(&self, tokens: &TokenPair, user: &User) -> Result<()> {
        self.save_tokens(tokens)?;
        self.save_user(user)?;
        Ok(())
    }

    /// # Errors
    /// Returns an error if the token pair cannot be serialized or written.
    pub fn save_tokens(&self, tokens: &TokenPair) -> Result<()> {
        self.write_json(TOKENS_FILE, tokens)
    }

    /// # Errors
    /// Returns an error if the user record cannot be serialized or written.
    pub fn save_user(&self, user: &User) -> Result<()> {
        self.write_json(USER_FILE, user)
    }

    /// Reads only the persisted token pair. Used as the logout fallback when
    /// the in-memory refresh token is already gone.
    pub fn stored_tokens(&self) -> Option<TokenPair> {
        self.read_json(TOKENS_FILE)
    }

    /// Removes both entries.
    ///
    /// # Errors
    /// Returns an error if an existing entry cannot be removed.
    pub fn clear(&self) -> Result<()> {
        for name in [TOKENS_FILE, USER_FILE] {
            let path = self.base_dir.join(name);
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove session file: {path:?}"))?;
            }
        }
        Ok(())
    }

    fn write_json<T: serde::Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.base_dir.join(name);
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize {name}"))?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write session file: {path:?}"))?;

        debug!("wrote session file {:?}", path);

        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.base_dir.join(name);
        if !path.exists() {
            return None;
        }

        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(err) => {
                warn!("failed to read session file {:?}: {}", path, err);
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("failed to parse session file {:?}: {}", path, err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::types::Role;
    use std::fs;
    use tempfile::TempDir;

    fn sample_tokens() -> TokenPair {
        TokenPair {
            access: "access-1".to_string(),
            refresh: "refresh-1".to_string(),
        }
    }

    fn sample_user() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::Patient,
            mfa_enabled: false,
        }
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SessionStorage::new(temp_dir.path()).unwrap();

        storage
            .save_session(&sample_tokens(), &sample_user())
            .unwrap();

        let (tokens, user) = storage.load().unwrap();
        assert_eq!(tokens, sample_tokens());
        assert_eq!(user, sample_user());
    }

    #[test]
    fn load_empty_mirror_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SessionStorage::new(temp_dir.path()).unwrap();

        assert!(storage.load().is_none());
    }

    #[test]
    fn corrupt_tokens_entry_clears_both() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SessionStorage::new(temp_dir.path()).unwrap();

        storage
            .save_session(&sample_tokens(), &sample_user())
            .unwrap();
        fs::write(temp_dir.path().join(TOKENS_FILE), "{not json").unwrap();

        assert!(storage.load().is_none());
        assert!(!temp_dir.path().join(USER_FILE).exists());
        assert!(storage.stored_tokens().is_none());
    }

    #[test]
    fn missing_user_entry_clears_tokens() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SessionStorage::new(temp_dir.path()).unwrap();

        storage.save_tokens(&sample_tokens()).unwrap();

        assert!(storage.load().is_none());
        assert!(!temp_dir.path().join(TOKENS_FILE).exists());
    }

    #[test]
    fn clear_removes_both_entries() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SessionStorage::new(temp_dir.path()).unwrap();

        storage
            .save_session(&sample_tokens(), &sample_user())
            .unwrap();
        storage.clear().unwrap();

        assert!(!temp_dir.path().join(TOKENS_FILE).exists());
        assert!(!temp_dir.path().join(USER_FILE).exists());
        assert!(storage.load().is_none());
    }

    #[test]
    fn stored_tokens_survive_without_user() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SessionStorage::new(temp_dir.path()).unwrap();

        storage.save_tokens(&sample_tokens()).unwrap();

        // Direct token read does not enforce the both-or-none rule; load does.
        assert_eq!(storage.stored_tokens().unwrap(), sample_tokens());
    }
}
