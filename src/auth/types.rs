//! Data model for the authentication session and the portal auth endpoints.
//! Tokens end up mirrored to durable storage, so the token pair serializes as
//! plain strings; passwords never appear in any serializable type.

use crate::auth::error::AuthError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Portal roles. `admin` and `doctor` accounts are provisioned by staff;
/// self-registration is limited to `patient` and `provider`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
    Provider,
}

impl Role {
    /// Post-login landing decision. The caller (login form, CLI) performs the
    /// actual navigation; the mapping itself lives with the role.
    #[must_use]
    pub fn landing_path(&self) -> &'static str {
        match self {
            Role::Doctor => "/doctor",
            Role::Admin => "/admin",
            Role::Patient | Role::Provider => "/portal",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
            Role::Provider => "provider",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            "admin" => Ok(Role::Admin),
            "provider" => Ok(Role::Provider),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Identity record returned by the backend on login and profile refresh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub mfa_enabled: bool,
}

/// Access/refresh bearer credentials issued by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Outcome of one authentication attempt (`login` or `verify_mfa`).
#[derive(Clone, Debug, PartialEq)]
pub enum LoginOutcome {
    /// Credentials accepted and a session established. When
    /// `requires_policy_acceptance` is set the caller must route the user
    /// through the policy gate before proceeding.
    Authenticated {
        tokens: TokenPair,
        requires_policy_acceptance: bool,
    },
    /// Primary credentials accepted but a second factor is pending. No
    /// session exists yet; `temp_token` identifies the in-progress login.
    MfaRequired { temp_token: String },
    /// Attempt rejected or unreachable. `message` is the server's error when
    /// it gave one, a generic fallback otherwise.
    Failed { message: String },
}

/// Self-registration payload for `/api/auth/register/`.
#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub role: Role,
}

const MIN_PASSWORD_CHARS: usize = 8;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex must compile")
    })
}

impl RegisterRequest {
    /// First-line validation before any network call. The backend re-checks
    /// everything; this only rejects what the original form would.
    ///
    /// # Errors
    /// Returns `AuthError::Config` naming the first failing field.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.username.trim().is_empty() {
            return Err(AuthError::Config("Username is required".to_string()));
        }
        if !email_regex().is_match(self.email.trim()) {
            return Err(AuthError::Config("Enter a valid email address".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::Config(format!(
                "Password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }
        if self.password != self.password_confirm {
            return Err(AuthError::Config("Passwords do not match".to_string()));
        }
        match self.role {
            Role::Patient | Role::Provider => Ok(()),
            Role::Doctor | Role::Admin => Err(AuthError::Config(
                "Only patient and provider accounts can self-register".to_string(),
            )),
        }
    }
}
