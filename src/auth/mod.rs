//! Authentication client for the SecureMed portal backend.
//!
//! Every public operation resolves to a typed outcome; network and parse
//! faults never cross this boundary as errors except on the two endpoints
//! (`register`, `accept_policy`) whose callers want the fault itself. The
//! session store is passed in explicitly so flows stay testable without any
//! ambient global.

pub mod error;
pub mod policy;
pub mod session;
pub mod storage;
pub mod types;

pub use error::AuthError;
pub use policy::PolicyGate;
pub use session::SessionStore;
pub use storage::SessionStorage;
pub use types::{LoginOutcome, RegisterRequest, Role, TokenPair, User};

use crate::APP_USER_AGENT;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, info_span, warn, Instrument};
use url::Url;

const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";
const LOGIN_FAILED_MESSAGE: &str = "Login failed";
const INVALID_OTP_MESSAGE: &str = "Invalid OTP code";
const INVALID_RECOVERY_MESSAGE: &str = "Invalid recovery code";
const ACCEPT_FAILED_MESSAGE: &str = "Failed to accept terms. Please try again.";
const REGISTER_FAILED_MESSAGE: &str = "Registration failed";

/// Normalize the portal base URL and join an endpoint path onto it.
///
/// # Errors
/// Returns an error if the URL cannot be parsed, has no host, or uses an
/// unsupported scheme.
pub fn endpoint_url(base_url: &str, path: &str) -> Result<String, AuthError> {
    let url = Url::parse(base_url)
        .map_err(|err| AuthError::Config(format!("Error parsing portal URL: {err}")))?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| AuthError::Config("Error parsing portal URL: no host specified".to_string()))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => {
                return Err(AuthError::Config(format!(
                    "Error parsing portal URL: unsupported scheme {scheme}"
                )))
            }
        },
    };

    let endpoint_url = format!("{scheme}://{host}:{port}{path}");

    debug!("endpoint URL: {}", endpoint_url);

    Ok(endpoint_url)
}

/// Server-reported error message, when the response body carried one.
fn server_error_message(json: &Value) -> Option<&str> {
    json.get("error").and_then(Value::as_str)
}

/// Flattened message for registration failures: the `error` string when
/// present, otherwise every field-validation list joined up.
fn register_error_message(json: &Value) -> String {
    if let Some(message) = server_error_message(json) {
        return message.to_string();
    }

    if let Some(object) = json.as_object() {
        let mut parts = Vec::new();
        for value in object.values() {
            match value {
                Value::String(message) => parts.push(message.clone()),
                Value::Array(messages) => {
                    parts.extend(messages.iter().filter_map(Value::as_str).map(String::from));
                }
                _ => {}
            }
        }
        if !parts.is_empty() {
            return parts.join(", ");
        }
    }

    REGISTER_FAILED_MESSAGE.to_string()
}

/// Token pair, user record and policy flag from a login-shaped response.
fn session_payload(json: &Value) -> Result<(TokenPair, User, bool), AuthError> {
    let access = json
        .get("access")
        .and_then(Value::as_str)
        .ok_or_else(|| AuthError::Parse("no access token in response".to_string()))?;
    let refresh = json
        .get("refresh")
        .and_then(Value::as_str)
        .ok_or_else(|| AuthError::Parse("no refresh token in response".to_string()))?;
    let user = json
        .get("user")
        .cloned()
        .ok_or_else(|| AuthError::Parse("no user record in response".to_string()))?;
    let user: User = serde_json::from_value(user)
        .map_err(|err| AuthError::Parse(format!("malformed user record: {err}")))?;
    let requires_policy_acceptance = json
        .get("requires_policy_acceptance")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let tokens = TokenPair {
        access: access.to_string(),
        refresh: refresh.to_string(),
    };

    Ok((tokens, user, requires_policy_acceptance))
}

pub struct AuthClient {
    http: Client,
    base_url: String,
}

impl AuthClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or the portal URL
    /// does not parse.
    pub fn new(portal_url: &str) -> Result<Self, AuthError> {
        // Fail fast on an unusable base URL instead of on the first request.
        endpoint_url(portal_url, "/")?;

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .map_err(|err| AuthError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: portal_url.to_string(),
        })
    }

    /// Primary credential check. Establishes a session on plain success,
    /// hands back a temp token when a second factor is pending, and reports
    /// failures without touching the store.
    pub async fn login(
        &self,
        session: &mut SessionStore,
        username: &str,
        password: &SecretString,
    ) -> LoginOutcome {
        match self.try_login(session, username, password).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("login request failed: {}", err);
                LoginOutcome::Failed {
                    message: NETWORK_ERROR_MESSAGE.to_string(),
                }
            }
        }
    }

    async fn try_login(
        &self,
        session: &mut SessionStore,
        username: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, AuthError> {
        let url = endpoint_url(&self.base_url, "/api/auth/login/")?;

        let payload = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let span = info_span!("auth.login", http.method = "POST", url = %url);
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let json = response.json::<Value>().await.unwrap_or(Value::Null);
            return Ok(LoginOutcome::Failed {
                message: server_error_message(&json)
                    .unwrap_or(LOGIN_FAILED_MESSAGE)
                    .to_string(),
            });
        }

        let json: Value = response.json().await?;

        if json
            .get("mfa_required")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            let temp_token = json
                .get("temp_token")
                .and_then(Value::as_str)
                .ok_or_else(|| AuthError::Parse("no temp_token in MFA response".to_string()))?;
            debug!("MFA required for {}", username);
            return Ok(LoginOutcome::MfaRequired {
                temp_token: temp_token.to_string(),
            });
        }

        let (tokens, user, requires_policy_acceptance) = session_payload(&json)?;
        session.set_session(user, tokens.clone());

        Ok(LoginOutcome::Authenticated {
            tokens,
            requires_policy_acceptance,
        })
    }

    /// Second-factor check with either a one-time code or a recovery code.
    /// Success establishes the session exactly like `login`.
    pub async fn verify_mfa(
        &self,
        session: &mut SessionStore,
        temp_token: &str,
        code: &str,
        is_recovery_code: bool,
    ) -> LoginOutcome {
        match self
            .try_verify_mfa(session, temp_token, code, is_recovery_code)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("MFA verification request failed: {}", err);
                LoginOutcome::Failed {
                    message: NETWORK_ERROR_MESSAGE.to_string(),
                }
            }
        }
    }

    async fn try_verify_mfa(
        &self,
        session: &mut SessionStore,
        temp_token: &str,
        code: &str,
        is_recovery_code: bool,
    ) -> Result<LoginOutcome, AuthError> {
        let url = endpoint_url(&self.base_url, "/api/auth/mfa/login/")?;

        let payload = if is_recovery_code {
            json!({ "temp_token": temp_token, "recovery_code": code })
        } else {
            json!({ "temp_token": temp_token, "otp": code })
        };

        let span = info_span!("auth.verify_mfa", http.method = "POST", url = %url);
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let json = response.json::<Value>().await.unwrap_or(Value::Null);
            let fallback = if is_recovery_code {
                INVALID_RECOVERY_MESSAGE
            } else {
                INVALID_OTP_MESSAGE
            };
            return Ok(LoginOutcome::Failed {
                message: server_error_message(&json).unwrap_or(fallback).to_string(),
            });
        }

        let json: Value = response.json().await?;
        let (tokens, user, requires_policy_acceptance) = session_payload(&json)?;
        session.set_session(user, tokens.clone());

        Ok(LoginOutcome::Authenticated {
            tokens,
            requires_policy_acceptance,
        })
    }

    /// Exchanges the stored refresh token for a new pair. Returns `false`
    /// without a network call when no refresh token is present; any failure
    /// is fatal to the session and forces a full logout.
    pub async fn refresh_token(&self, session: &mut SessionStore) -> bool {
        let Some(refresh) = session.tokens().map(|tokens| tokens.refresh.clone()) else {
            return false;
        };

        match self.try_refresh(&refresh).await {
            Ok(tokens) => {
                session.set_tokens(tokens);
                true
            }
            Err(err) => {
                warn!("token refresh failed, forcing logout: {}", err);
                self.logout(session).await;
                false
            }
        }
    }

    async fn try_refresh(&self, refresh: &str) -> Result<TokenPair, AuthError> {
        let url = endpoint_url(&self.base_url, "/api/auth/refresh/")?;

        let span = info_span!("auth.refresh_token", http.method = "POST", url = %url);
        let response = self
            .http
            .post(&url)
            .json(&json!({ "refresh": refresh }))
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let json = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(AuthError::Http {
                status: status.as_u16(),
                message: server_error_message(&json)
                    .unwrap_or("refresh token rejected")
                    .to_string(),
            });
        }

        let json: Value = response.json().await?;
        let access = json
            .get("access")
            .and_then(Value::as_str)
            .ok_or_else(|| AuthError::Parse("no access token in refresh response".to_string()))?;
        let refresh = json
            .get("refresh")
            .and_then(Value::as_str)
            .ok_or_else(|| AuthError::Parse("no refresh token in refresh response".to_string()))?;

        Ok(TokenPair {
            access: access.to_string(),
            refresh: refresh.to_string(),
        })
    }

    /// Re-fetches the user profile with the current access token. Replaces
    /// only the stored user record; any failure leaves the session untouched.
    pub async fn refresh_user_status(&self, session: &mut SessionStore) -> bool {
        let Some(access) = session.tokens().map(|tokens| tokens.access.clone()) else {
            warn!("no access token available");
            return false;
        };

        match self.try_fetch_user(&access).await {
            Ok(user) => {
                session.set_user(user);
                true
            }
            Err(err) => {
                warn!("failed to fetch user profile: {}", err);
                false
            }
        }
    }

    async fn try_fetch_user(&self, access: &str) -> Result<User, AuthError> {
        let url = endpoint_url(&self.base_url, "/api/auth/user/")?;

        let span = info_span!("auth.refresh_user_status", http.method = "GET", url = %url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Http {
                status: status.as_u16(),
                message: "Failed to fetch user profile".to_string(),
            });
        }

        let user: User = response
            .json()
            .await
            .map_err(|err| AuthError::Parse(format!("malformed user record: {err}")))?;

        Ok(user)
    }

    /// Logs out. The backend call is a best-effort attempt to blacklist the
    /// refresh token (falling back to the storage mirror when the in-memory
    /// copy is gone); the local session is cleared no matter what.
    pub async fn logout(&self, session: &mut SessionStore) {
        let access = session.tokens().map(|tokens| tokens.access.clone());
        let refresh = session.refresh_token_with_fallback();

        match (access, refresh) {
            (Some(access), Some(refresh)) => {
                if let Err(err) = self.try_logout(&access, &refresh).await {
                    warn!("backend logout failed: {}", err);
                }
            }
            _ => debug!("skipping backend logout, no tokens available"),
        }

        session.clear();
    }

    async fn try_logout(&self, access: &str, refresh: &str) -> Result<(), AuthError> {
        let url = endpoint_url(&self.base_url, "/api/auth/logout/")?;

        let span = info_span!("auth.logout", http.method = "POST", url = %url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(access)
            .json(&json!({ "refresh": refresh }))
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Http {
                status: status.as_u16(),
                message: "logout rejected".to_string(),
            });
        }

        Ok(())
    }

    /// Creates a new portal account. Client-side validation runs first; the
    /// backend re-validates and its field errors are flattened into the
    /// returned message.
    ///
    /// # Errors
    /// `AuthError::Config` for local validation failures, `AuthError::Http`
    /// with the server's message otherwise.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), AuthError> {
        request.validate()?;

        let url = endpoint_url(&self.base_url, "/api/auth/register/")?;

        let span = info_span!("auth.register", http.method = "POST", url = %url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let json = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(AuthError::Http {
                status: status.as_u16(),
                message: register_error_message(&json),
            });
        }

        Ok(())
    }

    /// Reports acceptance of the updated terms against the pending token.
    ///
    /// # Errors
    /// Returns an error when the request fails or the backend rejects the
    /// acceptance; the caller keeps its gate visible and may retry.
    pub async fn accept_policy(&self, token: &str) -> Result<(), AuthError> {
        let url = endpoint_url(&self.base_url, "/api/auth/accept-policy/")?;

        let span = info_span!("auth.accept_policy", http.method = "POST", url = %url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Http {
                status: status.as_u16(),
                message: ACCEPT_FAILED_MESSAGE.to_string(),
            });
        }

        Ok(())
    }
}
