//! # SecureMed portal authentication client
//!
//! Client-side authentication surface for the SecureMed patient portal. The
//! backend owns password hashing, MFA secret issuance, token signing and
//! policy versioning; this crate only talks to its documented HTTP endpoints
//! and manages the resulting session on the client.
//!
//! ## Session lifecycle
//!
//! A session is the pair of (user record, token pair). Both are present or
//! both are absent; there is no partially authenticated state. Sessions are
//! created by [`auth::AuthClient::login`] or [`auth::AuthClient::verify_mfa`],
//! rotated in place by token or profile refresh, and destroyed by logout or a
//! failed token refresh. The session is mirrored to durable storage so it
//! survives process restart; a mirror that fails to parse is discarded and
//! the session starts empty.
//!
//! ## Policy gate
//!
//! When the backend flags `requires_policy_acceptance` on a login response,
//! the [`auth::policy::PolicyGate`] blocks the flow until the user has read
//! the updated terms to the end and accepted them against the pending token.

pub mod auth;
pub mod cli;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
