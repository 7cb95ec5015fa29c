//! Policy acceptance gate.
//!
//! After a login or MFA response flags `requires_policy_acceptance`, the gate
//! becomes visible and holds the access token pending acceptance. The accept
//! action stays disabled until the user has scrolled the terms document to
//! the bottom; that latch is one-way, scrolling back up does not re-disable
//! it. Accepting posts against the pending token; failure keeps the gate
//! visible so the user can retry. There is no timeout: the gate stays up
//! until accepted or the session ends.

use crate::auth::error::AuthError;
use crate::auth::AuthClient;
use tracing::debug;

/// Slack, in scroll units, within which the document counts as read to the
/// bottom.
const SCROLL_BOTTOM_SLACK: f64 = 20.0;

/// The terms document shown by the gate. The backend versions the policy;
/// the client only renders the current text and reports acceptance.
pub const TERMS_OF_SERVICE: &str = "\
SecureMed Terms of Service Update

1. Privacy Policy & Data Protection

SecureMed is committed to protecting your personal health information. We
comply with HIPAA (Health Insurance Portability and Accountability Act) and
GDPR (General Data Protection Regulation) standards to ensure your data is
secure, confidential, and handled with the utmost care.

2. Data Collection & Usage

We collect only the minimum necessary information required to provide our
medical portal services. This includes your account credentials, basic
profile information, and secure logs of your interactions with the platform.
Your data is encrypted at rest and in transit.

3. Right to be Forgotten

In accordance with modern privacy laws, you have the right to request the
deletion of your account and associated data. Upon request, your account will
be immediately deactivated and scheduled for permanent deletion after a
30-day grace period. You may download a deletion certificate for your
records.

4. Security Responsibilities

You are responsible for maintaining the confidentiality of your login
credentials and for all activities that occur under your account. You agree
to notify us immediately of any unauthorized use of your account. SecureMed
employs Multi-Factor Authentication (MFA) to further protect your account.

5. Policy Updates

We may update these terms from time to time to reflect changes in our
practices or legal requirements. You will be notified of any significant
changes and required to accept the updated terms to continue accessing the
platform.

6. Consent to Electronic Communications

By using medical services provided by SecureMed, you consent to receive
electronic communications from us regarding your account, security updates,
and other relevant information.
";

#[derive(Debug, Default)]
pub struct PolicyGate {
    pending_token: Option<String>,
    scrolled_to_bottom: bool,
}

impl PolicyGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the gate visible for `token`. Called by whoever observed
    /// `requires_policy_acceptance` on a login outcome.
    pub fn trigger(&mut self, token: impl Into<String>) {
        self.pending_token = Some(token.into());
        self.scrolled_to_bottom = false;
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.pending_token.is_some()
    }

    #[must_use]
    pub fn pending_token(&self) -> Option<&str> {
        self.pending_token.as_deref()
    }

    /// Feeds a scroll observation. Latches once the viewport bottom is within
    /// [`SCROLL_BOTTOM_SLACK`] units of the document end; never unlatches.
    pub fn record_scroll(&mut self, scroll_top: f64, scroll_height: f64, client_height: f64) {
        if (scroll_height - client_height - scroll_top).abs() < SCROLL_BOTTOM_SLACK {
            if !self.scrolled_to_bottom {
                debug!("terms scrolled to bottom, accept enabled");
            }
            self.scrolled_to_bottom = true;
        }
    }

    /// True once the user has read to the bottom while the gate is visible.
    #[must_use]
    pub fn can_accept(&self) -> bool {
        self.is_visible() && self.scrolled_to_bottom
    }

    /// Sends the acceptance against the pending token. On success the gate
    /// hides and the caller runs its continuation (typically the role-based
    /// landing); on failure the gate stays visible for retry.
    ///
    /// # Errors
    /// `AuthError::Config` when the gate is not ready to accept, otherwise
    /// whatever the accept-policy request raised.
    pub async fn accept(&mut self, client: &AuthClient) -> Result<(), AuthError> {
        if !self.can_accept() {
            return Err(AuthError::Config(
                "Terms must be read to the bottom before accepting".to_string(),
            ));
        }
        let token = self
            .pending_token
            .clone()
            .ok_or_else(|| AuthError::Config("No policy acceptance pending".to_string()))?;

        client.accept_policy(&token).await?;

        self.pending_token = None;
        self.scrolled_to_bottom = false;
        Ok(())
    }
}
