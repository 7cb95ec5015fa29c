use crate::auth::policy::{PolicyGate, TERMS_OF_SERVICE};
use crate::auth::{AuthClient, LoginOutcome, SessionStore};
use crate::cli::globals::GlobalArgs;
use anyhow::{anyhow, Context, Result};
use rustyline::DefaultEditor;
use secrecy::SecretString;
use tracing::warn;

/// Lines of the terms document shown per page in the paged review.
const TERMS_PAGE_LINES: usize = 16;

/// Handle the login action: primary credentials, then the MFA step when the
/// backend asks for one, then the policy gate when acceptance is pending.
pub async fn handle(
    globals: &GlobalArgs,
    username: &str,
    password: &SecretString,
    otp: Option<String>,
    recovery_code: Option<String>,
) -> Result<()> {
    let mut session = SessionStore::restore(globals.session_storage()?);
    let client = AuthClient::new(&globals.portal_url)?;

    let mut outcome = client.login(&mut session, username, password).await;

    if let LoginOutcome::MfaRequired { temp_token } = outcome {
        let (code, is_recovery_code) = match (otp, recovery_code) {
            (Some(code), _) => (code, false),
            (None, Some(code)) => (code, true),
            (None, None) => prompt_mfa_code()?,
        };

        outcome = client
            .verify_mfa(&mut session, &temp_token, code.trim(), is_recovery_code)
            .await;
    }

    match outcome {
        LoginOutcome::Authenticated {
            tokens,
            requires_policy_acceptance,
        } => {
            if requires_policy_acceptance {
                review_terms(&client, &tokens.access).await?;
            }

            let user = session.user().context("session missing user record")?;
            println!("Signed in as {} ({})", user.username, user.role);
            println!("Continue to {}", user.role.landing_path());
            Ok(())
        }
        LoginOutcome::MfaRequired { .. } => Err(anyhow!("unexpected second MFA challenge")),
        LoginOutcome::Failed { message } => Err(anyhow!(message)),
    }
}

fn prompt_mfa_code() -> Result<(String, bool)> {
    let mut editor = DefaultEditor::new()?;
    println!("This account has multi-factor authentication enabled.");

    let code = editor.readline("One-time code (or 'r' to use a recovery code): ")?;
    if code.trim().eq_ignore_ascii_case("r") {
        let recovery = editor.readline("Recovery code: ")?;
        return Ok((recovery, true));
    }

    Ok((code, false))
}

/// Successive top offsets of the paged terms view. The last page always ends
/// at the document end so the scroll latch can engage.
fn page_offsets(total_lines: usize, viewport: usize) -> Vec<usize> {
    if total_lines <= viewport {
        return vec![0];
    }

    let mut offsets = Vec::new();
    let mut top = 0;
    loop {
        offsets.push(top);
        if top + viewport >= total_lines {
            break;
        }
        top = (top + viewport).min(total_lines - viewport);
    }
    offsets
}

/// Page the updated terms through the policy gate, then prompt for
/// acceptance. The gate keeps the flow blocked until the backend records the
/// acceptance; a rejected attempt leaves the gate visible for retry.
async fn review_terms(client: &AuthClient, pending_token: &str) -> Result<()> {
    let mut gate = PolicyGate::new();
    gate.trigger(pending_token);

    println!("The portal terms of service have been updated.");
    println!("Please review them before continuing.\n");

    let lines: Vec<&str> = TERMS_OF_SERVICE.lines().collect();
    let total = lines.len();
    let viewport = TERMS_PAGE_LINES.min(total);
    let mut editor = DefaultEditor::new()?;

    for (index, top) in page_offsets(total, viewport).iter().copied().enumerate() {
        if index > 0 {
            editor.readline("-- press Enter to keep reading --")?;
        }
        for line in &lines[top..(top + viewport).min(total)] {
            println!("{line}");
        }
        gate.record_scroll(top as f64, total as f64, viewport as f64);
    }

    while gate.is_visible() {
        let answer =
            editor.readline("\nType 'accept' to agree to the updated terms, or 'quit': ")?;
        match answer.trim().to_lowercase().as_str() {
            "accept" => match gate.accept(client).await {
                Ok(()) => println!("Terms accepted."),
                Err(err) => {
                    warn!("policy acceptance failed: {}", err);
                    eprintln!("Failed to accept terms. Please try again.");
                }
            },
            "quit" => return Err(anyhow!("the updated terms must be accepted to continue")),
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_document_is_a_single_page() {
        assert_eq!(page_offsets(10, 16), vec![0]);
    }

    #[test]
    fn offsets_end_at_document_end() {
        let offsets = page_offsets(60, 16);
        assert_eq!(offsets.first(), Some(&0));
        assert_eq!(offsets.last(), Some(&44));
    }

    #[test]
    fn last_page_engages_the_latch() {
        let total = TERMS_OF_SERVICE.lines().count();
        let viewport = TERMS_PAGE_LINES.min(total);

        let mut gate = PolicyGate::new();
        gate.trigger("pending-token");
        for top in page_offsets(total, viewport) {
            gate.record_scroll(top as f64, total as f64, viewport as f64);
        }

        assert!(gate.can_accept());
    }

    #[test]
    fn first_page_alone_does_not_unlock_accept() {
        let total = TERMS_OF_SERVICE.lines().count();
        let viewport = TERMS_PAGE_LINES.min(total);
        assert!(total > viewport);

        let mut gate = PolicyGate::new();
        gate.trigger("pending-token");
        gate.record_scroll(0.0, total as f64, viewport as f64);

        assert!(!gate.can_accept());
    }
}
