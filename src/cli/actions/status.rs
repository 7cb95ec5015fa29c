use crate::auth::{AuthClient, SessionStore};
use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result};
use tracing::debug;

/// Handle the status action: report the current session, refreshing the
/// stored user record when the backend is reachable.
pub async fn handle(globals: &GlobalArgs) -> Result<()> {
    let mut session = SessionStore::restore(globals.session_storage()?);

    if !session.is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }

    let client = AuthClient::new(&globals.portal_url)?;
    if !client.refresh_user_status(&mut session).await {
        debug!("profile refresh failed, showing cached session");
    }

    let user = session.user().context("session missing user record")?;
    println!("Signed in as {} ({})", user.username, user.role);
    println!("Email: {}", user.email);
    println!(
        "Multi-factor authentication: {}",
        if user.mfa_enabled { "enabled" } else { "disabled" }
    );
    println!("Portal: {}", user.role.landing_path());

    Ok(())
}
