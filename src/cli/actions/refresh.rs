use crate::auth::{AuthClient, SessionStore};
use crate::cli::globals::GlobalArgs;
use anyhow::{anyhow, Result};

/// Handle the refresh action. A rejected refresh token has already forced a
/// full logout by the time this reports failure.
pub async fn handle(globals: &GlobalArgs) -> Result<()> {
    let mut session = SessionStore::restore(globals.session_storage()?);
    let client = AuthClient::new(&globals.portal_url)?;

    if client.refresh_token(&mut session).await {
        println!("Session tokens refreshed.");
        Ok(())
    } else {
        Err(anyhow!("Session expired. Please sign in again."))
    }
}
