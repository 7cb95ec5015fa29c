use crate::auth::{AuthClient, SessionStore};
use crate::cli::globals::GlobalArgs;
use anyhow::Result;

/// Handle the logout action. The backend call is best-effort; the local
/// session is cleared no matter what the server says.
pub async fn handle(globals: &GlobalArgs) -> Result<()> {
    let mut session = SessionStore::restore(globals.session_storage()?);
    let client = AuthClient::new(&globals.portal_url)?;

    client.logout(&mut session).await;

    println!("You have been successfully logged out.");
    Ok(())
}
