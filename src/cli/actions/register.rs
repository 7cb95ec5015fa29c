use crate::auth::types::{RegisterRequest, Role};
use crate::auth::AuthClient;
use crate::cli::globals::GlobalArgs;
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};

/// Handle the register action. Validation failures and the backend's field
/// errors both surface as the returned error.
pub async fn handle(
    globals: &GlobalArgs,
    username: String,
    email: String,
    password: SecretString,
    password_confirm: SecretString,
    role: Role,
) -> Result<()> {
    let client = AuthClient::new(&globals.portal_url)?;

    let request = RegisterRequest {
        username,
        email,
        password: password.expose_secret().to_string(),
        password_confirm: password_confirm.expose_secret().to_string(),
        role,
    };

    client.register(&request).await?;

    println!("Registration successful. Your account has been created; please log in.");
    Ok(())
}
