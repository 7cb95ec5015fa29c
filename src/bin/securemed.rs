use anyhow::Result;
use securemed::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let (action, globals) = start()?;

    // Handle the action
    match action {
        Action::Login {
            username,
            password,
            otp,
            recovery_code,
        } => actions::login::handle(&globals, &username, &password, otp, recovery_code).await?,
        Action::Logout => actions::logout::handle(&globals).await?,
        Action::Refresh => actions::refresh::handle(&globals).await?,
        Action::Status => actions::status::handle(&globals).await?,
        Action::Register {
            username,
            email,
            password,
            password_confirm,
            role,
        } => {
            actions::register::handle(&globals, username, email, password, password_confirm, role)
                .await?;
        }
    }

    Ok(())
}
