use crate::auth::types::Role;
use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// Translate parsed arguments into an [`Action`] plus the global settings
/// every action needs.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let portal_url = matches
        .get_one::<String>("portal-url")
        .cloned()
        .context("missing required argument: --portal-url")?;

    let mut globals = GlobalArgs::new(portal_url);
    globals.data_dir = matches.get_one::<PathBuf>("data-dir").cloned();

    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("missing subcommand"))?;

    let action = match name {
        "login" => Action::Login {
            username: sub
                .get_one::<String>("username")
                .cloned()
                .context("missing required argument: --username")?,
            password: sub
                .get_one::<String>("password")
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --password")?,
            otp: sub.get_one::<String>("otp").cloned(),
            recovery_code: sub.get_one::<String>("recovery-code").cloned(),
        },
        "logout" => Action::Logout,
        "refresh" => Action::Refresh,
        "status" => Action::Status,
        "register" => Action::Register {
            username: sub
                .get_one::<String>("username")
                .cloned()
                .context("missing required argument: --username")?,
            email: sub
                .get_one::<String>("email")
                .cloned()
                .context("missing required argument: --email")?,
            password: sub
                .get_one::<String>("password")
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --password")?,
            password_confirm: sub
                .get_one::<String>("password-confirm")
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --password-confirm")?,
            role: sub
                .get_one::<String>("role")
                .context("missing required argument: --role")?
                .parse::<Role>()
                .map_err(|err| anyhow!(err))?,
        },
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok((action, globals))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn login_action_from_matches() {
        temp_env::with_vars([("SECUREMED_PORTAL_URL", None::<String>)], || {
            let matches = commands::new().get_matches_from(vec![
                "securemed",
                "login",
                "--username",
                "alice",
                "--password",
                "hunter2hunter2",
            ]);

            let (action, globals) = handler(&matches).unwrap();
            assert_eq!(globals.portal_url, "http://localhost:8000");
            match action {
                Action::Login {
                    username,
                    otp,
                    recovery_code,
                    ..
                } => {
                    assert_eq!(username, "alice");
                    assert!(otp.is_none());
                    assert!(recovery_code.is_none());
                }
                other => panic!("expected login action, got {other:?}"),
            }
        });
    }

    #[test]
    fn register_action_parses_role() {
        let matches = commands::new().get_matches_from(vec![
            "securemed",
            "register",
            "--username",
            "bob",
            "--email",
            "bob@example.com",
            "--password",
            "correct horse",
            "--password-confirm",
            "correct horse",
            "--role",
            "provider",
        ]);

        let (action, _) = handler(&matches).unwrap();
        match action {
            Action::Register { role, email, .. } => {
                assert_eq!(role, Role::Provider);
                assert_eq!(email, "bob@example.com");
            }
            other => panic!("expected register action, got {other:?}"),
        }
    }

    #[test]
    fn data_dir_lands_in_globals() {
        temp_env::with_vars([("SECUREMED_DATA_DIR", None::<String>)], || {
            let matches = commands::new().get_matches_from(vec![
                "securemed",
                "logout",
                "--data-dir",
                "/tmp/securemed-test",
            ]);

            let (action, globals) = handler(&matches).unwrap();
            assert!(matches!(action, Action::Logout));
            assert_eq!(
                globals.data_dir,
                Some(PathBuf::from("/tmp/securemed-test"))
            );
        });
    }
}
