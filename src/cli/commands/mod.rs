use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};
use std::path::PathBuf;

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("securemed")
        .about("SecureMed patient portal authentication client")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("portal-url")
                .long("portal-url")
                .help("Portal backend base URL")
                .default_value("http://localhost:8000")
                .env("SECUREMED_PORTAL_URL")
                .global(true),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Directory holding the persisted session (default: ~/.securemed)")
                .env("SECUREMED_DATA_DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("SECUREMED_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("login")
                .about("Sign in to the portal")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("Account username")
                        .env("SECUREMED_USERNAME")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Account password")
                        .env("SECUREMED_PASSWORD")
                        .required(true),
                )
                .arg(
                    Arg::new("otp")
                        .long("otp")
                        .help("One-time code, when MFA is enabled on the account"),
                )
                .arg(
                    Arg::new("recovery-code")
                        .long("recovery-code")
                        .help("Recovery code used instead of a one-time code")
                        .conflicts_with("otp"),
                ),
        )
        .subcommand(Command::new("logout").about("Sign out and clear the local session"))
        .subcommand(
            Command::new("refresh").about("Exchange the refresh token for a new token pair"),
        )
        .subcommand(Command::new("status").about("Show the current session"))
        .subcommand(
            Command::new("register")
                .about("Create a new portal account")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("Account username")
                        .required(true),
                )
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Account email address")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("Account password")
                        .env("SECUREMED_PASSWORD")
                        .required(true),
                )
                .arg(
                    Arg::new("password-confirm")
                        .long("password-confirm")
                        .help("Password confirmation")
                        .required(true),
                )
                .arg(
                    Arg::new("role")
                        .long("role")
                        .help("Account role")
                        .default_value("patient")
                        .value_parser(["patient", "provider"]),
                ),
        )
}
