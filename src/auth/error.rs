use std::fmt;

/// Faults raised while talking to the portal backend or its local mirror.
///
/// Client operations that promise a typed outcome (`login`, `verify_mfa`,
/// `refresh_token`, ...) catch these internally; only `register` and
/// `accept_policy` surface them to callers.
#[derive(Clone, Debug)]
pub enum AuthError {
    Config(String),
    Network(String),
    Http { status: u16, message: String },
    Parse(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Config(message) => write!(formatter, "Config error: {message}"),
            AuthError::Network(message) => write!(formatter, "Network error: {message}"),
            AuthError::Http { status, message } => {
                write!(formatter, "Request failed ({status}): {message}")
            }
            AuthError::Parse(message) => write!(formatter, "Response error: {message}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthError::Parse(format!("Failed to decode response: {err}"))
        } else {
            AuthError::Network(format!("Unable to reach the server: {err}"))
        }
    }
}
