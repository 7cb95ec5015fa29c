use crate::auth::types::Role;
use secrecy::SecretString;

pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod status;

#[derive(Debug)]
pub enum Action {
    Login {
        username: String,
        password: SecretString,
        otp: Option<String>,
        recovery_code: Option<String>,
    },
    Logout,
    Refresh,
    Status,
    Register {
        username: String,
        email: String,
        password: SecretString,
        password_confirm: SecretString,
        role: Role,
    },
}
