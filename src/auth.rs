//! Operator login.

use std::io::{BufRead, Write};

use tracing::warn;

use crate::console::Console;
use crate::error::{GymError, Result};

/// Number of tries an operator gets before the session is refused.
pub const MAX_ATTEMPTS: u32 = 3;

/// Decides whether a username/password pair may use the tool.
pub trait CredentialCheck {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single built-in administrator account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCredentials {
    username: String,
    password: String,
}

impl FixedCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for FixedCredentials {
    fn default() -> Self {
        Self::new("Admin", "Admin12!")
    }
}

impl CredentialCheck for FixedCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

/// Prompts for credentials up to `attempts` times.
///
/// Returns [`GymError::AuthenticationFailed`] once the attempts are used up;
/// the caller decides how to end the process.
pub fn login<R, W>(
    console: &mut Console<R, W>,
    check: &impl CredentialCheck,
    attempts: u32,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut remaining = attempts;
    while remaining > 0 {
        let username = console.prompt("Enter your username: ")?;
        let password = console.prompt("Enter your password: ")?;

        if check.verify(&username, &password) {
            console.say("Login Successful!\n")?;
            return Ok(());
        }

        remaining -= 1;
        warn!(remaining, "login attempt rejected");
        console.say(format_args!("Login failed! {remaining} attempt(s) left."))?;
    }

    console.say("Login failed! System shutting down.")?;
    Err(GymError::AuthenticationFailed)
}
