//! Basic-auth credentials supplied through the environment.

use crate::TransportError;

/// Environment variable holding the remote username.
pub const USERNAME_VAR: &str = "GIT_USERNAME";
/// Environment variable holding the remote password or token.
pub const PASSWORD_VAR: &str = "GIT_PASSWORD";

/// A username/password pair for HTTP basic auth.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Read credentials from the environment, failing cleanly before any
    /// request is made when either variable is unset.
    pub fn from_env() -> Result<Self, TransportError> {
        let missing = || TransportError::MissingCredentials {
            username_var: USERNAME_VAR,
            password_var: PASSWORD_VAR,
        };
        let username = std::env::var(USERNAME_VAR).map_err(|_| missing())?;
        let password = std::env::var(PASSWORD_VAR).map_err(|_| missing())?;
        Ok(Self { username, password })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never let the password reach a log line.
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_password() {
        let creds = Credentials {
            username: "alice".into(),
            password: "hunter2".into(),
        };
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
