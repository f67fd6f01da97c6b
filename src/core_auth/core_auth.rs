use crate::config::AuthConfig;

/// Username and password collected during the login handshake.
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    username: String,
    password: String,
}

impl LoginAttempt {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Literal comparison against the configured credentials. Both fields
    /// are always compared.
    pub fn matches(&self, auth: &AuthConfig) -> bool {
        let username_ok = self.username == auth.username;
        let password_ok = self.password == auth.password;
        username_ok & password_ok
    }
}
