//! Credentials attached to every request.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// How requests authenticate against Harvest.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// HTTP basic auth with the account's email address and password.
    Basic { username: String, password: String },
    /// A pre-built header supplied by the caller, e.g. an OAuth bearer token.
    Header { name: String, value: String },
}

impl Credential {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credential::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        Credential::Header {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The `(name, value)` header pair to send with every request.
    pub fn to_header(&self) -> (String, String) {
        match self {
            Credential::Basic { username, password } => {
                let encoded = STANDARD.encode(format!("{username}:{password}"));
                ("Authorization".to_string(), format!("Basic {encoded}"))
            }
            Credential::Header { name, value } => (name.clone(), value.clone()),
        }
    }
}

// Secrets stay out of logs and panic messages.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Credential::Header { name, .. } => f
                .debug_struct("Header")
                .field("name", name)
                .field("value", &"***")
                .finish(),
        }
    }
}
