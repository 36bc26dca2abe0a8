//! Account and credential configuration.

use std::env;

use crate::auth::Credential;
use crate::error::ConfigError;

pub const ACCOUNT_VAR: &str = "HARVEST_ACCOUNT";
pub const USERNAME_VAR: &str = "HARVEST_USERNAME";
pub const PASSWORD_VAR: &str = "HARVEST_PASSWORD";
pub const BASE_URL_VAR: &str = "HARVEST_BASE_URL";

/// Everything a `HarvestController` needs to reach an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    /// The `xxxx` in `https://xxxx.harvestapp.com`.
    pub account_name: String,
    pub credential: Credential,
    /// Overrides the account URL, e.g. to point at a local mock server.
    pub base_url: Option<String>,
}

impl HarvestConfig {
    pub fn new(account_name: impl Into<String>, credential: Credential) -> Self {
        Self {
            account_name: account_name.into(),
            credential,
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The URL every endpoint path is appended to, without a trailing slash.
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.harvestapp.com", self.account_name),
        }
    }

    /// Reads `HARVEST_ACCOUNT`, `HARVEST_USERNAME`, `HARVEST_PASSWORD` and the
    /// optional `HARVEST_BASE_URL` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            let value = lookup(key).ok_or(ConfigError::MissingVar(key))?;
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyVar(key));
            }
            Ok(value)
        };

        let account_name = required(ACCOUNT_VAR)?.trim().to_string();
        let username = required(USERNAME_VAR)?.trim().to_string();
        // Passwords are sent exactly as given; surrounding spaces may be part of them.
        let password = required(PASSWORD_VAR)?;

        let mut config = HarvestConfig::new(account_name, Credential::basic(username, password));
        if let Some(url) = lookup(BASE_URL_VAR).filter(|url| !url.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        Ok(config)
    }
}
