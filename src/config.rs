use crate::constants::*;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: String,
    pub data_path: String,
    pub owner_id: String,
    pub twilio: Option<TwilioConfig>,
}

/// Credentials for the Twilio-compatible messaging gateway.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
    pub api_base: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(String),

    #[error("OWNER_ID cannot be empty")]
    EmptyOwnerId,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `SERVER_HOST` | `0.0.0.0` |
    /// | `SERVER_PORT` | `3000` |
    /// | `DATABASE_PATH` | `data` |
    /// | `OWNER_ID` | fixed single-user id |
    /// | `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_PHONE_NUMBER` | (none, reminders disabled) |
    /// | `TWILIO_API_BASE` | `https://api.twilio.com` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env::var("SERVER_PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let data_path = env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());
        let owner_id = env::var("OWNER_ID").unwrap_or_else(|_| DEFAULT_OWNER_ID.to_string());

        // Validate port is a valid number
        if port.parse::<u16>().is_err() {
            return Err(ConfigError::InvalidPort(port));
        }
        if owner_id.trim().is_empty() {
            return Err(ConfigError::EmptyOwnerId);
        }

        let twilio = TwilioConfig::from_parts(
            env::var("TWILIO_ACCOUNT_SID").ok(),
            env::var("TWILIO_AUTH_TOKEN").ok(),
            env::var("TWILIO_PHONE_NUMBER").ok(),
            env::var("TWILIO_API_BASE").ok(),
        );

        Ok(Config {
            host,
            port,
            data_path,
            owner_id,
            twilio,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl TwilioConfig {
    /// Builds gateway credentials only when all three required values are present.
    pub fn from_parts(
        account_sid: Option<String>,
        auth_token: Option<String>,
        from_number: Option<String>,
        api_base: Option<String>,
    ) -> Option<Self> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        let count = [&account_sid, &auth_token, &from_number]
            .into_iter()
            .filter(|v| present(v))
            .count();

        if count < 3 {
            if count > 0 {
                tracing::warn!("Incomplete Twilio credentials, SMS reminders are disabled");
            }
            return None;
        }

        Some(TwilioConfig {
            account_sid: account_sid?.trim().to_string(),
            auth_token: auth_token?.trim().to_string(),
            from_number: from_number?.trim().to_string(),
            api_base: api_base
                .filter(|b| !b.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TWILIO_API_BASE.to_string()),
        })
    }
}
