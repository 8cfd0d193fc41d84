//! Outbound SMS through a third-party messaging gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::TwilioConfig;
use crate::constants::MAX_E164_DIGITS;

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("Invalid phone number format. Must be in E.164 format (e.g., +12345678901): {0}")]
    InvalidDestination(String),

    #[error("Message body cannot be empty")]
    EmptyBody,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub id: Option<String>,
    pub to: String,
}

/// A single request/response send. No retries, no delivery receipts.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    async fn send_message(&self, to: &str, body: &str) -> Result<SentMessage, SmsError>;
}

/// `+` followed by 2 to 15 digits, the first of which is not zero.
pub fn is_e164(number: &str) -> bool {
    let Some(digits) = number.strip_prefix('+') else {
        return false;
    };
    (2..=MAX_E164_DIGITS).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0')
}

#[derive(Debug, Default, Deserialize)]
struct TwilioMessage {
    sid: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    message: Option<String>,
}

/// Twilio-compatible REST gateway.
#[derive(Clone)]
pub struct TwilioGateway {
    http: Client,
    config: TwilioConfig,
}

impl TwilioGateway {
    pub fn new(config: TwilioConfig) -> Result<Self, SmsError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http, config })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl MessageGateway for TwilioGateway {
    async fn send_message(&self, to: &str, body: &str) -> Result<SentMessage, SmsError> {
        if !is_e164(to) {
            return Err(SmsError::InvalidDestination(to.to_string()));
        }
        if body.is_empty() {
            return Err(SmsError::EmptyBody);
        }

        let url = self.messages_url();
        debug!("Sending SMS via {}", url);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to),
                ("From", self.config.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SmsError::Rejected {
                status: status.as_u16(),
                message: error_message(&text, status.canonical_reason()),
            });
        }

        // Accepted even when the body does not parse; the SID is informational
        let sent: TwilioMessage = response.json().await.unwrap_or_default();
        info!("SMS sent to {}, SID: {:?}", to, sent.sid);

        Ok(SentMessage {
            id: sent.sid,
            to: sent.to.unwrap_or_else(|| to.to_string()),
        })
    }
}

/// Extracts the gateway's `message` field, falling back to the HTTP reason phrase.
fn error_message(body: &str, reason: Option<&str>) -> String {
    serde_json::from_str::<TwilioErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| reason.unwrap_or("Failed to send SMS").to_string())
}
