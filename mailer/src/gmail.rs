//! Gmail API delivery.

use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use crate::Mailer;
use crate::error::{DeliveryError, Result};
use crate::message::EmailMessage;
use crate::oauth::Authenticator;

pub const GMAIL_SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

pub struct GmailMailer {
    client: reqwest::blocking::Client,
    authenticator: Authenticator,
    access_token: Option<String>,
}

impl GmailMailer {
    pub fn new(credentials_file: impl Into<PathBuf>, token_file: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            authenticator: Authenticator::new(client.clone(), credentials_file, token_file),
            client,
            access_token: None,
        })
    }

    pub fn authenticate(&mut self) -> Result<()> {
        self.access_token = Some(self.authenticator.access_token()?);
        info!("Gmail authentication successful");
        Ok(())
    }
}

impl Mailer for GmailMailer {
    fn send(&mut self, message: &EmailMessage) -> Result<()> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(DeliveryError::NotAuthenticated)?;

        let response = self
            .client
            .post(GMAIL_SEND_URL)
            .bearer_auth(token)
            .json(&json!({ "raw": message.to_raw() }))
            .send()
            .map_err(|e| {
                error!(error = %e, "Failed to send email");
                DeliveryError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Failed to send email");
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        info!(recipient = %message.to, "Email sent successfully");
        Ok(())
    }
}
