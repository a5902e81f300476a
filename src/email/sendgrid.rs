use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{Instrument, debug, info_span};

use super::{EmailMessage, EmailSender};
use crate::APP_USER_AGENT;

const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

/// Delivers through the SendGrid v3 `mail/send` endpoint.
#[derive(Clone)]
pub struct SendGridSender {
    client: reqwest::Client,
    api_key: SecretString,
    from: String,
    endpoint: String,
}

impl SendGridSender {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: SecretString, from: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()
            .context("failed to build SendGrid client")?;
        Ok(Self {
            client,
            api_key,
            from,
            endpoint: SENDGRID_ENDPOINT.to_string(),
        })
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    fn payload(&self, message: &EmailMessage) -> serde_json::Value {
        json!({
            "personalizations": [{ "to": [{ "email": message.to }] }],
            "from": { "email": self.from },
            "subject": message.subject,
            "content": [{ "type": "text/html", "value": message.html_body }],
        })
    }
}

impl std::fmt::Debug for SendGridSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendGridSender")
            .field("api_key", &"***")
            .field("from", &self.from)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[async_trait]
impl EmailSender for SendGridSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let span = info_span!("email.send", email.provider = "sendgrid");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.payload(message))
            .send()
            .instrument(span)
            .await
            .context("failed to reach SendGrid")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("SendGrid rejected message: {status} {body}");
        }

        debug!(to = %message.to, "email accepted by SendGrid");
        Ok(())
    }
}
