//! Transactional email delivery.
//!
//! Account flows build an [`EmailMessage`] from one of the [`templates`] and
//! hand it to an [`EmailSender`]. The sender decides how to deliver and returns
//! `Ok`/`Err`; callers decide whether a failure fails the request.
//!
//! - [`LogEmailSender`]: local dev, logs instead of sending.
//! - [`SendGridSender`]: SendGrid v3 HTTP API.
//! - [`MemoryOutbox`]: records messages for tests.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

mod sendgrid;
pub mod templates;

pub use sendgrid::SendGridSender;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver a message or return why it could not be delivered.
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Local dev sender that logs the message instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body = %message.html_body,
            "email send stub"
        );
        Ok(())
    }
}

/// Collects sent messages; can be switched to fail every delivery.
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    sent: Mutex<Vec<EmailMessage>>,
    failing: Mutex<bool>,
}

impl MemoryOutbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_failing(&self, failing: bool) {
        *self.failing.lock().await = failing;
    }

    pub async fn messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn messages_to(&self, to: &str) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|message| message.to == to)
            .cloned()
            .collect()
    }

    pub async fn last_to(&self, to: &str) -> Option<EmailMessage> {
        self.messages_to(to).await.pop()
    }
}

#[async_trait]
impl EmailSender for MemoryOutbox {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if *self.failing.lock().await {
            return Err(anyhow!("outbox configured to fail"));
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            to: to.to_string(),
            subject: "Hello".to_string(),
            html_body: "<p>hi</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn log_sender_always_succeeds() {
        assert!(LogEmailSender.send(&message("a@x.com")).await.is_ok());
    }

    #[tokio::test]
    async fn outbox_records_by_recipient() -> Result<()> {
        let outbox = MemoryOutbox::new();
        outbox.send(&message("a@x.com")).await?;
        outbox.send(&message("b@x.com")).await?;
        assert_eq!(outbox.messages().await.len(), 2);
        assert_eq!(outbox.messages_to("a@x.com").await, vec![message("a@x.com")]);
        Ok(())
    }

    #[tokio::test]
    async fn failing_outbox_records_nothing() {
        let outbox = MemoryOutbox::new();
        outbox.set_failing(true).await;
        assert!(outbox.send(&message("a@x.com")).await.is_err());
        assert!(outbox.messages().await.is_empty());
    }
}
