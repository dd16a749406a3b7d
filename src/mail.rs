//! Outgoing email.
//!
//! The password reset flow only needs to hand a rendered message to a
//! [`Mailer`]. Production uses [`SmtpMailer`]; [`MemoryMailer`] keeps messages
//! in memory and backs both local runs without SMTP and the test suite.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::info;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::MailConfig;
use crate::error::AppError;

/// A plain-text message to a single recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), AppError>;
}

/// Sends mail through an SMTP relay using STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig, sender: &str) -> Result<Self, AppError> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            sender: sender.parse()?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> Result<(), AppError> {
        let message = Message::builder()
            .from(self.sender.clone())
            .to(email.recipient.parse()?)
            .subject(email.subject.clone())
            .body(email.body.clone())?;

        self.transport.send(message).await?;
        info!("Sent '{}' email to {}", email.subject, email.recipient);
        Ok(())
    }
}

/// Records messages instead of sending them.
#[derive(Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<RwLock<Vec<Email>>>,
    failing: bool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every dispatch fails, for exercising error paths.
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            failing: true,
        }
    }

    pub fn sent(&self) -> Vec<Email> {
        self.sent.read().clone()
    }

    pub fn last(&self) -> Option<Email> {
        self.sent.read().last().cloned()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: &Email) -> Result<(), AppError> {
        if self.failing {
            return Err(AppError::Upstream(format!(
                "mail dispatch to {} refused",
                email.recipient
            )));
        }
        info!(
            "Email to {} not sent (no SMTP server configured): {}",
            email.recipient, email.subject
        );
        self.sent.write().push(email.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email {
            recipient: "alice@example.com".to_string(),
            subject: "password reset".to_string(),
            body: "code 42".to_string(),
        }
    }

    #[actix_rt::test]
    async fn test_memory_mailer_records_messages() {
        let mailer = MemoryMailer::new();
        mailer.send(&email()).await.unwrap();

        assert_eq!(mailer.sent().len(), 1);
        assert_eq!(mailer.last().unwrap().body, "code 42");
    }

    #[actix_rt::test]
    async fn test_clones_share_the_outbox() {
        let mailer = MemoryMailer::new();
        let handle = mailer.clone();
        handle.send(&email()).await.unwrap();
        assert_eq!(mailer.sent().len(), 1);
    }

    #[actix_rt::test]
    async fn test_failing_mailer() {
        let mailer = MemoryMailer::failing();
        assert!(matches!(
            mailer.send(&email()).await,
            Err(AppError::Upstream(_))
        ));
        assert!(mailer.sent().is_empty());
    }

    #[actix_rt::test]
    async fn test_smtp_mailer_rejects_bad_sender() {
        let config = MailConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: None,
            password: None,
        };
        assert!(SmtpMailer::new(&config, "not an address").is_err());
        assert!(SmtpMailer::new(&config, "no-reply@example.com").is_ok());
    }
}
