/// Outgoing account mail
///
/// [`SmtpMailer`] delivers through an SMTP relay. Without a configured relay
/// host the service falls back to [`LogMailer`], which only logs the link.
use crate::config::MailConfig;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use std::sync::Arc;
use tracing::{info, warn};

pub const ACTIVATION_SUBJECT: &str = "Activate your account";

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver the activation link for a freshly registered account
    async fn send_activation(&self, to: &str, activation_url: &str) -> Result<()>;
}

fn activation_body(activation_url: &str) -> String {
    format!(
        "Thank you for registering, please activate your account.\n\nActivation link: {}\n",
        activation_url
    )
}

/// Pick the SMTP mailer when a relay host is configured, the log mailer
/// otherwise
pub fn mailer_from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    if config.smtp_host.trim().is_empty() {
        warn!("SMTP host not configured; activation mails will only be logged");
        return Ok(Arc::new(LogMailer::new(config)));
    }
    Ok(Arc::new(SmtpMailer::new(config)?))
}

/// Writes activation mails to the log instead of delivering them
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            from: config.from.clone(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_activation(&self, to: &str, activation_url: &str) -> Result<()> {
        info!(
            from = %self.from,
            to = %to,
            subject = ACTIVATION_SUBJECT,
            activation_url = %activation_url,
            "activation mail"
        );
        Ok(())
    }
}

/// Delivers activation mails over SMTP
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid MAIL_FROM address: {}", e)))?;

        let builder = if config.use_starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
        }
        .map_err(|e| AppError::Internal(format!("Failed to configure SMTP transport: {}", e)))?
        .port(config.smtp_port);

        let builder = match (&config.smtp_username, &config.smtp_password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            starttls = config.use_starttls,
            "SMTP mailer configured"
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn activation_message(&self, to: &str, activation_url: &str) -> Result<Message> {
        let to = to
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid recipient email address: {}", e)))?;

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(ACTIVATION_SUBJECT)
            .header(header::ContentType::TEXT_PLAIN)
            .body(activation_body(activation_url))
            .map_err(|e| AppError::Internal(format!("Failed to build email message: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_activation(&self, to: &str, activation_url: &str) -> Result<()> {
        let message = self.activation_message(to, activation_url)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))?;
        info!(subject = ACTIVATION_SUBJECT, "activation mail sent");
        Ok(())
    }
}
