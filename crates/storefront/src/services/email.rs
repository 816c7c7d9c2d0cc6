//! Email service for sending verification codes and notifications.
//!
//! Uses SMTP via lettre for delivery. When SMTP is not configured the
//! service degrades to logging the outbound message, which keeps local
//! development and tests free of a mail relay.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::SmtpConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum MailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Outbound email capability: `send(to, subject, body)` plus the two
/// messages the auth flow needs.
pub struct EmailService {
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl EmailService {
    /// Build the service from optional SMTP configuration.
    ///
    /// With `None`, delivery is disabled and messages are logged instead.
    ///
    /// # Errors
    ///
    /// Returns `MailError::Smtp` if the relay configuration is invalid.
    pub fn from_config(config: Option<&SmtpConfig>) -> Result<Self, MailError> {
        match config {
            Some(cfg) => {
                let credentials = Credentials::new(
                    cfg.username.clone(),
                    cfg.password.expose_secret().to_owned(),
                );
                let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.host)?
                    .credentials(credentials)
                    .build();

                Ok(Self {
                    mailer: Some(mailer),
                    from_address: cfg.from_address.clone(),
                })
            }
            None => Ok(Self {
                mailer: None,
                from_address: "noreply@localhost".to_owned(),
            }),
        }
    }

    /// Send a plain-text email.
    ///
    /// # Errors
    ///
    /// Returns `MailError::InvalidAddress` if an address doesn't parse,
    /// `MailError::Smtp` if delivery fails.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let Some(mailer) = &self.mailer else {
            tracing::info!(to = %to, subject = %subject, "Email delivery disabled, skipping send");
            return Ok(());
        };

        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|_| MailError::InvalidAddress(self.from_address.clone()))?;
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|_| MailError::InvalidAddress(to.to_owned()))?;

        let email = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_owned())?;

        mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }

    /// Send the 6-digit verification code issued at registration.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::send`] errors.
    pub async fn send_verification_code(&self, to: &str, code: &str) -> Result<(), MailError> {
        let body = format!(
            "Your IVMA Store verification code is: {code}\n\n\
             The code expires in 10 minutes. If you did not create an account, \
             you can ignore this message.\n"
        );
        self.send(to, "Verify your IVMA Store account", &body).await
    }

    /// Send the post-verification welcome message.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::send`] errors.
    pub async fn send_welcome(&self, to: &str, first_name: &str) -> Result<(), MailError> {
        let body = format!(
            "Hi {first_name},\n\n\
             Your IVMA Store account is verified and ready to use. \
             Happy shopping!\n"
        );
        self.send(to, "Welcome to IVMA Store", &body).await
    }
}

/// Generate a 6-digit verification code.
#[must_use]
pub fn generate_verification_code() -> String {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_verification_code_format() {
        let code = generate_verification_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_verification_code_range() {
        for _ in 0..100 {
            let code: u32 = generate_verification_code().parse().expect("valid number");
            assert!(code >= 100_000);
            assert!(code < 1_000_000);
        }
    }

    #[tokio::test]
    async fn test_disabled_service_swallows_sends() {
        let service = EmailService::from_config(None).expect("disabled service builds");
        service
            .send("someone@example.com", "subject", "body")
            .await
            .expect("disabled send succeeds");
    }
}
