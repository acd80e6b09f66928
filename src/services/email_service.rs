//! Email delivery for Footnotes.
//!
//! Builds subscription-related messages; the actual transport sits behind
//! the [`Mailer`] seam so the rest of the platform never talks to a network.

use crate::types::errors::EmailError;
use crate::types::footnote::Footnote;
use crate::types::subscriber::Subscriber;

/// A plain-text email ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

/// Trait defining the delivery transport.
pub trait Mailer {
    fn send(&mut self, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Development transport: prints the message instead of sending it.
pub struct ConsoleMailer;

impl Mailer for ConsoleMailer {
    fn send(&mut self, message: &EmailMessage) -> Result<(), EmailError> {
        println!("{}", "=".repeat(60));
        println!("[EMAIL] Would send email:");
        println!("To: {}", message.to);
        println!("Subject: {}", message.subject);
        println!("{}", "-".repeat(60));
        println!("{}", message.text);
        println!("{}", "=".repeat(60));
        Ok(())
    }
}

/// Test transport: records every message it was asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Vec<EmailMessage>,
}

impl Mailer for RecordingMailer {
    fn send(&mut self, message: &EmailMessage) -> Result<(), EmailError> {
        self.sent.push(message.clone());
        Ok(())
    }
}

/// Composes and dispatches subscription emails.
pub struct EmailService {
    mailer: Box<dyn Mailer + Send>,
    base_url: String,
}

impl EmailService {
    pub fn new(mailer: Box<dyn Mailer + Send>, base_url: impl Into<String>) -> Self {
        Self {
            mailer,
            base_url: base_url.into(),
        }
    }

    /// Sends the double-opt-in confirmation for a new subscription.
    pub fn send_confirmation(
        &mut self,
        subscriber: &Subscriber,
        author_name: &str,
    ) -> Result<(), EmailError> {
        let confirm_url = format!(
            "{}/subscribe/confirm/{}",
            self.base_url, subscriber.confirm_token
        );
        let message = EmailMessage {
            to: subscriber.email.clone(),
            subject: format!("Confirm your subscription to {}", author_name),
            text: format!(
                "You've requested to subscribe to {} on footnotes.\n\n\
                 Click the link below to confirm your subscription:\n{}\n\n\
                 If you didn't request this, you can safely ignore this email.",
                author_name, confirm_url
            ),
        };
        self.mailer.send(&message)
    }

    /// Announces a freshly published footnote to one confirmed subscriber.
    pub fn send_new_footnote(
        &mut self,
        subscriber: &Subscriber,
        author_name: &str,
        author_handle: &str,
        footnote: &Footnote,
    ) -> Result<(), EmailError> {
        let footnote_url = format!("{}/{}/{}", self.base_url, author_handle, footnote.slug);
        let unsubscribe_url = format!(
            "{}/subscribe/unsubscribe/{}",
            self.base_url, subscriber.unsubscribe_token
        );
        let subject = match &footnote.title {
            Some(title) => format!("{}: {}", author_name, title),
            None => format!("New footnote from {}", author_name),
        };
        let message = EmailMessage {
            to: subscriber.email.clone(),
            subject,
            text: format!(
                "{} published a new footnote:\n{}\n\n\
                 Unsubscribe: {}",
                author_name, footnote_url, unsubscribe_url
            ),
        };
        self.mailer.send(&message)
    }
}
