//! Email notifications for shares and completed submissions.

mod transport;

use std::sync::Arc;

use thiserror::Error;

pub use transport::{EmailMessage, LogTransport, MailTransport, OutboxTransport};

use crate::db::models::Form;
use crate::response::Answer;

/// Outbound mail could not be handed to the transport.
#[derive(Debug, Clone, Error)]
#[error("failed to send email to {recipient}: {reason}")]
pub struct EmailError {
    pub recipient: String,
    pub reason: String,
}

#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
    from_email: String,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>, from_email: impl Into<String>) -> Self {
        Self {
            transport,
            from_email: from_email.into(),
        }
    }

    fn deliver(&self, recipient: &str, subject: String, body: String) -> Result<(), EmailError> {
        let message = EmailMessage {
            from: self.from_email.clone(),
            to: vec![recipient.to_string()],
            subject,
            body,
        };
        self.transport.send(&message).map_err(|err| EmailError {
            recipient: recipient.to_string(),
            reason: format!("{err:#}"),
        })
    }

    /// Tell `recipient_email` that `sender` shared `form` at `share_url`.
    pub fn send_share_notification(
        &self,
        recipient_email: &str,
        sender: &str,
        form: &Form,
        share_url: &str,
        sender_message: &str,
    ) -> Result<(), EmailError> {
        let subject = format!("{sender} has shared a UIForm with you!");

        let mut body = format!("{sender} would like you to fill out \"{}\".\n\n", form.label);
        body.push_str(&form.description);
        body.push_str("\n\n");
        if !sender_message.trim().is_empty() {
            body.push_str(&format!("Message from {sender}:\n{}\n\n", sender_message.trim()));
        }
        body.push_str(&format!("Open the form here:\n{share_url}\n"));

        self.deliver(recipient_email, subject, body)
    }

    /// Mail the owner one completed submission of `form`.
    pub fn send_submission_notification(
        &self,
        form_owner_email: &str,
        form: &Form,
        answers: &[Answer],
    ) -> Result<(), EmailError> {
        let subject = "Your UIForm has been completed!".to_string();

        let mut body = format!("Someone filled out \"{}\":\n\n", form.label);
        for answer in answers {
            body.push_str(&format!("{}: {}\n", answer.label, answer.answer));
        }

        self.deliver(form_owner_email, subject, body)
    }
}
