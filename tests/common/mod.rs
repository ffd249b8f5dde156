#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};
use uiforms_lib::{
    db::{
        models::{FieldInput, FieldKind, Form, FormInput, Identity},
        Database,
    },
    notify::{EmailMessage, MailTransport, Notifier},
    settings::Settings,
    AppState,
};

/// Keeps every message it is given; can be switched to fail.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<EmailMessage>>,
    failing: Mutex<bool>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }
}

impl MailTransport for RecordingTransport {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        if *self.failing.lock().unwrap() {
            bail!("SMTP server unavailable");
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct Harness {
    pub state: AppState,
    pub mail: Arc<RecordingTransport>,
}

impl Harness {
    pub fn db(&self) -> &Database {
        &self.state.db
    }

    pub async fn owner(&self, username: &str) -> Identity {
        let user = self
            .state
            .db
            .register_user(username.to_string(), format!("{username}@example.org"))
            .await
            .expect("register owner");
        Identity::from(&user)
    }

    pub async fn form(&self, owner: &Identity, label: &str) -> Form {
        self.state
            .db
            .create_form(owner.user_id, form_input(label))
            .await
            .expect("create form")
    }
}

pub fn harness() -> Harness {
    let db = Database::in_memory().expect("open in-memory store");
    let mail = Arc::new(RecordingTransport::default());
    let notifier = Notifier::new(mail.clone(), "webmaster@localhost");
    let settings = Settings {
        site_url: "http://forms.test".into(),
        ..Settings::default()
    };
    Harness {
        state: AppState::new(db, notifier, settings),
        mail,
    }
}

pub fn form_input(label: &str) -> FormInput {
    FormInput {
        label: label.to_string(),
        description: "A brief description of this form...".to_string(),
    }
}

pub fn field_input(label: &str, kind: FieldKind) -> FieldInput {
    FieldInput {
        label: label.to_string(),
        kind,
        description: None,
    }
}
