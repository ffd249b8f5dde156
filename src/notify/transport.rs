use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Outbound mail delivery.
#[cfg_attr(test, mockall::automock)]
pub trait MailTransport: Send + Sync {
    fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Writes every message to the log instead of delivering it.
#[derive(Debug, Default)]
pub struct LogTransport;

impl MailTransport for LogTransport {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            "Email from {} to {}: {}\n{}",
            message.from,
            message.to.join(", "),
            message.subject,
            message.body
        );
        Ok(())
    }
}

/// Drops each message as a JSON file into a directory.
#[derive(Debug)]
pub struct OutboxTransport {
    dir: PathBuf,
}

impl OutboxTransport {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create outbox directory {}", dir.display()))?;
        Ok(Self { dir })
    }
}

impl MailTransport for OutboxTransport {
    fn send(&self, message: &EmailMessage) -> Result<()> {
        let name = format!(
            "{}-{}.json",
            Utc::now().format("%Y%m%dT%H%M%S%.3f"),
            Uuid::new_v4()
        );
        let path = self.dir.join(name);
        let serialized = serde_json::to_string_pretty(message)?;
        fs::write(&path, serialized)
            .with_context(|| format!("failed to write email to {}", path.display()))
    }
}
