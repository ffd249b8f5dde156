use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Environment variable naming the settings file.
pub const SETTINGS_ENV: &str = "UIFORMS_SETTINGS";
const DEFAULT_SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackend {
    /// Log each message instead of sending it.
    Log,
    /// Write each message into `outbox_dir`.
    Outbox,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub database_path: PathBuf,
    /// Absolute base for links placed in emails.
    pub site_url: String,
    pub default_from_email: String,
    pub mail_backend: MailBackend,
    pub outbox_dir: PathBuf,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("uiforms.sqlite3"),
            site_url: "http://localhost:8000".into(),
            default_from_email: "webmaster@localhost".into(),
            mail_backend: MailBackend::Log,
            outbox_dir: PathBuf::from("outbox"),
            log_level: "info".into(),
        }
    }
}

impl Settings {
    /// Settings file location: `$UIFORMS_SETTINGS`, else `settings.json` in the working directory.
    pub fn default_path() -> PathBuf {
        env::var_os(SETTINGS_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    /// Read settings from `path`. A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "site_url": "https://forms.example.org", "mail_backend": "outbox" }"#,
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.site_url, "https://forms.example.org");
        assert_eq!(settings.mail_backend, MailBackend::Outbox);
        assert_eq!(settings.default_from_email, "webmaster@localhost");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load(&path).is_err());
    }
}
