//! Owner accounts.
//!
//! Authentication happens outside this crate; a `User` row only records who owns which forms
//! and where submission results are mailed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_USERNAME_CHARS: usize = 150;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// The authenticated owner a command acts on behalf of.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

pub mod validation {
    use super::MAX_USERNAME_CHARS;
    use crate::error::ValidationErrors;

    pub fn validate_username(username: &str, errors: &mut ValidationErrors) {
        if username.is_empty() {
            errors.add("username", "This field is required.");
            return;
        }
        if username.chars().count() > MAX_USERNAME_CHARS {
            errors.add(
                "username",
                format!("Ensure this value has at most {MAX_USERNAME_CHARS} characters."),
            );
        }
        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
    }

    /// Shape check only: one `@`, a non-empty local part, and a dotted domain.
    pub fn is_valid_email(email: &str) -> bool {
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
            return false;
        }
        let labels: Vec<&str> = domain.split('.').collect();
        labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
    }

    pub fn validate_email(field: &str, email: &str, errors: &mut ValidationErrors) {
        if email.is_empty() {
            errors.add(field, "This field is required.");
        } else if !is_valid_email(email) {
            errors.add(field, "Enter a valid email address.");
        }
    }

}
