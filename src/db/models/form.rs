//! Form definitions owned by a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Field;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    pub id: i64,
    pub owner_id: i64,
    pub label: String,
    pub description: String,
    /// Derived from the label on creation; never rewritten afterwards.
    pub slug: String,
    pub created_at: DateTime<Utc>,
    /// Last-modified stamp, also advanced by any field mutation.
    pub updated_at: DateTime<Utc>,
}

/// Input data for creating or updating a form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub label: String,
    pub description: String,
}

/// A form together with its fields, in stored order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDetail {
    pub form: Form,
    pub fields: Vec<Field>,
}

/// Lightweight change marker polled by an open preview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormStatus {
    pub id: i64,
    pub url: String,
    /// `updated_at` in milliseconds since the Unix epoch.
    pub last_updated: i64,
}

pub mod validation {
    use super::FormInput;
    use crate::error::ValidationErrors;

    pub const MAX_LABEL_CHARS: usize = 140;

    pub fn validate_form_input(input: &FormInput) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let label = input.label.trim();
        if label.is_empty() {
            errors.add("label", "This field is required.");
        } else if label.chars().count() > MAX_LABEL_CHARS {
            errors.add(
                "label",
                format!("Ensure this value has at most {MAX_LABEL_CHARS} characters."),
            );
        }

        if input.description.trim().is_empty() {
            errors.add("description", "This field is required.");
        }

        errors
    }

}
