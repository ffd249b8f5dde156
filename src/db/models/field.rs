//! Typed questions belonging to a form.

use serde::{Deserialize, Serialize};

/// Storage codes for the known kinds.
const BOOLEAN_CODE: &str = "B";
const INTEGER_CODE: &str = "I";

/// Question type of a field.
///
/// Rows written by older or foreign tooling may carry a code this build does not know;
/// those load as `Unrecognized` instead of failing the whole form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldKind {
    #[default]
    Boolean,
    Integer,
    Unrecognized(String),
}

impl FieldKind {
    pub fn from_code(code: &str) -> Self {
        match code {
            BOOLEAN_CODE => FieldKind::Boolean,
            INTEGER_CODE => FieldKind::Integer,
            other => FieldKind::Unrecognized(other.to_string()),
        }
    }

    pub fn as_code(&self) -> &str {
        match self {
            FieldKind::Boolean => BOOLEAN_CODE,
            FieldKind::Integer => INTEGER_CODE,
            FieldKind::Unrecognized(code) => code,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldKind::Unrecognized(_))
    }
}

impl From<String> for FieldKind {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("boolean") {
            FieldKind::Boolean
        } else if value.eq_ignore_ascii_case("integer") {
            FieldKind::Integer
        } else {
            FieldKind::from_code(&value)
        }
    }
}

impl From<FieldKind> for String {
    fn from(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Boolean => "Boolean".into(),
            FieldKind::Integer => "Integer".into(),
            FieldKind::Unrecognized(code) => code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: i64,
    pub form_id: i64,
    pub label: String,
    pub kind: FieldKind,
    pub description: Option<String>,
}

/// Input data for creating or updating a field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInput {
    pub label: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub description: Option<String>,
}

pub mod validation {
    use super::FieldInput;
    use crate::error::ValidationErrors;

    pub const MAX_LABEL_CHARS: usize = 50;

    /// Checks one field input; `prefix` namespaces the error keys inside batch saves.
    pub fn validate_field_input(input: &FieldInput, prefix: &str) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        let key = |name: &str| format!("{prefix}{name}");

        let label = input.label.trim();
        if label.is_empty() {
            errors.add(key("label"), "This field is required.");
        } else if label.chars().count() > MAX_LABEL_CHARS {
            errors.add(
                key("label"),
                format!("Ensure this value has at most {MAX_LABEL_CHARS} characters."),
            );
        }

        if !input.kind.is_known() {
            errors.add(
                key("kind"),
                format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    input.kind.as_code()
                ),
            );
        }

        errors
    }
}
