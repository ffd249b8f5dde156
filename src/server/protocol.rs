use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, ValidationErrors};

/// One line of input.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub id: Option<Value>,
    pub command: String,
    /// Username the caller was authenticated as upstream, if any.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationErrors>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        let fields = match err {
            AppError::Validation(errors) => Some(errors.clone()),
            _ => None,
        };
        let message = match err {
            // Never echo store details back to callers.
            AppError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        Self {
            kind: err.kind().to_string(),
            message,
            fields,
        }
    }
}

pub fn success(id: Option<Value>, result: Value) -> Value {
    json!({
        "id": id.unwrap_or(Value::Null),
        "ok": true,
        "result": result,
    })
}

pub fn failure(id: Option<Value>, error: ErrorBody) -> Value {
    json!({
        "id": id.unwrap_or(Value::Null),
        "ok": false,
        "error": error,
    })
}

/// Response for a line that is not a request at all.
pub fn malformed(message: impl Into<String>) -> Value {
    failure(
        None,
        ErrorBody {
            kind: "invalid_request".into(),
            message: message.into(),
            fields: None,
        },
    )
}
