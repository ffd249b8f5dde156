use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque access token granting unauthenticated access to one form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShareToken {
    pub id: i64,
    pub form_id: i64,
    pub token: String,
    pub created_at: DateTime<Utc>,
}
