use serde::{Deserialize, Serialize};

use crate::{db::models::User, error::AppResult, AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
}

pub async fn register_user(state: &AppState, input: RegisterInput) -> AppResult<User> {
    let db = &state.db;
    db.register_user(input.username, input.email).await
}
