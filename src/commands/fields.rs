use serde::{Deserialize, Serialize};

use crate::{
    db::{
        models::{Field, FieldInput, Identity},
        FieldChange,
    },
    error::AppResult,
    AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    pub field_id: i64,
    #[serde(flatten)]
    pub input: FieldInput,
}

pub async fn add_field(
    state: &AppState,
    identity: &Identity,
    slug: &str,
    input: FieldInput,
) -> AppResult<Field> {
    let db = &state.db;
    let form = db.find_form(identity.user_id, slug).await?;
    db.add_field(form.id, input).await
}

pub async fn update_field(
    state: &AppState,
    identity: &Identity,
    slug: &str,
    update: FieldUpdate,
) -> AppResult<Field> {
    let db = &state.db;
    let form = db.find_form(identity.user_id, slug).await?;
    db.update_field(form.id, update.field_id, update.input).await
}

pub async fn delete_field(
    state: &AppState,
    identity: &Identity,
    slug: &str,
    field_id: i64,
) -> AppResult<()> {
    let db = &state.db;
    let form = db.find_form(identity.user_id, slug).await?;
    db.delete_field(form.id, field_id).await
}

/// Apply a whole field list edit at once.
pub async fn save_fields(
    state: &AppState,
    identity: &Identity,
    slug: &str,
    changes: Vec<FieldChange>,
) -> AppResult<Vec<Field>> {
    let db = &state.db;
    let form = db.find_form(identity.user_id, slug).await?;
    db.save_fields(form.id, changes).await
}
