use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    db::models::{Form, FormDetail, FormInput, FormStatus, Identity},
    error::AppResult,
    response::{self, ResponseSchema},
    sharing, AppState,
};

/// A form as a respondent would see it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPreview {
    pub form: Form,
    pub schema: ResponseSchema,
}

pub async fn list_forms(state: &AppState, identity: &Identity) -> AppResult<Vec<Form>> {
    let db = &state.db;
    db.list_forms(identity.user_id).await
}

pub async fn create_form(
    state: &AppState,
    identity: &Identity,
    input: FormInput,
) -> AppResult<Form> {
    let form = state.db.create_form(identity.user_id, input).await?;
    info!("{} created form '{}' ({})", identity.username, form.label, form.slug);
    Ok(form)
}

/// The edit screen: the form and its fields.
pub async fn get_form(state: &AppState, identity: &Identity, slug: &str) -> AppResult<FormDetail> {
    let db = &state.db;
    let form = db.find_form(identity.user_id, slug).await?;
    let fields = db.list_fields(form.id).await?;
    Ok(FormDetail { form, fields })
}

pub async fn update_form(
    state: &AppState,
    identity: &Identity,
    slug: &str,
    input: FormInput,
) -> AppResult<Form> {
    let db = &state.db;
    db.update_form(identity.user_id, slug, input).await
}

pub async fn delete_form(state: &AppState, identity: &Identity, slug: &str) -> AppResult<()> {
    state.db.delete_form(identity.user_id, slug).await?;
    info!("{} deleted form {slug}", identity.username);
    Ok(())
}

pub async fn preview_form(
    state: &AppState,
    identity: &Identity,
    slug: &str,
) -> AppResult<FormPreview> {
    let db = &state.db;
    let form = db.find_form(identity.user_id, slug).await?;
    let fields = db.list_fields(form.id).await?;
    Ok(FormPreview {
        schema: response::build(&fields),
        form,
    })
}

/// Change marker for an open preview to poll.
pub async fn form_status(
    state: &AppState,
    identity: &Identity,
    slug: &str,
) -> AppResult<FormStatus> {
    let form = state.db.find_form(identity.user_id, slug).await?;
    Ok(FormStatus {
        id: form.id,
        url: sharing::update_url(&state.settings.site_url, &identity.username, &form.slug),
        last_updated: form.updated_at.timestamp_millis(),
    })
}
