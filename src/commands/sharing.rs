use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::{
    db::models::{user::validation::validate_email, Identity},
    error::{AppResult, ValidationErrors},
    notify::EmailError,
    response::{self, Answer, Submission},
    sharing, AppState,
};

use super::forms::FormPreview;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareInput {
    pub email: String,
    #[serde(default)]
    pub message: String,
}

/// Result of a share. The link exists even when the email could not be sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOutcome {
    pub url: String,
    pub recipient: String,
    pub email_error: Option<String>,
}

/// Result of an accepted submission. `email_error` is set when the owner could not be told.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub answers: Vec<Answer>,
    pub email_error: Option<String>,
}

/// Notifier calls do blocking IO; keep them off the async workers.
async fn send_blocking<F>(send: F) -> Result<(), EmailError>
where
    F: FnOnce() -> Result<(), EmailError> + Send + 'static,
{
    match tokio::task::spawn_blocking(send).await {
        Ok(result) => result,
        Err(join_err) => Err(EmailError {
            recipient: String::new(),
            reason: format!("mail task failed: {join_err}"),
        }),
    }
}

/// Issue (or reuse) the form's share token and mail the link to `input.email`.
pub async fn share_form(
    state: &AppState,
    identity: &Identity,
    slug: &str,
    input: ShareInput,
) -> AppResult<ShareOutcome> {
    let recipient = input.email.trim().to_string();
    let mut errors = ValidationErrors::new();
    validate_email("email", &recipient, &mut errors);
    errors.into_result()?;

    let db = &state.db;
    let form = db.find_form(identity.user_id, slug).await?;
    let token = db.get_or_create_share_token(form.id).await?;
    let url = sharing::share_url(&state.settings.site_url, &form.slug, &token.token);

    let notifier = state.notifier.clone();
    let sender = identity.username.clone();
    let (to, link) = (recipient.clone(), url.clone());
    let sent = send_blocking(move || {
        notifier.send_share_notification(&to, &sender, &form, &link, &input.message)
    })
    .await;

    let email_error = match sent {
        Ok(()) => {
            info!("{} shared form {slug} with {recipient}", identity.username);
            None
        }
        Err(err) => {
            error!("{err}");
            Some(err.to_string())
        }
    };

    Ok(ShareOutcome {
        url,
        recipient,
        email_error,
    })
}

/// Respondent view of a shared form.
pub async fn view_shared_form(state: &AppState, slug: &str, token: &str) -> AppResult<FormPreview> {
    let db = &state.db;
    let form = db.find_shared_form(slug, token).await?;
    let fields = db.list_fields(form.id).await?;
    Ok(FormPreview {
        schema: response::build(&fields),
        form,
    })
}

/// Validate a respondent's answers and mail them to the form owner.
///
/// The schema is rebuilt from the form's current fields on every call. Answers are not stored.
pub async fn submit_shared_form(
    state: &AppState,
    slug: &str,
    token: &str,
    submitted: Submission,
) -> AppResult<SubmissionOutcome> {
    let db = &state.db;
    let form = db.find_shared_form(slug, token).await?;
    let fields = db.list_fields(form.id).await?;
    let schema = response::build(&fields);
    let answers = response::validate(&schema, &submitted)?;

    let owner = db.find_user_by_id(form.owner_id).await?;
    let notifier = state.notifier.clone();
    let form_slug = form.slug.clone();
    let outgoing = answers.clone();
    let sent = send_blocking(move || {
        notifier.send_submission_notification(&owner.email, &form, &outgoing)
    })
    .await;

    let email_error = match sent {
        Ok(()) => {
            info!("Submission for form {form_slug} delivered to its owner");
            None
        }
        Err(err) => {
            error!("{err}");
            Some(err.to_string())
        }
    };

    Ok(SubmissionOutcome {
        answers,
        email_error,
    })
}
