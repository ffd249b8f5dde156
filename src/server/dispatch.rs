use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    commands::{
        accounts::{self, RegisterInput},
        fields::{self, FieldUpdate},
        forms,
        sharing::{self, ShareInput},
    },
    db::{
        models::{FieldInput, FormInput, Identity},
        FieldChange,
    },
    error::{AppError, AppResult},
    response::Submission,
    AppState,
};

use super::protocol::Request;

#[derive(Deserialize)]
struct SlugParams {
    slug: String,
}

#[derive(Deserialize)]
struct FormParams {
    slug: String,
    #[serde(flatten)]
    input: FormInput,
}

#[derive(Deserialize)]
struct AddFieldParams {
    slug: String,
    #[serde(flatten)]
    input: FieldInput,
}

#[derive(Deserialize)]
struct UpdateFieldParams {
    slug: String,
    #[serde(flatten)]
    update: FieldUpdate,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteFieldParams {
    slug: String,
    field_id: i64,
}

#[derive(Deserialize)]
struct SaveFieldsParams {
    slug: String,
    changes: Vec<FieldChange>,
}

#[derive(Deserialize)]
struct ShareParams {
    slug: String,
    #[serde(flatten)]
    input: ShareInput,
}

#[derive(Deserialize)]
struct TokenParams {
    slug: String,
    token: String,
}

#[derive(Deserialize)]
struct SubmitParams {
    slug: String,
    token: String,
    answers: Submission,
}

fn params<T: DeserializeOwned>(raw: Value) -> AppResult<T> {
    let raw = if raw.is_null() {
        Value::Object(Default::default())
    } else {
        raw
    };
    serde_json::from_value(raw).map_err(|err| AppError::validation("params", err.to_string()))
}

fn reply<T: Serialize>(value: T) -> AppResult<Value> {
    serde_json::to_value(value).map_err(|err| AppError::Internal(err.into()))
}

/// Owner commands need a known user; unknown and absent users look the same as a missing form.
async fn authenticate(state: &AppState, user: Option<&str>) -> AppResult<Identity> {
    match user {
        Some(username) => state.db.identify(username).await,
        None => Err(AppError::NotFound),
    }
}

pub const COMMANDS: &[&str] = &[
    "register_user",
    "list_forms",
    "create_form",
    "get_form",
    "update_form",
    "delete_form",
    "preview_form",
    "form_status",
    "add_field",
    "update_field",
    "delete_field",
    "save_fields",
    "share_form",
    "view_shared_form",
    "submit_shared_form",
];

pub async fn dispatch(state: &AppState, request: Request) -> AppResult<Value> {
    let Request {
        command,
        user,
        params: raw,
        ..
    } = request;

    match command.as_str() {
        "register_user" => {
            let input: RegisterInput = params(raw)?;
            reply(accounts::register_user(state, input).await?)
        }
        "view_shared_form" => {
            let p: TokenParams = params(raw)?;
            reply(sharing::view_shared_form(state, &p.slug, &p.token).await?)
        }
        "submit_shared_form" => {
            let p: SubmitParams = params(raw)?;
            reply(sharing::submit_shared_form(state, &p.slug, &p.token, p.answers).await?)
        }
        owner_command if COMMANDS.contains(&owner_command) => {
            let identity = authenticate(state, user.as_deref()).await?;
            dispatch_owner(state, &identity, owner_command, raw).await
        }
        other => Err(AppError::validation(
            "command",
            format!("Unknown command '{other}'"),
        )),
    }
}

async fn dispatch_owner(
    state: &AppState,
    identity: &Identity,
    command: &str,
    raw: Value,
) -> AppResult<Value> {
    match command {
        "list_forms" => reply(forms::list_forms(state, identity).await?),
        "create_form" => {
            let input: FormInput = params(raw)?;
            reply(forms::create_form(state, identity, input).await?)
        }
        "get_form" => {
            let p: SlugParams = params(raw)?;
            reply(forms::get_form(state, identity, &p.slug).await?)
        }
        "update_form" => {
            let p: FormParams = params(raw)?;
            reply(forms::update_form(state, identity, &p.slug, p.input).await?)
        }
        "delete_form" => {
            let p: SlugParams = params(raw)?;
            forms::delete_form(state, identity, &p.slug).await?;
            Ok(Value::Null)
        }
        "preview_form" => {
            let p: SlugParams = params(raw)?;
            reply(forms::preview_form(state, identity, &p.slug).await?)
        }
        "form_status" => {
            let p: SlugParams = params(raw)?;
            reply(forms::form_status(state, identity, &p.slug).await?)
        }
        "add_field" => {
            let p: AddFieldParams = params(raw)?;
            reply(fields::add_field(state, identity, &p.slug, p.input).await?)
        }
        "update_field" => {
            let p: UpdateFieldParams = params(raw)?;
            reply(fields::update_field(state, identity, &p.slug, p.update).await?)
        }
        "delete_field" => {
            let p: DeleteFieldParams = params(raw)?;
            fields::delete_field(state, identity, &p.slug, p.field_id).await?;
            Ok(Value::Null)
        }
        "save_fields" => {
            let p: SaveFieldsParams = params(raw)?;
            reply(fields::save_fields(state, identity, &p.slug, p.changes).await?)
        }
        "share_form" => {
            let p: ShareParams = params(raw)?;
            reply(sharing::share_form(state, identity, &p.slug, p.input).await?)
        }
        other => Err(AppError::validation(
            "command",
            format!("Unknown command '{other}'"),
        )),
    }
}
