mod common;

use common::{field_input, harness, Harness};
use pretty_assertions::assert_eq;
use rusqlite::params;
use serde_json::json;
use uiforms_lib::{
    commands::{
        forms,
        sharing::{self, ShareInput},
    },
    db::models::{FieldKind, Form, Identity},
    error::AppError,
    response::Submission,
};

async fn survey(h: &Harness) -> (Identity, Form) {
    let nemo = h.owner("nemo").await;
    let form = h.form(&nemo, "Newsletter").await;
    h.db()
        .add_field(form.id, field_input("Subscribed?", FieldKind::Boolean))
        .await
        .unwrap();
    h.db()
        .add_field(form.id, field_input("Age", FieldKind::Integer))
        .await
        .unwrap();
    (nemo, form)
}

fn answers(value: serde_json::Value) -> Submission {
    value.as_object().cloned().expect("object")
}

fn share_input(email: &str) -> ShareInput {
    ShareInput {
        email: email.into(),
        message: "Please fill this in".into(),
    }
}

#[tokio::test]
async fn token_is_created_once_and_reused() {
    let h = harness();
    let (_, form) = survey(&h).await;

    let first = h.db().get_or_create_share_token(form.id).await.unwrap();
    let second = h.db().get_or_create_share_token(form.id).await.unwrap();
    assert_eq!(first, second);
    assert!(first.token.len() >= 32);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_shares_converge_on_one_token() {
    let h = harness();
    let (_, form) = survey(&h).await;

    let form_id = form.id;
    let mut handles = Vec::new();
    for _ in 0..8 {
        let db = h.db().clone();
        handles.push(tokio::spawn(async move {
            db.get_or_create_share_token(form_id).await.unwrap()
        }));
    }

    let mut tokens = Vec::new();
    for handle in handles {
        tokens.push(handle.await.unwrap().token);
    }
    tokens.dedup();
    assert_eq!(tokens.len(), 1);

    let rows: i64 = h
        .db()
        .execute(move |conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM share_tokens WHERE form_id = ?1",
                params![form_id],
                |row| row.get(0),
            )?)
        })
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn share_mails_the_link_and_reuses_it() {
    let h = harness();
    let (nemo, form) = survey(&h).await;

    let first = sharing::share_form(&h.state, &nemo, &form.slug, share_input("ned@example.org"))
        .await
        .unwrap();
    assert!(first.email_error.is_none());
    assert!(first.url.starts_with("http://forms.test/forms/newsletter/"));

    let second = sharing::share_form(
        &h.state,
        &nemo,
        &form.slug,
        share_input("conseil@example.org"),
    )
    .await
    .unwrap();
    assert_eq!(first.url, second.url);

    let sent = h.mail.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, ["ned@example.org"]);
    assert_eq!(sent[0].subject, "nemo has shared a UIForm with you!");
    assert!(sent[0].body.contains(&first.url));
    assert!(sent[0].body.contains("Please fill this in"));
}

#[tokio::test]
async fn share_rejects_bad_recipient_without_issuing_a_token() {
    let h = harness();
    let (nemo, form) = survey(&h).await;

    let err = sharing::share_form(&h.state, &nemo, &form.slug, share_input("not-an-email"))
        .await
        .unwrap_err();
    match err {
        AppError::Validation(errors) => assert_eq!(errors.fields(), ["email"]),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(h.db().find_share_token(form.id).await.unwrap().is_none());
    assert!(h.mail.sent().is_empty());
}

#[tokio::test]
async fn share_still_completes_when_mail_fails() {
    let h = harness();
    let (nemo, form) = survey(&h).await;
    h.mail.set_failing(true);

    let outcome = sharing::share_form(&h.state, &nemo, &form.slug, share_input("ned@example.org"))
        .await
        .unwrap();
    let email_error = outcome.email_error.expect("email error reported");
    assert!(email_error.contains("SMTP server unavailable"));

    let token = h.db().find_share_token(form.id).await.unwrap().expect("token kept");
    assert!(outcome.url.contains(&token.token));
}

#[tokio::test]
async fn other_owners_cannot_share_or_preview() {
    let h = harness();
    let (_, form) = survey(&h).await;
    let ned = h.owner("ned").await;

    assert!(matches!(
        sharing::share_form(&h.state, &ned, &form.slug, share_input("ned@example.org")).await,
        Err(AppError::NotFound)
    ));
    assert!(matches!(
        forms::preview_form(&h.state, &ned, &form.slug).await,
        Err(AppError::NotFound)
    ));
    assert!(h.db().find_share_token(form.id).await.unwrap().is_none());
}

#[tokio::test]
async fn shared_form_needs_matching_slug_and_token() {
    let h = harness();
    let (nemo, form) = survey(&h).await;
    let other = h.form(&nemo, "Dive log").await;
    let token = h.db().get_or_create_share_token(form.id).await.unwrap();

    let view = sharing::view_shared_form(&h.state, &form.slug, &token.token)
        .await
        .unwrap();
    assert_eq!(view.form.id, form.id);
    assert_eq!(view.schema.len(), 2);

    for (slug, token) in [
        (form.slug.as_str(), "0000"),
        (other.slug.as_str(), token.token.as_str()),
        ("newsletter-guess", token.token.as_str()),
    ] {
        assert!(matches!(
            sharing::view_shared_form(&h.state, slug, token).await,
            Err(AppError::NotFound)
        ));
    }
}

#[tokio::test]
async fn valid_submission_is_mailed_to_the_owner() {
    let h = harness();
    let (_, form) = survey(&h).await;
    let token = h.db().get_or_create_share_token(form.id).await.unwrap();

    let outcome = sharing::submit_shared_form(
        &h.state,
        &form.slug,
        &token.token,
        answers(json!({ "Subscribed?": true, "Age": "33" })),
    )
    .await
    .unwrap();

    assert_eq!(
        serde_json::to_value(&outcome.answers).unwrap(),
        json!([
            { "label": "Subscribed?", "answer": true },
            { "label": "Age", "answer": 33 },
        ])
    );
    assert!(outcome.email_error.is_none());

    let sent = h.mail.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, ["nemo@example.org"]);
    assert_eq!(sent[0].subject, "Your UIForm has been completed!");
    assert!(sent[0].body.contains("Age: 33"));
}

#[tokio::test]
async fn invalid_submission_reports_only_bad_answers_and_sends_nothing() {
    let h = harness();
    let (_, form) = survey(&h).await;
    let token = h.db().get_or_create_share_token(form.id).await.unwrap();

    let err = sharing::submit_shared_form(
        &h.state,
        &form.slug,
        &token.token,
        answers(json!({ "Subscribed?": true, "Age": "abc" })),
    )
    .await
    .unwrap_err();

    match err {
        AppError::Validation(errors) => assert_eq!(errors.fields(), ["Age"]),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert!(h.mail.sent().is_empty());
}

#[tokio::test]
async fn submission_survives_mail_failure() {
    let h = harness();
    let (_, form) = survey(&h).await;
    let token = h.db().get_or_create_share_token(form.id).await.unwrap();
    h.mail.set_failing(true);

    let outcome = sharing::submit_shared_form(
        &h.state,
        &form.slug,
        &token.token,
        answers(json!({ "Subscribed?": "no", "Age": 41 })),
    )
    .await
    .unwrap();

    assert_eq!(outcome.answers.len(), 2);
    assert!(outcome.email_error.is_some());
}

#[tokio::test]
async fn form_status_tracks_field_edits() {
    let h = harness();
    let (nemo, form) = survey(&h).await;

    let before = forms::form_status(&h.state, &nemo, &form.slug).await.unwrap();
    assert_eq!(before.url, "http://forms.test/forms/nemo/newsletter/update/");

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    h.db()
        .add_field(form.id, field_input("Shoe size", FieldKind::Integer))
        .await
        .unwrap();

    let after = forms::form_status(&h.state, &nemo, &form.slug).await.unwrap();
    assert!(after.last_updated > before.last_updated);
}
