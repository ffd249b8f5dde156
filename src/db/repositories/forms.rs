use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    helpers::{is_unique_violation, parse_datetime, slugify},
    models::{form::validation, Form, FormInput},
};
use crate::error::{AppError, AppResult};

const FORM_COLUMNS: &str = "id, owner_id, label, description, slug, created_at, updated_at";
const DUPLICATE_LABEL: &str = "You already have a form with this label!";
const FALLBACK_SLUG: &str = "form";

fn row_to_form(row: &Row) -> Result<Form> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(Form {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        label: row.get("label")?,
        description: row.get("description")?,
        slug: row.get("slug")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn fetch_form(conn: &Connection, form_id: i64) -> Result<Option<Form>> {
    let mut stmt = conn.prepare(&format!("SELECT {FORM_COLUMNS} FROM forms WHERE id = ?1"))?;
    let mut rows = stmt.query(params![form_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_form(row)?)),
        None => Ok(None),
    }
}

fn fetch_owned_form(conn: &Connection, owner_id: i64, slug: &str) -> Result<Option<Form>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {FORM_COLUMNS} FROM forms WHERE owner_id = ?1 AND slug = ?2"
    ))?;
    let mut rows = stmt.query(params![owner_id, slug])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_form(row)?)),
        None => Ok(None),
    }
}

/// Whether `owner_id` already has a form labelled `label`, ignoring form `exclude_id`.
fn label_taken(
    conn: &Connection,
    owner_id: i64,
    label: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM forms WHERE owner_id = ?1 AND label = ?2 AND id != ?3",
        params![owner_id, label, exclude_id.unwrap_or(-1)],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Slug for a new form, suffixed `-2`, `-3`, ... until free within the owner's forms.
fn unique_slug(conn: &Connection, owner_id: i64, label: &str) -> Result<String> {
    let mut base = slugify(label);
    if base.is_empty() {
        base = FALLBACK_SLUG.to_string();
    }

    let mut candidate = base.clone();
    let mut suffix = 2;
    loop {
        let taken: i64 = conn.query_row(
            "SELECT COUNT(*) FROM forms WHERE owner_id = ?1 AND slug = ?2",
            params![owner_id, candidate],
            |row| row.get(0),
        )?;
        if taken == 0 {
            return Ok(candidate);
        }
        candidate = format!("{base}-{suffix}");
        suffix += 1;
    }
}

/// Advance a form's last-modified stamp.
pub(crate) fn touch_form(conn: &Connection, form_id: i64, now: DateTime<Utc>) -> Result<()> {
    let rows_affected = conn.execute(
        "UPDATE forms SET updated_at = ?1 WHERE id = ?2",
        params![now.to_rfc3339(), form_id],
    )?;
    if rows_affected == 0 {
        return Err(AppError::NotFound.into());
    }
    Ok(())
}

fn map_label_conflict(err: rusqlite::Error) -> anyhow::Error {
    if is_unique_violation(&err) {
        AppError::validation("label", DUPLICATE_LABEL).into()
    } else {
        err.into()
    }
}

impl Database {
    /// All forms owned by `owner_id`, oldest first.
    pub async fn list_forms(&self, owner_id: i64) -> AppResult<Vec<Form>> {
        let forms = self
            .execute(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {FORM_COLUMNS} FROM forms WHERE owner_id = ?1 ORDER BY id ASC"
                ))?;

                let mut rows = stmt.query(params![owner_id])?;
                let mut forms = Vec::new();
                while let Some(row) = rows.next()? {
                    forms.push(row_to_form(row)?);
                }

                Ok(forms)
            })
            .await?;

        Ok(forms)
    }

    /// Create a form for `owner_id`.
    /// Returns a validation error if the owner already uses the label.
    pub async fn create_form(&self, owner_id: i64, input: FormInput) -> AppResult<Form> {
        validation::validate_form_input(&input).into_result()?;

        let form = self
            .execute(move |conn| {
                let now = Utc::now();
                let label = input.label.trim().to_string();

                // Checked in the same DB task as the insert, so no other write can slip between.
                if label_taken(conn, owner_id, &label, None)? {
                    return Err(AppError::validation("label", DUPLICATE_LABEL).into());
                }
                let slug = unique_slug(conn, owner_id, &label)?;

                conn.execute(
                    "INSERT INTO forms (owner_id, label, description, slug, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        owner_id,
                        label,
                        input.description,
                        slug,
                        now.to_rfc3339(),
                        now.to_rfc3339(),
                    ],
                )
                .map_err(map_label_conflict)?;

                let form_id = conn.last_insert_rowid();
                fetch_form(conn, form_id)?.ok_or_else(|| anyhow!("Form not found after insert"))
            })
            .await?;

        Ok(form)
    }

    /// Look up one of `owner_id`'s forms by slug.
    pub async fn find_form(&self, owner_id: i64, slug: &str) -> AppResult<Form> {
        let slug = slug.to_string();
        let form = self
            .execute(move |conn| fetch_owned_form(conn, owner_id, &slug))
            .await?;

        form.ok_or(AppError::NotFound)
    }

    /// Edit label and description. The slug is left as first assigned.
    pub async fn update_form(
        &self,
        owner_id: i64,
        slug: &str,
        input: FormInput,
    ) -> AppResult<Form> {
        validation::validate_form_input(&input).into_result()?;

        let slug = slug.to_string();
        let form = self
            .execute(move |conn| {
                let now = Utc::now();
                let existing =
                    fetch_owned_form(conn, owner_id, &slug)?.ok_or(AppError::NotFound)?;
                let label = input.label.trim().to_string();

                if label_taken(conn, owner_id, &label, Some(existing.id))? {
                    return Err(AppError::validation("label", DUPLICATE_LABEL).into());
                }

                conn.execute(
                    "UPDATE forms
                     SET label = ?1,
                         description = ?2,
                         updated_at = ?3
                     WHERE id = ?4",
                    params![label, input.description, now.to_rfc3339(), existing.id],
                )
                .map_err(map_label_conflict)?;

                fetch_form(conn, existing.id)?.ok_or_else(|| anyhow!("Form not found after update"))
            })
            .await?;

        Ok(form)
    }

    /// Delete a form; its fields and share token go with it.
    pub async fn delete_form(&self, owner_id: i64, slug: &str) -> AppResult<()> {
        let slug = slug.to_string();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            let form = fetch_owned_form(&tx, owner_id, &slug)?.ok_or(AppError::NotFound)?;

            tx.execute("DELETE FROM fields WHERE form_id = ?1", params![form.id])?;
            tx.execute("DELETE FROM share_tokens WHERE form_id = ?1", params![form.id])?;
            tx.execute("DELETE FROM forms WHERE id = ?1", params![form.id])?;
            tx.commit()?;
            Ok(())
        })
        .await?;

        Ok(())
    }

    /// Respondent lookup: both the slug and the token must match the same form.
    pub async fn find_shared_form(&self, slug: &str, token: &str) -> AppResult<Form> {
        let slug = slug.to_string();
        let token = token.to_string();
        let form = self
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT f.id, f.owner_id, f.label, f.description, f.slug, f.created_at, f.updated_at
                     FROM share_tokens t
                     JOIN forms f ON f.id = t.form_id
                     WHERE t.token = ?1 AND f.slug = ?2",
                )?;
                let mut rows = stmt.query(params![token, slug])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row_to_form(row)?)),
                    None => Ok(None),
                }
            })
            .await?;

        form.ok_or(AppError::NotFound)
    }
}
