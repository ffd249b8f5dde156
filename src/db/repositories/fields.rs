use anyhow::{anyhow, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{
    connection::Database,
    models::{field::validation, Field, FieldInput, FieldKind},
};
use crate::error::{AppError, AppResult, ValidationErrors};

use super::forms::touch_form;

/// One entry of a batch field save.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum FieldChange {
    Create {
        #[serde(flatten)]
        input: FieldInput,
    },
    Update {
        id: i64,
        #[serde(flatten)]
        input: FieldInput,
    },
    Delete {
        id: i64,
    },
}

fn row_to_field(row: &Row) -> Result<Field> {
    let kind: String = row.get("kind")?;

    Ok(Field {
        id: row.get("id")?,
        form_id: row.get("form_id")?,
        label: row.get("label")?,
        kind: FieldKind::from_code(&kind),
        description: row.get("description")?,
    })
}

fn fetch_field(conn: &Connection, form_id: i64, field_id: i64) -> Result<Option<Field>> {
    let mut stmt = conn.prepare(
        "SELECT id, form_id, label, kind, description
         FROM fields
         WHERE id = ?1 AND form_id = ?2",
    )?;
    let mut rows = stmt.query(params![field_id, form_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_field(row)?)),
        None => Ok(None),
    }
}

fn fetch_fields(conn: &Connection, form_id: i64) -> Result<Vec<Field>> {
    let mut stmt = conn.prepare(
        "SELECT id, form_id, label, kind, description
         FROM fields
         WHERE form_id = ?1
         ORDER BY id ASC",
    )?;

    let mut rows = stmt.query(params![form_id])?;
    let mut fields = Vec::new();
    while let Some(row) = rows.next()? {
        fields.push(row_to_field(row)?);
    }
    Ok(fields)
}

fn normalized_description(description: &Option<String>) -> Option<String> {
    description
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn insert_field(conn: &Connection, form_id: i64, input: &FieldInput) -> Result<i64> {
    conn.execute(
        "INSERT INTO fields (form_id, label, kind, description) VALUES (?1, ?2, ?3, ?4)",
        params![
            form_id,
            input.label.trim(),
            input.kind.as_code(),
            normalized_description(&input.description),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Rewrites label, kind and description. `form_id` is only a filter, never reassigned.
fn rewrite_field(conn: &Connection, form_id: i64, field_id: i64, input: &FieldInput) -> Result<()> {
    let rows_affected = conn.execute(
        "UPDATE fields
         SET label = ?1,
             kind = ?2,
             description = ?3
         WHERE id = ?4 AND form_id = ?5",
        params![
            input.label.trim(),
            input.kind.as_code(),
            normalized_description(&input.description),
            field_id,
            form_id,
        ],
    )?;
    if rows_affected == 0 {
        return Err(AppError::NotFound.into());
    }
    Ok(())
}

fn remove_field(conn: &Connection, form_id: i64, field_id: i64) -> Result<()> {
    let rows_affected = conn.execute(
        "DELETE FROM fields WHERE id = ?1 AND form_id = ?2",
        params![field_id, form_id],
    )?;
    if rows_affected == 0 {
        return Err(AppError::NotFound.into());
    }
    Ok(())
}

impl Database {
    /// Fields of a form in stored order.
    pub async fn list_fields(&self, form_id: i64) -> AppResult<Vec<Field>> {
        let fields = self.execute(move |conn| fetch_fields(conn, form_id)).await?;
        Ok(fields)
    }

    /// Append a field and advance the parent form's last-modified stamp.
    pub async fn add_field(&self, form_id: i64, input: FieldInput) -> AppResult<Field> {
        validation::validate_field_input(&input, "").into_result()?;

        let field = self
            .execute(move |conn| {
                let tx = conn.transaction()?;
                let field_id = insert_field(&tx, form_id, &input)?;
                touch_form(&tx, form_id, Utc::now())?;
                let field = fetch_field(&tx, form_id, field_id)?
                    .ok_or_else(|| anyhow!("Field not found after insert"))?;
                tx.commit()?;
                Ok(field)
            })
            .await?;

        Ok(field)
    }

    pub async fn update_field(
        &self,
        form_id: i64,
        field_id: i64,
        input: FieldInput,
    ) -> AppResult<Field> {
        validation::validate_field_input(&input, "").into_result()?;

        let field = self
            .execute(move |conn| {
                let tx = conn.transaction()?;
                rewrite_field(&tx, form_id, field_id, &input)?;
                touch_form(&tx, form_id, Utc::now())?;
                let field = fetch_field(&tx, form_id, field_id)?
                    .ok_or_else(|| anyhow!("Field not found after update"))?;
                tx.commit()?;
                Ok(field)
            })
            .await?;

        Ok(field)
    }

    pub async fn delete_field(&self, form_id: i64, field_id: i64) -> AppResult<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            remove_field(&tx, form_id, field_id)?;
            touch_form(&tx, form_id, Utc::now())?;
            tx.commit()?;
            Ok(())
        })
        .await?;

        Ok(())
    }

    /// Apply a batch of field changes atomically and return the resulting field list.
    ///
    /// Every entry is validated first; error keys are prefixed with the entry index
    /// (`"2.label"`). Nothing is written unless the whole batch is valid and every
    /// referenced field belongs to `form_id`.
    pub async fn save_fields(
        &self,
        form_id: i64,
        changes: Vec<FieldChange>,
    ) -> AppResult<Vec<Field>> {
        let mut errors = ValidationErrors::new();
        for (index, change) in changes.iter().enumerate() {
            if let FieldChange::Create { input } | FieldChange::Update { input, .. } = change {
                errors.merge(validation::validate_field_input(input, &format!("{index}.")));
            }
        }
        errors.into_result()?;

        let fields = self
            .execute(move |conn| {
                let tx = conn.transaction()?;
                for change in &changes {
                    match change {
                        FieldChange::Create { input } => {
                            insert_field(&tx, form_id, input)?;
                        }
                        FieldChange::Update { id, input } => {
                            rewrite_field(&tx, form_id, *id, input)?;
                        }
                        FieldChange::Delete { id } => {
                            remove_field(&tx, form_id, *id)?;
                        }
                    }
                }
                if !changes.is_empty() {
                    touch_form(&tx, form_id, Utc::now())?;
                }
                let fields = fetch_fields(&tx, form_id)?;
                tx.commit()?;
                Ok(fields)
            })
            .await?;

        Ok(fields)
    }
}
