use anyhow::{anyhow, Result};
use chrono::Utc;
use log::info;
use rusqlite::{params, Connection, Row};

use crate::db::{connection::Database, helpers::parse_datetime, models::ShareToken};
use crate::error::AppResult;
use crate::sharing::generate_token;

fn row_to_share_token(row: &Row) -> Result<ShareToken> {
    let created_at: String = row.get("created_at")?;

    Ok(ShareToken {
        id: row.get("id")?,
        form_id: row.get("form_id")?,
        token: row.get("token")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn fetch_share_token(conn: &Connection, form_id: i64) -> Result<Option<ShareToken>> {
    let mut stmt = conn.prepare(
        "SELECT id, form_id, token, created_at FROM share_tokens WHERE form_id = ?1",
    )?;
    let mut rows = stmt.query(params![form_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_share_token(row)?)),
        None => Ok(None),
    }
}

impl Database {
    /// Token for `form_id`, created on first use and returned unchanged afterwards.
    ///
    /// A single `INSERT OR IGNORE` against the unique `form_id` column followed by a read,
    /// so racing first shares converge on whichever row landed first.
    pub async fn get_or_create_share_token(&self, form_id: i64) -> AppResult<ShareToken> {
        let candidate = generate_token();
        let token = self
            .execute(move |conn| {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO share_tokens (form_id, token, created_at)
                     VALUES (?1, ?2, ?3)",
                    params![form_id, candidate, Utc::now().to_rfc3339()],
                )?;
                if inserted > 0 {
                    info!("Issued share token for form {form_id}");
                }

                fetch_share_token(conn, form_id)?
                    .ok_or_else(|| anyhow!("share token missing for form {form_id}"))
            })
            .await?;

        Ok(token)
    }

    pub async fn find_share_token(&self, form_id: i64) -> AppResult<Option<ShareToken>> {
        let token = self
            .execute(move |conn| fetch_share_token(conn, form_id))
            .await?;
        Ok(token)
    }
}
