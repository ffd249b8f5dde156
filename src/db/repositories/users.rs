use anyhow::Result;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database,
    helpers::{is_unique_violation, parse_datetime},
    models::{user::validation, Identity, User},
};
use crate::error::{AppError, AppResult, ValidationErrors};

fn row_to_user(row: &Row) -> Result<User> {
    let created_at: String = row.get("created_at")?;

    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    /// Record a form owner. Usernames are unique.
    pub async fn register_user(&self, username: String, email: String) -> AppResult<User> {
        let username = username.trim().to_string();
        let email = email.trim().to_string();

        let mut errors = ValidationErrors::new();
        validation::validate_username(&username, &mut errors);
        validation::validate_email("email", &email, &mut errors);
        errors.into_result()?;

        let user = self
            .execute(move |conn| {
                let now = Utc::now();
                let inserted = conn.execute(
                    "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
                    params![username, email, now.to_rfc3339()],
                );
                match inserted {
                    Ok(_) => {}
                    Err(err) if is_unique_violation(&err) => {
                        return Err(AppError::validation(
                            "username",
                            "A user with that username already exists.",
                        )
                        .into());
                    }
                    Err(err) => return Err(err.into()),
                }

                Ok(User {
                    id: conn.last_insert_rowid(),
                    username,
                    email,
                    created_at: now,
                })
            })
            .await?;

        Ok(user)
    }

    pub async fn find_user(&self, username: &str) -> AppResult<User> {
        let username = username.to_string();
        let user = self
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, username, email, created_at FROM users WHERE username = ?1",
                )?;
                let mut rows = stmt.query(params![username])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row_to_user(row)?)),
                    None => Ok(None),
                }
            })
            .await?;

        user.ok_or(AppError::NotFound)
    }

    /// Owner lookup for notifications, where only the form's `owner_id` is at hand.
    pub async fn find_user_by_id(&self, user_id: i64) -> AppResult<User> {
        let user = self
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, username, email, created_at FROM users WHERE id = ?1",
                )?;
                let user = stmt
                    .query_row(params![user_id], |row| Ok(row_to_user(row)))
                    .optional()?;
                user.transpose()
            })
            .await?;

        user.ok_or(AppError::NotFound)
    }

    /// Resolve an already-authenticated username into the identity commands act for.
    pub async fn identify(&self, username: &str) -> AppResult<Identity> {
        let user = self.find_user(username).await?;
        Ok(Identity::from(&user))
    }
}
