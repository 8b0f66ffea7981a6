//! Users, credentials and bearer sessions.
//!
//! Argon2 hashing is CPU-bound, so it runs on the blocking pool.

use chrono::{Duration, Utc};
use seatbook_core::directory::{Credentials, LoginId, NewUser, ProfileUpdate, UserDirectory};
use seatbook_core::error::{LedgerError, Result};
use seatbook_core::types::{Identity, Session, User, UserId};
use seatbook_core::BoxFuture;
use uuid::Uuid;

use crate::PostgresStore;
use crate::error::db_error;
use crate::rows::{USER_COLUMNS, UserCredentialRow, UserRow, identity};

/// Runs CPU-bound work off the async workers.
async fn off_thread<T, F>(work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| LedgerError::Database(format!("Password hashing task failed: {e}")))?
}

/// Reports a unique violation on `users` as `message`.
fn taken(message: &'static str, context: &'static str) -> impl Fn(sqlx::Error) -> LedgerError {
    move |e| match db_error(context)(e) {
        LedgerError::AlreadyExists(_) => LedgerError::AlreadyExists(message.to_string()),
        other => other,
    }
}

impl UserDirectory for PostgresStore {
    fn register(&self, user: NewUser) -> BoxFuture<'_, Result<User>> {
        Box::pin(async move {
            user.validate()?;
            let hashing = self.hashing.clone();
            let password = user.password.clone();
            let password_hash = off_thread(move || hashing.hash(&password)).await?;

            let row: UserRow = sqlx::query_as(&format!(
                "INSERT INTO users (id, name, mobile, email, role, password_hash)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 RETURNING {USER_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(&user.name)
            .bind(&user.mobile)
            .bind(&user.email)
            .bind(user.role.as_str())
            .bind(&password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(taken("User already exists", "Failed to create user"))?;

            let created: User = row.try_into()?;
            tracing::info!(user_id = %created.id, role = %created.role, "User registered");
            Ok(created)
        })
    }

    fn authenticate(&self, credentials: Credentials) -> BoxFuture<'_, Result<User>> {
        Box::pin(async move {
            let (column, value) = match &credentials.login {
                LoginId::Email(email) => ("email", email),
                LoginId::Mobile(mobile) => ("mobile", mobile),
            };
            let row: Option<UserCredentialRow> = sqlx::query_as(&format!(
                "SELECT {USER_COLUMNS}, password_hash FROM users WHERE {column} = $1"
            ))
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to look up user"))?;

            let Some(row) = row else {
                tracing::info!(by = column, "Login rejected: unknown user");
                return Err(LedgerError::InvalidCredentials);
            };

            let hashing = self.hashing.clone();
            let password = credentials.password;
            let stored = row.password_hash.clone();
            let matches = off_thread(move || hashing.verify(&password, &stored)).await?;

            let user: User = row.user.try_into()?;
            if !matches {
                tracing::info!(user_id = %user.id, "Login rejected: wrong password");
                return Err(LedgerError::InvalidCredentials);
            }
            Ok(user)
        })
    }

    fn create_session(&self, user_id: UserId, ttl: Duration) -> BoxFuture<'_, Result<Session>> {
        Box::pin(async move {
            let purged = sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to purge expired sessions"))?
                .rows_affected();
            if purged > 0 {
                tracing::debug!(purged, "Expired sessions purged");
            }

            let token = Uuid::new_v4();
            let expires_at = Utc::now() + ttl;
            let created: Option<(Uuid,)> = sqlx::query_as(
                "INSERT INTO sessions (token, user_id, expires_at)
                 SELECT $1, id, $3 FROM users WHERE id = $2
                 RETURNING token",
            )
            .bind(token)
            .bind(user_id.as_uuid())
            .bind(expires_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to create session"))?;

            created.ok_or_else(|| LedgerError::not_found("User", user_id))?;
            Ok(Session {
                token,
                user_id,
                expires_at,
            })
        })
    }

    fn resolve_session(&self, token: Uuid) -> BoxFuture<'_, Result<Option<Identity>>> {
        Box::pin(async move {
            let row: Option<(Uuid, String)> = sqlx::query_as(
                "SELECT u.id, u.role
                 FROM sessions s
                 JOIN users u ON u.id = s.user_id
                 WHERE s.token = $1 AND s.expires_at > now()",
            )
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to resolve session"))?;

            row.map(|(user_id, role)| identity(user_id, &role)).transpose()
        })
    }

    fn get_user(&self, user_id: UserId) -> BoxFuture<'_, Result<User>> {
        Box::pin(async move {
            let row: Option<UserRow> =
                sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                    .bind(user_id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(db_error("Failed to get user"))?;
            row.ok_or_else(|| LedgerError::not_found("User", user_id))?
                .try_into()
        })
    }

    fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> BoxFuture<'_, Result<User>> {
        Box::pin(async move {
            update.validate()?;
            let password_hash = match update.password.clone() {
                Some(password) => {
                    let hashing = self.hashing.clone();
                    Some(off_thread(move || hashing.hash(&password)).await?)
                }
                None => None,
            };

            let row: Option<UserRow> = sqlx::query_as(&format!(
                "UPDATE users
                 SET name = COALESCE($2, name),
                     email = COALESCE($3, email),
                     mobile = COALESCE($4, mobile),
                     password_hash = COALESCE($5, password_hash)
                 WHERE id = $1
                 RETURNING {USER_COLUMNS}"
            ))
            .bind(user_id.as_uuid())
            .bind(&update.name)
            .bind(&update.email)
            .bind(&update.mobile)
            .bind(&password_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(taken(
                "Mobile number or email already in use",
                "Failed to update profile",
            ))?;

            let updated: User = row
                .ok_or_else(|| LedgerError::not_found("User", user_id))?
                .try_into()?;
            tracing::info!(
                user_id = %user_id,
                password_changed = password_hash.is_some(),
                "Profile updated"
            );
            Ok(updated)
        })
    }
}
