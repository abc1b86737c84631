use std::sync::Arc;

use chrono::Utc;
use im_core::query::{columns, Predicate, USERS};
use im_core::types::UserId;
use im_core::{ImError, PasswordHasher, Result};
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use crate::executor::{self, Changes};

/// Hash off the async runtime
pub(crate) async fn hash(hasher: &Arc<dyn PasswordHasher>, password: String) -> Result<String> {
    let hasher = Arc::clone(hasher);
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| {
            error!("Password hashing task failed: {e}");
            ImError::internal(format!("password hashing task failed: {e}"))
        })?
}

async fn stored_hash(pool: &SqlitePool, user_id: &str) -> Result<String> {
    sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ImError::not_found("User", user_id))
}

/// Check a plaintext password; a mismatch is `Ok(false)`
pub async fn compare(
    pool: &SqlitePool,
    hasher: &Arc<dyn PasswordHasher>,
    user_id: &UserId,
    password: &str,
) -> Result<bool> {
    let stored = stored_hash(pool, user_id.as_str()).await?;

    let hasher = Arc::clone(hasher);
    let password = password.to_string();
    let ok = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored))
        .await
        .map_err(|e| ImError::internal(format!("password check task failed: {e}")))?;

    if ok {
        debug!(user_id = %user_id, "Password matched");
    } else {
        warn!(user_id = %user_id, "Password mismatch");
    }
    Ok(ok)
}

/// Replace the stored hash
pub async fn modify(
    pool: &SqlitePool,
    hasher: &Arc<dyn PasswordHasher>,
    user_id: &UserId,
    password: &str,
) -> Result<UserId> {
    if password.is_empty() {
        let err = ImError::invalid_argument("empty password");
        warn!("{err}");
        return Err(err);
    }
    // Existence check before paying for the hash
    stored_hash(pool, user_id.as_str()).await?;

    let password_hash = hash(hasher, password.to_string()).await?;
    let changes: Changes = vec![
        (columns::PASSWORD, password_hash.into()),
        (columns::UPDATE_TIME, Utc::now().into()),
    ];
    executor::update_fields(
        pool,
        &USERS,
        &changes,
        &Predicate::eq(columns::USER_ID, user_id.as_str()),
    )
    .await?;

    info!(user_id = %user_id, "Modified password");
    Ok(user_id.clone())
}
