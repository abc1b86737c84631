use std::sync::Arc;

use chrono::Utc;
use im_core::query::{
    build_predicate, columns, normalize, normalize_list, OrderBy, Page, Predicate, USERS,
    USER_GROUP_BINDINGS,
};
use im_core::types::{
    CreateUserRequest, ListResponse, ListUsersRequest, ModifyUserRequest, Status, User, UserId,
};
use im_core::{ImError, PasswordHasher, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{error, info, warn};

use crate::executor::{self, is_unique_violation, Changes};
use crate::groups::{self, dedup, parse_extra};
use crate::passwords;

pub(crate) fn from_row(row: &SqliteRow) -> Result<User> {
    let status: String = row.try_get(columns::STATUS)?;
    let extra: String = row.try_get(columns::EXTRA)?;
    Ok(User {
        user_id: row.try_get(columns::USER_ID)?,
        username: row.try_get(columns::USERNAME)?,
        email: row.try_get(columns::EMAIL)?,
        phone_number: row.try_get(columns::PHONE_NUMBER)?,
        description: row.try_get(columns::DESCRIPTION)?,
        password_hash: row.try_get(columns::PASSWORD)?,
        status: Status::parse(&status)
            .ok_or_else(|| ImError::internal(format!("unknown user status [{status}]")))?,
        create_time: row.try_get(columns::CREATE_TIME)?,
        update_time: row.try_get(columns::UPDATE_TIME)?,
        status_time: row.try_get(columns::STATUS_TIME)?,
        extra: parse_extra(&extra)?,
    })
}

/// Map a UNIQUE failure on username/email to a caller error
fn map_write_error(err: sqlx::Error, username: &str) -> ImError {
    if is_unique_violation(&err) {
        let err = ImError::invalid_argument(format!(
            "username [{username}] or its email is already in use"
        ));
        warn!("{err}");
        err
    } else {
        error!("User write failed: {err}");
        err.into()
    }
}

/// Get user by ID
pub async fn get(pool: &SqlitePool, user_id: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(from_row).transpose()
}

/// Get user by ID, failing with `NotFound`
pub async fn get_required(pool: &SqlitePool, user_id: &str) -> Result<User> {
    get(pool, user_id)
        .await?
        .ok_or_else(|| ImError::not_found("User", user_id))
}

/// Create an active user with a hashed password
pub async fn create(
    pool: &SqlitePool,
    hasher: &Arc<dyn PasswordHasher>,
    req: CreateUserRequest,
) -> Result<UserId> {
    let username = normalize(&req.username);
    if username.is_empty() {
        let err = ImError::invalid_argument("empty username");
        warn!("{err}");
        return Err(err);
    }
    if req.password.is_empty() {
        let err = ImError::invalid_argument("empty password");
        warn!("{err}");
        return Err(err);
    }

    let password_hash = passwords::hash(hasher, req.password).await?;

    let mut user = User::new(username, password_hash);
    user.email = normalize(&req.email);
    user.phone_number = normalize(&req.phone_number);
    user.description = req.description;
    user.extra = req.extra;

    sqlx::query(
        r#"
        INSERT INTO users (
            user_id, username, email, phone_number, description, password,
            status, create_time, update_time, status_time, extra
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.user_id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.phone_number)
    .bind(&user.description)
    .bind(&user.password_hash)
    .bind(user.status.as_str())
    .bind(user.create_time)
    .bind(user.update_time)
    .bind(user.status_time)
    .bind(serde_json::to_string(&user.extra)?)
    .execute(pool)
    .await
    .map_err(|e| map_write_error(e, &user.username))?;

    info!(user_id = %user.user_id, "Created user");
    Ok(user.user_id)
}

/// Soft-delete users and drop all of their memberships in one transaction
pub async fn delete(pool: &SqlitePool, user_ids: &[UserId]) -> Result<Vec<UserId>> {
    let ids = dedup(normalize_list(user_ids));
    if ids.is_empty() {
        let err = ImError::invalid_argument("empty user id");
        warn!("{err}");
        return Err(err);
    }

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let unbound = executor::delete(
        &mut *tx,
        &USER_GROUP_BINDINGS,
        &Predicate::in_list(columns::USER_ID, ids.iter().cloned()),
    )
    .await?;

    let changes: Changes = vec![
        (columns::STATUS, Status::Deleted.as_str().into()),
        (columns::STATUS_TIME, now.into()),
        (columns::UPDATE_TIME, now.into()),
    ];
    let affected = executor::update_fields(
        &mut *tx,
        &USERS,
        &changes,
        &Predicate::in_list(columns::USER_ID, ids.iter().cloned())
            .and(Predicate::eq(columns::STATUS, Status::Active.as_str())),
    )
    .await?;

    tx.commit().await?;

    info!(count = affected, bindings = unbound, "Deleted users {ids:?}");
    Ok(ids.into_iter().map(UserId::from).collect())
}

/// Overwrite supplied profile fields; never touches the password
pub async fn modify(pool: &SqlitePool, user_id: &UserId, req: ModifyUserRequest) -> Result<UserId> {
    let user = get_required(pool, user_id.as_str()).await?;

    let mut changes: Changes = Vec::new();
    let username = normalize(&req.username);
    if !username.is_empty() {
        changes.push((columns::USERNAME, username.clone().into()));
    }
    let email = normalize(&req.email);
    if !email.is_empty() {
        changes.push((columns::EMAIL, email.into()));
    }
    let phone_number = normalize(&req.phone_number);
    if !phone_number.is_empty() {
        changes.push((columns::PHONE_NUMBER, phone_number.into()));
    }
    if !req.description.is_empty() {
        changes.push((columns::DESCRIPTION, req.description.into()));
    }
    if !req.extra.is_empty() {
        changes.push((columns::EXTRA, serde_json::to_string(&req.extra)?.into()));
    }
    changes.push((columns::UPDATE_TIME, Utc::now().into()));

    let display_name = if username.is_empty() {
        user.username
    } else {
        username
    };
    executor::update_fields(
        pool,
        &USERS,
        &changes,
        &Predicate::eq(columns::USER_ID, user_id.as_str()),
    )
    .await
    .map_err(|e| map_write_error(e, &display_name))?;

    info!(user_id = %user_id, "Modified user");
    Ok(user_id.clone())
}

/// One page of users plus the unpaged match count
///
/// `root_group_id` widens to every group below the roots and is then
/// intersected with `group_id`; the resulting groups narrow the user set.
/// An empty scope returns an empty page.
pub async fn list(pool: &SqlitePool, req: &ListUsersRequest) -> Result<ListResponse<User>> {
    let order = OrderBy::resolve(&USERS, columns::CREATE_TIME, req.sort_key.as_deref(), req.reverse)?;
    let page = Page::new(req.limit, req.offset);

    let roots = normalize_list(&req.root_group_id);
    let mut group_ids = normalize_list(&req.group_id);

    if !roots.is_empty() {
        let subtree = groups::subtree_ids(pool, &roots).await?;
        group_ids = if group_ids.is_empty() {
            subtree
        } else {
            group_ids
                .into_iter()
                .filter(|id| subtree.contains(id))
                .collect()
        };
        if group_ids.is_empty() {
            return Ok(ListResponse::empty());
        }
    }

    // Members are matched in SQL so large groups never turn into bind lists
    let scope = if group_ids.is_empty() {
        Predicate::True
    } else {
        Predicate::in_select(
            columns::USER_ID,
            &USER_GROUP_BINDINGS,
            columns::USER_ID,
            Predicate::in_list(columns::GROUP_ID, group_ids),
        )
    };

    let predicate = build_predicate(req, &USERS, &[]).and(scope);
    let rows = executor::select(pool, &USERS, &predicate, Some(order), Some(page)).await?;
    let total_count = executor::count(pool, &USERS, &predicate).await?;

    Ok(ListResponse {
        total_count,
        items: rows.iter().map(from_row).collect::<Result<_>>()?,
    })
}

/// Members of a group
pub async fn for_group(pool: &SqlitePool, group_id: &str) -> Result<Vec<User>> {
    let rows = sqlx::query(
        r#"
        SELECT u.*
        FROM users u
        INNER JOIN user_group_bindings b ON b.user_id = u.user_id
        WHERE b.group_id = ?
        ORDER BY b.create_time, b.rowid
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;
    rows.iter().map(from_row).collect()
}
