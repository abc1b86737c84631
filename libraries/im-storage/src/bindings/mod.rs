use im_core::query::{
    columns, normalize_list, Predicate, TableSpec, USERS, USER_GROUPS, USER_GROUP_BINDINGS,
};
use im_core::types::{GroupId, MembershipRequest, Status, UserGroupBinding, UserId};
use im_core::{ImError, Result};
use sqlx::{Row, SqlitePool};
use tracing::{error, info, warn};

use crate::executor::{self, is_unique_violation};
use crate::groups::dedup;

/// Normalized, de-duplicated id lists; both must be non-empty
fn membership_ids(req: &MembershipRequest) -> Result<(Vec<String>, Vec<String>)> {
    let group_ids = dedup(normalize_list(&req.group_id));
    let user_ids = dedup(normalize_list(&req.user_id));
    if group_ids.is_empty() || user_ids.is_empty() {
        let err = ImError::invalid_argument("empty user id or group id");
        warn!("{err}");
        return Err(err);
    }
    Ok((group_ids, user_ids))
}

fn pair_predicate(group_ids: &[String], user_ids: &[String]) -> Predicate {
    Predicate::in_list(columns::GROUP_ID, group_ids.iter().cloned())
        .and(Predicate::in_list(columns::USER_ID, user_ids.iter().cloned()))
}

/// `(group_id, user_id)` pairs that are already bound
async fn bound_pairs(pool: &SqlitePool, predicate: &Predicate) -> Result<Vec<(String, String)>> {
    let rows = executor::select(pool, &USER_GROUP_BINDINGS, predicate, None, None).await?;
    rows.iter()
        .map(|row| -> Result<(String, String)> {
            Ok((row.try_get(columns::GROUP_ID)?, row.try_get(columns::USER_ID)?))
        })
        .collect()
}

fn describe_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(group_id, user_id)| format!("user [{user_id}] in group [{group_id}]"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every id must name an active row of `table`
async fn require_active(
    pool: &SqlitePool,
    table: &TableSpec,
    column: &'static str,
    ids: &[String],
) -> Result<()> {
    let predicate = Predicate::in_list(column, ids.iter().cloned())
        .and(Predicate::eq(columns::STATUS, Status::Active.as_str()));
    let found = executor::count(pool, table, &predicate).await?;
    if found != ids.len() as u64 {
        let err = ImError::invalid_argument(format!(
            "some of {ids:?} do not exist or are deleted in {}",
            table.name
        ));
        warn!("{err}");
        return Err(err);
    }
    Ok(())
}

/// Bind every user to every group in one transaction
pub async fn join(pool: &SqlitePool, req: &MembershipRequest) -> Result<(Vec<GroupId>, Vec<UserId>)> {
    let (group_ids, user_ids) = membership_ids(req)?;

    require_active(pool, &USER_GROUPS, columns::GROUP_ID, &group_ids).await?;
    require_active(pool, &USERS, columns::USER_ID, &user_ids).await?;

    let existing = bound_pairs(pool, &pair_predicate(&group_ids, &user_ids)).await?;
    if !existing.is_empty() {
        let err = ImError::permission_denied(format!(
            "already joined: {}",
            describe_pairs(&existing)
        ));
        warn!("{err}");
        return Err(err);
    }

    let mut tx = pool.begin().await?;
    for group_id in &group_ids {
        for user_id in &user_ids {
            let binding =
                UserGroupBinding::new(GroupId::new(group_id.as_str()), UserId::new(user_id.as_str()));
            sqlx::query(
                "INSERT INTO user_group_bindings (id, group_id, user_id, create_time) VALUES (?, ?, ?, ?)",
            )
            .bind(&binding.id)
            .bind(&binding.group_id)
            .bind(&binding.user_id)
            .bind(binding.create_time)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    let err = ImError::permission_denied(format!(
                        "user [{user_id}] already in group [{group_id}]"
                    ));
                    warn!("{err}");
                    err
                } else {
                    error!("Insert binding failed: {e}");
                    ImError::from(e)
                }
            })?;
        }
    }
    tx.commit().await?;

    info!(
        groups = group_ids.len(),
        users = user_ids.len(),
        "Joined users {user_ids:?} to groups {group_ids:?}"
    );
    Ok(into_typed(group_ids, user_ids))
}

/// Remove every user/group binding, all of which must exist
pub async fn leave(pool: &SqlitePool, req: &MembershipRequest) -> Result<(Vec<GroupId>, Vec<UserId>)> {
    let (group_ids, user_ids) = membership_ids(req)?;
    let predicate = pair_predicate(&group_ids, &user_ids);

    let existing = bound_pairs(pool, &predicate).await?;
    if existing.len() != group_ids.len() * user_ids.len() {
        let missing: Vec<(String, String)> = group_ids
            .iter()
            .flat_map(|g| user_ids.iter().map(move |u| (g.clone(), u.clone())))
            .filter(|pair| !existing.contains(pair))
            .collect();
        let err = ImError::permission_denied(format!(
            "not joined: {}",
            describe_pairs(&missing)
        ));
        warn!("{err}");
        return Err(err);
    }

    let removed = executor::delete(pool, &USER_GROUP_BINDINGS, &predicate).await?;

    info!(removed, "Removed users {user_ids:?} from groups {group_ids:?}");
    Ok(into_typed(group_ids, user_ids))
}

fn into_typed(group_ids: Vec<String>, user_ids: Vec<String>) -> (Vec<GroupId>, Vec<UserId>) {
    (
        group_ids.into_iter().map(GroupId::from).collect(),
        user_ids.into_iter().map(UserId::from).collect(),
    )
}
