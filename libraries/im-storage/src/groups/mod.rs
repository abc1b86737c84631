use chrono::Utc;
use im_core::hierarchy::{compute_depth, compute_path, rebase_path, resolve_ancestor_ids};
use im_core::query::{
    build_predicate, columns, normalize, normalize_list, OrderBy, Page, Predicate, USER_GROUPS,
    USER_GROUP_BINDINGS,
};
use im_core::types::{
    CreateGroupRequest, Extra, Group, GroupId, ListGroupsRequest, ListResponse, ModifyGroupRequest,
    Status,
};
use im_core::{ImError, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

use crate::executor::{self, Changes};

pub(crate) fn from_row(row: &SqliteRow) -> Result<Group> {
    let status: String = row.try_get(columns::STATUS)?;
    let extra: String = row.try_get(columns::EXTRA)?;
    Ok(Group {
        group_id: row.try_get(columns::GROUP_ID)?,
        parent_group_id: row.try_get(columns::PARENT_GROUP_ID)?,
        group_path: row.try_get(columns::GROUP_PATH)?,
        group_path_level: row.try_get(columns::GROUP_PATH_LEVEL)?,
        group_name: row.try_get(columns::GROUP_NAME)?,
        description: row.try_get(columns::DESCRIPTION)?,
        status: Status::parse(&status)
            .ok_or_else(|| ImError::internal(format!("unknown group status [{status}]")))?,
        create_time: row.try_get(columns::CREATE_TIME)?,
        update_time: row.try_get(columns::UPDATE_TIME)?,
        status_time: row.try_get(columns::STATUS_TIME)?,
        extra: parse_extra(&extra)?,
    })
}

pub(crate) fn parse_extra(raw: &str) -> Result<Extra> {
    if raw.trim().is_empty() {
        return Ok(Extra::new());
    }
    Ok(serde_json::from_str(raw)?)
}

/// Get group by ID
pub async fn get(pool: &SqlitePool, group_id: &str) -> Result<Option<Group>> {
    let row = sqlx::query("SELECT * FROM user_groups WHERE group_id = ?")
        .bind(group_id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(from_row).transpose()
}

/// Get group by ID, failing with `NotFound`
pub async fn get_required(pool: &SqlitePool, group_id: &str) -> Result<Group> {
    get(pool, group_id)
        .await?
        .ok_or_else(|| ImError::not_found("Group", group_id))
}

/// Path of the would-be parent, empty for no parent
async fn parent_path(pool: &SqlitePool, parent_group_id: &str) -> Result<String> {
    if parent_group_id.is_empty() {
        return Ok(String::new());
    }
    match get(pool, parent_group_id).await? {
        Some(parent) => Ok(parent.group_path),
        None => {
            let err =
                ImError::invalid_argument(format!("parent group [{parent_group_id}] not found"));
            warn!("{err}");
            Err(err)
        }
    }
}

/// Every ancestor segment of `path` must name an active group
async fn check_ancestors(pool: &SqlitePool, path: &str, self_id: &str) -> Result<()> {
    let ancestors = resolve_ancestor_ids(path, self_id);
    if ancestors.is_empty() {
        return Ok(());
    }
    let expected = ancestors.len() as u64;
    let predicate = Predicate::in_list(columns::GROUP_ID, ancestors)
        .and(Predicate::eq(columns::STATUS, Status::Active.as_str()));
    let found = executor::count(pool, &USER_GROUPS, &predicate).await?;
    if found != expected {
        let err = ImError::invalid_argument(format!(
            "some ancestor groups in path [{path}] do not exist or are deleted"
        ));
        warn!("{err}");
        return Err(err);
    }
    Ok(())
}

async fn insert(pool: &SqlitePool, group: &Group) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO user_groups (
            group_id, parent_group_id, group_path, group_path_level, group_name,
            description, status, create_time, update_time, status_time, extra
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&group.group_id)
    .bind(&group.parent_group_id)
    .bind(&group.group_path)
    .bind(group.group_path_level)
    .bind(&group.group_name)
    .bind(&group.description)
    .bind(group.status.as_str())
    .bind(group.create_time)
    .bind(group.update_time)
    .bind(group.status_time)
    .bind(serde_json::to_string(&group.extra)?)
    .execute(pool)
    .await?;
    Ok(())
}

/// Create a group under an optional parent
pub async fn create(pool: &SqlitePool, req: CreateGroupRequest) -> Result<GroupId> {
    let parent_group_id = normalize(&req.parent_group_id);
    let parent_path = parent_path(pool, &parent_group_id).await?;

    let mut group = Group::new(parent_group_id, &parent_path, normalize(&req.group_name));
    group.description = req.description;
    group.extra = req.extra;

    check_ancestors(pool, &group.group_path, group.group_id.as_str()).await?;

    insert(pool, &group).await?;

    info!(group_id = %group.group_id, path = %group.group_path, "Created group");
    Ok(group.group_id)
}

/// Active groups below any of `group_ids`, excluding the listed ids
pub async fn active_descendant_ids(pool: &SqlitePool, group_ids: &[String]) -> Result<Vec<String>> {
    let below = Predicate::any(
        group_ids
            .iter()
            .map(|id| Predicate::path_segment(columns::GROUP_PATH, id.as_str())),
    );
    let predicate = below
        .and(Predicate::not_in(columns::GROUP_ID, group_ids.iter().cloned()))
        .and(Predicate::eq(columns::STATUS, Status::Active.as_str()));
    Ok(executor::select_column(pool, &USER_GROUPS, columns::GROUP_ID, &predicate).await?)
}

/// `group_ids` plus every group whose path runs through one of them
pub async fn subtree_ids(pool: &SqlitePool, group_ids: &[String]) -> Result<Vec<String>> {
    let below = Predicate::any(
        group_ids
            .iter()
            .map(|id| Predicate::path_segment(columns::GROUP_PATH, id.as_str())),
    );
    let mut ids = executor::select_column(pool, &USER_GROUPS, columns::GROUP_ID, &below).await?;
    for id in group_ids {
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }
    Ok(ids)
}

/// Soft-delete groups with no active sub-groups and no members
pub async fn delete(pool: &SqlitePool, group_ids: &[GroupId]) -> Result<Vec<GroupId>> {
    let ids = dedup(normalize_list(group_ids));
    if ids.is_empty() {
        let err = ImError::invalid_argument("empty group id");
        warn!("{err}");
        return Err(err);
    }

    let sub_groups = active_descendant_ids(pool, &ids).await?;
    if !sub_groups.is_empty() {
        let err = ImError::permission_denied(format!("still has sub groups: {sub_groups:?}"));
        warn!("{err}");
        return Err(err);
    }

    let members = executor::count(
        pool,
        &USER_GROUP_BINDINGS,
        &Predicate::in_list(columns::GROUP_ID, ids.iter().cloned()),
    )
    .await?;
    if members > 0 {
        let err = ImError::permission_denied(format!("groups {ids:?} still have users"));
        warn!("{err}");
        return Err(err);
    }

    let now = Utc::now();
    let changes: Changes = vec![
        (columns::STATUS, Status::Deleted.as_str().into()),
        (columns::STATUS_TIME, now.into()),
        (columns::UPDATE_TIME, now.into()),
    ];
    let predicate = Predicate::in_list(columns::GROUP_ID, ids.iter().cloned())
        .and(Predicate::eq(columns::STATUS, Status::Active.as_str()));
    let affected = executor::update_fields(pool, &USER_GROUPS, &changes, &predicate).await?;

    info!(count = affected, "Deleted groups {ids:?}");
    Ok(ids.into_iter().map(GroupId::from).collect())
}

/// Overwrite supplied fields; a parent change moves the whole subtree
pub async fn modify(
    pool: &SqlitePool,
    group_id: &GroupId,
    req: ModifyGroupRequest,
) -> Result<GroupId> {
    let group = get_required(pool, group_id.as_str()).await?;
    let now = Utc::now();
    let mut changes: Changes = Vec::new();
    let mut moved: Option<(String, String)> = None;

    let parent_group_id = normalize(&req.parent_group_id);
    if !parent_group_id.is_empty() && parent_group_id != group.parent_group_id {
        let new_parent_path = parent_path(pool, &parent_group_id).await?;
        if im_core::hierarchy::is_descendant(&new_parent_path, group_id.as_str()) {
            let err = ImError::invalid_argument(format!(
                "cannot move group [{group_id}] under itself or its descendant [{parent_group_id}]"
            ));
            warn!("{err}");
            return Err(err);
        }
        let new_path = compute_path(&new_parent_path, group_id.as_str());
        check_ancestors(pool, &new_path, group_id.as_str()).await?;

        changes.push((columns::PARENT_GROUP_ID, parent_group_id.into()));
        changes.push((columns::GROUP_PATH, new_path.clone().into()));
        changes.push((columns::GROUP_PATH_LEVEL, compute_depth(&new_path).into()));
        moved = Some((group.group_path.clone(), new_path));
    }

    let group_name = normalize(&req.group_name);
    if !group_name.is_empty() {
        changes.push((columns::GROUP_NAME, group_name.into()));
    }
    if !req.description.is_empty() {
        changes.push((columns::DESCRIPTION, req.description.into()));
    }
    if !req.extra.is_empty() {
        changes.push((columns::EXTRA, serde_json::to_string(&req.extra)?.into()));
    }
    changes.push((columns::UPDATE_TIME, now.into()));

    let mut tx = pool.begin().await?;

    executor::update_fields(
        &mut *tx,
        &USER_GROUPS,
        &changes,
        &Predicate::eq(columns::GROUP_ID, group_id.as_str()),
    )
    .await?;

    if let Some((old_path, new_path)) = moved {
        let descendants = executor::select(
            &mut *tx,
            &USER_GROUPS,
            &Predicate::path_segment(columns::GROUP_PATH, group_id.as_str())
                .and(Predicate::not_in(columns::GROUP_ID, [group_id.as_str()])),
            None,
            None,
        )
        .await?;

        for row in &descendants {
            let child = from_row(row)?;
            let Some(child_path) = rebase_path(&child.group_path, &old_path, &new_path) else {
                continue;
            };
            let child_changes: Changes = vec![
                (columns::GROUP_PATH_LEVEL, compute_depth(&child_path).into()),
                (columns::GROUP_PATH, child_path.into()),
                (columns::UPDATE_TIME, now.into()),
            ];
            executor::update_fields(
                &mut *tx,
                &USER_GROUPS,
                &child_changes,
                &Predicate::eq(columns::GROUP_ID, child.group_id.as_str()),
            )
            .await?;
        }
        debug!(
            group_id = %group_id,
            descendants = descendants.len(),
            "Rebased group subtree from {old_path} to {new_path}"
        );
    }

    tx.commit().await?;

    info!(group_id = %group_id, "Modified group");
    Ok(group_id.clone())
}

/// One page of groups plus the unpaged match count
pub async fn list(pool: &SqlitePool, req: &ListGroupsRequest) -> Result<ListResponse<Group>> {
    let order = OrderBy::resolve(
        &USER_GROUPS,
        columns::CREATE_TIME,
        req.sort_key.as_deref(),
        req.reverse,
    )?;
    let page = Page::new(req.limit, req.offset);
    let predicate = build_predicate(req, &USER_GROUPS, &[]);

    let rows = executor::select(pool, &USER_GROUPS, &predicate, Some(order), Some(page)).await?;
    let total_count = executor::count(pool, &USER_GROUPS, &predicate).await?;

    Ok(ListResponse {
        total_count,
        items: rows.iter().map(from_row).collect::<Result<_>>()?,
    })
}

/// Groups a user belongs to
pub async fn for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Group>> {
    let rows = sqlx::query(
        r#"
        SELECT g.*
        FROM user_groups g
        INNER JOIN user_group_bindings b ON b.group_id = g.group_id
        WHERE b.user_id = ?
        ORDER BY b.create_time, b.rowid
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    rows.iter().map(from_row).collect()
}

pub(crate) fn dedup(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}
