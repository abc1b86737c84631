use std::sync::Arc;

use async_trait::async_trait;
use im_core::{error::Result, manager::IdentityManager, types::*, PasswordHasher};
use sqlx::SqlitePool;
use tracing::error;

use crate::{bindings, groups, passwords, users};

/// Identity store backed by `SQLite`
#[derive(Clone)]
pub struct SqliteIdentityStore {
    pool: SqlitePool,
    hasher: Arc<dyn PasswordHasher>,
}

impl SqliteIdentityStore {
    pub fn new(pool: SqlitePool, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { pool, hasher }
    }
}

#[async_trait]
impl IdentityManager for SqliteIdentityStore {
    // Groups
    async fn create_group(&self, req: CreateGroupRequest) -> Result<CreateGroupResponse> {
        let group_id = groups::create(&self.pool, req).await?;
        Ok(CreateGroupResponse { group_id })
    }

    async fn delete_groups(&self, req: DeleteGroupsRequest) -> Result<DeleteGroupsResponse> {
        let group_id = groups::delete(&self.pool, &req.group_id).await?;
        Ok(DeleteGroupsResponse { group_id })
    }

    async fn modify_group(
        &self,
        group_id: &GroupId,
        req: ModifyGroupRequest,
    ) -> Result<ModifyGroupResponse> {
        let group_id = groups::modify(&self.pool, group_id, req).await?;
        Ok(ModifyGroupResponse { group_id })
    }

    async fn get_group(&self, group_id: &GroupId) -> Result<Group> {
        groups::get_required(&self.pool, group_id.as_str()).await
    }

    async fn get_group_with_users(&self, group_id: &GroupId) -> Result<GroupWithUsers> {
        let group = groups::get_required(&self.pool, group_id.as_str()).await?;
        let users = users::for_group(&self.pool, group_id.as_str()).await?;
        Ok(GroupWithUsers { group, users })
    }

    async fn list_groups(&self, req: ListGroupsRequest) -> Result<ListResponse<Group>> {
        groups::list(&self.pool, &req).await
    }

    async fn list_groups_with_users(
        &self,
        req: ListGroupsRequest,
    ) -> Result<ListResponse<GroupWithUsers>> {
        let page = groups::list(&self.pool, &req).await?;
        let mut items = Vec::with_capacity(page.items.len());
        for group in page.items {
            let users = users::for_group(&self.pool, group.group_id.as_str())
                .await
                .inspect_err(|e| error!("Failed to get group [{}] users: {e}", group.group_id))?;
            items.push(GroupWithUsers { group, users });
        }
        Ok(ListResponse {
            total_count: page.total_count,
            items,
        })
    }

    // Users
    async fn create_user(&self, req: CreateUserRequest) -> Result<CreateUserResponse> {
        let user_id = users::create(&self.pool, &self.hasher, req).await?;
        Ok(CreateUserResponse { user_id })
    }

    async fn delete_users(&self, req: DeleteUsersRequest) -> Result<DeleteUsersResponse> {
        let user_id = users::delete(&self.pool, &req.user_id).await?;
        Ok(DeleteUsersResponse { user_id })
    }

    async fn modify_user(
        &self,
        user_id: &UserId,
        req: ModifyUserRequest,
    ) -> Result<ModifyUserResponse> {
        let user_id = users::modify(&self.pool, user_id, req).await?;
        Ok(ModifyUserResponse { user_id })
    }

    async fn get_user(&self, user_id: &UserId) -> Result<User> {
        users::get_required(&self.pool, user_id.as_str()).await
    }

    async fn get_user_with_groups(&self, user_id: &UserId) -> Result<UserWithGroups> {
        let user = users::get_required(&self.pool, user_id.as_str()).await?;
        let groups = groups::for_user(&self.pool, user_id.as_str()).await?;
        Ok(UserWithGroups { user, groups })
    }

    async fn list_users(&self, req: ListUsersRequest) -> Result<ListResponse<User>> {
        users::list(&self.pool, &req).await
    }

    async fn list_users_with_groups(
        &self,
        req: ListUsersRequest,
    ) -> Result<ListResponse<UserWithGroups>> {
        let page = users::list(&self.pool, &req).await?;
        let mut items = Vec::with_capacity(page.items.len());
        for user in page.items {
            let groups = groups::for_user(&self.pool, user.user_id.as_str())
                .await
                .inspect_err(|e| error!("Failed to get user [{}] groups: {e}", user.user_id))?;
            items.push(UserWithGroups { user, groups });
        }
        Ok(ListResponse {
            total_count: page.total_count,
            items,
        })
    }

    // Membership
    async fn join_group(&self, req: MembershipRequest) -> Result<MembershipResponse> {
        let (group_id, user_id) = bindings::join(&self.pool, &req).await?;
        Ok(MembershipResponse { group_id, user_id })
    }

    async fn leave_group(&self, req: MembershipRequest) -> Result<MembershipResponse> {
        let (group_id, user_id) = bindings::leave(&self.pool, &req).await?;
        Ok(MembershipResponse { group_id, user_id })
    }

    // Passwords
    async fn compare_password(&self, user_id: &UserId, password: &str) -> Result<bool> {
        passwords::compare(&self.pool, &self.hasher, user_id, password).await
    }

    async fn modify_password(&self, user_id: &UserId, password: &str) -> Result<UserId> {
        passwords::modify(&self.pool, &self.hasher, user_id, password).await
    }
}
