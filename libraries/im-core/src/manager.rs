//! Identity manager trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    CreateGroupRequest, CreateGroupResponse, CreateUserRequest, CreateUserResponse,
    DeleteGroupsRequest, DeleteGroupsResponse, DeleteUsersRequest, DeleteUsersResponse, Group,
    GroupId, GroupWithUsers, ListGroupsRequest, ListResponse, ListUsersRequest, MembershipRequest,
    MembershipResponse, ModifyGroupRequest, ModifyGroupResponse, ModifyUserRequest,
    ModifyUserResponse, User, UserId, UserWithGroups,
};

/// All operations on the user/group directory
///
/// Implementations are the sole mutators of stored state and keep the
/// group path invariants intact across every operation.
#[async_trait]
pub trait IdentityManager: Send + Sync {
    // ========================================================================
    // Groups
    // ========================================================================

    /// Create a group under an optional parent
    async fn create_group(&self, req: CreateGroupRequest) -> Result<CreateGroupResponse>;

    /// Soft-delete groups that have no active sub-groups and no members
    async fn delete_groups(&self, req: DeleteGroupsRequest) -> Result<DeleteGroupsResponse>;

    /// Overwrite supplied fields, moving the subtree if the parent changes
    async fn modify_group(
        &self,
        group_id: &GroupId,
        req: ModifyGroupRequest,
    ) -> Result<ModifyGroupResponse>;

    async fn get_group(&self, group_id: &GroupId) -> Result<Group>;

    async fn get_group_with_users(&self, group_id: &GroupId) -> Result<GroupWithUsers>;

    async fn list_groups(&self, req: ListGroupsRequest) -> Result<ListResponse<Group>>;

    async fn list_groups_with_users(
        &self,
        req: ListGroupsRequest,
    ) -> Result<ListResponse<GroupWithUsers>>;

    // ========================================================================
    // Users
    // ========================================================================

    async fn create_user(&self, req: CreateUserRequest) -> Result<CreateUserResponse>;

    /// Soft-delete users and drop all of their memberships
    async fn delete_users(&self, req: DeleteUsersRequest) -> Result<DeleteUsersResponse>;

    async fn modify_user(
        &self,
        user_id: &UserId,
        req: ModifyUserRequest,
    ) -> Result<ModifyUserResponse>;

    async fn get_user(&self, user_id: &UserId) -> Result<User>;

    async fn get_user_with_groups(&self, user_id: &UserId) -> Result<UserWithGroups>;

    async fn list_users(&self, req: ListUsersRequest) -> Result<ListResponse<User>>;

    async fn list_users_with_groups(
        &self,
        req: ListUsersRequest,
    ) -> Result<ListResponse<UserWithGroups>>;

    // ========================================================================
    // Membership
    // ========================================================================

    /// Bind every user to every group, all or nothing
    async fn join_group(&self, req: MembershipRequest) -> Result<MembershipResponse>;

    /// Remove every user/group binding, which must all exist
    async fn leave_group(&self, req: MembershipRequest) -> Result<MembershipResponse>;

    // ========================================================================
    // Passwords
    // ========================================================================

    /// Check a plaintext password; a mismatch is `Ok(false)`
    async fn compare_password(&self, user_id: &UserId, password: &str) -> Result<bool>;

    async fn modify_password(&self, user_id: &UserId, password: &str) -> Result<UserId>;

    /// Version of the running implementation
    fn version(&self) -> &'static str {
        crate::VERSION
    }
}
