mod binding;
mod group;
mod ids;
mod requests;
mod status;
mod user;

pub use binding::UserGroupBinding;
pub use group::{Group, GroupWithUsers};
pub use ids::{BindingId, GroupId, UserId, BINDING_ID_PREFIX, GROUP_ID_PREFIX, USER_ID_PREFIX};
pub use requests::{
    ComparePasswordResponse, CreateGroupRequest, CreateGroupResponse, CreateUserRequest,
    CreateUserResponse, DeleteGroupsRequest, DeleteGroupsResponse, DeleteUsersRequest,
    DeleteUsersResponse, ListGroupsRequest, ListResponse, ListUsersRequest, MembershipRequest,
    MembershipResponse, ModifyGroupRequest, ModifyGroupResponse, ModifyPasswordResponse,
    ModifyUserRequest, ModifyUserResponse, PasswordRequest,
};
pub use status::Status;
pub use user::{Extra, User, UserWithGroups};
