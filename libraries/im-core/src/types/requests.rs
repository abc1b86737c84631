//! Request and response payloads for identity operations
use serde::{Deserialize, Serialize};

use super::{Extra, GroupId, UserId};
use crate::query::{FieldValue, FilterRequest, SEARCH_WORD};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateGroupRequest {
    /// Empty for a root group
    pub parent_group_id: String,
    pub group_name: String,
    pub description: String,
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGroupResponse {
    pub group_id: GroupId,
}

/// Partial group update; empty fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifyGroupRequest {
    pub parent_group_id: String,
    pub group_name: String,
    pub description: String,
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyGroupResponse {
    pub group_id: GroupId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteGroupsRequest {
    pub group_id: Vec<GroupId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteGroupsResponse {
    pub group_id: Vec<GroupId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub description: String,
    pub password: String,
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user_id: UserId,
}

/// Partial user update; the password is changed through its own operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifyUserRequest {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub description: String,
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyUserResponse {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteUsersRequest {
    pub user_id: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteUsersResponse {
    pub user_id: Vec<UserId>,
}

/// Every listed user joins or leaves every listed group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MembershipRequest {
    pub group_id: Vec<GroupId>,
    pub user_id: Vec<UserId>,
}

pub type MembershipResponse = MembershipRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordRequest {
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparePasswordResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyPasswordResponse {
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListGroupsRequest {
    pub group_id: Vec<String>,
    pub parent_group_id: Vec<String>,
    pub group_path: Vec<String>,
    pub group_name: Vec<String>,
    pub status: Vec<String>,
    pub search_word: Vec<String>,
    pub sort_key: Option<String>,
    pub reverse: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl FilterRequest for ListGroupsRequest {
    fn filter_fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("group_id", FieldValue::List(&self.group_id)),
            ("parent_group_id", FieldValue::List(&self.parent_group_id)),
            ("group_path", FieldValue::List(&self.group_path)),
            ("group_name", FieldValue::List(&self.group_name)),
            ("status", FieldValue::List(&self.status)),
            (SEARCH_WORD, FieldValue::List(&self.search_word)),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListUsersRequest {
    /// Restrict to members of these groups or any of their descendants
    pub root_group_id: Vec<String>,
    /// Restrict to members of these groups
    pub group_id: Vec<String>,
    pub user_id: Vec<String>,
    pub username: Vec<String>,
    pub email: Vec<String>,
    pub phone_number: Vec<String>,
    pub status: Vec<String>,
    pub search_word: Vec<String>,
    pub sort_key: Option<String>,
    pub reverse: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl FilterRequest for ListUsersRequest {
    fn filter_fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
        vec![
            ("root_group_id", FieldValue::List(&self.root_group_id)),
            ("group_id", FieldValue::List(&self.group_id)),
            ("user_id", FieldValue::List(&self.user_id)),
            ("username", FieldValue::List(&self.username)),
            ("email", FieldValue::List(&self.email)),
            ("phone_number", FieldValue::List(&self.phone_number)),
            ("status", FieldValue::List(&self.status)),
            (SEARCH_WORD, FieldValue::List(&self.search_word)),
        ]
    }
}

/// One page of a listing plus the unpaged match count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub total_count: u64,
    pub items: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            items: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{build_predicate, Predicate, USERS, USER_GROUPS};

    #[test]
    fn list_groups_request_deserializes_with_defaults() {
        let req: ListGroupsRequest =
            serde_json::from_str(r#"{"status":["active"],"limit":10}"#).unwrap();
        assert_eq!(req.status, vec!["active"]);
        assert_eq!(req.limit, Some(10));
        assert!(!req.reverse);
        assert!(req.sort_key.is_none());
    }

    #[test]
    fn list_groups_fields_map_to_group_columns() {
        let req = ListGroupsRequest {
            parent_group_id: vec!["grp-root".into()],
            ..Default::default()
        };
        assert_eq!(
            build_predicate(&req, &USER_GROUPS, &[]),
            Predicate::in_list("parent_group_id", ["grp-root"])
        );
    }

    #[test]
    fn group_scopes_are_not_user_columns() {
        let req = ListUsersRequest {
            root_group_id: vec!["grp-a".into()],
            group_id: vec!["grp-b".into()],
            ..Default::default()
        };
        assert_eq!(build_predicate(&req, &USERS, &[]), Predicate::True);
    }

    #[test]
    fn every_declared_field_is_known_to_its_table() {
        let groups = ListGroupsRequest::default();
        for (name, _) in groups.filter_fields() {
            assert!(name == SEARCH_WORD || USER_GROUPS.is_indexed(name), "{name}");
        }
        let users = ListUsersRequest::default();
        for (name, _) in users.filter_fields() {
            let scope = name == "root_group_id" || name == "group_id";
            assert!(scope || name == SEARCH_WORD || USERS.is_indexed(name), "{name}");
        }
    }
}
