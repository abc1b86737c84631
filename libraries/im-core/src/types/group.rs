/// Group domain types
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Extra, GroupId, Status, User};
use crate::hierarchy;

/// A node of the group tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub group_id: GroupId,

    /// Empty for root groups
    pub parent_group_id: String,

    /// Dot separated ancestor ids ending in `group_id`
    pub group_path: String,

    /// Number of segments in `group_path`
    pub group_path_level: i64,

    pub group_name: String,
    pub description: String,
    pub status: Status,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub status_time: DateTime<Utc>,

    #[serde(default)]
    pub extra: Extra,
}

impl Group {
    /// Create an active group placed under a parent whose path is `parent_path`
    ///
    /// `parent_path` is empty for root groups.
    pub fn new(
        parent_group_id: impl Into<String>,
        parent_path: &str,
        group_name: impl Into<String>,
    ) -> Self {
        let group_id = GroupId::generate();
        let group_path = hierarchy::compute_path(parent_path, group_id.as_str());
        let now = Utc::now();
        Self {
            group_path_level: hierarchy::compute_depth(&group_path),
            group_id,
            parent_group_id: parent_group_id.into(),
            group_path,
            group_name: group_name.into(),
            description: String::new(),
            status: Status::Active,
            create_time: now,
            update_time: now,
            status_time: now,
            extra: Extra::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_group_id.is_empty()
    }
}

/// A group together with its member users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupWithUsers {
    pub group: Group,
    pub users: Vec<User>,
}
