/// Membership binding between a user and a group
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BindingId, GroupId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroupBinding {
    pub id: BindingId,
    pub group_id: GroupId,
    pub user_id: UserId,
    pub create_time: DateTime<Utc>,
}

impl UserGroupBinding {
    /// Create a new binding with a fresh id
    pub fn new(group_id: GroupId, user_id: UserId) -> Self {
        Self {
            id: BindingId::generate(),
            group_id,
            user_id,
            create_time: Utc::now(),
        }
    }
}
