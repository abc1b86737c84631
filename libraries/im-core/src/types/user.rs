/// User domain types
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Group, Status, UserId};

/// Free-form string attributes carried by users and groups
pub type Extra = BTreeMap<String, String>;

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub description: String,

    /// Password hash, never sent over the wire
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    pub status: Status,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub status_time: DateTime<Utc>,

    #[serde(default)]
    pub extra: Extra,
}

impl User {
    /// Create a new active user with a fresh id
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::generate(),
            username: username.into(),
            email: String::new(),
            phone_number: String::new(),
            description: String::new(),
            password_hash: password_hash.into(),
            status: Status::Active,
            create_time: now,
            update_time: now,
            status_time: now,
            extra: Extra::new(),
        }
    }
}

/// A user together with the groups it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWithGroups {
    pub user: User,
    pub groups: Vec<Group>,
}
