//! Static column whitelists per table
//!
//! Only columns named here ever reach generated SQL as identifiers.

pub mod columns {
    pub const USER_ID: &str = "user_id";
    pub const USERNAME: &str = "username";
    pub const EMAIL: &str = "email";
    pub const PHONE_NUMBER: &str = "phone_number";
    pub const PASSWORD: &str = "password";
    pub const GROUP_ID: &str = "group_id";
    pub const PARENT_GROUP_ID: &str = "parent_group_id";
    pub const GROUP_PATH: &str = "group_path";
    pub const GROUP_PATH_LEVEL: &str = "group_path_level";
    pub const GROUP_NAME: &str = "group_name";
    pub const DESCRIPTION: &str = "description";
    pub const STATUS: &str = "status";
    pub const CREATE_TIME: &str = "create_time";
    pub const UPDATE_TIME: &str = "update_time";
    pub const STATUS_TIME: &str = "status_time";
    pub const EXTRA: &str = "extra";
    pub const ID: &str = "id";
}

use columns::*;

/// Column roles for one table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    /// Columns filtered by exact `IN` match
    pub indexed: &'static [&'static str],
    /// Columns probed by `search_word`
    pub searchable: &'static [&'static str],
    /// Columns accepted as `sort_key`
    pub sortable: &'static [&'static str],
}

impl TableSpec {
    pub fn is_indexed(&self, column: &str) -> bool {
        self.indexed.contains(&column)
    }

    /// Look up a sortable column, ignoring ASCII case
    pub fn sortable_column(&self, key: &str) -> Option<&'static str> {
        self.sortable
            .iter()
            .copied()
            .find(|c| c.eq_ignore_ascii_case(key))
    }
}

pub const USERS: TableSpec = TableSpec {
    name: "users",
    indexed: &[USER_ID, USERNAME, EMAIL, PHONE_NUMBER, STATUS],
    searchable: &[USER_ID, USERNAME, EMAIL, PHONE_NUMBER, STATUS],
    sortable: &[
        USER_ID,
        USERNAME,
        EMAIL,
        PHONE_NUMBER,
        DESCRIPTION,
        STATUS,
        CREATE_TIME,
        UPDATE_TIME,
        STATUS_TIME,
    ],
};

pub const USER_GROUPS: TableSpec = TableSpec {
    name: "user_groups",
    indexed: &[GROUP_ID, PARENT_GROUP_ID, GROUP_PATH, GROUP_NAME, STATUS],
    searchable: &[GROUP_ID, GROUP_NAME, GROUP_PATH, STATUS],
    sortable: &[
        PARENT_GROUP_ID,
        GROUP_ID,
        GROUP_PATH,
        GROUP_NAME,
        DESCRIPTION,
        STATUS,
        CREATE_TIME,
        UPDATE_TIME,
        STATUS_TIME,
    ],
};

pub const USER_GROUP_BINDINGS: TableSpec = TableSpec {
    name: "user_group_bindings",
    indexed: &[ID, GROUP_ID, USER_ID],
    searchable: &[],
    sortable: &[CREATE_TIME],
};
