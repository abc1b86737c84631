//! Identity Manager Core
//!
//! Storage-agnostic types, traits and query building for a hierarchical
//! directory of users and groups.
//!
//! # Architecture
//!
//! - **Domain Types**: `User`, `Group`, `UserGroupBinding` and their ids
//! - **Query Building**: request fields to `Predicate`, `OrderBy` and `Page`
//! - **Hierarchy**: materialized group path arithmetic
//! - **Core Traits**: `IdentityManager`, `PasswordHasher`
//!
//! # Example
//!
//! ```rust
//! use im_core::hierarchy::{compute_depth, compute_path};
//! use im_core::query::{build_predicate, Predicate, USER_GROUPS};
//! use im_core::types::ListGroupsRequest;
//!
//! let path = compute_path("grp-root", "grp-child");
//! assert_eq!(path, "grp-root.grp-child");
//! assert_eq!(compute_depth(&path), 2);
//!
//! let req = ListGroupsRequest {
//!     status: vec!["active".into()],
//!     ..Default::default()
//! };
//! assert_eq!(
//!     build_predicate(&req, &USER_GROUPS, &[]),
//!     Predicate::in_list("status", ["active"]),
//! );
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod hierarchy;
pub mod idgen;
pub mod manager;
pub mod query;
pub mod traits;
pub mod types;

/// Crate version reported by `GetVersion`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export commonly used types
pub use error::{ErrorKind, ImError, Result};
pub use manager::IdentityManager;
pub use traits::PasswordHasher;

pub use types::{
    BindingId, Extra, Group, GroupId, GroupWithUsers, ListResponse, Status, User,
    UserGroupBinding, UserId, UserWithGroups,
};
