//! Filter, sort and pagination building for listing requests

mod filter;
mod normalize;
mod order;
mod page;
mod predicate;
pub mod table;

pub use filter::{build_predicate, FieldValue, FilterRequest, SEARCH_WORD};
pub use normalize::{normalize, normalize_list};
pub use order::{Direction, OrderBy};
pub use page::{Page, MAX_LIMIT};
pub use predicate::{escape_like, Predicate};
pub use table::{columns, TableSpec, USERS, USER_GROUPS, USER_GROUP_BINDINGS};
