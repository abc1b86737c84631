//! Result ordering

use super::table::TableSpec;
use crate::error::{ImError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Validated sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: Direction,
}

impl OrderBy {
    /// Resolve the ordering for a listing request
    ///
    /// `sort_key` overrides `default_column` when it names a sortable column
    /// of `table` (ASCII case-insensitive). Descending unless `reverse`.
    pub fn resolve(
        table: &TableSpec,
        default_column: &'static str,
        sort_key: Option<&str>,
        reverse: bool,
    ) -> Result<Self> {
        let column = match sort_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => table.sortable_column(key).ok_or_else(|| {
                ImError::invalid_argument(format!(
                    "sort key [{key}] is not sortable on {}",
                    table.name
                ))
            })?,
            None => default_column,
        };
        let direction = if reverse {
            Direction::Asc
        } else {
            Direction::Desc
        };
        Ok(Self { column, direction })
    }
}
