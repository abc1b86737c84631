//! Relational executor
//!
//! Renders [`Predicate`] values into `SQLite` SQL and runs the generic
//! select/count/update/delete statements the operation slices share.
//! Identifiers only ever come from the static table whitelists; every
//! value is a bind parameter.

use chrono::{DateTime, Utc};
use im_core::query::{OrderBy, Page, Predicate, TableSpec};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, QueryBuilder, Sqlite};

/// A bindable column value for updates
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Time(DateTime<Utc>),
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Time(v)
    }
}

/// Column assignments for an `UPDATE`
pub type Changes = Vec<(&'static str, SqlValue)>;

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &SqlValue) {
    match value {
        SqlValue::Text(v) => qb.push_bind(v.clone()),
        SqlValue::Int(v) => qb.push_bind(*v),
        SqlValue::Time(v) => qb.push_bind(*v),
    };
}

fn push_list(qb: &mut QueryBuilder<'_, Sqlite>, values: &[String]) {
    qb.push("(");
    let mut separated = qb.separated(", ");
    for v in values {
        separated.push_bind(v.clone());
    }
    separated.push_unseparated(")");
}

/// Append the SQL form of `predicate`
pub fn push_predicate(qb: &mut QueryBuilder<'_, Sqlite>, predicate: &Predicate) {
    match predicate {
        Predicate::True => {
            qb.push("1 = 1");
        }
        Predicate::False => {
            qb.push("1 = 0");
        }
        Predicate::In { column, values } => {
            if values.is_empty() {
                qb.push("1 = 0");
            } else {
                qb.push(*column).push(" IN ");
                push_list(qb, values);
            }
        }
        Predicate::NotIn { column, values } => {
            if values.is_empty() {
                qb.push("1 = 1");
            } else {
                qb.push(*column).push(" NOT IN ");
                push_list(qb, values);
            }
        }
        Predicate::Eq { column, value } => {
            qb.push(*column).push(" = ").push_bind(value.clone());
        }
        Predicate::Like { column, pattern } => {
            qb.push(*column)
                .push(" LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\'");
        }
        Predicate::PathSegment { column, segment } => {
            qb.push("instr('.' || ")
                .push(*column)
                .push(" || '.', '.' || ")
                .push_bind(segment.clone())
                .push(" || '.') > 0");
        }
        Predicate::InSelect {
            column,
            table,
            select,
            filter,
        } => {
            qb.push(*column)
                .push(" IN (SELECT ")
                .push(*select)
                .push(" FROM ")
                .push(*table)
                .push(" WHERE ");
            push_predicate(qb, filter);
            qb.push(")");
        }
        Predicate::And(parts) => push_group(qb, parts, " AND ", "1 = 1"),
        Predicate::Or(parts) => push_group(qb, parts, " OR ", "1 = 0"),
    }
}

fn push_group(
    qb: &mut QueryBuilder<'_, Sqlite>,
    parts: &[Predicate],
    joiner: &str,
    identity: &str,
) {
    if parts.is_empty() {
        qb.push(identity);
        return;
    }
    qb.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(joiner);
        }
        push_predicate(qb, part);
    }
    qb.push(")");
}

fn push_where(qb: &mut QueryBuilder<'_, Sqlite>, predicate: &Predicate) {
    qb.push(" WHERE ");
    push_predicate(qb, predicate);
}

/// `SELECT *` with optional ordering and paging
pub async fn select<'e, E>(
    executor: E,
    table: &TableSpec,
    predicate: &Predicate,
    order: Option<OrderBy>,
    page: Option<Page>,
) -> sqlx::Result<Vec<SqliteRow>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {}", table.name));
    push_where(&mut qb, predicate);
    if let Some(order) = order {
        let dir = order.direction.as_sql();
        qb.push(format!(" ORDER BY {} {dir}, rowid {dir}", order.column));
    }
    if let Some(page) = page {
        qb.push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset);
    }
    qb.build().fetch_all(executor).await
}

/// Values of a single column for every matching row
pub async fn select_column<'e, E>(
    executor: E,
    table: &TableSpec,
    column: &'static str,
    predicate: &Predicate,
) -> sqlx::Result<Vec<String>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut qb =
        QueryBuilder::<Sqlite>::new(format!("SELECT DISTINCT {column} FROM {}", table.name));
    push_where(&mut qb, predicate);
    qb.build_query_scalar::<String>().fetch_all(executor).await
}

pub async fn count<'e, E>(executor: E, table: &TableSpec, predicate: &Predicate) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {}", table.name));
    push_where(&mut qb, predicate);
    let n: i64 = qb.build_query_scalar().fetch_one(executor).await?;
    Ok(n as u64)
}

/// Apply `changes` to every matching row, returning the affected count
pub async fn update_fields<'e, E>(
    executor: E,
    table: &TableSpec,
    changes: &[(&'static str, SqlValue)],
    predicate: &Predicate,
) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    if changes.is_empty() {
        return Ok(0);
    }
    let mut qb = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET ", table.name));
    for (i, (column, value)) in changes.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column).push(" = ");
        push_value(&mut qb, value);
    }
    push_where(&mut qb, predicate);
    Ok(qb.build().execute(executor).await?.rows_affected())
}

pub async fn delete<'e, E>(executor: E, table: &TableSpec, predicate: &Predicate) -> sqlx::Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut qb = QueryBuilder::<Sqlite>::new(format!("DELETE FROM {}", table.name));
    push_where(&mut qb, predicate);
    Ok(qb.build().execute(executor).await?.rows_affected())
}

/// Whether a statement failed on a UNIQUE constraint
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
