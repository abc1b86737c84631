//! Immutable filter predicates
//!
//! Predicates are plain values composed with [`Predicate::and`] and
//! [`Predicate::or`]. Column names are `&'static str` taken from the table
//! whitelists; every user supplied value is carried as a bind parameter and
//! only rendered to SQL by the storage executor.

use super::table::TableSpec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    True,
    False,
    /// `column IN (values)`, never empty
    In {
        column: &'static str,
        values: Vec<String>,
    },
    /// `column NOT IN (values)`, never empty
    NotIn {
        column: &'static str,
        values: Vec<String>,
    },
    Eq {
        column: &'static str,
        value: String,
    },
    /// Case-insensitive `LIKE` with `\` as escape character
    Like {
        column: &'static str,
        pattern: String,
    },
    /// `segment` is a whole `.`-delimited segment of `column`
    PathSegment {
        column: &'static str,
        segment: String,
    },
    /// `column IN (SELECT select FROM table WHERE filter)`
    InSelect {
        column: &'static str,
        table: &'static str,
        select: &'static str,
        filter: Box<Predicate>,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// `column IN (values)`; an empty value set matches nothing
    pub fn in_list<I, S>(column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            Self::False
        } else {
            Self::In { column, values }
        }
    }

    /// `column NOT IN (values)`; an empty value set excludes nothing
    pub fn not_in<I, S>(column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            Self::True
        } else {
            Self::NotIn { column, values }
        }
    }

    pub fn eq(column: &'static str, value: impl Into<String>) -> Self {
        Self::Eq {
            column,
            value: value.into(),
        }
    }

    /// Substring match with `%` and `_` taken literally
    pub fn contains(column: &'static str, needle: &str) -> Self {
        Self::Like {
            column,
            pattern: format!("%{}%", escape_like(needle)),
        }
    }

    pub fn path_segment(column: &'static str, segment: impl Into<String>) -> Self {
        Self::PathSegment {
            column,
            segment: segment.into(),
        }
    }

    /// Match `column` against `select` of the `table` rows passing `filter`
    pub fn in_select(
        column: &'static str,
        table: &TableSpec,
        select: &'static str,
        filter: Predicate,
    ) -> Self {
        if filter == Self::False {
            return Self::False;
        }
        Self::InSelect {
            column,
            table: table.name,
            select,
            filter: Box::new(filter),
        }
    }

    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::False, _) | (_, Self::False) => Self::False,
            (Self::True, p) | (p, Self::True) => p,
            (Self::And(mut a), Self::And(b)) => {
                a.extend(b);
                Self::And(a)
            }
            (Self::And(mut a), p) => {
                a.push(p);
                Self::And(a)
            }
            (p, Self::And(mut b)) => {
                b.insert(0, p);
                Self::And(b)
            }
            (a, b) => Self::And(vec![a, b]),
        }
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::True, _) | (_, Self::True) => Self::True,
            (Self::False, p) | (p, Self::False) => p,
            (Self::Or(mut a), Self::Or(b)) => {
                a.extend(b);
                Self::Or(a)
            }
            (Self::Or(mut a), p) => {
                a.push(p);
                Self::Or(a)
            }
            (p, Self::Or(mut b)) => {
                b.insert(0, p);
                Self::Or(b)
            }
            (a, b) => Self::Or(vec![a, b]),
        }
    }

    /// Conjunction of all predicates, `True` when empty
    pub fn all(preds: impl IntoIterator<Item = Self>) -> Self {
        preds.into_iter().fold(Self::True, Self::and)
    }

    /// Disjunction of all predicates, `False` when empty
    pub fn any(preds: impl IntoIterator<Item = Self>) -> Self {
        preds.into_iter().fold(Self::False, Self::or)
    }
}

/// Escape `LIKE` metacharacters using `\`
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
