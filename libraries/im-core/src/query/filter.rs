//! Request fields to predicate

use super::normalize::{normalize, normalize_list};
use super::predicate::Predicate;
use super::table::TableSpec;

/// Name of the free-text search field
pub const SEARCH_WORD: &str = "search_word";

/// Value of one named request field
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Scalar(&'a str),
    List(&'a [String]),
}

impl FieldValue<'_> {
    /// Normalized non-empty values
    fn normalized(self) -> Vec<String> {
        match self {
            Self::Scalar(s) => {
                let v = normalize(s);
                if v.is_empty() {
                    Vec::new()
                } else {
                    vec![v]
                }
            }
            Self::List(values) => normalize_list(values),
        }
    }
}

/// A request exposing a fixed set of named filter fields
pub trait FilterRequest {
    fn filter_fields(&self) -> Vec<(&'static str, FieldValue<'_>)>;
}

/// Build the filter predicate for a request against a table
///
/// Indexed fields become `IN` clauses that are AND-ed together. Every
/// `search_word` value is matched against each searchable column not in
/// `exclude`; those alternatives are OR-ed and the group is AND-ed with the
/// rest. Unknown field names are ignored.
pub fn build_predicate<R: FilterRequest + ?Sized>(
    req: &R,
    table: &TableSpec,
    exclude: &[&str],
) -> Predicate {
    let mut clauses = Vec::new();
    let mut search = Vec::new();

    for (name, value) in req.filter_fields() {
        if name == SEARCH_WORD {
            search.extend(value.normalized());
            continue;
        }
        let Some(column) = table.indexed.iter().copied().find(|c| *c == name) else {
            continue;
        };
        let values = value.normalized();
        if !values.is_empty() {
            clauses.push(Predicate::in_list(column, values));
        }
    }

    if !search.is_empty() {
        clauses.push(search_predicate(table, &search, exclude));
    }

    Predicate::all(clauses)
}

fn search_predicate(table: &TableSpec, words: &[String], exclude: &[&str]) -> Predicate {
    let alternatives = words.iter().flat_map(|word| {
        table
            .searchable
            .iter()
            .copied()
            .filter(|column| !exclude.contains(column))
            .map(move |column| {
                if column.ends_with("_id") {
                    Predicate::eq(column, word.as_str())
                } else {
                    Predicate::contains(column, word)
                }
            })
    });
    Predicate::any(alternatives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::table::{USERS, USER_GROUPS};

    struct Probe {
        status: Vec<String>,
        username: String,
        search_word: Vec<String>,
        nickname: String,
    }

    impl FilterRequest for Probe {
        fn filter_fields(&self) -> Vec<(&'static str, FieldValue<'_>)> {
            vec![
                ("status", FieldValue::List(&self.status)),
                ("username", FieldValue::Scalar(&self.username)),
                (SEARCH_WORD, FieldValue::List(&self.search_word)),
                ("nickname", FieldValue::Scalar(&self.nickname)),
            ]
        }
    }

    fn probe() -> Probe {
        Probe {
            status: Vec::new(),
            username: String::new(),
            search_word: Vec::new(),
            nickname: String::new(),
        }
    }

    #[test]
    fn empty_request_matches_everything() {
        assert_eq!(build_predicate(&probe(), &USERS, &[]), Predicate::True);
    }

    #[test]
    fn indexed_fields_become_in_clauses() {
        let req = Probe {
            status: vec!["active".into(), "  ".into()],
            username: "  alice   smith ".into(),
            ..probe()
        };
        assert_eq!(
            build_predicate(&req, &USERS, &[]),
            Predicate::And(vec![
                Predicate::In {
                    column: "status",
                    values: vec!["active".into()]
                },
                Predicate::In {
                    column: "username",
                    values: vec!["alice smith".into()]
                },
            ])
        );
    }

    #[test]
    fn unknown_and_unindexed_fields_are_ignored() {
        let req = Probe {
            nickname: "bob".into(),
            username: "bob".into(),
            ..probe()
        };
        // username is not indexed on the group table
        assert_eq!(build_predicate(&req, &USER_GROUPS, &[]), Predicate::True);
    }

    #[test]
    fn search_word_ors_across_searchable_columns() {
        let req = Probe {
            search_word: vec![" ali ".into()],
            status: vec!["active".into()],
            ..probe()
        };
        let p = build_predicate(&req, &USERS, &["status"]);
        assert_eq!(
            p,
            Predicate::And(vec![
                Predicate::In {
                    column: "status",
                    values: vec!["active".into()]
                },
                Predicate::Or(vec![
                    Predicate::eq("user_id", "ali"),
                    Predicate::contains("username", "ali"),
                    Predicate::contains("email", "ali"),
                    Predicate::contains("phone_number", "ali"),
                ]),
            ])
        );
    }

    #[test]
    fn blank_search_word_adds_nothing() {
        let req = Probe {
            search_word: vec!["   ".into()],
            ..probe()
        };
        assert_eq!(build_predicate(&req, &USERS, &[]), Predicate::True);
    }
}
