//! Whitespace normalization for request values

/// Trim and collapse internal whitespace runs to a single space
pub fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize every entry, dropping the ones that become empty
pub fn normalize_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    values
        .iter()
        .map(|v| normalize(v.as_ref()))
        .filter(|v| !v.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn collapses_inner_whitespace() {
        assert_eq!(normalize("  alice \t  smith\n"), "alice smith");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \t "), "");
    }

    #[test]
    fn blank_entries_are_dropped() {
        let list = normalize_list(&["grp-1", "  ", "", " grp-2 "]);
        assert_eq!(list, vec!["grp-1".to_string(), "grp-2".to_string()]);
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "\\PC*") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn normalized_lists_have_no_empty_entries(values in proptest::collection::vec("[ a-z\\t]{0,6}", 0..10)) {
            let list = normalize_list(&values);
            prop_assert!(list.len() <= values.len());
            prop_assert!(list.iter().all(|v| !v.is_empty()));
            if values.iter().any(|v| v.trim().is_empty()) {
                prop_assert!(list.len() < values.len());
            }
        }
    }
}
