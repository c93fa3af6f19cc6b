//! Clause splitting for raw filter input
//!
//! The input grammar combines terms with `,`/`OU` (both OR) at the top level
//! and `ET` (AND) inside each clause. `OU` and `ET` only act as operators when
//! they stand alone between whitespace, so values like "OUEST" pass through.

use std::sync::LazyLock;

use regex::Regex;

static OR_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+OU\s+").unwrap());
static AND_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+ET\s+").unwrap());

/// Split raw input into OR-ed clauses of AND-ed terms.
///
/// Terms are trimmed; empty terms and empty clauses are discarded, so blank
/// input yields no clauses at all.
pub fn split_clauses(raw: &str) -> Vec<Vec<String>> {
    raw.split(',')
        .flat_map(|segment| OR_WORD.split(segment))
        .map(|clause| {
            AND_WORD
                .split(clause)
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        })
        .filter(|clause| !clause.is_empty())
        .collect()
}

/// Re-join a clause structure into canonical input form (`OU` between
/// clauses, `ET` between terms). Inverse of [`split_clauses`] up to
/// whitespace and the `,`/`OU` equivalence.
pub fn join_clauses(clauses: &[Vec<String>]) -> String {
    clauses
        .iter()
        .map(|terms| terms.join(" ET "))
        .collect::<Vec<_>>()
        .join(" OU ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_and_ou_both_split_clauses() {
        assert_eq!(split_clauses("toto, tutu"), vec![vec!["toto"], vec!["tutu"]]);
        assert_eq!(split_clauses("toto OU tutu"), vec![vec!["toto"], vec!["tutu"]]);
        assert_eq!(
            split_clauses("a, b OU c"),
            vec![vec!["a"], vec!["b"], vec!["c"]]
        );
    }

    #[test]
    fn et_splits_terms_within_a_clause() {
        assert_eq!(
            split_clauses(">100 ET <200"),
            vec![vec![">100", "<200"]]
        );
        assert_eq!(
            split_clauses("a ET b, c"),
            vec![vec!["a", "b"], vec!["c"]]
        );
    }

    #[test]
    fn operators_require_surrounding_whitespace() {
        // OUEST and ETAGE must not be split
        assert_eq!(split_clauses("OUEST"), vec![vec!["OUEST"]]);
        assert_eq!(split_clauses("ETAGE 2"), vec![vec!["ETAGE 2"]]);
    }

    #[test]
    fn blanks_are_discarded() {
        assert!(split_clauses("").is_empty());
        assert!(split_clauses("   ").is_empty());
        assert!(split_clauses(" , , ").is_empty());
        assert_eq!(split_clauses("a, ,b"), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn terms_keep_inner_whitespace() {
        assert_eq!(
            split_clauses("new york OU los angeles"),
            vec![vec!["new york"], vec!["los angeles"]]
        );
    }

    #[test]
    fn split_then_join_is_stable() {
        // Associativity: re-joining with OU/ET and re-parsing yields the
        // same structure.
        for input in [
            "a, b OU c",
            ">100 ET <200",
            "2024-01, 2024-03",
            "a ET b OU c ET d, e",
        ] {
            let first = split_clauses(input);
            let rejoined = join_clauses(&first);
            assert_eq!(split_clauses(&rejoined), first, "input: {input}");
        }
    }
}
