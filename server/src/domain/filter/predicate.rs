//! Field predicate compilation
//!
//! Compiles one raw input string into a field-level predicate: OR over
//! clauses of AND over term conditions. Unparseable terms are dropped and
//! reported; compilation itself never fails.

use super::clause::split_clauses;
use super::term::{self, Condition};
use crate::domain::model::{FieldType, FieldValue};

/// Compiled predicate for one field: disjunction of conjunctions
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    clauses: Vec<Vec<Condition>>,
}

impl FieldPredicate {
    pub fn matches(&self, value: &FieldValue) -> bool {
        self.clauses
            .iter()
            .any(|terms| terms.iter().all(|cond| cond.matches(value)))
    }

    #[cfg(test)]
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }
}

/// Outcome of compiling one raw input
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledField {
    /// None = no restriction (blank input, or nothing parseable)
    pub predicate: Option<FieldPredicate>,
    /// Terms that matched no recognized grammar and were ignored
    pub dropped_terms: Vec<String>,
}

/// Compile raw input for a field.
///
/// Blank input removes the filter. A clause whose terms all fail to parse is
/// dropped as a whole (an empty conjunction would match everything). If every
/// clause is dropped the field contributes no restriction.
pub fn compile(field_type: FieldType, raw: &str) -> CompiledField {
    let mut dropped_terms = Vec::new();
    let mut clauses = Vec::new();

    for terms in split_clauses(raw) {
        let mut conditions = Vec::new();
        for t in terms {
            match term::parse_term(field_type, &t) {
                Some(cond) => conditions.push(cond),
                None => dropped_terms.push(t),
            }
        }
        if !conditions.is_empty() {
            clauses.push(conditions);
        }
    }

    let predicate = if clauses.is_empty() { None } else { Some(FieldPredicate { clauses }) };
    CompiledField { predicate, dropped_terms }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn number(n: f64) -> FieldValue {
        FieldValue::Number(n)
    }

    fn on_date(s: &str) -> FieldValue {
        FieldValue::Date(NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap())
    }

    #[test]
    fn blank_input_yields_no_restriction() {
        let out = compile(FieldType::Text, "");
        assert!(out.predicate.is_none());
        assert!(out.dropped_terms.is_empty());

        let out = compile(FieldType::Text, "   ");
        assert!(out.predicate.is_none());
    }

    #[test]
    fn and_between_numeric_bounds() {
        let out = compile(FieldType::Numeric, ">100 ET <200");
        let pred = out.predicate.unwrap();
        assert!(pred.matches(&number(150.0)));
        assert!(!pred.matches(&number(100.0)));
        assert!(!pred.matches(&number(200.0)));
    }

    #[test]
    fn or_between_numeric_values() {
        let out = compile(FieldType::Numeric, "10, 20, 30");
        let pred = out.predicate.unwrap();
        assert_eq!(pred.clause_count(), 3);
        assert!(pred.matches(&number(20.0)));
        assert!(!pred.matches(&number(25.0)));
    }

    #[test]
    fn or_between_date_months() {
        let out = compile(FieldType::Date, "2024-01, 2024-03");
        let pred = out.predicate.unwrap();
        assert!(pred.matches(&on_date("2024-01-10")));
        assert!(!pred.matches(&on_date("2024-02-15")));
        assert!(pred.matches(&on_date("2024-03-31")));
    }

    #[test]
    fn and_between_date_bounds() {
        let out = compile(FieldType::Date, ">2024-01 ET <2024-06");
        let pred = out.predicate.unwrap();
        assert!(pred.matches(&on_date("2024-03-01")));
        assert!(!pred.matches(&on_date("2024-01-15")));
        assert!(!pred.matches(&on_date("2024-06-15")));
    }

    #[test]
    fn failed_terms_are_reported_and_rest_survives() {
        let out = compile(FieldType::Numeric, ">100 ET garbage");
        assert_eq!(out.dropped_terms, vec!["garbage".to_string()]);
        let pred = out.predicate.unwrap();
        assert!(pred.matches(&number(150.0)));
        assert!(!pred.matches(&number(50.0)));
    }

    #[test]
    fn clause_with_no_surviving_terms_is_dropped() {
        // "garbage" alone would otherwise become an always-true clause and
        // defeat the other one
        let out = compile(FieldType::Numeric, "garbage, >100");
        let pred = out.predicate.unwrap();
        assert_eq!(pred.clause_count(), 1);
        assert!(!pred.matches(&number(50.0)));
    }

    #[test]
    fn all_terms_failing_yields_no_restriction() {
        let out = compile(FieldType::Numeric, "abc, def");
        assert!(out.predicate.is_none());
        assert_eq!(out.dropped_terms.len(), 2);
    }

    #[test]
    fn mixed_text_clause() {
        let out = compile(FieldType::Text, "toto ET tutu, titi");
        let pred = out.predicate.unwrap();
        assert!(pred.matches(&FieldValue::Text("xx toto yy tutu".into())));
        assert!(!pred.matches(&FieldValue::Text("only toto".into())));
        assert!(pred.matches(&FieldValue::Text("TITI here".into())));
    }
}
