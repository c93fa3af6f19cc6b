//! Filter expression engine
//!
//! Compiles the per-field filter mini-language typed by end users into
//! record predicates. Grammar summary (see the module docs of [`term`] for
//! details): `,`/`OU` separate OR-ed clauses, `ET` separates AND-ed terms,
//! `*` anchors text matches, `>`/`>=`/`<`/`<=` prefix numeric and date
//! comparisons, and date terms accept `AAAA`, `AAAA-MM`, `AAAA-SWW`,
//! `AAAA-MM-JJ` and `JJ/MM/AAAA` patterns.
//!
//! Compilation is pure and total: bad terms are dropped (and reported), a
//! blank input removes the field's filter, and the result is always a usable
//! predicate.

pub mod clause;
pub mod date;
pub mod predicate;
pub mod term;

use std::collections::HashMap;

use crate::domain::model::{FilterField, Record};

pub use predicate::{CompiledField, FieldPredicate, compile};

/// Record-level predicate: the conjunction of all per-field predicates of a
/// dashboard, built from the caller's raw inputs.
#[derive(Debug, Default)]
pub struct FilterSet {
    /// (source field name, compiled predicate)
    restrictions: Vec<(String, FieldPredicate)>,
    /// Terms ignored across all fields, surfaced as a diagnostic
    pub dropped_terms: Vec<String>,
}

impl FilterSet {
    /// Compile the raw inputs keyed by filter-field id. Unknown ids and blank
    /// inputs contribute nothing.
    pub fn compile(fields: &[FilterField], inputs: &HashMap<String, String>) -> Self {
        let mut set = FilterSet::default();
        for field in fields {
            let Some(raw) = inputs.get(&field.id) else { continue };
            let compiled = compile(field.field_type, raw);
            set.dropped_terms.extend(compiled.dropped_terms);
            if let Some(predicate) = compiled.predicate {
                set.restrictions.push((field.field_name.clone(), predicate));
            }
        }
        set
    }

    /// AND across fields
    pub fn matches(&self, record: &Record) -> bool {
        self.restrictions
            .iter()
            .all(|(field, predicate)| predicate.matches(record.value(field)))
    }

    pub fn is_empty(&self) -> bool {
        self.restrictions.is_empty()
    }
}
