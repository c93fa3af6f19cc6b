//! Atomic term parsing and evaluation
//!
//! A term is one filter expression inside a clause. What it may look like
//! depends on the field's declared type:
//!
//! - text: `abc` (contains), `abc*` (starts with), `*abc` (ends with)
//! - numeric: `100`, `>100`, `>=100`, `<100`, `<=100`
//! - boolean: `1,true,vrai,yes,oui` / `0,false,faux,no,non`
//! - date: `AAAA`, `AAAA-MM`, `AAAA-SWW`, `AAAA-MM-JJ`, `JJ/MM/AAAA`,
//!   optionally prefixed with a comparison operator
//!
//! Terms that fit no recognized shape yield `None` and are silently dropped
//! by the compiler.

use chrono::NaiveDate;

use super::date::{self, DateBucket};
use crate::domain::model::{FieldType, FieldValue};

const TRUE_WORDS: [&str; 5] = ["1", "true", "vrai", "yes", "oui"];
const FALSE_WORDS: [&str; 5] = ["0", "false", "faux", "no", "non"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Gt,
    Gte,
    Lt,
    Lte,
}

/// A single compiled filter condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Case-insensitive substring match on the display value
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    BoolIs(bool),
    NumberEq(f64),
    NumberCmp(CmpOp, f64),
    /// Range membership in a calendar bucket
    DateIn(DateBucket),
    /// Comparison against a bucket boundary
    DateCmp(CmpOp, DateBucket),
}

/// Strip a leading comparison operator, longest match first
fn split_cmp_prefix(term: &str) -> (Option<CmpOp>, &str) {
    for (prefix, op) in [(">=", CmpOp::Gte), ("<=", CmpOp::Lte), (">", CmpOp::Gt), ("<", CmpOp::Lt)]
    {
        if let Some(rest) = term.strip_prefix(prefix) {
            return (Some(op), rest.trim_start());
        }
    }
    (None, term)
}

/// Parse one trimmed term for the given field type. `None` means the term is
/// dropped (never an error).
pub fn parse_term(field_type: FieldType, term: &str) -> Option<Condition> {
    match field_type {
        FieldType::Text => Some(parse_text_term(term)),
        FieldType::Numeric => parse_numeric_term(term),
        FieldType::Boolean => parse_boolean_term(term),
        FieldType::Date => parse_date_term(term),
    }
}

/// Text terms always parse: comparison prefixes are not meaningful on text
/// and fall back to literal substring content.
fn parse_text_term(term: &str) -> Condition {
    let starts_anchor = term.len() > 1 && term.ends_with('*');
    let ends_anchor = term.len() > 1 && term.starts_with('*');
    match (ends_anchor, starts_anchor) {
        (false, true) => Condition::StartsWith(lower(term.trim_end_matches('*'))),
        (true, false) => Condition::EndsWith(lower(term.trim_start_matches('*'))),
        (true, true) => {
            Condition::Contains(lower(term.trim_matches('*')))
        }
        (false, false) => Condition::Contains(lower(term)),
    }
}

fn lower(s: &str) -> String {
    s.to_lowercase()
}

fn parse_numeric_term(term: &str) -> Option<Condition> {
    let (op, rest) = split_cmp_prefix(term);
    let value: f64 = rest.parse().ok()?;
    Some(match op {
        Some(op) => Condition::NumberCmp(op, value),
        None => Condition::NumberEq(value),
    })
}

fn parse_boolean_term(term: &str) -> Option<Condition> {
    let needle = term.to_lowercase();
    if TRUE_WORDS.contains(&needle.as_str()) {
        Some(Condition::BoolIs(true))
    } else if FALSE_WORDS.contains(&needle.as_str()) {
        Some(Condition::BoolIs(false))
    } else {
        None
    }
}

fn parse_date_term(term: &str) -> Option<Condition> {
    let (op, rest) = split_cmp_prefix(term);
    let bucket = date::parse_bucket(rest)?;
    Some(match op {
        Some(op) => Condition::DateCmp(op, bucket),
        None => Condition::DateIn(bucket),
    })
}

impl Condition {
    /// Evaluate against a record value. Null values fail every condition.
    pub fn matches(&self, value: &FieldValue) -> bool {
        match self {
            Condition::Contains(needle) => value_text(value).is_some_and(|t| t.contains(needle)),
            Condition::StartsWith(needle) => {
                value_text(value).is_some_and(|t| t.starts_with(needle))
            }
            Condition::EndsWith(needle) => value_text(value).is_some_and(|t| t.ends_with(needle)),
            Condition::BoolIs(expected) => matches!(value, FieldValue::Bool(b) if b == expected),
            Condition::NumberEq(expected) => value.as_number() == Some(*expected),
            Condition::NumberCmp(op, bound) => {
                value.as_number().is_some_and(|n| apply_cmp(*op, n, *bound))
            }
            Condition::DateIn(bucket) => value_date(value).is_some_and(|d| bucket.contains(d)),
            Condition::DateCmp(op, bucket) => value_date(value).is_some_and(|d| match op {
                // `>` excludes the bucket entirely, `>=` includes its start;
                // `<` stops before the bucket, `<=` runs through its end
                CmpOp::Gt => d >= bucket.end(),
                CmpOp::Gte => d >= bucket.start(),
                CmpOp::Lt => d < bucket.start(),
                CmpOp::Lte => d < bucket.end(),
            }),
        }
    }
}

fn apply_cmp(op: CmpOp, lhs: f64, rhs: f64) -> bool {
    match op {
        CmpOp::Gt => lhs > rhs,
        CmpOp::Gte => lhs >= rhs,
        CmpOp::Lt => lhs < rhs,
        CmpOp::Lte => lhs <= rhs,
    }
}

fn value_text(value: &FieldValue) -> Option<String> {
    if value.is_null() {
        return None;
    }
    Some(value.display().to_lowercase())
}

fn value_date(value: &FieldValue) -> Option<NaiveDate> {
    match value {
        FieldValue::Date(d) => Some(*d),
        _ => None,
    }
}
