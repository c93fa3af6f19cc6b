//! Calendar buckets for date filter terms
//!
//! A date term selects a half-open interval `[start, end)`: a full year, a
//! month, an ISO week or a single day. Patterns are matched in priority
//! order; the first hit wins.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate, Weekday};
use regex::Regex;

static DAY_FR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());
static DAY_ISO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static WEEK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-[Ss](\d{1,2})$").unwrap());
static MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap());
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})$").unwrap());

/// A half-open calendar interval derived from a date pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBucket {
    Year(i32),
    Month(i32, u32),
    /// ISO week (Monday-based)
    Week(i32, u32),
    Day(NaiveDate),
}

impl DateBucket {
    /// First day of the bucket
    pub fn start(&self) -> NaiveDate {
        match *self {
            DateBucket::Year(y) => NaiveDate::from_ymd_opt(y, 1, 1).unwrap_or(NaiveDate::MIN),
            DateBucket::Month(y, m) => {
                NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(NaiveDate::MIN)
            }
            DateBucket::Week(y, w) => {
                NaiveDate::from_isoywd_opt(y, w, Weekday::Mon).unwrap_or(NaiveDate::MIN)
            }
            DateBucket::Day(d) => d,
        }
    }

    /// First day after the bucket (exclusive bound)
    pub fn end(&self) -> NaiveDate {
        match *self {
            DateBucket::Year(y) => {
                NaiveDate::from_ymd_opt(y + 1, 1, 1).unwrap_or(NaiveDate::MAX)
            }
            DateBucket::Month(y, m) => {
                let (ny, nm) = if m == 12 { (y + 1, 1) } else { (y, m + 1) };
                NaiveDate::from_ymd_opt(ny, nm, 1).unwrap_or(NaiveDate::MAX)
            }
            DateBucket::Week(..) | DateBucket::Day(_) => {
                let days = if matches!(self, DateBucket::Week(..)) { 7 } else { 1 };
                self.start().checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
            }
        }
    }

    /// Range membership: `start <= d < end`
    pub fn contains(&self, d: NaiveDate) -> bool {
        d >= self.start() && d < self.end()
    }
}

/// Parse a date pattern into a bucket.
///
/// Priority order: `JJ/MM/AAAA`, `AAAA-MM-JJ`, `AAAA-SWW`, `AAAA-MM`, `AAAA`.
/// Returns None when nothing matches or the components are out of range, in
/// which case the caller drops the term.
pub fn parse_bucket(s: &str) -> Option<DateBucket> {
    if let Some(c) = DAY_FR.captures(s) {
        let (d, m, y) = (num(&c, 1), num(&c, 2), num(&c, 3));
        return NaiveDate::from_ymd_opt(y as i32, m, d).map(DateBucket::Day);
    }
    if let Some(c) = DAY_ISO.captures(s) {
        let (y, m, d) = (num(&c, 1), num(&c, 2), num(&c, 3));
        return NaiveDate::from_ymd_opt(y as i32, m, d).map(DateBucket::Day);
    }
    if let Some(c) = WEEK.captures(s) {
        let (y, w) = (num(&c, 1) as i32, num(&c, 2));
        // Validate through chrono: week 53 only exists in long years
        return NaiveDate::from_isoywd_opt(y, w, Weekday::Mon).map(|_| DateBucket::Week(y, w));
    }
    if let Some(c) = MONTH.captures(s) {
        let (y, m) = (num(&c, 1) as i32, num(&c, 2));
        return (1..=12).contains(&m).then_some(DateBucket::Month(y, m));
    }
    if let Some(c) = YEAR.captures(s) {
        return Some(DateBucket::Year(num(&c, 1) as i32));
    }
    None
}

fn num(captures: &regex::Captures<'_>, i: usize) -> u32 {
    captures[i].parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_patterns_in_priority_order() {
        assert_eq!(parse_bucket("07/12/2025"), Some(DateBucket::Day(date(2025, 12, 7))));
        assert_eq!(parse_bucket("2025-12-07"), Some(DateBucket::Day(date(2025, 12, 7))));
        assert_eq!(parse_bucket("2025-S15"), Some(DateBucket::Week(2025, 15)));
        assert_eq!(parse_bucket("2025-s15"), Some(DateBucket::Week(2025, 15)));
        assert_eq!(parse_bucket("2025-03"), Some(DateBucket::Month(2025, 3)));
        assert_eq!(parse_bucket("2025"), Some(DateBucket::Year(2025)));
    }

    #[test]
    fn rejects_out_of_range_components() {
        assert_eq!(parse_bucket("32/01/2025"), None);
        assert_eq!(parse_bucket("2025-13"), None);
        assert_eq!(parse_bucket("2025-02-30"), None);
        // 2025 is not a long ISO year
        assert_eq!(parse_bucket("2025-S53"), None);
        assert_eq!(parse_bucket("2020-S53"), Some(DateBucket::Week(2020, 53)));
        assert_eq!(parse_bucket("hello"), None);
        assert_eq!(parse_bucket(""), None);
    }

    #[test]
    fn year_interval_is_half_open() {
        let b = DateBucket::Year(2024);
        assert_eq!(b.start(), date(2024, 1, 1));
        assert_eq!(b.end(), date(2025, 1, 1));
        assert!(b.contains(date(2024, 12, 31)));
        assert!(!b.contains(date(2025, 1, 1)));
    }

    #[test]
    fn month_interval_wraps_december() {
        let b = DateBucket::Month(2024, 12);
        assert_eq!(b.end(), date(2025, 1, 1));
        assert!(b.contains(date(2024, 12, 31)));
    }

    #[test]
    fn week_starts_monday_and_lasts_seven_days() {
        // ISO week 1 of 2025 starts Monday 2024-12-30
        let b = DateBucket::Week(2025, 1);
        assert_eq!(b.start(), date(2024, 12, 30));
        assert_eq!(b.end(), date(2025, 1, 6));
        assert!(b.contains(date(2025, 1, 5)));
        assert!(!b.contains(date(2025, 1, 6)));
    }

    #[test]
    fn day_interval_is_one_day() {
        let b = DateBucket::Day(date(2024, 2, 29));
        assert_eq!(b.end(), date(2024, 3, 1));
        assert!(b.contains(date(2024, 2, 29)));
        assert!(!b.contains(date(2024, 3, 1)));
    }
}
