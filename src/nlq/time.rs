//! Time expression recognition: explicit period filters and bucket
//! granularity vocabulary.
//!
//! Recognition is an ordered list of independent rules; each contributes an
//! optional condition plus bucket/year hints, and the contributions reduce
//! into one [`PeriodFilter`]. The documented precedence (month-year, then
//! quarter-year, then plain year) falls out of the rule order.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Time-aggregation granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Day,
    Month,
    Quarter,
    Year,
}

/// A recognized period condition, rendered by the dialect adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeCondition {
    /// order_date BETWEEN start AND end (inclusive ISO dates).
    Between { start: String, end: String },
    /// Calendar year equality.
    YearEquals(i32),
}

/// The combined result of period recognition for one question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodFilter {
    /// Conditions in recognition order; each carries its bound values.
    pub conditions: Vec<TimeCondition>,
    /// Bucket inferred from the filters (first hint wins).
    pub bucket: Option<Bucket>,
    /// Present only when the filter pins exactly one calendar year,
    /// enabling calendar fill.
    pub single_year: Option<i32>,
}

/// One rule's contribution to the period filter.
struct Contribution {
    condition: TimeCondition,
    bucket_hint: Bucket,
    year: i32,
}

/// Month names and standard abbreviations.
const MONTHS: &[(&str, u32)] = &[
    ("january", 1),
    ("jan", 1),
    ("february", 2),
    ("feb", 2),
    ("march", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("may", 5),
    ("june", 6),
    ("jun", 6),
    ("july", 7),
    ("jul", 7),
    ("august", 8),
    ("aug", 8),
    ("september", 9),
    ("sept", 9),
    ("sep", 9),
    ("october", 10),
    ("oct", 10),
    ("november", 11),
    ("nov", 11),
    ("december", 12),
    ("dec", 12),
];

fn month_number(name: &str) -> Option<u32> {
    MONTHS.iter().find(|(n, _)| *n == name).map(|(_, m)| *m)
}

/// Last day of a calendar month, leap years included.
fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    Some(next?.pred_opt()?.day())
}

static MONTH_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    // Longer names first so "january" is not shadowed by "jan".
    let mut names: Vec<&str> = MONTHS.iter().map(|(n, _)| *n).collect();
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    Regex::new(&format!(r"\b({})\s+(20\d{{2}})\b", names.join("|"))).expect("valid month pattern")
});

static YEAR_QUARTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(20\d{2})\s*q([1-4])\b").expect("valid year-quarter pattern"));
static QUARTER_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bq([1-4])\s*(20\d{2})\b").expect("valid quarter-year pattern"));
static ORDINAL_QUARTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(first|second|third|fourth)\s+quarter(?:\s+of|\s+in)?\s+(20\d{2})\b")
        .expect("valid ordinal quarter pattern")
});
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20\d{2})\b").expect("valid year pattern"));

/// "january 2025" - a whole calendar month, so the pinned range is daily.
fn month_year_rule(text: &str, _existing: &[TimeCondition]) -> Option<Contribution> {
    let caps = MONTH_YEAR_RE.captures(text)?;
    let month = month_number(&caps[1])?;
    let year: i32 = caps[2].parse().ok()?;
    let last = last_day_of_month(year, month)?;
    Some(Contribution {
        condition: TimeCondition::Between {
            start: format!("{year:04}-{month:02}-01"),
            end: format!("{year:04}-{month:02}-{last:02}"),
        },
        bucket_hint: Bucket::Day,
        year,
    })
}

/// "2025 q4" / "q4 2025" / "fourth quarter of 2025".
fn quarter_year_rule(text: &str, _existing: &[TimeCondition]) -> Option<Contribution> {
    let (quarter, year): (u32, i32) = if let Some(caps) = YEAR_QUARTER_RE.captures(text) {
        (caps[2].parse().ok()?, caps[1].parse().ok()?)
    } else if let Some(caps) = QUARTER_YEAR_RE.captures(text) {
        (caps[1].parse().ok()?, caps[2].parse().ok()?)
    } else if let Some(caps) = ORDINAL_QUARTER_RE.captures(text) {
        let quarter = match &caps[1] {
            "first" => 1,
            "second" => 2,
            "third" => 3,
            _ => 4,
        };
        (quarter, caps[2].parse().ok()?)
    } else {
        return None;
    };

    let start_month = 1 + (quarter - 1) * 3;
    let end_month = start_month + 2;
    let last = last_day_of_month(year, end_month)?;
    Some(Contribution {
        condition: TimeCondition::Between {
            start: format!("{year:04}-{start_month:02}-01"),
            end: format!("{year:04}-{end_month:02}-{last:02}"),
        },
        bucket_hint: Bucket::Month,
        year,
    })
}

/// Bare "2024", applied only if no date range was already pinned.
fn plain_year_rule(text: &str, existing: &[TimeCondition]) -> Option<Contribution> {
    if existing
        .iter()
        .any(|c| matches!(c, TimeCondition::Between { .. }))
    {
        return None;
    }
    let year: i32 = YEAR_RE.captures(text)?[1].parse().ok()?;
    Some(Contribution {
        condition: TimeCondition::YearEquals(year),
        bucket_hint: Bucket::Month,
        year,
    })
}

type Rule = fn(&str, &[TimeCondition]) -> Option<Contribution>;

const RULES: &[Rule] = &[month_year_rule, quarter_year_rule, plain_year_rule];

/// Recognize explicit period filters in the question text.
pub fn extract_period_filter(text: &str) -> PeriodFilter {
    let lower = text.to_lowercase();
    let mut filter = PeriodFilter::default();
    for rule in RULES {
        if let Some(contribution) = rule(&lower, &filter.conditions) {
            filter.bucket = filter.bucket.or(Some(contribution.bucket_hint));
            filter.single_year = Some(contribution.year);
            filter.conditions.push(contribution.condition);
        }
    }
    filter
}

static BARE_QUARTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bq[1-4]\b").expect("valid bare quarter pattern"));

/// Recognize explicit bucket-granularity vocabulary.
///
/// When both an explicit bucket word and a filter-inferred bucket are
/// present, the explicit word wins (the caller composes the two).
pub fn extract_bucket(tokens: &[String], text: &str) -> Option<Bucket> {
    let lower = text.to_lowercase();
    let has = |word: &str| tokens.iter().any(|t| t == word);

    if ["quarterly", "by quarter", "qtr"]
        .iter()
        .any(|p| lower.contains(p))
        || BARE_QUARTER_RE.is_match(&lower)
        || has("quarter")
    {
        return Some(Bucket::Quarter);
    }
    if ["by month", "monthly", "per month", "each month", "months"]
        .iter()
        .any(|p| lower.contains(p))
        || has("month")
    {
        return Some(Bucket::Month);
    }
    if ["yearly", "per year", "by year", "years"]
        .iter()
        .any(|p| lower.contains(p))
        || has("year")
        || has("yearly")
    {
        return Some(Bucket::Year);
    }
    if has("day") {
        return Some(Bucket::Day);
    }
    None
}

static DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"date\s+between\s+(\d{4}-\d{2}-\d{2})\s+and\s+(\d{4}-\d{2}-\d{2})")
        .expect("valid date range pattern")
});

/// Recognize an explicit literal date range ("date between 2025-10-20 and
/// 2025-10-25"). Composes additively with any period filter; a range that
/// fails the pattern is treated as absent.
pub fn extract_date_range(text: &str) -> Option<(String, String)> {
    let lowered = text.to_lowercase();
    let caps = DATE_RANGE_RE.captures(&lowered)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}
