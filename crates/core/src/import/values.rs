//! Tolerant value parsers for the numeric and date text found in broker
//! exports. Both return `Option` — "unparsable" is never conflated with
//! zero or with a default date; the row parser decides the fallback.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Characters stripped before numeric parsing: currency symbols, plain and
/// non-breaking spaces, and apostrophe group separators (Swiss format).
const NUMERIC_NOISE: &[char] = &['$', '€', '£', '¥', '₹', ' ', '\u{a0}', '\''];

/// Parse a numeric field. Handles:
/// - currency symbols and embedded spaces,
/// - parenthesized values as negatives (accounting notation),
/// - European decimal commas ("1.234,56" → 1234.56) — detected when the
///   string ends in a comma followed by 1–2 digits,
/// - thousands-separator commas otherwise ("1,234.56" → 1234.56).
///
/// Returns `None` (not zero) when the residue is not a valid finite number.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (body, negated) = match trimmed
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
    {
        Some(inner) => (inner.trim(), true),
        None => (trimmed, false),
    };

    let cleaned: String = body.chars().filter(|c| !NUMERIC_NOISE.contains(c)).collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if has_decimal_comma(&cleaned) {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.replace(',', "")
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| if negated { -n } else { n })
}

/// European decimal style: the string ends in a comma followed by exactly
/// one or two digits ("0,5", "1.234,56"). Three or more digits after the
/// last comma read as a thousands separator ("1,234").
fn has_decimal_comma(s: &str) -> bool {
    match s.rfind(',') {
        Some(pos) => {
            let tail = &s[pos + 1..];
            (1..=2).contains(&tail.len()) && tail.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Datetime layouts, tried in order after RFC 3339. The quoted
/// `"YYYY-MM-DD, HH:MM:SS"` form is IBKR's Date/Time column.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d, %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

/// Date-only layouts: ISO first, then day-month-year, then year-month-day,
/// across `/`, `-`, and `.` separators.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
];

/// Parse a timestamp from export text. `None` means unparsable — the row
/// parser substitutes the current time, so a bad date never skips a row.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}
