//! Best-effort timestamp parsing for upstream feed entries.
//!
//! Upstream dates arrive in a handful of common shapes (RFC 3339, RFC 822,
//! bare dates). We preserve whatever timezone offset the source declared
//! rather than normalizing eagerly to UTC, per the entry data model.

use super::*;

pub type Timestamp = chrono::DateTime<chrono::FixedOffset>;

/// Parse a date string from an upstream feed, trying the formats feeds
/// actually show up in before giving up.
pub fn parse_timestamp(date: &str) -> Option<Timestamp> {
    let date = date.trim();
    if date.is_empty() {
        return None;
    }

    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(date) {
        return Some(parsed);
    }

    if let Ok(parsed) = chrono::DateTime::parse_from_rfc2822(date) {
        return Some(parsed);
    }

    if let Ok(naive) =
        chrono::NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%SZ")
    {
        return Some(fixed_utc(naive));
    }

    if let Ok(naive) =
        chrono::NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%MZ")
    {
        return Some(fixed_utc(naive));
    }

    if let Ok(naive) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        if let Some(naive) = naive.and_hms_opt(0, 0, 0) {
            return Some(fixed_utc(naive));
        }
    }

    None
}

fn fixed_utc(naive: chrono::NaiveDateTime) -> Timestamp {
    chrono::DateTime::from_naive_utc_and_offset(
        naive,
        chrono::FixedOffset::east_opt(0).expect("zero offset is valid"),
    )
}

/// Current wall-clock time, used as the last resort for `update_date`.
pub fn now() -> Timestamp {
    chrono::Utc::now().fixed_offset()
}
