// 📅 Date Normalizer - ambiguous locale spellings → YYYY-MM-DD
//
// Accepts the spellings observed in the source sheets:
//   20240105, 2024-01-05, 2024.1.5, 2024/1/5, 2024년 1월 5일, 24.1.5,
//   1월 5일, 1/5
// Anything else passes through unchanged. Never fails.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

use crate::record::NO_DATE;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

fn compact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})$").expect("invalid compact date regex"))
}

fn full_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]{4})[.\-/\s년]+([0-9]{1,2})[.\-/\s월]+([0-9]{1,2})[\s일]*$")
            .expect("invalid full date regex")
    })
}

fn full_date_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]{4})[.\-/\s]+([0-9]{1,2})[.\-/\s]+([0-9]{1,2})")
            .expect("invalid full date prefix regex")
    })
}

fn short_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]{2})[.\-/\s년]+([0-9]{1,2})[.\-/\s월]+([0-9]{1,2})[\s일]*$")
            .expect("invalid short year date regex")
    })
}

fn month_day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]{1,2})[.\-/\s월]+([0-9]{1,2})[\s일]*$").expect("invalid month/day regex")
    })
}

/// Normalize a date-ish string to `YYYY-MM-DD`.
///
/// `today` anchors the year for bare month/day input: the current year is
/// assumed, and if that lands strictly after `today` the previous year is
/// used instead (late-December entries processed in early January).
///
/// Blank input and the `"X"` sentinel normalize to `""`. Unrecognised input
/// is returned trimmed but otherwise unchanged.
pub fn normalize_date(raw: &str, today: NaiveDate) -> String {
    let value = raw.trim();
    if value.is_empty() || value == NO_DATE {
        return String::new();
    }

    if let Some(caps) = compact_re().captures(value) {
        return format!("{}-{}-{}", &caps[1], &caps[2], &caps[3]);
    }

    if let Some(caps) = full_date_re()
        .captures(value)
        .or_else(|| full_date_prefix_re().captures(value))
    {
        return format!("{}-{}-{}", &caps[1], pad2(&caps[2]), pad2(&caps[3]));
    }

    if let Some(caps) = short_year_re().captures(value) {
        return format!("20{}-{}-{}", &caps[1], pad2(&caps[2]), pad2(&caps[3]));
    }

    if let Some(caps) = month_day_re().captures(value) {
        let month = pad2(&caps[1]);
        let day = pad2(&caps[2]);
        return format!("{}-{}-{}", infer_year(&month, &day, today), month, day);
    }

    value.to_string()
}

/// Format a timestamp from the persistence layer through its own calendar
/// accessor (`Datelike`), e.g. a `DateTime<Utc>` or `NaiveDateTime`.
pub fn normalize_timestamp<D: Datelike>(value: &D) -> String {
    format!("{:04}-{:02}-{:02}", value.year(), value.month(), value.day())
}

/// Read a stored date field as a calendar date.
///
/// Goes through [`normalize_date`] first, so any accepted spelling works.
/// Returns `None` for absence markers and anything unparseable.
pub fn parse_calendar_date(value: &str, today: NaiveDate) -> Option<NaiveDate> {
    let normalized = normalize_date(value, today);
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").ok()
}

/// Whole days elapsed from midnight of `since` to `now`, rounded up.
///
/// Negative when `since` is after `now`. The overdue rule in both the status
/// classifier and the dashboard uses this, so their answers always agree.
pub fn elapsed_days(since: NaiveDate, now: NaiveDateTime) -> i64 {
    let start = since.and_time(NaiveTime::MIN);
    let millis = (now - start).num_milliseconds();
    ceil_div(millis, MILLIS_PER_DAY)
}

/// `date` shifted back by `days`.
pub fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    date - Duration::days(days)
}

fn infer_year(month: &str, day: &str, today: NaiveDate) -> i32 {
    let year = today.year();
    let candidate = month
        .parse::<u32>()
        .ok()
        .zip(day.parse::<u32>().ok())
        .and_then(|(m, d)| NaiveDate::from_ymd_opt(year, m, d));

    match candidate {
        Some(date) if date > today => year - 1,
        _ => year,
    }
}

fn pad2(value: &str) -> String {
    format!("{:0>2}", value)
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    let quotient = value / divisor;
    if value % divisor > 0 {
        quotient + 1
    } else {
        quotient
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_canonical_is_idempotent() {
        assert_eq!(normalize_date("2024-01-05", today()), "2024-01-05");
        let once = normalize_date("2024.1.5", today());
        assert_eq!(normalize_date(&once, today()), once);
    }

    #[test]
    fn test_korean_and_short_year_spellings() {
        assert_eq!(normalize_date("24.1.5", today()), "2024-01-05");
        assert_eq!(normalize_date("2024년 1월 5일", today()), "2024-01-05");
        assert_eq!(normalize_date("2024년1월5일", today()), "2024-01-05");
    }

    #[test]
    fn test_compact_and_separators() {
        assert_eq!(normalize_date("20240105", today()), "2024-01-05");
        assert_eq!(normalize_date("2024/1/5", today()), "2024-01-05");
        assert_eq!(normalize_date("2024 01 05", today()), "2024-01-05");
        assert_eq!(normalize_date(" 2024.12.31 ", today()), "2024-12-31");
    }

    #[test]
    fn test_full_date_with_trailing_text() {
        assert_eq!(normalize_date("2024-01-05 (금)", today()), "2024-01-05");
        assert_eq!(normalize_date("2024-01-05T10:00:00", today()), "2024-01-05");
    }

    #[test]
    fn test_month_day_assumes_current_year() {
        assert_eq!(normalize_date("3월 2일", today()), "2024-03-02");
        assert_eq!(normalize_date("6/15", today()), "2024-06-15");
    }

    #[test]
    fn test_month_day_rolls_back_future_dates() {
        let january = NaiveDate::from_ymd_opt(2025, 1, 3).unwrap();

        assert_eq!(normalize_date("12월 28일", january), "2024-12-28");
        assert_eq!(normalize_date("1/3", january), "2025-01-03");
        assert_eq!(normalize_date("1/4", january), "2024-01-04");
    }

    #[test]
    fn test_sentinels_and_passthrough() {
        assert_eq!(normalize_date("X", today()), "");
        assert_eq!(normalize_date("", today()), "");
        assert_eq!(normalize_date("   ", today()), "");
        assert_eq!(normalize_date("미정", today()), "미정");
        assert_eq!(normalize_date("2024", today()), "2024");
    }

    #[test]
    fn test_non_ascii_digits_pass_through() {
        assert_eq!(normalize_date("２０２４.1.5", today()), "２０２４.1.5");
        assert_eq!(normalize_date("２０２４０１０５", today()), "２０２４０１０５");
        assert_eq!(normalize_date("١/٥", today()), "١/٥");
        assert_eq!(parse_calendar_date("２０２４.1.5", today()), None);
    }

    #[test]
    fn test_normalize_timestamp() {
        let stamp = Utc.with_ymd_and_hms(2024, 3, 7, 23, 59, 0).unwrap();
        assert_eq!(normalize_timestamp(&stamp), "2024-03-07");
        assert_eq!(normalize_timestamp(&stamp.date_naive()), "2024-03-07");
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(
            parse_calendar_date("2024.1.5", today()),
            NaiveDate::from_ymd_opt(2024, 1, 5)
        );
        assert_eq!(parse_calendar_date("X", today()), None);
        assert_eq!(parse_calendar_date("2024-13-40", today()), None);
        assert_eq!(parse_calendar_date("someday", today()), None);
    }

    #[test]
    fn test_elapsed_days_rounds_up() {
        let check = NaiveDate::from_ymd_opt(2024, 5, 16).unwrap();
        let midnight = today().and_time(NaiveTime::MIN);
        let noon = today().and_hms_opt(12, 0, 0).unwrap();

        assert_eq!(elapsed_days(check, midnight), 30);
        assert_eq!(elapsed_days(check, noon), 31);
        assert_eq!(elapsed_days(today(), midnight), 0);
        assert!(elapsed_days(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(), midnight) < 0);
        assert_eq!(days_before(today(), 30), check);
    }
}
