//! Duration parsing for reminder requests
//!
//! Turns free text like `"3 days to walk the dog"` into an absolute fire
//! timestamp plus the cleaned message body. Months and years are fixed
//! multiples of a week, not calendar units; the same conversion is used for
//! the length cap and for display, so the two never disagree.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: One fixed-factor conversion for both the cap and display
//! - 1.1.0: Reject zero-length durations
//! - 1.0.0: Initial implementation

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Longest accepted duration, in whole days (2 years).
pub const MAX_DURATION_DAYS: i64 = 730;

const MINUTE_SECS: i64 = 60;
const HOUR_SECS: i64 = 60 * MINUTE_SECS;
const DAY_SECS: i64 = 24 * HOUR_SECS;
const WEEK_SECS: i64 = 7 * DAY_SECS;
// Fixed-factor approximations, not calendar months/years.
const MONTH_SECS: i64 = 4 * WEEK_SECS;
const YEAR_SECS: i64 = 52 * WEEK_SECS;

static UNIT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+(second|minute|hour|day|week|month|year)s?\b")
        .expect("unit token pattern is valid")
});

/// A time unit accepted by the parser. Anything else fails the match in
/// [`UNIT_TOKEN`], so unknown units never reach this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    fn from_token(token: &str) -> Option<TimeUnit> {
        match token.to_ascii_lowercase().as_str() {
            "second" => Some(TimeUnit::Second),
            "minute" => Some(TimeUnit::Minute),
            "hour" => Some(TimeUnit::Hour),
            "day" => Some(TimeUnit::Day),
            "week" => Some(TimeUnit::Week),
            "month" => Some(TimeUnit::Month),
            "year" => Some(TimeUnit::Year),
            _ => None,
        }
    }

    /// Singular display name.
    pub fn label(&self) -> &'static str {
        match self {
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Year => "year",
        }
    }

    fn seconds(&self) -> i64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Minute => MINUTE_SECS,
            TimeUnit::Hour => HOUR_SECS,
            TimeUnit::Day => DAY_SECS,
            TimeUnit::Week => WEEK_SECS,
            TimeUnit::Month => MONTH_SECS,
            TimeUnit::Year => YEAR_SECS,
        }
    }
}

/// User-input errors from duration parsing. Shown to the caller verbatim,
/// never retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("couldn't find a duration; try something like `10 minutes` or `3 days`")]
    NoDurationFound,
    #[error("{} was given more than once", .0.label())]
    DuplicateUnit(TimeUnit),
    #[error("that's too far out; reminders are capped at {MAX_DURATION_DAYS} days")]
    TooLong,
}

/// A parsed reminder request: when to fire, and what to say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DurationSpec {
    /// Absolute expiration instant, Unix seconds.
    pub fire_at: i64,
    /// Message text with the duration phrase removed.
    pub body: String,
}

impl DurationSpec {
    /// Parse free text containing `<count> <unit>` tokens interleaved with
    /// the message body. Each unit may appear at most once; the combined
    /// duration must be positive and no longer than [`MAX_DURATION_DAYS`]
    /// days.
    pub fn parse(input: &str, now: i64) -> Result<DurationSpec, DurationError> {
        let mut seen = [false; 7];
        let mut total_secs: i64 = 0;
        let mut span: Option<(usize, usize)> = None;

        for caps in UNIT_TOKEN.captures_iter(input) {
            let Some(whole) = caps.get(0) else { continue };
            let Some(unit) = TimeUnit::from_token(&caps[2]) else {
                continue;
            };
            if seen[unit as usize] {
                return Err(DurationError::DuplicateUnit(unit));
            }
            seen[unit as usize] = true;

            // A count too large for i64 is over any cap we'd accept.
            let count: i64 = caps[1].parse().unwrap_or(i64::MAX);
            total_secs = total_secs.saturating_add(count.saturating_mul(unit.seconds()));

            span = Some(match span {
                None => (whole.start(), whole.end()),
                Some((first, _)) => (first, whole.end()),
            });
        }

        let Some((first, last)) = span else {
            return Err(DurationError::NoDurationFound);
        };
        if total_secs == 0 {
            // A reminder must fire strictly after its creation.
            return Err(DurationError::NoDurationFound);
        }
        if total_secs / DAY_SECS > MAX_DURATION_DAYS {
            return Err(DurationError::TooLong);
        }

        Ok(DurationSpec {
            fire_at: now.saturating_add(total_secs),
            body: clean_body(&input[..first], &input[last..]),
        })
    }

    /// Rehydrate from storage with a known fire timestamp; no parsing.
    pub fn from_stored(fire_at: i64, body: impl Into<String>) -> DurationSpec {
        DurationSpec {
            fire_at,
            body: body.into(),
        }
    }
}

/// The body is whatever lies outside the span of duration tokens, with the
/// connective words of "remind me to X in Y" phrasing stripped.
fn clean_body(prefix: &str, suffix: &str) -> String {
    let prefix = prefix.trim();
    let suffix = suffix.trim();
    let combined = match (prefix.is_empty(), suffix.is_empty()) {
        (true, true) => String::new(),
        (false, true) => prefix.to_string(),
        (true, false) => suffix.to_string(),
        (false, false) => format!("{prefix} {suffix}"),
    };

    let mut body = combined.as_str();
    if let Some(rest) = body.strip_prefix("to ") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix(" in") {
        body = rest;
    }
    body.trim().to_string()
}

/// Human-readable span, largest units first: `"1 year 2 weeks 3 hours"`.
/// Uses the same fixed-factor month/year conversion as the parser.
pub fn format_span(total_secs: i64) -> String {
    if total_secs <= 0 {
        return "0 seconds".to_string();
    }

    const PARTS: [(i64, &str); 7] = [
        (YEAR_SECS, "year"),
        (MONTH_SECS, "month"),
        (WEEK_SECS, "week"),
        (DAY_SECS, "day"),
        (HOUR_SECS, "hour"),
        (MINUTE_SECS, "minute"),
        (1, "second"),
    ];

    let mut out = Vec::new();
    let mut rem = total_secs;
    for (size, label) in PARTS {
        let n = rem / size;
        if n > 0 {
            out.push(format!("{} {}{}", n, label, if n == 1 { "" } else { "s" }));
            rem %= size;
        }
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_parse_days_with_body() {
        let spec = DurationSpec::parse("3 days to walk the dog", NOW).unwrap();
        assert_eq!(spec.fire_at, NOW + 3 * DAY_SECS);
        assert_eq!(spec.body, "walk the dog");
    }

    #[test]
    fn test_parse_minutes_no_body() {
        let spec = DurationSpec::parse("10 minutes", NOW).unwrap();
        assert_eq!(spec.fire_at, NOW + 10 * MINUTE_SECS);
        assert_eq!(spec.body, "");
    }

    #[test]
    fn test_parse_body_before_duration() {
        let spec = DurationSpec::parse("feed the cat in 2 hours", NOW).unwrap();
        assert_eq!(spec.fire_at, NOW + 2 * HOUR_SECS);
        assert_eq!(spec.body, "feed the cat");
    }

    #[test]
    fn test_parse_combines_units() {
        let spec = DurationSpec::parse("1 hour 30 minutes tea", NOW).unwrap();
        assert_eq!(spec.fire_at, NOW + HOUR_SECS + 30 * MINUTE_SECS);
        assert_eq!(spec.body, "tea");
    }

    #[test]
    fn test_parse_singular_units() {
        let spec = DurationSpec::parse("1 week 1 day", NOW).unwrap();
        assert_eq!(spec.fire_at, NOW + WEEK_SECS + DAY_SECS);
    }

    #[test]
    fn test_duplicate_unit_rejected() {
        assert_eq!(
            DurationSpec::parse("5 days 5 days do X", NOW),
            Err(DurationError::DuplicateUnit(TimeUnit::Day))
        );
    }

    #[test]
    fn test_no_duration_rejected() {
        assert_eq!(
            DurationSpec::parse("do the thing", NOW),
            Err(DurationError::NoDurationFound)
        );
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert_eq!(
            DurationSpec::parse("0 seconds hurry", NOW),
            Err(DurationError::NoDurationFound)
        );
    }

    #[test]
    fn test_too_long_rejected() {
        assert_eq!(
            DurationSpec::parse("800 days wait", NOW),
            Err(DurationError::TooLong)
        );
    }

    #[test]
    fn test_two_years_is_within_cap() {
        // 2 years = 104 weeks = 728 days under the fixed-factor model.
        let spec = DurationSpec::parse("2 years", NOW).unwrap();
        assert_eq!(spec.fire_at, NOW + 2 * YEAR_SECS);
    }

    #[test]
    fn test_huge_count_rejected_not_panicking() {
        assert_eq!(
            DurationSpec::parse("99999999999999999999 days nope", NOW),
            Err(DurationError::TooLong)
        );
    }

    #[test]
    fn test_months_and_years_are_fixed_factor() {
        let spec = DurationSpec::parse("1 month", NOW).unwrap();
        assert_eq!(spec.fire_at, NOW + 4 * WEEK_SECS);
        let spec = DurationSpec::parse("1 year", NOW).unwrap();
        assert_eq!(spec.fire_at, NOW + 52 * WEEK_SECS);
    }

    #[test]
    fn test_body_strips_to_and_in() {
        let spec = DurationSpec::parse("2 hours to stretch", NOW).unwrap();
        assert_eq!(spec.body, "stretch");
        let spec = DurationSpec::parse("stretch in 2 hours", NOW).unwrap();
        assert_eq!(spec.body, "stretch");
    }

    #[test]
    fn test_body_around_duration_is_joined() {
        let spec = DurationSpec::parse("call 2 hours the dentist", NOW).unwrap();
        assert_eq!(spec.body, "call the dentist");
    }

    #[test]
    fn test_from_stored_skips_parsing() {
        let spec = DurationSpec::from_stored(NOW + 60, "5 days 5 days not parsed");
        assert_eq!(spec.fire_at, NOW + 60);
        assert_eq!(spec.body, "5 days 5 days not parsed");
    }

    #[test]
    fn test_format_span() {
        assert_eq!(format_span(0), "0 seconds");
        assert_eq!(format_span(1), "1 second");
        assert_eq!(format_span(90), "1 minute 30 seconds");
        assert_eq!(format_span(HOUR_SECS), "1 hour");
        assert_eq!(format_span(DAY_SECS + HOUR_SECS), "1 day 1 hour");
        assert_eq!(format_span(YEAR_SECS), "1 year");
        assert_eq!(format_span(MONTH_SECS + WEEK_SECS), "1 month 1 week");
    }

    #[test]
    fn test_format_span_round_trips_parser_model() {
        // "1 year" parses to 52 weeks and displays as "1 year" again.
        let spec = DurationSpec::parse("1 year", NOW).unwrap();
        assert_eq!(format_span(spec.fire_at - NOW), "1 year");
    }
}
