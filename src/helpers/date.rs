//! Date helper functions

use chrono::{DateTime, FixedOffset, Locale, TimeZone, Utc};

/// Parse a publication timestamp as sent by the content API
///
/// Accepts RFC 3339 (`2021-03-25T19:25:28+00:00`) and the colon-less offset
/// form the API actually emits (`2021-03-25T19:25:28+0000`).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::<FixedOffset>::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::<FixedOffset>::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|d| d.with_timezone(&Utc))
        .ok()
}

/// Format a date using a date-fns/Unicode pattern in the given locale
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMM yyyy", Locale::pt_BR) // -> "25 mar 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, pattern: &str, locale: Locale) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = unicode_to_chrono_format(pattern);
    date.format_localized(&chrono_format, locale).to_string()
}

/// Convert a date-fns/Unicode pattern to chrono format
fn unicode_to_chrono_format(pattern: &str) -> String {
    // Longest tokens first within each field
    let replacements = [
        // Year
        ("yyyy", "%Y"),
        ("yy", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        // Day of month
        ("dd", "%d"),
        // Hour
        ("HH", "%H"),
        ("hh", "%I"),
        // Minute (after MM has been consumed)
        ("mm", "%M"),
        // Second
        ("ss", "%S"),
        // Day of week
        ("EEEE", "%A"),
        ("EEE", "%a"),
    ];

    let mut result = pattern.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
