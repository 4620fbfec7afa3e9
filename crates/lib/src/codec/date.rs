//! ISO-8601 date handling for the `Date` wire tag.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeDelta, Utc};

fn iso_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(
            r"^([0-9]{1,4})-([0-9]{1,2})-([0-9]{1,2})T([0-9]{1,2}):([0-9]{1,2}):([0-9]{1,2})(.([0-9]+))?Z$",
        )
        .expect("date pattern is a valid regex")
    })
}

/// Parses a UTC timestamp of the form `YYYY-MM-DDThh:mm:ss[.sss]Z`.
///
/// Year, month, day, hour, minute and second take 1-4 and 1-2 digits
/// respectively. The fractional part is read as a whole number of
/// milliseconds. Returns `None` for anything that does not match or names an
/// impossible calendar instant.
pub fn parse_date(iso: &str) -> Option<DateTime<Utc>> {
    let caps = iso_regex().captures(iso)?;
    let field = |i: usize| -> Option<u32> { caps.get(i)?.as_str().parse().ok() };

    // Years are literal and out-of-range components are rejected, not rolled over.
    let year = field(1)? as i32;
    let date = NaiveDate::from_ymd_opt(year, field(2)?, field(3)?)?;
    let naive = date.and_hms_opt(field(4)?, field(5)?, field(6)?)?;

    let millis: i64 = match caps.get(8) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let naive = naive.checked_add_signed(TimeDelta::try_milliseconds(millis)?)?;
    Some(naive.and_utc())
}

/// Formats a timestamp as ISO-8601 UTC with millisecond precision.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}
