//! Display formatting for course and booking instants.
//!
//! All comparisons happen on UTC instants; only rendering uses the display
//! offset.

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::{BookingError, Result};

/// The formats are tied to their screens and are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `3月5日 08:00`
    CourseList,
    /// `2025-03-05 08:00`
    Detail,
    /// `03-05 08:00`
    BookingList,
}

impl TimeFormat {
    const fn pattern(self) -> &'static str {
        match self {
            Self::CourseList => "%-m月%-d日 %H:%M",
            Self::Detail => "%Y-%m-%d %H:%M",
            Self::BookingList => "%m-%d %H:%M",
        }
    }
}

pub fn format_time(instant: DateTime<Utc>, mode: TimeFormat, offset: FixedOffset) -> String {
    instant
        .with_timezone(&offset)
        .format(mode.pattern())
        .to_string()
}

pub fn format_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    mode: TimeFormat,
    offset: FixedOffset,
) -> String {
    format!(
        "{} - {}",
        format_time(start, mode, offset),
        format_time(end, mode, offset)
    )
}

/// Parse `+08:00`, `-0530`, `+8` or `Z` into a fixed offset.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset> {
    let invalid = || BookingError::Config(format!("Invalid UTC offset '{s}'"));
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    if !rest.is_ascii() {
        return Err(invalid());
    }

    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() == 4 => rest.split_at(2),
        None => (rest, "0"),
    };

    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn beijing() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    fn instant() -> DateTime<Utc> {
        // 2025-03-05 08:05 in UTC+8
        Utc.with_ymd_and_hms(2025, 3, 5, 0, 5, 0).unwrap()
    }

    #[test]
    fn test_course_list_format_has_no_padding_or_year() {
        assert_eq!(
            format_time(instant(), TimeFormat::CourseList, beijing()),
            "3月5日 08:05"
        );
    }

    #[test]
    fn test_detail_format_has_year() {
        assert_eq!(
            format_time(instant(), TimeFormat::Detail, beijing()),
            "2025-03-05 08:05"
        );
    }

    #[test]
    fn test_booking_list_format_is_padded_without_year() {
        assert_eq!(
            format_time(instant(), TimeFormat::BookingList, beijing()),
            "03-05 08:05"
        );
    }

    #[test]
    fn test_offset_changes_rendered_day() {
        let late = Utc.with_ymd_and_hms(2025, 12, 31, 20, 0, 0).unwrap();
        assert_eq!(
            format_time(late, TimeFormat::Detail, beijing()),
            "2026-01-01 04:00"
        );
        assert_eq!(
            format_time(late, TimeFormat::Detail, FixedOffset::east_opt(0).unwrap()),
            "2025-12-31 20:00"
        );
    }

    #[test]
    fn test_format_range() {
        let end = instant() + chrono::Duration::minutes(90);
        assert_eq!(
            format_range(instant(), end, TimeFormat::CourseList, beijing()),
            "3月5日 08:05 - 3月5日 09:35"
        );
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+08:00").unwrap(), beijing());
        assert_eq!(parse_utc_offset("+0800").unwrap(), beijing());
        assert_eq!(parse_utc_offset("+8").unwrap(), beijing());
        assert_eq!(
            parse_utc_offset("-05:30").unwrap(),
            FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap()
        );
        assert_eq!(parse_utc_offset("Z").unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn test_parse_utc_offset_rejects_garbage() {
        assert!(parse_utc_offset("08:00").is_err());
        assert!(parse_utc_offset("+25:00").is_err());
        assert!(parse_utc_offset("+08:75").is_err());
        assert!(parse_utc_offset("+ab").is_err());
        assert!(parse_utc_offset("+aé1").is_err());
        assert!(parse_utc_offset("+８:00").is_err());
    }
}
