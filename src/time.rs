//! Hotel-local time handling. The property operates on fixed UTC+8 wall
//! clocks; every instant is stored and compared as UTC and only rendered
//! in the local offset at the edges.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Timelike, TimeZone, Utc};

fn hotel_offset() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).expect("UTC+8 is a valid offset")
}

/// Parses a local `YYYY-MM-DDTHH:MM` (optionally with seconds) wall-clock
/// string into a UTC instant, truncated to the minute. Malformed input and
/// impossible calendar values both yield `None`.
pub fn parse_local(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .ok()?
        .with_second(0)?
        .with_nanosecond(0)?;
    Some(
        hotel_offset()
            .from_local_datetime(&naive)
            .single()?
            .with_timezone(&Utc),
    )
}

pub fn add_hours(instant: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    instant + Duration::hours(hours)
}

/// Renders an instant for the staff console, e.g. `08/21/2026, 02:30 PM`.
pub fn format_display(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&hotel_offset())
        .format("%m/%d/%Y, %I:%M %p")
        .to_string()
}

/// Renders an instant back into the `YYYY-MM-DDTHH:MM` shape accepted by
/// [`parse_local`].
pub fn format_input(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&hotel_offset())
        .format("%Y-%m-%dT%H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_local_wall_clock_as_utc_plus_eight() {
        let parsed = parse_local("2026-08-21T14:30").unwrap();
        let expected = Utc.with_ymd_and_hms(2026, 8, 21, 6, 30, 0).unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn seconds_are_accepted_but_truncated() {
        assert_eq!(
            parse_local("2026-08-21T14:30:45"),
            parse_local("2026-08-21T14:30")
        );
    }

    #[test]
    fn rejects_impossible_calendar_values() {
        assert!(parse_local("2026-13-01T10:00").is_none());
        assert!(parse_local("2026-02-30T10:00").is_none());
        assert!(parse_local("2026-08-21T24:15").is_none());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_local("").is_none());
        assert!(parse_local("not-a-date").is_none());
        assert!(parse_local("2026-08-21 14:30").is_none());
    }

    #[test]
    fn add_hours_advances_the_instant() {
        let start = Utc.with_ymd_and_hms(2026, 8, 21, 6, 30, 0).unwrap();
        assert_eq!(
            add_hours(start, 5),
            Utc.with_ymd_and_hms(2026, 8, 21, 11, 30, 0).unwrap()
        );
    }

    #[test]
    fn round_trips_through_input_format_at_minute_precision() {
        let instant = Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(parse_local(&format_input(instant)), Some(instant));
    }

    #[test]
    fn display_format_uses_the_local_offset() {
        let instant = Utc.with_ymd_and_hms(2026, 8, 21, 6, 30, 0).unwrap();
        assert_eq!(format_display(instant), "08/21/2026, 02:30 PM");
        assert_eq!(format_input(instant), "2026-08-21T14:30");
    }
}
