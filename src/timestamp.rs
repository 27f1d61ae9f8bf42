use chrono::{DateTime, Local, TimeZone, Timelike};
use std::fmt::Display;

/// Render `at` as `YYYY-MM-DDTHH:MM:SS.ffffff±hhmm`.
///
/// A leap second renders as second `60` with its own sub-second part.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let micros = (at.nanosecond() % 1_000_000_000) / 1_000;
    format!(
        "{}.{:06}{}",
        at.format("%Y-%m-%dT%H:%M:%S"),
        micros,
        at.format("%z")
    )
}

/// Current wall-clock time in the process's local timezone.
pub fn local_timestamp() -> String {
    format_timestamp(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(offset_secs: i32, nanos: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_secs)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 15, 10, 30, 0)
            .unwrap()
            .with_nanosecond(nanos)
            .unwrap()
    }

    #[test]
    fn renders_microseconds_and_offset() {
        assert_eq!(
            format_timestamp(&at(0, 123_456_789)),
            "2024-01-15T10:30:00.123456+0000"
        );
    }

    #[test]
    fn zero_pads_microseconds() {
        assert_eq!(
            format_timestamp(&at(3600, 42_000)),
            "2024-01-15T10:30:00.000042+0100"
        );
    }

    #[test]
    fn negative_sub_hour_offsets_keep_their_sign() {
        assert_eq!(
            format_timestamp(&at(-(5 * 3600 + 30 * 60), 0)),
            "2024-01-15T10:30:00.000000-0530"
        );
        assert_eq!(
            format_timestamp(&at(-30 * 60, 0)),
            "2024-01-15T10:30:00.000000-0030"
        );
    }

    #[test]
    fn local_timestamp_has_expected_shape() {
        let re = regex::Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{6}[+-]\d{4}$").unwrap();
        assert!(re.is_match(&local_timestamp()));
    }
}
