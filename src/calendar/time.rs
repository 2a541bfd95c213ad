use chrono::{Duration, NaiveDateTime};

use crate::error::{AideError, AideResult};

pub const HUMAN_TIME_FORMAT: &str = "%d-%m-%Y %H-%M";
/// Local date-time as sent to the calendar API alongside a `timeZone`.
pub const API_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse `DD-MM-YYYY HH-MM`, e.g. `16-10-2026 09-30`.
pub fn parse_human_time(input: &str) -> AideResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), HUMAN_TIME_FORMAT).map_err(|_| {
        AideError::InvalidFormat(format!(
            "invalid time \"{input}\", expected DD-MM-YYYY HH-MM"
        ))
    })
}

/// Parse `<N>h` or `<N>m`, e.g. `2h`, `45m`.
pub fn parse_duration(input: &str) -> AideResult<Duration> {
    let input = input.trim();
    let invalid = || AideError::InvalidFormat(format!("invalid duration \"{input}\", expected <N>h or <N>m"));

    let (number, to_duration): (&str, fn(i64) -> Option<Duration>) =
        if let Some(hours) = input.strip_suffix(['h', 'H']) {
            (hours, Duration::try_hours)
        } else if let Some(minutes) = input.strip_suffix(['m', 'M']) {
            (minutes, Duration::try_minutes)
        } else {
            return Err(invalid());
        };
    let amount: i64 = number.parse().map_err(|_| invalid())?;
    if amount <= 0 {
        return Err(invalid());
    }
    to_duration(amount).ok_or_else(invalid)
}

/// Resolve an event's end: explicit end, else start + duration, else start + fallback.
pub fn resolve_end(
    start: NaiveDateTime,
    end_time: Option<&str>,
    duration: Option<&str>,
    fallback: &str,
) -> AideResult<NaiveDateTime> {
    let end = match (end_time, duration) {
        (Some(end), _) => parse_human_time(end)?,
        (None, duration) => {
            let duration = duration.unwrap_or(fallback);
            start
                .checked_add_signed(parse_duration(duration)?)
                .ok_or_else(|| AideError::InvalidFormat(format!("duration \"{duration}\" is out of range")))?
        }
    };
    if end <= start {
        return Err(AideError::InvalidFormat("event end must be after its start".into()));
    }
    Ok(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_human_time() {
        let t = parse_human_time("16-10-2026 09-30").unwrap();
        assert_eq!(t.format(API_TIME_FORMAT).to_string(), "2026-10-16T09:30:00");
    }

    #[test]
    fn rejects_iso_time() {
        assert!(matches!(
            parse_human_time("2026-10-16T09:30"),
            Err(AideError::InvalidFormat(_))
        ));
    }

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("2h").unwrap(), Duration::hours(2));
        assert_eq!(parse_duration("45m").unwrap(), Duration::minutes(45));
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("10s").is_err());
        assert!(parse_duration("0m").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn non_ascii_durations_are_rejected() {
        for input in ["2é", "3ч", "ч", "1hé", "é5m", "99999999999999999h"] {
            assert!(
                matches!(parse_duration(input), Err(AideError::InvalidFormat(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn end_resolution_prefers_explicit_end() {
        let start = parse_human_time("01-01-2026 10-00").unwrap();
        let end = resolve_end(start, Some("01-01-2026 12-00"), Some("30m"), "1h").unwrap();
        assert_eq!(end, parse_human_time("01-01-2026 12-00").unwrap());
        let end = resolve_end(start, None, Some("30m"), "1h").unwrap();
        assert_eq!(end - start, Duration::minutes(30));
        let end = resolve_end(start, None, None, "1h").unwrap();
        assert_eq!(end - start, Duration::hours(1));
        assert!(resolve_end(start, Some("01-01-2026 09-00"), None, "1h").is_err());
        assert!(resolve_end(start, None, Some("2000000000h"), "1h").is_err());
    }
}
