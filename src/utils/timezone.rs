use chrono::{DateTime, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

/// Parse an IANA timezone name, falling back to UTC when unknown
pub fn parse_timezone(name: &str) -> Tz {
    name.trim().parse::<Tz>().unwrap_or_else(|_| {
        warn!("⚠️  Unknown timezone '{}', reports will use UTC", name);
        Tz::UTC
    })
}

/// Instant of local midnight on `date` in `tz`.
///
/// Where midnight does not exist (DST gap) the first valid instant of the day is used.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            // Clocks jumped forward over midnight; walk forward to the first valid minute
            (1..=180)
                .find_map(|minutes| {
                    let candidate = midnight + chrono::Duration::minutes(minutes);
                    tz.from_local_datetime(&candidate).earliest()
                })
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_timezone_parses() {
        assert_eq!(parse_timezone("Asia/Bangkok"), chrono_tz::Asia::Bangkok);
        assert_eq!(parse_timezone(" UTC "), Tz::UTC);
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_utc() {
        assert_eq!(parse_timezone("Mars/Olympus"), Tz::UTC);
    }

    #[test]
    fn test_bangkok_midnight_is_seven_hours_before_utc_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let midnight = local_midnight(date, chrono_tz::Asia::Bangkok);
        assert_eq!(midnight, Utc.with_ymd_and_hms(2024, 6, 14, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_midnight_inside_dst_gap_moves_forward() {
        // Santiago skipped 00:00-01:00 on 2023-09-03
        let date = NaiveDate::from_ymd_opt(2023, 9, 3).unwrap();
        let start = local_midnight(date, chrono_tz::America::Santiago);
        assert_eq!(start, Utc.with_ymd_and_hms(2023, 9, 3, 4, 0, 0).unwrap());
    }
}
