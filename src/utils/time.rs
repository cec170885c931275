use chrono::{Datelike, Duration, NaiveDate, ParseResult};

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a date to a day-key in focustime.
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

pub fn parse_day_key(key: &str) -> ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(key, DAY_KEY_FORMAT)
}

/// Returns the Monday starting the week `date` belongs to. Sunday belongs to the week that
/// started 6 days earlier.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Formats elapsed time as `<H>h <M>m <S>s`. Hours are not wrapped into days.
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.num_seconds().max(0);
    format!(
        "{}h {}m {}s",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::{day_key, format_elapsed, parse_day_key, week_start};

    #[test]
    fn test_day_key_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(day_key(date), "2024-03-04");
        assert_eq!(parse_day_key("2024-03-04").unwrap(), date);
        assert!(parse_day_key("04/03/2024").is_err());
    }

    #[test]
    fn test_week_start_for_every_weekday() {
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        for offset in 0..7 {
            assert_eq!(week_start(monday + Duration::days(offset)), monday);
        }
        // Sunday before belongs to the previous week.
        assert_eq!(
            week_start(monday - Duration::days(1)),
            NaiveDate::from_ymd_opt(2024, 2, 26).unwrap()
        );
    }

    #[test]
    fn test_week_start_across_year_boundary() {
        let wednesday = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(
            week_start(wednesday),
            NaiveDate::from_ymd_opt(2024, 12, 30).unwrap()
        );
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::zero()), "0h 0m 0s");
        assert_eq!(format_elapsed(Duration::seconds(65)), "0h 1m 5s");
        assert_eq!(format_elapsed(Duration::seconds(3600 * 26 + 61)), "26h 1m 1s");
    }
}
