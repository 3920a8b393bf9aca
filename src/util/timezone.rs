use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use time::{Date, Month, OffsetDateTime, UtcOffset};

/// Calendar date of `time` as observed in `tz`.
pub fn localized_date(time: OffsetDateTime, tz: Tz) -> Date {
    let utc = time.to_offset(UtcOffset::UTC);
    let Some(datetime_utc) = DateTime::<Utc>::from_timestamp(utc.unix_timestamp(), utc.nanosecond())
    else {
        return utc.date();
    };

    let localized = datetime_utc.with_timezone(&tz);
    let month = u8::try_from(localized.month())
        .ok()
        .and_then(|month| Month::try_from(month).ok());
    let day = u8::try_from(localized.day()).ok();

    match (month, day) {
        (Some(month), Some(day)) => {
            Date::from_calendar_date(localized.year(), month, day).unwrap_or(utc.date())
        }
        _ => utc.date(),
    }
}

pub fn parse_timezone(name: &str) -> Result<Tz, String> {
    Tz::from_str(name.trim()).map_err(|err| format!("unknown time zone `{name}`: {err}"))
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    #[test]
    fn date_shifts_with_zone() {
        let late_utc = datetime!(2020-03-05 23:30 UTC);
        assert_eq!(localized_date(late_utc, chrono_tz::UTC), date!(2020 - 03 - 05));
        assert_eq!(
            localized_date(late_utc, chrono_tz::Europe::Berlin),
            date!(2020 - 03 - 06)
        );
        assert_eq!(
            localized_date(late_utc, chrono_tz::America::Los_Angeles),
            date!(2020 - 03 - 05)
        );
    }

    #[test]
    fn parse_rejects_unknown_zone() {
        assert_eq!(parse_timezone("Europe/Paris"), Ok(chrono_tz::Europe::Paris));
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
