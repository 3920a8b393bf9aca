//! The date separating past events from upcoming ones.

use chrono_tz::Tz;
use time::{Date, OffsetDateTime};

use crate::util::timezone;

pub trait PastEventCutoff: Send + Sync {
    /// Events starting on or after this date are upcoming.
    fn cutoff(&self) -> Date;
}

/// Today's date in the portal's time zone.
#[derive(Debug, Clone, Copy)]
pub struct SystemCutoff {
    timezone: Tz,
}

impl SystemCutoff {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl PastEventCutoff for SystemCutoff {
    fn cutoff(&self) -> Date {
        timezone::localized_date(OffsetDateTime::now_utc(), self.timezone)
    }
}

/// A pinned reference date, for previews and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedCutoff(pub Date);

impl PastEventCutoff for FixedCutoff {
    fn cutoff(&self) -> Date {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn fixed_cutoff_is_stable() {
        let cutoff = FixedCutoff(date!(2020 - 03 - 05));
        assert_eq!(cutoff.cutoff(), date!(2020 - 03 - 05));
    }

    #[test]
    fn system_cutoff_tracks_the_zone_date() {
        let utc_today = OffsetDateTime::now_utc().date();
        let cutoff = SystemCutoff::new(chrono_tz::UTC).cutoff();
        // Allow for the test straddling midnight.
        assert!(cutoff == utc_today || cutoff == utc_today.next_day().unwrap_or(utc_today));
    }
}
