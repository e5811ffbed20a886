//! Calendar periods used by the `--today` and `--week` filters.

use chrono::{
    DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    /// Monday through Sunday of the current week.
    Week,
}

impl Period {
    /// Heading shown above period stats.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Week => "This Week",
        }
    }

    /// Inclusive `[start, end]` bounds of the period containing `now`, in local time.
    pub fn bounds(self, now: DateTime<Local>) -> (DateTime<Utc>, DateTime<Utc>) {
        self.bounds_in(&Local, now.date_naive())
    }

    /// Inclusive bounds for the period containing `today` in `tz`.
    ///
    /// The end is one millisecond before the next period starts, so an entry
    /// starting at the following midnight is excluded.
    pub fn bounds_in<Tz: TimeZone>(self, tz: &Tz, today: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let (first, next) = match self {
            Self::Today => (today, today + TimeDelta::days(1)),
            Self::Week => {
                let monday =
                    today - TimeDelta::days(i64::from(today.weekday().num_days_from_monday()));
                (monday, monday + TimeDelta::days(7))
            }
        };
        let start = midnight_to_utc(tz, first);
        let end = midnight_to_utc(tz, next) - TimeDelta::milliseconds(1);
        (start, end)
    }
}

/// Converts a date at local midnight to UTC.
/// DST ambiguity resolves to the earlier instant; a skipped midnight moves to 1am.
fn midnight_to_utc<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let resolve = |time: NaiveTime| match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.with_timezone(&Utc)),
        LocalResult::None => None,
    };
    resolve(NaiveTime::MIN)
        .or_else(|| resolve(NaiveTime::from_hms_opt(1, 0, 0).unwrap_or(NaiveTime::MIN)))
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN).and_utc())
}
