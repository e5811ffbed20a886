//! Parsing of user-supplied dates and times.
//!
//! Dates come in one of three dashed layouts chosen in the global settings;
//! times are accepted in 12-hour (with meridiem) or 24-hour form. Everything is
//! interpreted in the local time zone.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Local, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Time layouts tried in order; the first that parses wins.
const TIME_LAYOUTS: [&str; 3] = ["%-I:%M %p", "%I:%M %p", "%H:%M"];

const TIME_HINT: &str = "use 12-hour (e.g., 9:30 AM) or 24-hour (e.g., 14:30)";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateTimeError {
    #[error("date cannot be empty")]
    EmptyDate,
    #[error("invalid date format, use {expected}")]
    InvalidDate { expected: &'static str },
    #[error("date cannot be in the future")]
    FutureDate,
    #[error("time cannot be empty")]
    EmptyTime,
    #[error("invalid time format, {TIME_HINT}")]
    InvalidTime,
    #[error("{0} does not exist in the local time zone")]
    NonexistentLocalTime(NaiveDateTime),
    #[error("invalid start datetime: {0}")]
    InvalidStart(Box<Self>),
    #[error("invalid end datetime: {0}")]
    InvalidEnd(Box<Self>),
    #[error("end time must be after start time")]
    EndNotAfterStart,
    #[error("unknown date format {0:?}, use MM/DD/YYYY, DD/MM/YYYY or YYYY-MM-DD")]
    UnknownDateFormat(String),
    #[error("unknown time format {0:?}, use 24-hour or 12-hour")]
    UnknownTimeFormat(String),
}

/// Layout used for date input and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum DateFormat {
    #[default]
    #[serde(rename = "MM/DD/YYYY")]
    MonthFirst,
    #[serde(rename = "DD/MM/YYYY")]
    DayFirst,
    #[serde(rename = "YYYY-MM-DD")]
    YearFirst,
}

impl DateFormat {
    /// Setting value as written to the config file.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MonthFirst => "MM/DD/YYYY",
            Self::DayFirst => "DD/MM/YYYY",
            Self::YearFirst => "YYYY-MM-DD",
        }
    }

    /// The dashed layout users type dates in.
    pub const fn input_hint(self) -> &'static str {
        match self {
            Self::MonthFirst => "MM-DD-YYYY",
            Self::DayFirst => "DD-MM-YYYY",
            Self::YearFirst => "YYYY-MM-DD",
        }
    }

    const fn layout(self) -> &'static str {
        match self {
            Self::MonthFirst => "%m-%d-%Y",
            Self::DayFirst => "%d-%m-%Y",
            Self::YearFirst => "%Y-%m-%d",
        }
    }

    /// Formats a date in this layout, suitable for feeding back into [`parse_date`].
    pub fn format(self, date: NaiveDate) -> String {
        date.format(self.layout()).to_string()
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateFormat {
    type Err = DateTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MM/DD/YYYY" | "MM-DD-YYYY" => Ok(Self::MonthFirst),
            "DD/MM/YYYY" | "DD-MM-YYYY" => Ok(Self::DayFirst),
            "YYYY-MM-DD" | "YYYY/MM/DD" => Ok(Self::YearFirst),
            _ => Err(DateTimeError::UnknownDateFormat(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for DateFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_setting(deserializer)
    }
}

/// Clock style used when displaying times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "12-hour")]
    TwelveHour,
    #[serde(rename = "24-hour")]
    TwentyFourHour,
}

impl TimeFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TwelveHour => "12-hour",
            Self::TwentyFourHour => "24-hour",
        }
    }

    /// Formats a time of day, e.g. `3:04 PM` or `15:04`.
    pub fn format<Tz: TimeZone>(self, instant: &DateTime<Tz>) -> String
    where
        Tz::Offset: fmt::Display,
    {
        match self {
            Self::TwelveHour => instant.format("%-I:%M %p").to_string(),
            Self::TwentyFourHour => instant.format("%H:%M").to_string(),
        }
    }

    /// Same as [`Self::format`] but fixed-width, for column output.
    pub fn format_padded<Tz: TimeZone>(self, instant: &DateTime<Tz>) -> String
    where
        Tz::Offset: fmt::Display,
    {
        match self {
            Self::TwelveHour => format!("{:>8}", instant.format("%-I:%M %p").to_string()),
            Self::TwentyFourHour => instant.format("%H:%M").to_string(),
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFormat {
    type Err = DateTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "12-hour" | "12" | "12h" | "12-hour (am/pm)" => Ok(Self::TwelveHour),
            "24-hour" | "24" | "24h" => Ok(Self::TwentyFourHour),
            _ => Err(DateTimeError::UnknownTimeFormat(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for TimeFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_setting(deserializer)
    }
}

/// Reads a setting label through its `FromStr` impl. Bare numbers such as
/// `24` are taken as their decimal text.
fn deserialize_setting<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = DateTimeError>,
{
    struct Label;

    impl Visitor<'_> for Label {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a format label")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer
        .deserialize_any(Label)?
        .parse()
        .map_err(de::Error::custom)
}

/// Parses a time of day such as `9:30 AM`, `09:30 pm` or `14:30`.
pub fn parse_time(input: &str) -> Result<NaiveTime, DateTimeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DateTimeError::EmptyTime);
    }
    let normalized = input.to_ascii_uppercase();
    TIME_LAYOUTS
        .iter()
        .find_map(|layout| NaiveTime::parse_from_str(&normalized, layout).ok())
        .ok_or(DateTimeError::InvalidTime)
}

pub fn parse_date(input: &str, format: DateFormat) -> Result<NaiveDate, DateTimeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DateTimeError::EmptyDate);
    }
    NaiveDate::parse_from_str(input, format.layout()).map_err(|_| DateTimeError::InvalidDate {
        expected: format.input_hint(),
    })
}

/// Parses a date and rejects anything more than 24 hours after `now`.
pub fn validate_date(
    input: &str,
    format: DateFormat,
    now: DateTime<Local>,
) -> Result<NaiveDate, DateTimeError> {
    let date = parse_date(input, format)?;
    let midnight = resolve_local(&Local, date.and_time(NaiveTime::MIN))?;
    if midnight > now + TimeDelta::hours(24) {
        return Err(DateTimeError::FutureDate);
    }
    Ok(date)
}

/// Combines a date and a time string into a local timestamp.
pub fn parse_date_time(
    date: &str,
    time: &str,
    format: DateFormat,
) -> Result<DateTime<Local>, DateTimeError> {
    parse_date_time_in(&Local, date, time, format)
}

/// Like [`parse_date_time`], in an explicit time zone.
pub fn parse_date_time_in<Tz: TimeZone>(
    tz: &Tz,
    date: &str,
    time: &str,
    format: DateFormat,
) -> Result<DateTime<Tz>, DateTimeError> {
    let date = parse_date(date, format)?;
    let time = parse_time(time)?;
    resolve_local(tz, date.and_time(time))
}

/// Parses both ends of a range and requires `end > start`.
pub fn validate_end_date_time(
    start_date: &str,
    start_time: &str,
    end_date: &str,
    end_time: &str,
    format: DateFormat,
) -> Result<(DateTime<Local>, DateTime<Local>), DateTimeError> {
    let start = parse_date_time(start_date, start_time, format)
        .map_err(|err| DateTimeError::InvalidStart(Box::new(err)))?;
    let end = parse_date_time(end_date, end_time, format)
        .map_err(|err| DateTimeError::InvalidEnd(Box::new(err)))?;
    if end <= start {
        return Err(DateTimeError::EndNotAfterStart);
    }
    Ok((start, end))
}

/// Maps a wall-clock time to an instant, taking the earlier one on DST fall-back.
pub fn resolve_local<Tz: TimeZone>(
    tz: &Tz,
    naive: NaiveDateTime,
) -> Result<DateTime<Tz>, DateTimeError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt),
        LocalResult::None => Err(DateTimeError::NonexistentLocalTime(naive)),
    }
}
