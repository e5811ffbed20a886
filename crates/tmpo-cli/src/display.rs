//! Plain-text formatting shared by commands.

use std::fmt;
use std::io::{self, Write};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use tmpo_core::{RangeMismatch, format_currency};

use crate::Config;

pub const SEPARATOR: &str = "─────────────────────────────────────────";

/// Formats a duration as `1h 2m 3s`, `2m 3s` or `3s`.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// Writes an indented `Label: value` line.
pub fn info<W: Write>(writer: &mut W, label: &str, value: impl fmt::Display) -> io::Result<()> {
    writeln!(writer, "    {label}: {value}")
}

/// Renders instants in a time zone (local by default) using the configured formats.
#[derive(Debug, Clone, Copy)]
pub struct Formatter<'a, Tz: TimeZone = Local> {
    config: &'a Config,
    tz: Tz,
}

impl<'a> Formatter<'a> {
    pub const fn new(config: &'a Config) -> Self {
        Self { config, tz: Local }
    }
}

impl<'a, Tz> Formatter<'a, Tz>
where
    Tz: TimeZone + Copy,
    Tz::Offset: fmt::Display,
{
    pub const fn with_tz(config: &'a Config, tz: Tz) -> Self {
        Self { config, tz }
    }

    pub fn local(self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    /// e.g. `Monday, January 15, 2024`.
    pub fn date_long(self, instant: DateTime<Utc>) -> String {
        self.local(instant).format("%A, %B %-d, %Y").to_string()
    }

    /// Date in the configured input layout, e.g. `01-15-2024`.
    pub fn date(self, instant: DateTime<Utc>) -> String {
        self.config.date_format.format(self.local(instant).date_naive())
    }

    pub fn time(self, instant: DateTime<Utc>) -> String {
        self.config.time_format.format(&self.local(instant))
    }

    pub fn time_padded(self, instant: DateTime<Utc>) -> String {
        self.config.time_format.format_padded(&self.local(instant))
    }

    pub fn date_time(self, instant: DateTime<Utc>) -> String {
        format!("{} {}", self.date(instant), self.time(instant))
    }

    pub fn money(self, amount: f64) -> String {
        format_currency(amount, &self.config.currency)
    }

    /// Explains why an entry starting at `start` falls outside a milestone.
    pub fn range_mismatch(self, mismatch: RangeMismatch, start: DateTime<Utc>) -> String {
        match mismatch {
            RangeMismatch::BeforeStart { milestone_start } => format!(
                "Entry starts ({}) before milestone began ({})",
                self.date_time(start),
                self.date_time(milestone_start)
            ),
            RangeMismatch::AfterEnd { milestone_end } => format!(
                "Entry starts ({}) after milestone ended ({})",
                self.date_time(start),
                self.date_time(milestone_end)
            ),
        }
    }
}
