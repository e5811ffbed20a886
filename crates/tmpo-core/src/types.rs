//! Input validation shared by the command layer.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Validation errors for user-supplied values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Hourly rates must not be negative.
    #[error("hourly rate cannot be negative, got {value}")]
    NegativeHourlyRate { value: f64 },

    #[error("hourly rate must be a finite number, got {value}")]
    NonFiniteHourlyRate { value: f64 },

    /// The hourly rate could not be parsed as a number.
    #[error("invalid hourly rate: {value}")]
    InvalidHourlyRate { value: String },

    /// The end of a time range is not after its start.
    #[error("end time must be after start time")]
    EndNotAfterStart,

    #[error("invalid timezone {value:?}: {reason}")]
    InvalidTimezone { value: String, reason: &'static str },
}

/// Abbreviations accepted as a timezone besides `Region/City` names.
const TIMEZONE_ABBREVIATIONS: [&str; 6] = ["UTC", "GMT", "EST", "PST", "MST", "CST"];

/// Trims a project or milestone name and rejects empty values.
pub fn validate_name(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_string())
}

pub fn validate_hourly_rate(value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteHourlyRate { value });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeHourlyRate { value });
    }
    Ok(value)
}

/// Parses an hourly rate typed by the user. Empty input means "no rate".
pub fn parse_hourly_rate(input: &str) -> Result<Option<f64>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let value: f64 = input
        .parse()
        .map_err(|_| ValidationError::InvalidHourlyRate {
            value: input.to_string(),
        })?;
    validate_hourly_rate(value).map(Some)
}

/// Checks a timezone setting: a common abbreviation or an IANA `Region/City`
/// name. Blank input means the local zone and yields `None`.
pub fn validate_timezone(input: &str) -> Result<Option<String>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let invalid = |reason| ValidationError::InvalidTimezone {
        value: input.to_string(),
        reason,
    };
    if TIMEZONE_ABBREVIATIONS
        .iter()
        .any(|abbr| abbr.eq_ignore_ascii_case(input))
    {
        return Ok(Some(input.to_ascii_uppercase()));
    }
    if !input.contains('/') {
        return Err(invalid("use Region/City (e.g., America/New_York) or UTC"));
    }
    if input.contains(char::is_whitespace) {
        return Err(invalid("use underscores instead of spaces"));
    }
    Ok(Some(input.to_string()))
}

/// Requires `end` to be strictly after `start`.
pub fn validate_time_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if end <= start {
        return Err(ValidationError::EndNotAfterStart);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    #[test]
    fn validate_name_trims_and_rejects_empty() {
        assert_eq!(validate_name("project name", "  api  ").unwrap(), "api");
        assert_eq!(
            validate_name("project name", "   "),
            Err(ValidationError::Empty {
                field: "project name"
            })
        );
    }

    #[test]
    fn negative_hourly_rate_rejected() {
        assert!(validate_hourly_rate(0.0).is_ok());
        assert!(validate_hourly_rate(75.5).is_ok());
        assert!(matches!(
            validate_hourly_rate(-1.0),
            Err(ValidationError::NegativeHourlyRate { .. })
        ));
    }

    #[test]
    fn non_finite_hourly_rate_rejected() {
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            assert!(matches!(
                validate_hourly_rate(value),
                Err(ValidationError::NonFiniteHourlyRate { .. })
            ));
        }
        assert!(parse_hourly_rate("inf").is_err());
        assert!(parse_hourly_rate("1e400").is_err());
    }

    #[test]
    fn timezone_accepts_abbreviations_and_region_names() {
        assert_eq!(validate_timezone("  ").unwrap(), None);
        assert_eq!(validate_timezone("utc").unwrap().as_deref(), Some("UTC"));
        assert_eq!(
            validate_timezone(" Europe/London ").unwrap().as_deref(),
            Some("Europe/London")
        );
        assert!(matches!(
            validate_timezone("London"),
            Err(ValidationError::InvalidTimezone { .. })
        ));
        assert!(validate_timezone("America/New York").is_err());
    }

    #[test]
    fn parse_hourly_rate_handles_empty_and_garbage() {
        assert_eq!(parse_hourly_rate("").unwrap(), None);
        assert_eq!(parse_hourly_rate(" 50 ").unwrap(), Some(50.0));
        assert!(matches!(
            parse_hourly_rate("fifty"),
            Err(ValidationError::InvalidHourlyRate { .. })
        ));
        assert!(parse_hourly_rate("-5").is_err());
    }

    #[test]
    fn time_range_requires_strictly_later_end() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert!(validate_time_range(start, end).is_ok());
        assert_eq!(
            validate_time_range(start, start),
            Err(ValidationError::EndNotAfterStart)
        );
        assert_eq!(
            validate_time_range(end, start),
            Err(ValidationError::EndNotAfterStart)
        );
    }
}
