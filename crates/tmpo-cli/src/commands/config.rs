//! Show or change global settings.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tmpo_core::types::validate_timezone;
use tmpo_core::{DateFormat, TimeFormat, validate_currency_code};

use crate::Config;
use crate::cli::ConfigArgs;
use crate::display::info;

const NOT_SET: &str = "(not set)";
const LOCAL_ZONE: &str = "(local)";

fn has_changes(args: &ConfigArgs) -> bool {
    args.currency.is_some()
        || args.date_format.is_some()
        || args.time_format.is_some()
        || args.export_path.is_some()
        || args.clear_export_path
        || args.timezone.is_some()
        || args.clear_timezone
}

/// Prints the settings, or applies and saves the given changes.
///
/// Changes are applied to the stored settings in `data_dir`, so values coming
/// from the environment or `--config` are not written back.
pub fn run<W: Write>(writer: &mut W, data_dir: &Path, args: &ConfigArgs) -> Result<()> {
    let mut config = Config::load_stored(data_dir).context("failed to load settings")?;

    if !has_changes(args) {
        writeln!(writer, "Global tmpo Configuration\n")?;
        writeln!(writer, "Current settings:")?;
        writeln!(writer, "  Currency:    {}", config.currency)?;
        writeln!(writer, "  Date format: {}", config.date_format)?;
        writeln!(writer, "  Time format: {}", config.time_format.as_str())?;
        writeln!(
            writer,
            "  Export path: {}",
            config.export_path.as_deref().unwrap_or(NOT_SET)
        )?;
        writeln!(
            writer,
            "  Timezone:    {}",
            config.timezone.as_deref().unwrap_or(LOCAL_ZONE)
        )?;
        return Ok(());
    }

    if let Some(currency) = &args.currency {
        config.currency = validate_currency_code(currency)?;
    }
    if let Some(format) = &args.date_format {
        config.date_format = format.parse::<DateFormat>()?;
    }
    if let Some(format) = &args.time_format {
        config.time_format = format.parse::<TimeFormat>()?;
    }
    if args.clear_export_path {
        config.export_path = None;
    } else if let Some(path) = &args.export_path {
        let path = path.trim();
        config.export_path = (!path.is_empty()).then(|| path.to_string());
    }
    if args.clear_timezone {
        config.timezone = None;
    } else if let Some(timezone) = &args.timezone {
        config.timezone = validate_timezone(timezone)?;
    }

    let path = config.save(data_dir)?;
    writeln!(writer, "Configuration saved to {}", path.display())?;
    info(writer, "Currency", &config.currency)?;
    info(writer, "Date format", config.date_format)?;
    info(writer, "Time format", config.time_format.as_str())?;
    if let Some(export_path) = &config.export_path {
        info(writer, "Export path", export_path)?;
    }
    if let Some(timezone) = &config.timezone {
        info(writer, "Timezone", timezone)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_defaults_without_flags() {
        let temp = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        run(&mut out, temp.path(), &ConfigArgs::default()).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Global tmpo Configuration\n\nCurrent settings:\n  Currency:    USD\n  Date format: MM/DD/YYYY\n  Time format: 12-hour\n  Export path: (not set)\n  Timezone:    (local)\n"
        );
        assert!(!Config::path_in(temp.path()).exists());
    }

    #[test]
    fn updates_are_validated_and_saved() {
        let temp = tempfile::tempdir().unwrap();
        let args = ConfigArgs {
            currency: Some("eur".to_string()),
            date_format: Some("dd/mm/yyyy".to_string()),
            time_format: Some("24".to_string()),
            export_path: Some("~/exports".to_string()),
            timezone: Some("utc".to_string()),
            ..ConfigArgs::default()
        };
        let mut out = Vec::new();
        run(&mut out, temp.path(), &args).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("    Timezone: UTC\n"));

        let saved = Config::load_stored(temp.path()).unwrap();
        assert_eq!(saved.currency, "EUR");
        assert_eq!(saved.date_format, DateFormat::DayFirst);
        assert_eq!(saved.time_format, TimeFormat::TwentyFourHour);
        assert_eq!(saved.export_path.as_deref(), Some("~/exports"));
        assert_eq!(saved.timezone.as_deref(), Some("UTC"));

        let clear = ConfigArgs {
            clear_export_path: true,
            clear_timezone: true,
            ..ConfigArgs::default()
        };
        run(&mut Vec::new(), temp.path(), &clear).unwrap();
        let saved = Config::load_stored(temp.path()).unwrap();
        assert_eq!(saved.export_path, None);
        assert_eq!(saved.timezone, None);
        assert_eq!(saved.currency, "EUR");
    }

    #[test]
    fn invalid_values_are_not_saved() {
        let temp = tempfile::tempdir().unwrap();
        for args in [
            ConfigArgs {
                currency: Some("EURO".to_string()),
                ..ConfigArgs::default()
            },
            ConfigArgs {
                date_format: Some("YY".to_string()),
                ..ConfigArgs::default()
            },
            ConfigArgs {
                timezone: Some("New York".to_string()),
                ..ConfigArgs::default()
            },
        ] {
            assert!(run(&mut Vec::new(), temp.path(), &args).is_err());
        }
        assert!(!Config::path_in(temp.path()).exists());
    }
}
