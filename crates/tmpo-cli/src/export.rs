//! CSV and JSON export writers.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use tmpo_core::{TimeEntry, hours};

use crate::cli::ExportFormat;

const CSV_HEADER: [&str; 5] = [
    "Project",
    "Start Time",
    "End Time",
    "Duration (hours)",
    "Description",
];

const CSV_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One entry in the JSON export.
#[derive(Debug, Serialize)]
struct ExportEntry<'a> {
    project: &'a str,
    start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<String>,
    duration_hours: f64,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
}

/// Writes entries as CSV with times rendered in `tz`.
pub fn write_csv<W, Tz>(writer: W, entries: &[TimeEntry], tz: &Tz, now: DateTime<Utc>) -> Result<()>
where
    W: io::Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)
        .context("failed to write header")?;
    for entry in entries {
        let local = |instant: DateTime<Utc>| {
            instant
                .with_timezone(tz)
                .format(CSV_TIME_FORMAT)
                .to_string()
        };
        let record = [
            entry.project_name.clone(),
            local(entry.start_time),
            entry.end_time.map(local).unwrap_or_default(),
            format!("{:.2}", hours(entry.duration_at(now))),
            entry.description.clone(),
        ];
        csv.write_record(&record)
            .context("failed to write record")?;
    }
    csv.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// Writes entries as a pretty-printed JSON array with RFC 3339 times in `tz`.
pub fn write_json<W, Tz>(
    mut writer: W,
    entries: &[TimeEntry],
    tz: &Tz,
    now: DateTime<Utc>,
) -> Result<()>
where
    W: io::Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let rfc3339 = |instant: DateTime<Utc>| {
        instant
            .with_timezone(tz)
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    };
    let rows: Vec<ExportEntry<'_>> = entries
        .iter()
        .map(|entry| ExportEntry {
            project: &entry.project_name,
            start_time: rfc3339(entry.start_time),
            end_time: entry.end_time.map(rfc3339),
            duration_hours: hours(entry.duration_at(now)),
            description: &entry.description,
        })
        .collect();
    serde_json::to_writer_pretty(&mut writer, &rows).context("failed to encode JSON")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// `tmpo-export-YYYY-MM-DD.<ext>`.
pub fn default_file_name(format: ExportFormat, today: NaiveDate) -> String {
    format!(
        "tmpo-export-{}.{}",
        today.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Final output path for an export.
///
/// The extension is appended when missing. When an export directory is set,
/// only the file name of `output` is kept and placed inside it.
pub fn output_path(
    output: Option<&Path>,
    format: ExportFormat,
    export_dir: Option<&Path>,
    today: NaiveDate,
) -> PathBuf {
    let mut file = output.map_or_else(
        || PathBuf::from(default_file_name(format, today)),
        Path::to_path_buf,
    );
    if file.extension().and_then(|ext| ext.to_str()) != Some(format.extension()) {
        let mut name = file.into_os_string();
        name.push(".");
        name.push(format.extension());
        file = PathBuf::from(name);
    }
    if let Some(dir) = export_dir {
        if let Some(name) = file.file_name() {
            return dir.join(name);
        }
    }
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeDelta;

    fn entries() -> Vec<TimeEntry> {
        let start = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        vec![
            TimeEntry {
                id: 2,
                project_name: "api".to_string(),
                start_time: start + TimeDelta::hours(4),
                end_time: None,
                description: String::new(),
                hourly_rate: None,
                milestone_name: None,
            },
            TimeEntry {
                id: 1,
                project_name: "web, main".to_string(),
                start_time: start,
                end_time: Some(start + TimeDelta::minutes(90)),
                description: "fix \"login\"".to_string(),
                hourly_rate: Some(50.0),
                milestone_name: Some("m1".to_string()),
            },
        ]
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 13, 15, 0).unwrap()
    }

    #[test]
    fn csv_has_header_and_quoted_fields() {
        let mut out = Vec::new();
        write_csv(&mut out, &entries(), &Utc, now()).unwrap();
        let out = String::from_utf8(out).unwrap();

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines,
            [
                "Project,Start Time,End Time,Duration (hours),Description",
                "api,2024-01-15 13:00:00,,0.25,",
                "\"web, main\",2024-01-15 09:00:00,2024-01-15 10:30:00,1.50,\"fix \"\"login\"\"\"",
            ]
        );
    }

    #[test]
    fn json_omits_absent_fields() {
        let mut out = Vec::new();
        write_json(&mut out, &entries(), &Utc, now()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["project"], "api");
        assert_eq!(rows[0]["start_time"], "2024-01-15T13:00:00Z");
        assert!(rows[0].get("end_time").is_none());
        assert!(rows[0].get("description").is_none());
        assert_eq!(rows[1]["end_time"], "2024-01-15T10:30:00Z");
        assert_eq!(rows[1]["duration_hours"], 1.5);
        assert_eq!(rows[1]["description"], "fix \"login\"");
    }

    #[test]
    fn output_paths() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            output_path(None, ExportFormat::Csv, None, today),
            PathBuf::from("tmpo-export-2024-03-09.csv")
        );
        assert_eq!(
            output_path(Some(Path::new("report")), ExportFormat::Json, None, today),
            PathBuf::from("report.json")
        );
        assert_eq!(
            output_path(Some(Path::new("report.csv")), ExportFormat::Json, None, today),
            PathBuf::from("report.csv.json")
        );
        assert_eq!(
            output_path(
                Some(Path::new("nested/report.csv")),
                ExportFormat::Csv,
                Some(Path::new("/exports")),
                today
            ),
            PathBuf::from("/exports/report.csv")
        );
    }
}
