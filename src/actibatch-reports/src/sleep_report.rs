use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDateTime;
use regex::Regex;

use actibatch_types::{ColumnRole, NightRecord, ReportSchema, SubjectId, schema};

use crate::encoding::read_export;
use crate::locale;
use crate::wear_times::find_column;
use crate::{ReportError, Result};

/// Preamble line naming the subject, e.g. `"Subject Name:","7"`.
pub const SUBJECT_TAG: &str = "Subject Name:";
/// First cell of the column header row. Everything above it is preamble.
pub const HEADER_MARKER: &str = "In Bed Date";

/// A parsed sleep report: one record per scored sleep period, in file
/// order, plus how many rows could not be read.
#[derive(Clone, Debug)]
pub struct SleepReport {
    pub subject: SubjectId,
    pub records: Vec<NightRecord>,
    pub skipped_rows: usize,
}

struct StampColumns {
    in_bed: (usize, usize),
    onset: (usize, usize),
    out_bed: (usize, usize),
}

struct ValueColumn {
    name: String,
    index: usize,
}

/// Reads one scoring-software sleep report.
///
/// The file starts with a free-form preamble and becomes a CSV table at the
/// header row. Columns the schema declares are required; any further column
/// whose non-empty cells all read as numbers is carried along under its own
/// header. Rows with unreadable timestamps or declared values are skipped
/// with a warning rather than failing the report.
pub fn read_sleep_report(
    path: &Path,
    schema: &ReportSchema,
    name_pattern: Option<&Regex>,
) -> Result<SleepReport> {
    let text = read_export(path)?;
    let lines: Vec<&str> = text.lines().collect();

    let mut embedded = None;
    let mut header_at = None;
    for (i, line) in lines.iter().enumerate() {
        if let Some((_, rest)) = line.split_once(SUBJECT_TAG) {
            let name = rest.trim_matches(|c: char| c == '"' || c == ',' || c.is_whitespace());
            if !name.is_empty() {
                embedded = Some(name.to_string());
            }
        }
        if line.contains(HEADER_MARKER) {
            header_at = Some(i);
            break;
        }
    }
    let header_at =
        header_at.ok_or_else(|| ReportError::MissingHeaderMarker(path.to_path_buf()))?;
    let subject = subject_for(path, name_pattern, embedded)?;

    let body = lines[header_at..].join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());
    let headers = reader.headers()?.clone();

    let stamps = StampColumns {
        in_bed: stamp_columns(&headers, "In Bed", path)?,
        onset: stamp_columns(&headers, "Onset", path)?,
        out_bed: stamp_columns(&headers, "Out Bed", path)?,
    };

    let mut declared = Vec::new();
    for spec in schema.columns() {
        if !matches!(spec.role, ColumnRole::Scalar | ColumnRole::Duration) {
            continue;
        }
        declared.push(ValueColumn {
            name: spec.name.clone(),
            index: find_column(&headers, &spec.source, path)?,
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?);
    }

    let extras = sniff_extras(&headers, &rows, &stamps, &declared);

    let mut records = Vec::new();
    let mut skipped_rows = 0;
    for row in &rows {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        match parse_row(row, &subject, &stamps, &declared, &extras) {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!("{}: skipped a row ({error})", path.display());
                skipped_rows += 1;
            }
        }
    }

    Ok(SleepReport {
        subject,
        records,
        skipped_rows,
    })
}

fn subject_for(
    path: &Path,
    pattern: Option<&Regex>,
    embedded: Option<String>,
) -> Result<SubjectId> {
    if let Some(pattern) = pattern {
        let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");
        if let Some(capture) = pattern.captures(file_name).and_then(|captures| captures.get(1)) {
            let name = capture.as_str().trim();
            if !name.is_empty() {
                return Ok(SubjectId::new(name));
            }
        }
    }
    match embedded {
        Some(name) => Ok(SubjectId::new(name)),
        None => Err(ReportError::MissingSubject(path.to_path_buf())),
    }
}

fn stamp_columns(
    headers: &csv::StringRecord,
    prefix: &str,
    path: &Path,
) -> Result<(usize, usize)> {
    let date = find_column(headers, &format!("{prefix} Date"), path)?;
    let time = find_column(headers, &format!("{prefix} Time"), path)?;
    Ok((date, time))
}

/// Undeclared columns ride along when every non-empty cell reads as a
/// number. Text columns like remarks never qualify.
fn sniff_extras(
    headers: &csv::StringRecord,
    rows: &[csv::StringRecord],
    stamps: &StampColumns,
    declared: &[ValueColumn],
) -> Vec<ValueColumn> {
    let mut consumed = vec![
        stamps.in_bed.0,
        stamps.in_bed.1,
        stamps.onset.0,
        stamps.onset.1,
        stamps.out_bed.0,
        stamps.out_bed.1,
    ];
    consumed.extend(declared.iter().map(|column| column.index));

    let mut extras = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        if consumed.contains(&index) {
            continue;
        }
        let name = header.trim();
        if name.is_empty() {
            continue;
        }
        let cells: Vec<&str> = rows
            .iter()
            .filter_map(|row| row.get(index))
            .map(str::trim)
            .filter(|cell| !cell.is_empty())
            .collect();
        if cells.is_empty() {
            continue;
        }
        if cells.iter().all(|cell| locale::parse_decimal(cell).is_ok()) {
            extras.push(ValueColumn {
                name: name.to_string(),
                index,
            });
        }
    }
    extras
}

fn parse_row(
    row: &csv::StringRecord,
    subject: &SubjectId,
    stamps: &StampColumns,
    declared: &[ValueColumn],
    extras: &[ValueColumn],
) -> Result<NightRecord> {
    let in_bed = read_stamp(row, stamps.in_bed)?;
    let onset = read_stamp(row, stamps.onset)?;
    let out_bed = read_stamp(row, stamps.out_bed)?;

    let mut values: BTreeMap<String, f64> = BTreeMap::new();
    for column in declared {
        let raw = row.get(column.index).unwrap_or("");
        values.insert(column.name.clone(), locale::parse_decimal(raw)?);
    }

    let mut extra: BTreeMap<String, f64> = BTreeMap::new();
    for column in extras {
        let raw = row.get(column.index).unwrap_or("").trim();
        if raw.is_empty() {
            continue;
        }
        if let Ok(value) = locale::parse_decimal(raw) {
            extra.insert(column.name.clone(), value);
        }
    }

    let total_sleep_min = values.remove(schema::TOTAL_SLEEP).unwrap_or_default();
    let time_in_bed_min = values.remove(schema::TIME_IN_BED).unwrap_or_default();
    let awakenings = values.remove(schema::AWAKENINGS).unwrap_or_default();
    let waso_min = values.remove(schema::WASO).unwrap_or_default();
    extra.extend(values);

    Ok(NightRecord {
        subject: subject.clone(),
        in_bed,
        onset,
        out_bed,
        total_sleep_min,
        time_in_bed_min,
        awakenings,
        waso_min,
        extra,
    })
}

fn read_stamp(row: &csv::StringRecord, columns: (usize, usize)) -> Result<NaiveDateTime> {
    locale::parse_report_stamp(
        row.get(columns.0).unwrap_or(""),
        row.get(columns.1).unwrap_or(""),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const REPORT: &str = "\
\"Analysis Name:\",\"New Analysis\"\n\
\"Subject Name:\",\"7\"\n\
\"Subject Gender:\",\"\"\n\
\n\
In Bed Date,In Bed Time,Onset Date,Onset Time,Out Bed Date,Out Bed Time,Total Sleep Time (TST),Total Minutes in Bed,Number of Awakenings,Wake After Sleep Onset (WASO),Average Awakening Length,Sleep Fragmentation Index,Sleep Efficiency,Remarks\n\
09.03.2023,23:00,09.03.2023,23:10,10.03.2023,07:00,\"300,5\",480,3,\"20,5\",\"6,8\",\"12,3\",\"88,9\",restless\n\
10.03.2023,23:30,10.03.2023,23:40,11.03.2023,08:00,360,510,2,15,\"7,5\",\"10,1\",\"91,2\",\n\
summary,23:30,10.03.2023,23:40,11.03.2023,08:00,330,495,2,15,7,11,90,avg\n";

    fn write_report(name: &str, content: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_records_and_embedded_subject() {
        let (_dir, path) = write_report("7-sleep-report.csv", REPORT);
        let report = read_sleep_report(&path, &ReportSchema::sleep(), None).unwrap();

        assert_eq!(report.subject.as_str(), "7");
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.skipped_rows, 1);

        let first = &report.records[0];
        assert_eq!(first.total_sleep_min, 300.5);
        assert_eq!(first.waso_min, 20.5);
        assert_eq!(first.in_bed.format("%d.%m. %H:%M").to_string(), "09.03. 23:00");
        assert_eq!(first.out_bed.format("%d.%m. %H:%M").to_string(), "10.03. 07:00");
        // declared AAL and SFI land under their short names
        assert_eq!(first.extra.get("SFI"), Some(&12.3));
        assert_eq!(first.extra.get("AAL"), Some(&6.8));
    }

    #[test]
    fn numeric_stray_columns_ride_along() {
        let (_dir, path) = write_report("7-sleep-report.csv", REPORT);
        let report = read_sleep_report(&path, &ReportSchema::sleep(), None).unwrap();

        let first = &report.records[0];
        assert_eq!(first.extra.get("Sleep Efficiency"), Some(&88.9));
        // text column, never picked up
        assert_eq!(first.extra.get("Remarks"), None);
    }

    #[test]
    fn filename_pattern_beats_the_embedded_name() {
        let (_dir, path) = write_report("99-sleep-report.csv", REPORT);
        let pattern = Regex::new("^(?:(.*)-sleep-report*)").unwrap();
        let report = read_sleep_report(&path, &ReportSchema::sleep(), Some(&pattern)).unwrap();
        assert_eq!(report.subject.as_str(), "99");
    }

    #[test]
    fn unmatched_pattern_falls_back_to_the_embedded_name() {
        let (_dir, path) = write_report("notes.csv", REPORT);
        let pattern = Regex::new("^(?:(.*)-sleep-report*)").unwrap();
        let report = read_sleep_report(&path, &ReportSchema::sleep(), Some(&pattern)).unwrap();
        assert_eq!(report.subject.as_str(), "7");
    }

    #[test]
    fn missing_header_marker_is_an_error() {
        let (_dir, path) = write_report("7-sleep-report.csv", "\"Subject Name:\",\"7\"\nno table\n");
        assert!(matches!(
            read_sleep_report(&path, &ReportSchema::sleep(), None),
            Err(ReportError::MissingHeaderMarker(_))
        ));
    }

    #[test]
    fn missing_declared_column_is_an_error() {
        let slim = REPORT.replace("Sleep Fragmentation Index", "Fragmentation");
        let (_dir, path) = write_report("7-sleep-report.csv", &slim);
        assert!(matches!(
            read_sleep_report(&path, &ReportSchema::sleep(), None),
            Err(ReportError::MissingColumn(_, column)) if column == "Sleep Fragmentation Index"
        ));
    }

    #[test]
    fn anonymous_report_without_pattern_is_an_error() {
        let anonymous = REPORT.replace("\"Subject Name:\",\"7\"\n", "");
        let (_dir, path) = write_report("notes.csv", &anonymous);
        assert!(matches!(
            read_sleep_report(&path, &ReportSchema::sleep(), None),
            Err(ReportError::MissingSubject(_))
        ));
    }
}
