use std::collections::BTreeMap;
use std::path::Path;

use actibatch_types::{SubjectId, WearInterval};

use crate::encoding::read_export;
use crate::locale;
use crate::{ReportError, Result};

pub const SUBJECT_COLUMN: &str = "Subject";
pub const WEAR_START_COLUMN: &str = "Wear Time Start";
pub const WEAR_END_COLUMN: &str = "Wear Time End";

/// Reads a wear-time validation export into per-subject interval lists.
///
/// This file is study-level input: where the per-subject parsers skip and
/// carry on, everything wrong here is an error.
pub fn read_wear_times(path: &Path) -> Result<BTreeMap<SubjectId, Vec<WearInterval>>> {
    let text = read_export(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let subject_col = find_column(&headers, SUBJECT_COLUMN, path)?;
    let start_col = find_column(&headers, WEAR_START_COLUMN, path)?;
    let end_col = find_column(&headers, WEAR_END_COLUMN, path)?;

    let mut intervals: BTreeMap<SubjectId, Vec<WearInterval>> = BTreeMap::new();
    for record in reader.records() {
        let record = record?;
        let subject = SubjectId::new(record.get(subject_col).unwrap_or("").trim());
        let start = locale::parse_wear_stamp(record.get(start_col).unwrap_or(""))?;
        let stop = locale::parse_wear_stamp(record.get(end_col).unwrap_or(""))?;
        intervals
            .entry(subject)
            .or_default()
            .push(WearInterval::new(start, stop));
    }

    Ok(intervals)
}

pub(crate) fn find_column(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .ok_or_else(|| ReportError::MissingColumn(path.to_path_buf(), name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_export(content: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("StudyWearTimeValidationDetails.csv");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn groups_intervals_by_subject() {
        let (_dir, path) = write_export(
            "Subject,Device,Wear Time Start,Wear Time End\n\
             7,A1,10.03.2023 08:00:00,10.03.2023 20:00:00\n\
             7,A1,11.03.2023 08:00:00,11.03.2023 20:00:00\n\
             11,B2,10.03.2023 09:00:00,10.03.2023 21:00:00\n",
        );
        let wear = read_wear_times(&path).unwrap();

        assert_eq!(wear.len(), 2);
        assert_eq!(wear.get(&SubjectId::new("7")).unwrap().len(), 2);
        let eleven = &wear.get(&SubjectId::new("11")).unwrap()[0];
        assert_eq!(eleven.start.format("%H:%M").to_string(), "09:00");
    }

    #[test]
    fn missing_column_is_an_error() {
        let (_dir, path) = write_export("Subject,Start,End\n7,x,y\n");
        assert!(matches!(
            read_wear_times(&path),
            Err(ReportError::MissingColumn(_, column)) if column == WEAR_START_COLUMN
        ));
    }

    #[test]
    fn bad_interval_stamp_is_an_error() {
        let (_dir, path) = write_export(
            "Subject,Wear Time Start,Wear Time End\n\
             7,not a date,10.03.2023 20:00:00\n",
        );
        assert!(matches!(
            read_wear_times(&path),
            Err(ReportError::BadTimestamp(_))
        ));
    }
}
