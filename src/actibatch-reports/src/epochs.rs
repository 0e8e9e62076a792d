use std::path::Path;

use actibatch_types::{EpochSeries, SubjectId};

use crate::encoding::read_export;
use crate::locale;
use crate::wear_times::find_column;
use crate::{ReportError, Result};

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const COUNTS_COLUMN: &str = "counts";

/// Reads one subject's epoch-by-epoch activity counts. Timestamps must be
/// strictly increasing; the subject is the first digit run of the file
/// name, so `test7epochs.csv` belongs to subject 7.
pub fn read_epoch_series(path: &Path) -> Result<EpochSeries> {
    let text = read_export(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let timestamp_col = find_column(&headers, TIMESTAMP_COLUMN, path)?;
    let counts_col = find_column(&headers, COUNTS_COLUMN, path)?;

    let mut timestamps = Vec::new();
    let mut counts = Vec::new();
    for record in reader.records() {
        let record = record?;
        let stamp = locale::parse_wear_stamp(record.get(timestamp_col).unwrap_or(""))?;
        if timestamps.last().is_some_and(|previous| stamp <= *previous) {
            return Err(ReportError::NonMonotonicSeries(path.to_path_buf()));
        }
        timestamps.push(stamp);
        counts.push(locale::parse_decimal(record.get(counts_col).unwrap_or(""))?);
    }

    if timestamps.is_empty() {
        return Err(ReportError::EmptySeries(path.to_path_buf()));
    }

    Ok(EpochSeries {
        subject: subject_from_name(path)?,
        timestamps,
        counts,
    })
}

fn subject_from_name(path: &Path) -> Result<SubjectId> {
    let stem = path.file_stem().and_then(|stem| stem.to_str()).unwrap_or("");
    let Some(start) = stem.find(|c: char| c.is_ascii_digit()) else {
        return Err(ReportError::MissingSubject(path.to_path_buf()));
    };
    let digits = &stem[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    Ok(SubjectId::new(&digits[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_series(name: &str, content: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn parses_series_and_file_name_subject() {
        let (_dir, path) = write_series(
            "test7epochs.csv",
            "timestamp,counts\n\
             10.03.2023 08:00:00,0\n\
             10.03.2023 08:01:00,\"12,5\"\n\
             10.03.2023 08:02:00,40\n",
        );
        let series = read_epoch_series(&path).unwrap();

        assert_eq!(series.subject.as_str(), "7");
        assert_eq!(series.len(), 3);
        assert_eq!(series.counts[1], 12.5);
        assert_eq!(
            series.end().unwrap().format("%H:%M").to_string(),
            "08:02"
        );
    }

    #[test]
    fn empty_series_is_an_error() {
        let (_dir, path) = write_series("test7epochs.csv", "timestamp,counts\n");
        assert!(matches!(
            read_epoch_series(&path),
            Err(ReportError::EmptySeries(_))
        ));
    }

    #[test]
    fn out_of_order_timestamps_are_an_error() {
        let (_dir, path) = write_series(
            "test7epochs.csv",
            "timestamp,counts\n\
             10.03.2023 08:01:00,1\n\
             10.03.2023 08:00:00,2\n",
        );
        assert!(matches!(
            read_epoch_series(&path),
            Err(ReportError::NonMonotonicSeries(_))
        ));
    }

    #[test]
    fn file_without_digits_has_no_subject() {
        let (_dir, path) = write_series("epochs.csv", "timestamp,counts\n10.03.2023 08:00:00,1\n");
        assert!(matches!(
            read_epoch_series(&path),
            Err(ReportError::MissingSubject(_))
        ));
    }
}
