use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Error)]
#[error("{self:?}")]
pub enum ReportError {
    Io(PathBuf, std::io::Error),
    UnsupportedEncoding(PathBuf),
    /// The line naming the report's column headers was never found.
    MissingHeaderMarker(PathBuf),
    MissingSubject(PathBuf),
    MissingColumn(PathBuf, String),
    BadTimestamp(String),
    BadNumber(String),
    EmptySeries(PathBuf),
    NonMonotonicSeries(PathBuf),
    Csv(#[from] csv::Error),
}
