//! Timestamp and number formats of the study exports: day-first dates and
//! decimal commas.

use chrono::{NaiveDateTime, NaiveTime};

use crate::{ReportError, Result};

pub const REPORT_STAMP: &str = "%d.%m.%Y %H:%M";
pub const WEAR_STAMP: &str = "%d.%m.%Y %H:%M:%S";

/// Joins a report's separate date and time cells into one timestamp.
pub fn parse_report_stamp(date: &str, time: &str) -> Result<NaiveDateTime> {
    let joined = format!("{} {}", date.trim(), time.trim());
    NaiveDateTime::parse_from_str(&joined, REPORT_STAMP)
        .map_err(|_| ReportError::BadTimestamp(joined))
}

/// Wear exports carry seconds; some tooling rewrites them without.
pub fn parse_wear_stamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, WEAR_STAMP)
        .or_else(|_| NaiveDateTime::parse_from_str(value, REPORT_STAMP))
        .map_err(|_| ReportError::BadTimestamp(value.to_string()))
}

pub fn parse_decimal(value: &str) -> Result<f64> {
    let normalized = value.trim().replace(',', ".");
    normalized
        .parse()
        .map_err(|_| ReportError::BadNumber(value.trim().to_string()))
}

pub fn parse_clock(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| ReportError::BadTimestamp(value.to_string()))
}
