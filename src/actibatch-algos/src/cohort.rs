use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveTime};
use strum::{Display, EnumIter, IntoEnumIterator};

use actibatch_types::{CanonicalNight, CellValue, ColumnRole, ReportSchema, SubjectId, SummaryTable};

use crate::helpers::time_math;
use crate::mean_clock_48;

/// Day-of-week partition a night falls into, keyed by the date the subject
/// got out of bed. Monday through Friday count as workdays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum DayGroup {
    All,
    Workdays,
    Weekend,
}

impl DayGroup {
    pub fn contains(self, date: NaiveDate) -> bool {
        match self {
            DayGroup::All => true,
            DayGroup::Workdays => date.weekday().num_days_from_monday() < 5,
            DayGroup::Weekend => date.weekday().num_days_from_monday() >= 5,
        }
    }
}

/// One subject's summary row: labeled cells together with the role that
/// decides how the cohort-level average treats each of them.
#[derive(Clone, Debug)]
pub struct SubjectSummary {
    pub subject: SubjectId,
    pub cells: Vec<(String, ColumnRole, CellValue)>,
}

/// Averages a subject's canonical nights into one summary row.
///
/// Every schema column, and every stray numeric column the nights carry, is
/// averaged once per day group and labeled `Average <column> (<group>)`; a
/// group with no nights contributes no cells at all, so a subject without
/// weekend data simply has no weekend columns. `sleeps` is the raw period
/// count before same-night merging.
pub fn summarize_nights(
    subject: SubjectId,
    sleeps: usize,
    nights: &[CanonicalNight],
    schema: &ReportSchema,
) -> SubjectSummary {
    let mut cells = vec![
        (
            "# Sleeps".to_string(),
            ColumnRole::Scalar,
            CellValue::Count(sleeps as u64),
        ),
        (
            "# Nights".to_string(),
            ColumnRole::Scalar,
            CellValue::Count(nights.len() as u64),
        ),
    ];

    for group in DayGroup::iter() {
        let subset: Vec<&CanonicalNight> = nights
            .iter()
            .filter(|night| group.contains(night.date))
            .collect();
        let Some(averaged) = average_nights(&subset, schema) else {
            continue;
        };
        for (name, role, value) in averaged {
            cells.push((format!("Average {name} ({group})"), role, value));
        }
    }

    SubjectSummary { subject, cells }
}

/// Averages each schema column over the given nights, plus any stray numeric
/// columns they carry; `None` when there are no nights to average.
fn average_nights(
    nights: &[&CanonicalNight],
    schema: &ReportSchema,
) -> Option<Vec<(String, ColumnRole, CellValue)>> {
    if nights.is_empty() {
        return None;
    }

    let mut cells = Vec::new();
    for column in schema.columns() {
        let value = match column.role {
            ColumnRole::Info => continue,
            ColumnRole::Scalar => match mean_value(nights, &column.name) {
                Some(mean) => CellValue::Number(mean),
                None => CellValue::Missing,
            },
            ColumnRole::Duration => match mean_value(nights, &column.name) {
                Some(mean) => CellValue::Minutes(mean),
                None => CellValue::Missing,
            },
            ColumnRole::Clock { pivot } => {
                let times: Vec<NaiveTime> = nights
                    .iter()
                    .filter_map(|night| night.clock(&column.name))
                    .collect();
                match mean_clock_48(&times, pivot) {
                    Some(time) => CellValue::Clock(time),
                    None => CellValue::Missing,
                }
            }
        };
        cells.push((column.name.clone(), column.role, value));
    }

    // Undeclared report columns average as plain numbers, present only in
    // groups where at least one night carries them.
    let strays: BTreeSet<&str> = nights
        .iter()
        .flat_map(|night| night.extra.keys())
        .map(String::as_str)
        .filter(|name| schema.by_name(name).is_none())
        .collect();
    for name in strays {
        if let Some(mean) = mean_value(nights, name) {
            cells.push((name.to_string(), ColumnRole::Scalar, CellValue::Number(mean)));
        }
    }

    Some(cells)
}

fn mean_value(nights: &[&CanonicalNight], name: &str) -> Option<f64> {
    let values: Vec<f64> = nights
        .iter()
        .filter_map(|night| night.value(name))
        .collect();
    if values.is_empty() {
        return None;
    }
    Some(time_math::mean(&values))
}

/// Averages each table column over all subjects, honoring the column role:
/// scalars arithmetically, durations in minutes, clock times circularly.
/// Info columns and columns with no values present are left out.
pub fn cohort_average(table: &SummaryTable) -> Vec<(String, CellValue)> {
    let mut averages = Vec::new();

    for (name, role) in table.columns() {
        let cells: Vec<&CellValue> = table
            .subjects()
            .map(|subject| table.get(subject, name))
            .collect();

        let value = match role {
            ColumnRole::Info => continue,
            ColumnRole::Scalar => {
                let values: Vec<f64> = cells.iter().filter_map(|cell| cell.as_number()).collect();
                if values.is_empty() {
                    continue;
                }
                CellValue::Number(time_math::mean(&values))
            }
            ColumnRole::Duration => {
                let values: Vec<f64> = cells.iter().filter_map(|cell| cell.as_minutes()).collect();
                if values.is_empty() {
                    continue;
                }
                CellValue::Minutes(time_math::mean(&values))
            }
            ColumnRole::Clock { pivot } => {
                let times: Vec<NaiveTime> =
                    cells.iter().filter_map(|cell| cell.as_clock()).collect();
                match mean_clock_48(&times, pivot) {
                    Some(time) => CellValue::Clock(time),
                    None => continue,
                }
            }
        };
        averages.push((name.to_string(), value));
    }

    averages
}
