use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

use crate::{ColumnRole, FormatHM, SubjectId};

/// One cell of a summary table. The variant decides both rendering and
/// whether the cell takes part in cohort-level averaging.
#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Count(u64),
    Number(f64),
    /// Duration in minutes, shown as a wall-clock HH:MM by convention.
    Minutes(f64),
    Clock(NaiveTime),
    Stamp(NaiveDateTime),
    /// Elapsed span, shown as total hours and minutes without day wrap.
    Span(TimeDelta),
    Missing,
}

impl CellValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Count(n) => Some(*n as f64),
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_minutes(&self) -> Option<f64> {
        match self {
            CellValue::Minutes(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_clock(&self) -> Option<NaiveTime> {
        match self {
            CellValue::Clock(t) => Some(*t),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Count(n) => f.write_fmt(format_args!("{}", n)),
            CellValue::Number(v) => f.write_fmt(format_args!("{}", v)),
            CellValue::Minutes(v) => f.write_str(&v.format_hm()),
            CellValue::Clock(t) => f.write_str(&t.format_hm()),
            CellValue::Stamp(dt) => f.write_fmt(format_args!("{}", dt.format("%Y-%m-%d %H:%M:%S"))),
            CellValue::Span(delta) => f.write_str(&delta.format_hm()),
            CellValue::Missing => Ok(()),
        }
    }
}

/// A table of named columns indexed by subject: columns iterate in
/// lexicographic order, rows in subject order, and absent cells read as
/// `Missing`.
#[derive(Debug, Default)]
pub struct SummaryTable {
    index_label: String,
    columns: BTreeMap<String, ColumnRole>,
    rows: BTreeMap<SubjectId, BTreeMap<String, CellValue>>,
}

impl SummaryTable {
    pub fn new(index_label: impl Into<String>) -> Self {
        Self {
            index_label: index_label.into(),
            columns: BTreeMap::new(),
            rows: BTreeMap::new(),
        }
    }

    /// Sets one cell, declaring the column on first use. The role a column
    /// was first declared with wins.
    pub fn set(&mut self, subject: &SubjectId, column: &str, role: ColumnRole, value: CellValue) {
        self.columns.entry(column.to_string()).or_insert(role);
        self.rows
            .entry(subject.clone())
            .or_default()
            .insert(column.to_string(), value);
    }

    pub fn index_label(&self) -> &str {
        &self.index_label
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, ColumnRole)> {
        self.columns.iter().map(|(name, role)| (name.as_str(), *role))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn subjects(&self) -> impl Iterator<Item = &SubjectId> {
        self.rows.keys()
    }

    pub fn get(&self, subject: &SubjectId, column: &str) -> &CellValue {
        self.rows
            .get(subject)
            .and_then(|row| row.get(column))
            .unwrap_or(&CellValue::Missing)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
