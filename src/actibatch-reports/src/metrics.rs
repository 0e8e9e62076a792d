use std::collections::BTreeMap;
use std::path::Path;

use actibatch_types::{CellValue, ColumnRole, ReportSchema, SubjectId};

use crate::encoding::read_export;
use crate::locale;
use crate::{ReportError, Result};

/// Externally computed metrics for one subject, typed by the schema where
/// the column is declared there and treated as plain numbers otherwise.
#[derive(Clone, Debug, Default)]
pub struct MetricsRow {
    pub cells: Vec<(String, ColumnRole, CellValue)>,
}

/// Reads a sidecar metrics table, one row per subject. Unreadable cells are
/// dropped with a warning; the rest of the row survives.
pub fn read_metrics(path: &Path, schema: &ReportSchema) -> Result<BTreeMap<SubjectId, MetricsRow>> {
    let text = read_export(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let subject_col = headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case("subject"))
        .ok_or_else(|| ReportError::MissingColumn(path.to_path_buf(), "subject".to_string()))?;

    let mut rows = BTreeMap::new();
    for record in reader.records() {
        let record = record?;
        let subject = record.get(subject_col).unwrap_or("").trim();
        if subject.is_empty() {
            continue;
        }

        let mut cells = Vec::new();
        for (index, header) in headers.iter().enumerate() {
            if index == subject_col {
                continue;
            }
            let name = header.trim();
            let raw = record.get(index).unwrap_or("").trim();
            if name.is_empty() || raw.is_empty() {
                continue;
            }

            let role = schema.role(name).unwrap_or(ColumnRole::Scalar);
            let value = match role {
                ColumnRole::Info => continue,
                ColumnRole::Clock { .. } => locale::parse_clock(raw).map(CellValue::Clock),
                ColumnRole::Scalar => locale::parse_decimal(raw).map(CellValue::Number),
                ColumnRole::Duration => locale::parse_decimal(raw).map(CellValue::Minutes),
            };
            match value {
                Ok(value) => cells.push((name.to_string(), role, value)),
                Err(error) => warn!("{}: dropped metric {name} ({error})", path.display()),
            }
        }

        rows.insert(SubjectId::new(subject), MetricsRow { cells });
    }

    Ok(rows)
}
