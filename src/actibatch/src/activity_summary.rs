use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use actibatch_algos::{CoverageSummary, SubjectSummary, ValidityMask, cohort_average};
use actibatch_reports::{EPOCH_SUFFIX, MetricsRow, read_epoch_series, read_metrics, read_wear_times};
use actibatch_types::{
    CellValue, ColumnRole, ReportSchema, SubjectId, SummaryTable, WearInterval, schema,
};

use crate::batch::run_batch;
use crate::sink;

/// Turns a folder of epoch exports into a wear-time coverage table, one row
/// per subject, joined with externally computed rhythm metrics.
pub async fn run(
    epochs: PathBuf,
    wear_times: PathBuf,
    metrics: Option<PathBuf>,
    output: PathBuf,
    jobs: usize,
) -> anyhow::Result<()> {
    let schema = ReportSchema::activity();

    let wear = read_wear_times(&wear_times)
        .with_context(|| format!("reading {}", wear_times.display()))?;
    let metrics = match metrics {
        Some(path) => {
            read_metrics(&path, &schema).with_context(|| format!("reading {}", path.display()))?
        }
        None => BTreeMap::new(),
    };

    let files = list_epoch_files(&epochs)?;
    anyhow::ensure!(!files.is_empty(), "no epoch exports found");

    let wear = Arc::new(wear);
    let metrics = Arc::new(metrics);
    let (summaries, report) = run_batch("epoch exports", files, jobs, move |path| {
        summarize_epochs(&path, &schema, &wear, &metrics)
    })
    .await;

    let mut table = SummaryTable::new("subject");
    for summary in summaries {
        for (column, role, value) in summary.cells {
            table.set(&summary.subject, &column, role, value);
        }
    }

    let averages = cohort_average(&table);
    sink::write_table(&output, &table)?;
    sink::write_averages(&output, &averages)?;
    for (name, value) in &averages {
        println!("{name}: {value}");
    }

    info!("{report}");
    Ok(())
}

fn summarize_epochs(
    path: &Path,
    schema: &ReportSchema,
    wear: &BTreeMap<SubjectId, Vec<WearInterval>>,
    metrics: &BTreeMap<SubjectId, MetricsRow>,
) -> anyhow::Result<SubjectSummary> {
    let series =
        read_epoch_series(path).with_context(|| format!("reading {}", path.display()))?;
    let subject = series.subject.clone();

    let intervals = wear.get(&subject).map(Vec::as_slice);
    if intervals.is_none() {
        warn!("{subject}: no wear times on record, keeping every epoch");
    }
    let mask = ValidityMask::from_intervals(&series.timestamps, intervals);
    let coverage = CoverageSummary::new(&series, mask.as_ref()).context("empty epoch series")?;

    let mut cells = coverage_cells(&coverage, schema);
    match metrics.get(&subject) {
        Some(row) => cells.extend(row.cells.iter().cloned()),
        None if !metrics.is_empty() => warn!("{subject}: no external metrics row"),
        None => {}
    }

    Ok(SubjectSummary { subject, cells })
}

fn coverage_cells(
    coverage: &CoverageSummary,
    schema: &ReportSchema,
) -> Vec<(String, ColumnRole, CellValue)> {
    let role = |name: &str| schema.role(name).unwrap_or(ColumnRole::Scalar);

    let mut cells = vec![
        (
            schema::START_TIME.to_string(),
            role(schema::START_TIME),
            CellValue::Stamp(coverage.start),
        ),
        (
            schema::EPOCHS.to_string(),
            role(schema::EPOCHS),
            CellValue::Count(coverage.epochs as u64),
        ),
        (
            schema::DURATION.to_string(),
            role(schema::DURATION),
            CellValue::Span(coverage.duration()),
        ),
        (
            schema::MASKED.to_string(),
            role(schema::MASKED),
            CellValue::Count(coverage.masked as u64),
        ),
    ];
    if let Some(fraction) = coverage.valid_fraction {
        cells.push((
            schema::MASK_FRACTION.to_string(),
            role(schema::MASK_FRACTION),
            CellValue::Number(fraction),
        ));
    }
    if let Some(adat) = coverage.adat {
        cells.push((
            schema::ADAT.to_string(),
            role(schema::ADAT),
            CellValue::Number(adat),
        ));
    }
    cells
}

fn list_epoch_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let is_epoch = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(EPOCH_SUFFIX));
        if path.is_file() && is_epoch {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column<'a>(header: &'a str, row: &'a str, name: &str) -> &'a str {
        let index = header.split(',').position(|cell| cell == name).unwrap();
        row.split(',').nth(index).unwrap()
    }

    #[tokio::test]
    async fn summarizes_epochs_with_wear_mask_and_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let epochs = dir.path().join("epochs");
        fs::create_dir_all(&epochs).unwrap();

        // subject 7 wears the device on the first day only
        fs::write(
            epochs.join("test7epochs.csv"),
            "timestamp,counts\n\
             10.03.2023 08:00:00,100\n\
             10.03.2023 08:01:00,200\n\
             11.03.2023 08:00:00,50\n",
        )
        .unwrap();
        // subject 8 has no wear times on record
        fs::write(
            epochs.join("test8epochs.csv"),
            "timestamp,counts\n\
             10.03.2023 09:00:00,10\n\
             11.03.2023 09:00:00,30\n",
        )
        .unwrap();
        fs::write(epochs.join("notes.txt"), "ignore me").unwrap();

        let wear_times = dir.path().join("wear.csv");
        fs::write(
            &wear_times,
            "Subject,Wear Time Start,Wear Time End\n\
             7,10.03.2023 00:00:00,10.03.2023 23:59:59\n",
        )
        .unwrap();

        let metrics = dir.path().join("rhythm.csv");
        fs::write(
            &metrics,
            "subject,L5,L5 Midpoint\n7,\"12,5\",02:31:00\n",
        )
        .unwrap();

        let output = dir.path().join("activity");
        run(epochs, wear_times, Some(metrics), output, 2)
            .await
            .unwrap();

        let csv = fs::read_to_string(dir.path().join("activity.csv")).unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        let seven = lines.next().unwrap();
        let eight = lines.next().unwrap();

        assert!(header.starts_with("subject,"));
        assert!(seven.starts_with("7,"));
        assert!(eight.starts_with("8,"));

        assert_eq!(column(header, seven, "Start_time"), "2023-03-10 08:00:00");
        assert_eq!(column(header, seven, "Epochs"), "3");
        assert_eq!(column(header, seven, "Duration"), "24:00");
        assert_eq!(column(header, seven, "Masked"), "1");
        // only the first day survives the mask
        assert_eq!(column(header, seven, "ADAT"), "300");
        assert_eq!(column(header, seven, "L5 Midpoint"), "02:31");

        assert_eq!(column(header, eight, "Masked"), "0");
        assert_eq!(column(header, eight, "Mask_fraction"), "");
        // unmasked: both days count, (10 + 30) / 2
        assert_eq!(column(header, eight, "ADAT"), "20");
        assert_eq!(column(header, eight, "L5 Midpoint"), "");

        let averages = fs::read_to_string(dir.path().join("activity_averages.csv")).unwrap();
        assert!(averages.contains("ADAT,160\n"));
        assert!(averages.contains("Masked,0.5\n"));
        // Info columns never enter the averages
        assert!(!averages.contains("Start_time"));
    }

    #[tokio::test]
    async fn unreadable_wear_times_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let epochs = dir.path().join("epochs");
        fs::create_dir_all(&epochs).unwrap();
        fs::write(
            epochs.join("test7epochs.csv"),
            "timestamp,counts\n10.03.2023 08:00:00,1\n",
        )
        .unwrap();

        let result = run(
            epochs,
            dir.path().join("missing-wear.csv"),
            None,
            dir.path().join("activity"),
            1,
        )
        .await;
        assert!(result.is_err());
    }
}
