use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use regex::Regex;

use actibatch_algos::{SubjectSummary, cohort_average, combine_same_nights, summarize_nights};
use actibatch_reports::{read_sleep_report, search_folder};
use actibatch_types::{ReportSchema, SummaryTable};

use crate::batch::run_batch;
use crate::sink;

/// Turns a folder of sleep reports into one summary table, one row per
/// subject, plus a cohort averages file.
pub async fn run(
    reports: Option<PathBuf>,
    search: Option<PathBuf>,
    output: PathBuf,
    subject_filename_pattern: String,
    jobs: usize,
) -> anyhow::Result<()> {
    let pattern = Regex::new(&format!("^(?:{subject_filename_pattern})"))
        .with_context(|| format!("invalid subject pattern `{subject_filename_pattern}`"))?;

    let files = match (reports, search) {
        (Some(dir), None) => list_reports(&dir)?,
        (None, Some(root)) => search_folder(&root)?
            .into_values()
            .filter_map(|files| files.sleep_report)
            .collect(),
        _ => anyhow::bail!("pass exactly one of --reports or --search-folder"),
    };
    anyhow::ensure!(!files.is_empty(), "no sleep reports found");

    let schema = ReportSchema::sleep();
    let (summaries, report) = run_batch("sleep reports", files, jobs, move |path| {
        summarize_report(&path, &schema, &pattern)
    })
    .await;

    let mut table = SummaryTable::new("Subject");
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

fn summarize_report(
    path: &Path,
    schema: &ReportSchema,
    pattern: &Regex,
) -> anyhow::Result<SubjectSummary> {
    let report = read_sleep_report(path, schema, Some(pattern))
        .with_context(|| format!("reading {}", path.display()))?;

    let subject = report.subject;
    let sleeps = report.records.len();
    let combined = combine_same_nights(report.records);
    if combined.merged() {
        info!(
            "{subject} has more sleep periods in same nights, combined from {sleeps} sleeps to {} nights.",
            combined.nights.len()
        );
    }

    Ok(summarize_nights(subject, sleeps, &combined.nights, schema))
}

fn list_reports(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "csv") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
