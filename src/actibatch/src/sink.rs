use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use actibatch_types::{CellValue, SubjectId, SummaryTable, WearInterval};

/// `prefix` is a path plus the start of a file name, so a prefix of
/// `out/study` names `out/study.csv`, `out/study_averages.csv` and so on.
pub fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", prefix.display(), suffix))
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Writes the summary table as CSV plus a browsable HTML copy.
pub fn write_table(prefix: &Path, table: &SummaryTable) -> anyhow::Result<()> {
    write_csv(&with_suffix(prefix, ".csv"), table)?;
    write_html(&with_suffix(prefix, ".html"), table)?;
    Ok(())
}

fn write_csv(path: &Path, table: &SummaryTable) -> anyhow::Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec![table.index_label().to_string()];
    header.extend(table.column_names().map(String::from));
    writer.write_record(&header)?;

    for subject in table.subjects() {
        let mut row = vec![subject.to_string()];
        for column in table.column_names() {
            row.push(table.get(subject, column).to_string());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn write_html(path: &Path, table: &SummaryTable) -> anyhow::Result<()> {
    ensure_parent(path)?;

    let mut html = String::from("<!DOCTYPE html>\n<html><body>\n<table border=\"1\">\n<tr>");
    html.push_str(&format!("<th>{}</th>", escape(table.index_label())));
    for column in table.column_names() {
        html.push_str(&format!("<th>{}</th>", escape(column)));
    }
    html.push_str("</tr>\n");

    for subject in table.subjects() {
        html.push_str("<tr>");
        html.push_str(&format!("<td>{}</td>", escape(subject.as_str())));
        for column in table.column_names() {
            let cell = table.get(subject, column).to_string();
            html.push_str(&format!("<td>{}</td>", escape(&cell)));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</table>\n</body></html>\n");
    fs::write(path, html)?;
    Ok(())
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Cohort averages as bare name,value rows next to the main table.
pub fn write_averages(prefix: &Path, averages: &[(String, CellValue)]) -> anyhow::Result<()> {
    let path = with_suffix(prefix, "_averages.csv");
    ensure_parent(&path)?;

    let mut writer = csv::Writer::from_path(&path)?;
    for (name, value) in averages {
        let rendered = value.to_string();
        writer.write_record([name.as_str(), rendered.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Wear intervals as a subject study time log readable by scoring tools.
pub fn write_sstlog(
    path: &Path,
    wear: &BTreeMap<SubjectId, Vec<WearInterval>>,
) -> anyhow::Result<()> {
    ensure_parent(path)?;

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Subject_id", "Start_time", "Stop_time", "Remarks"])?;
    for (subject, intervals) in wear {
        for interval in intervals {
            let start = interval.start.format("%Y-%m-%d %H:%M:%S").to_string();
            let stop = interval.stop.format("%Y-%m-%d %H:%M:%S").to_string();
            writer.write_record([subject.as_str(), start.as_str(), stop.as_str(), ""])?;
        }
    }
    writer.flush()?;
    Ok(())
}
