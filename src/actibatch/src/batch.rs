use std::fmt;

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::task::spawn_blocking;

/// Outcome counts for one batch run.
pub struct BatchReport {
    pub processed: usize,
    pub skipped: usize,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Batch complete:")?;
        writeln!(f, "  processed: {}", self.processed)?;
        write!(f, "  skipped:   {}", self.skipped)
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:>16} [{wide_bar:.cyan/dim}] {pos}/{len} ({eta} remaining)")
        .unwrap()
        .progress_chars("=>-")
}

/// Runs `work` over every item on blocking threads, at most `jobs` at a
/// time, keeping input order in the results. A failed item is logged and
/// dropped so one bad export cannot stop the run.
pub async fn run_batch<T, R, F>(
    label: &str,
    items: Vec<T>,
    jobs: usize,
    work: F,
) -> (Vec<R>, BatchReport)
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> anyhow::Result<R> + Send + Sync + Clone + 'static,
{
    let pb = ProgressBar::new(items.len() as u64);
    pb.set_style(bar_style());
    pb.set_prefix(label.to_string());

    let mut results = Vec::new();
    let mut report = BatchReport {
        processed: 0,
        skipped: 0,
    };

    let mut outcomes = futures::stream::iter(items.into_iter().map(|item| {
        let work = work.clone();
        spawn_blocking(move || work(item))
    }))
    .buffered(jobs);

    while let Some(outcome) = outcomes.next().await {
        pb.inc(1);
        match outcome {
            Ok(Ok(result)) => {
                results.push(result);
                report.processed += 1;
            }
            Ok(Err(error)) => {
                warn!("{error:#}");
                report.skipped += 1;
            }
            Err(join_error) => {
                warn!("worker gave up: {join_error}");
                report.skipped += 1;
            }
        }
    }

    pb.finish();
    (results, report)
}
