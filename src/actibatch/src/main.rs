#[macro_use]
extern crate log;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dotenv::dotenv;

mod activity_summary;
mod batch;
mod sink;
mod sleep_summary;

#[derive(Parser)]
pub struct ActibatchCli {
    /// How many exports to read at once
    #[arg(env, long, default_value_t = 3)]
    pub jobs: usize,
    #[clap(subcommand)]
    pub subcommand: ActibatchCommand,
}

#[derive(Subcommand)]
pub enum ActibatchCommand {
    ///
    /// Average sleep reports into one summary table per study
    ///
    SleepSummary {
        /// Folder holding the report CSVs directly
        #[arg(long, env)]
        reports: Option<PathBuf>,
        /// Study folder with one directory per subject
        #[arg(long, env)]
        search_folder: Option<PathBuf>,
        /// Output path prefix, e.g. out/study
        #[arg(long, env)]
        output: PathBuf,
        /// Capture group 1 names the subject
        #[arg(long, env, default_value = "(.*)-sleep-report*")]
        subject_filename_pattern: String,
    },
    ///
    /// Summarize epoch exports masked by validated wear times
    ///
    ActivitySummary {
        /// Folder holding the epoch CSVs
        #[arg(long, env)]
        epochs: PathBuf,
        /// Wear-time validation export for the whole study
        #[arg(long, env)]
        wear_times: PathBuf,
        /// Optional sidecar table of externally computed metrics
        #[arg(long, env)]
        metrics: Option<PathBuf>,
        /// Output path prefix, e.g. out/activity
        #[arg(long, env)]
        output: PathBuf,
    },
    ///
    /// List the per-subject exports a study folder contains
    ///
    Scan {
        #[arg(long, env)]
        search_folder: PathBuf,
    },
    ///
    /// Rewrite a wear-time validation export as a subject study time log
    ///
    Sstlog {
        #[arg(long, env)]
        wear_times: PathBuf,
        #[arg(long, env, default_value = "sstlog.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(error) = dotenv() {
        println!("{}", error);
    }

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = ActibatchCli::parse();
    if cli.jobs == 0 {
        anyhow::bail!("--jobs must be at least 1");
    }

    match cli.subcommand {
        ActibatchCommand::SleepSummary {
            reports,
            search_folder,
            output,
            subject_filename_pattern,
        } => {
            sleep_summary::run(
                reports,
                search_folder,
                output,
                subject_filename_pattern,
                cli.jobs,
            )
            .await
        }
        ActibatchCommand::ActivitySummary {
            epochs,
            wear_times,
            metrics,
            output,
        } => activity_summary::run(epochs, wear_times, metrics, output, cli.jobs).await,
        ActibatchCommand::Scan { search_folder } => {
            let found = actibatch_reports::search_folder(&search_folder)?;
            println!("{}", serde_json::to_string_pretty(&found)?);
            Ok(())
        }
        ActibatchCommand::Sstlog { wear_times, output } => {
            let wear = actibatch_reports::read_wear_times(&wear_times)?;
            sink::write_sstlog(&output, &wear)?;
            println!("Wrote {} subjects to {}", wear.len(), output.display());
            Ok(())
        }
    }
}
