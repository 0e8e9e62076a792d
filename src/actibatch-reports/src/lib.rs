#[macro_use]
extern crate log;

mod error;
pub use error::{ReportError, Result};

mod encoding;
pub use encoding::read_export;

pub mod locale;

mod wear_times;
pub use wear_times::read_wear_times;

mod sleep_report;
pub use sleep_report::{SleepReport, read_sleep_report};

mod epochs;
pub use epochs::read_epoch_series;

mod metrics;
pub use metrics::{MetricsRow, read_metrics};

mod discover;
pub use discover::{EPOCH_SUFFIX, REPORT_SUFFIX, SubjectFiles, WEAR_SUFFIX, search_folder};
