pub(crate) mod mask;
pub use mask::ValidityMask;

pub(crate) mod clock;
pub use clock::mean_clock_48;

pub(crate) mod night;
pub use night::{CombinedNights, combine_same_nights};

pub(crate) mod cohort;
pub use cohort::{DayGroup, SubjectSummary, cohort_average, summarize_nights};

pub(crate) mod coverage;
pub use coverage::CoverageSummary;

pub mod helpers;
