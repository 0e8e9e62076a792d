use chrono::NaiveTime;

use crate::helpers::time_math::{mean, pivot_minutes};

/// Averages clock times by unrolling them onto a 48-hour line cut at the
/// pivot hour: samples with an hour strictly greater than the pivot stay on
/// the first day, the rest move to the second. The mean is folded back into
/// one day and truncated to whole minutes; seconds of the samples are
/// ignored.
///
/// This is a linear stand-in for a true circular mean and is only unbiased
/// while the samples keep clear of the cut point. Returns `None` for an
/// empty sample or a pivot outside 0..=23.
pub fn mean_clock_48(times: &[NaiveTime], pivot: u32) -> Option<NaiveTime> {
    if times.is_empty() || pivot > 23 {
        return None;
    }

    let minutes: Vec<f64> = times
        .iter()
        .map(|t| pivot_minutes(t, pivot) as f64)
        .collect();

    let mut average = mean(&minutes);
    if average >= 1440.0 {
        average -= 1440.0;
    }

    NaiveTime::from_hms_opt((average / 60.0) as u32, (average % 60.0) as u32, 0)
}
