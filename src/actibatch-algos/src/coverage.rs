use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use actibatch_types::EpochSeries;

use crate::ValidityMask;
use crate::helpers::time_math;

/// Recording coverage and activity totals for one epoch series, optionally
/// restricted to wear-validated epochs.
#[derive(Clone, Debug, PartialEq)]
pub struct CoverageSummary {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub epochs: usize,
    /// Whether a wear-time mask was applied at all.
    pub masked: bool,
    /// Share of epochs inside wear intervals, absent when unmasked.
    pub valid_fraction: Option<f64>,
    /// Average daily activity total: mean over calendar dates of the summed
    /// counts of that date's valid epochs. Absent when no epoch is valid.
    pub adat: Option<f64>,
}

impl CoverageSummary {
    /// Summarizes one series. With no mask every epoch counts; with a mask
    /// only valid epochs enter the daily totals. An empty series has no
    /// coverage to report.
    pub fn new(series: &EpochSeries, mask: Option<&ValidityMask>) -> Option<Self> {
        let start = series.start()?;
        let end = series.end()?;

        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (i, (timestamp, counts)) in series.timestamps.iter().zip(&series.counts).enumerate() {
            if mask.map_or(true, |mask| mask.is_valid(i)) {
                *daily.entry(timestamp.date()).or_default() += counts;
            }
        }

        let adat = if daily.is_empty() {
            None
        } else {
            let totals: Vec<f64> = daily.values().copied().collect();
            Some(time_math::mean(&totals))
        };

        Some(Self {
            start,
            end,
            epochs: series.len(),
            masked: mask.is_some(),
            valid_fraction: mask.map(ValidityMask::fraction),
            adat,
        })
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}
