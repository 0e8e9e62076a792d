use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeDelta};

use actibatch_types::{CanonicalNight, NightRecord};

/// Result of collapsing same-night sleep periods: one canonical night per
/// out-bed calendar date, ordered by date, plus the raw period count so
/// callers can report how much was merged.
#[derive(Clone, Debug)]
pub struct CombinedNights {
    pub nights: Vec<CanonicalNight>,
    pub sleeps: usize,
}

impl CombinedNights {
    /// True when at least two sleep periods shared a night.
    pub fn merged(&self) -> bool {
        self.nights.len() < self.sleeps
    }
}

/// Groups records by the calendar date of `out_bed` and collapses each
/// group: numeric fields are summed, `in_bed` takes the earliest, `out_bed`
/// the latest, `onset` the earliest, and the midpoint of sleep is recomputed
/// from the combined totals. A group of one passes through unchanged.
pub fn combine_same_nights(records: Vec<NightRecord>) -> CombinedNights {
    let sleeps = records.len();

    let mut by_date: BTreeMap<NaiveDate, Vec<NightRecord>> = BTreeMap::new();
    for record in records {
        by_date.entry(record.night_date()).or_default().push(record);
    }

    let nights = by_date
        .into_iter()
        .filter_map(|(date, group)| combine_group(date, group))
        .collect();

    CombinedNights { nights, sleeps }
}

fn combine_group(date: NaiveDate, group: Vec<NightRecord>) -> Option<CanonicalNight> {
    let first = group.first()?;
    let subject = first.subject.clone();

    let mut in_bed = first.in_bed;
    let mut onset = first.onset;
    let mut out_bed = first.out_bed;
    let mut total_sleep_min = 0.0;
    let mut time_in_bed_min = 0.0;
    let mut awakenings = 0.0;
    let mut waso_min = 0.0;
    let mut extra: BTreeMap<String, f64> = BTreeMap::new();

    for record in &group {
        in_bed = in_bed.min(record.in_bed);
        onset = onset.min(record.onset);
        out_bed = out_bed.max(record.out_bed);
        total_sleep_min += record.total_sleep_min;
        time_in_bed_min += record.time_in_bed_min;
        awakenings += record.awakenings;
        waso_min += record.waso_min;
        for (name, value) in &record.extra {
            *extra.entry(name.clone()).or_default() += value;
        }
    }

    let midpoint = onset + TimeDelta::seconds((total_sleep_min * 30.0).round() as i64);

    Some(CanonicalNight {
        subject,
        date,
        in_bed,
        onset,
        out_bed,
        midpoint,
        total_sleep_min,
        time_in_bed_min,
        awakenings,
        waso_min,
        extra,
        sleeps: group.len(),
    })
}
