use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::SubjectId;
use crate::schema;

/// One clinician-validated interval during which the device was worn.
/// Both bounds are inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WearInterval {
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
}

impl WearInterval {
    pub fn new(start: NaiveDateTime, stop: NaiveDateTime) -> Self {
        Self { start, stop }
    }

    pub fn contains(&self, time: NaiveDateTime) -> bool {
        self.start <= time && time <= self.stop
    }
}

/// One subject's epoch-by-epoch activity counts, timestamps strictly
/// increasing. Parsers enforce the ordering before this is constructed.
#[derive(Clone, Debug, PartialEq)]
pub struct EpochSeries {
    pub subject: SubjectId,
    pub timestamps: Vec<NaiveDateTime>,
    pub counts: Vec<f64>,
}

impl EpochSeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.timestamps.last().copied()
    }
}

/// One row of a sleep report: a single scored sleep period.
///
/// The four standard sums are fields; any further numeric report columns
/// ride along in `extra` under their canonical names.
#[derive(Clone, Debug, PartialEq)]
pub struct NightRecord {
    pub subject: SubjectId,
    pub in_bed: NaiveDateTime,
    pub onset: NaiveDateTime,
    pub out_bed: NaiveDateTime,
    pub total_sleep_min: f64,
    pub time_in_bed_min: f64,
    pub awakenings: f64,
    pub waso_min: f64,
    pub extra: BTreeMap<String, f64>,
}

impl NightRecord {
    /// Calendar date this record is filed under when nights are combined.
    pub fn night_date(&self) -> NaiveDate {
        self.out_bed.date()
    }
}

/// One night after same-date records have been collapsed: exactly one of
/// these exists per (subject, out-bed date).
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalNight {
    pub subject: SubjectId,
    pub date: NaiveDate,
    pub in_bed: NaiveDateTime,
    pub onset: NaiveDateTime,
    pub out_bed: NaiveDateTime,
    /// Onset plus half the total sleep time, recomputed from the combined
    /// values rather than carried over from the source rows.
    pub midpoint: NaiveDateTime,
    pub total_sleep_min: f64,
    pub time_in_bed_min: f64,
    pub awakenings: f64,
    pub waso_min: f64,
    pub extra: BTreeMap<String, f64>,
    /// How many sleep periods were merged into this night.
    pub sleeps: usize,
}

impl CanonicalNight {
    pub fn duration_in_bed(&self) -> TimeDelta {
        self.out_bed - self.in_bed
    }

    /// Numeric value of a canonical column, `None` when the night does not
    /// carry it.
    pub fn value(&self, name: &str) -> Option<f64> {
        match name {
            schema::TOTAL_SLEEP => Some(self.total_sleep_min),
            schema::TIME_IN_BED => Some(self.time_in_bed_min),
            schema::AWAKENINGS => Some(self.awakenings),
            schema::WASO => Some(self.waso_min),
            _ => self.extra.get(name).copied(),
        }
    }

    /// Clock-of-day view of one of the four bed-time columns.
    pub fn clock(&self, name: &str) -> Option<NaiveTime> {
        match name {
            schema::IN_BED => Some(self.in_bed.time()),
            schema::ONSET => Some(self.onset.time()),
            schema::MIDPOINT => Some(self.midpoint.time()),
            schema::OUT_BED => Some(self.out_bed.time()),
            _ => None,
        }
    }
}
