use chrono::NaiveDateTime;

use actibatch_types::WearInterval;

/// Per-epoch validity derived from wear-time intervals: a set position means
/// the epoch falls inside at least one interval, bounds inclusive.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidityMask {
    bits: Vec<bool>,
}

impl ValidityMask {
    /// Builds the mask for a strictly increasing timestamp index.
    ///
    /// `None` intervals means the subject has no wear-time group at all,
    /// which is different from intervals that cover nothing: the first gives
    /// no mask, the second an all-false one.
    pub fn from_intervals(
        index: &[NaiveDateTime],
        intervals: Option<&[WearInterval]>,
    ) -> Option<Self> {
        let intervals = intervals?;

        let mut sorted = intervals.to_vec();
        sorted.sort_by_key(|interval| interval.start);

        let mut bits = vec![false; index.len()];
        let mut pos = 0;
        for interval in sorted {
            while pos < index.len() && index[pos] < interval.start {
                pos += 1;
            }
            // Overlapping intervals rescan the shared range, which keeps
            // the union idempotent.
            let mut j = pos;
            while j < index.len() && index[j] <= interval.stop {
                bits[j] = true;
                j += 1;
            }
        }

        Some(Self { bits })
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn is_valid(&self, epoch: usize) -> bool {
        self.bits.get(epoch).copied().unwrap_or(false)
    }

    pub fn valid_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Share of epochs covered by at least one interval.
    pub fn fraction(&self) -> f64 {
        if self.bits.is_empty() {
            0.0
        } else {
            self.valid_count() as f64 / self.bits.len() as f64
        }
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }
}
