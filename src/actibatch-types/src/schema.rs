use thiserror::Error;

/// Pivot hour for bed-time clock columns. Sleep times cluster around
/// midnight, so the 48-hour line is cut in the mid-afternoon.
pub const SLEEP_PIVOT: u32 = 14;

/// Pivot hour for activity-rhythm midpoints (L5 sits in the night, M10 in
/// the day), cutting the line in the early morning instead.
pub const RHYTHM_PIVOT: u32 = 5;

pub const TOTAL_SLEEP: &str = "TST";
pub const TIME_IN_BED: &str = "TBT";
pub const AWAKENINGS: &str = "Awakenings";
pub const WASO: &str = "WASO";
pub const IN_BED: &str = "In Bed";
pub const ONSET: &str = "Onset";
pub const MIDPOINT: &str = "MPOS";
pub const OUT_BED: &str = "Out Bed";

pub const START_TIME: &str = "Start_time";
pub const EPOCHS: &str = "Epochs";
pub const DURATION: &str = "Duration";
pub const MASKED: &str = "Masked";
pub const MASK_FRACTION: &str = "Mask_fraction";
pub const ADAT: &str = "ADAT";

#[derive(Debug, Error)]
#[error("{self:?}")]
pub enum SchemaError {
    PivotOutOfRange(u32),
    DuplicateColumn(String),
}

/// How a column is averaged and displayed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColumnRole {
    /// Arithmetic mean, shown as a plain number.
    Scalar,
    /// Minutes; averaged arithmetically, shown as a clock time.
    Duration,
    /// Time of day; averaged circularly around the pivot hour.
    Clock { pivot: u32 },
    /// Carried through per subject, never averaged.
    Info,
}

#[derive(Clone, Debug)]
pub struct ColumnSpec {
    /// Column header as written in the source export.
    pub source: String,
    /// Canonical short name used everywhere downstream.
    pub name: String,
    pub role: ColumnRole,
}

impl ColumnSpec {
    pub fn new(source: impl Into<String>, name: impl Into<String>, role: ColumnRole) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
            role,
        }
    }

    /// Column that keeps its source header as the canonical name.
    pub fn keep(name: impl Into<String>, role: ColumnRole) -> Self {
        let name = name.into();
        Self {
            source: name.clone(),
            name,
            role,
        }
    }
}

/// The declared mapping from export columns to canonical summary columns.
#[derive(Clone, Debug, Default)]
pub struct ReportSchema {
    columns: Vec<ColumnSpec>,
}

impl ReportSchema {
    pub fn new(columns: Vec<ColumnSpec>) -> Result<Self, SchemaError> {
        for (i, spec) in columns.iter().enumerate() {
            if let ColumnRole::Clock { pivot } = spec.role {
                if pivot > 23 {
                    return Err(SchemaError::PivotOutOfRange(pivot));
                }
            }
            if columns[..i].iter().any(|other| other.name == spec.name) {
                return Err(SchemaError::DuplicateColumn(spec.name.clone()));
            }
        }
        Ok(Self { columns })
    }

    /// Standard columns of a clinician sleep report.
    pub fn sleep() -> Self {
        let clock = ColumnRole::Clock { pivot: SLEEP_PIVOT };
        Self {
            columns: vec![
                ColumnSpec::keep(IN_BED, clock),
                ColumnSpec::keep(ONSET, clock),
                ColumnSpec::keep(MIDPOINT, clock),
                ColumnSpec::keep(OUT_BED, clock),
                ColumnSpec::new("Total Sleep Time (TST)", TOTAL_SLEEP, ColumnRole::Duration),
                ColumnSpec::new("Total Minutes in Bed", TIME_IN_BED, ColumnRole::Duration),
                ColumnSpec::new("Number of Awakenings", AWAKENINGS, ColumnRole::Scalar),
                ColumnSpec::new("Wake After Sleep Onset (WASO)", WASO, ColumnRole::Scalar),
                ColumnSpec::new("Average Awakening Length", "AAL", ColumnRole::Scalar),
                ColumnSpec::new("Sleep Fragmentation Index", "SFI", ColumnRole::Scalar),
            ],
        }
    }

    /// Columns of the wear-time coverage table, including the externally
    /// computed rhythm metrics joined in as opaque values.
    pub fn activity() -> Self {
        let clock = ColumnRole::Clock {
            pivot: RHYTHM_PIVOT,
        };
        Self {
            columns: vec![
                ColumnSpec::keep(START_TIME, ColumnRole::Info),
                ColumnSpec::keep(EPOCHS, ColumnRole::Scalar),
                ColumnSpec::keep(DURATION, ColumnRole::Info),
                ColumnSpec::keep(MASKED, ColumnRole::Scalar),
                ColumnSpec::keep(MASK_FRACTION, ColumnRole::Scalar),
                ColumnSpec::keep(ADAT, ColumnRole::Scalar),
                ColumnSpec::keep("L5", ColumnRole::Scalar),
                ColumnSpec::keep("L5 Midpoint", clock),
                ColumnSpec::keep("M10", ColumnRole::Scalar),
                ColumnSpec::keep("M10 Midpoint", clock),
                ColumnSpec::keep("RA", ColumnRole::Scalar),
                ColumnSpec::keep("IS", ColumnRole::Scalar),
                ColumnSpec::keep("IV", ColumnRole::Scalar),
                ColumnSpec::keep("ISm", ColumnRole::Scalar),
                ColumnSpec::keep("IVm", ColumnRole::Scalar),
            ],
        }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn by_source(&self, header: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|spec| spec.source == header)
    }

    pub fn by_name(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|spec| spec.name == name)
    }

    pub fn role(&self, name: &str) -> Option<ColumnRole> {
        self.by_name(name).map(|spec| spec.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_pivot_past_the_last_hour() {
        let result = ReportSchema::new(vec![ColumnSpec::keep(
            "Onset",
            ColumnRole::Clock { pivot: 24 },
        )]);
        assert!(matches!(result, Err(SchemaError::PivotOutOfRange(24))));
    }

    #[test]
    fn rejects_duplicate_canonical_names() {
        let result = ReportSchema::new(vec![
            ColumnSpec::new("Total Sleep Time (TST)", "TST", ColumnRole::Duration),
            ColumnSpec::new("TST minutes", "TST", ColumnRole::Scalar),
        ]);
        assert!(matches!(result, Err(SchemaError::DuplicateColumn(_))));
    }

    #[test]
    fn sleep_schema_maps_the_report_headers() {
        let schema = ReportSchema::sleep();
        let tst = schema.by_source("Total Sleep Time (TST)").unwrap();
        assert_eq!(tst.name, "TST");
        assert_eq!(tst.role, ColumnRole::Duration);
        assert_eq!(
            schema.role("Onset"),
            Some(ColumnRole::Clock { pivot: SLEEP_PIVOT })
        );
        assert_eq!(schema.role("WASO"), Some(ColumnRole::Scalar));
    }

    #[test]
    fn activity_schema_pins_the_rhythm_pivot() {
        let schema = ReportSchema::activity();
        assert_eq!(
            schema.role("L5 Midpoint"),
            Some(ColumnRole::Clock {
                pivot: RHYTHM_PIVOT
            })
        );
        assert_eq!(schema.role("Start_time"), Some(ColumnRole::Info));
        assert_eq!(schema.role("RA"), Some(ColumnRole::Scalar));
    }
}
