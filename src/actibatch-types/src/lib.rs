pub(crate) mod subject;
pub use subject::SubjectId;

pub(crate) mod records;
pub use records::{CanonicalNight, EpochSeries, NightRecord, WearInterval};

pub mod schema;
pub use schema::{ColumnRole, ColumnSpec, ReportSchema, SchemaError};

pub(crate) mod table;
pub use table::{CellValue, SummaryTable};

pub(crate) mod format_hm;
pub use format_hm::FormatHM;
