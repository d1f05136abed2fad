//! Weekly report engine: filter → group → render over a [`TaskTable`].
//!
//! [`TaskTable`]: crate::workflows::table::TaskTable

mod exporter;
mod fields;
mod filter;
pub mod flatten;
mod grouping;
mod render;
mod vocabulary;

pub use exporter::{ExporterState, ReportExporter, ReportSettings};
pub use fields::{ReportFields, ResolvedFields};
pub use filter::{RecordFilter, WeekRange, DEFAULT_PAGE_SIZE};
pub use grouping::{GroupedReport, GroupingEngine, ReportGroup, MAX_RECORDS_IN_FLIGHT};
pub use render::render;
pub use vocabulary::ReportVocabulary;

use crate::workflows::table::TableError;

/// The table does not have the shape the report needs.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("description column '{field}' not found on table")]
    MissingDescriptionField { field: String },
    #[error("finish week column '{field}' not found on table")]
    MissingFinishWeekField { field: String },
}

/// Error raised while producing a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report exporter used before init()")]
    NotInitialized,
    #[error("report requested before a week range was set")]
    RangeNotConfigured,
    #[error("not a valid table for report generation: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Table(#[from] TableError),
}
