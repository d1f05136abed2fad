//! Data source contract consumed by the report engine, plus the in-process adapters.
//!
//! The engine only needs three things from a table: resolve a column by name, fetch the
//! records matching a [`FilterExpr`], and read one record's value for a resolved column.
//! Pagination stays on the adapter side of the seam; see [`TaskTable::fetch_records`].

mod cell;
mod expr;
mod loader;
mod memory;

pub use cell::{CellValue, FieldHandle, RecordId, SelectOption, TableRecord, TextSegment};
pub use expr::{CompareOp, FilterExpr, Operand};
pub use loader::{ColumnKind, CsvTableLoader};
pub use memory::InMemoryTable;

use async_trait::async_trait;

/// One fetch request against a table.
#[derive(Debug, Clone, Copy)]
pub struct RecordQuery<'a> {
    pub filter: &'a FilterExpr,
    pub page_size: usize,
    pub page_token: Option<&'a str>,
}

/// A single page of matching records.
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub records: Vec<TableRecord>,
    pub has_more: bool,
    pub page_token: Option<String>,
}

/// Access contract for a task-tracking table.
#[async_trait]
pub trait TaskTable: Send + Sync {
    /// Display name of the table.
    async fn name(&self) -> Result<String, TableError>;

    /// Resolves a column by name. A missing column is `Ok(None)`, never an error.
    async fn field_by_name(&self, name: &str) -> Result<Option<FieldHandle>, TableError>;

    async fn fetch_page(&self, query: RecordQuery<'_>) -> Result<RecordPage, TableError>;

    /// Value of `field` on `record`; `None` when the cell is empty.
    async fn cell(
        &self,
        field: &FieldHandle,
        record: &RecordId,
    ) -> Result<Option<CellValue>, TableError>;

    /// Every record matching `filter`, following page tokens until the table is drained.
    async fn fetch_records(
        &self,
        filter: &FilterExpr,
        page_size: usize,
    ) -> Result<Vec<TableRecord>, TableError> {
        let page_size = page_size.max(1);
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .fetch_page(RecordQuery {
                    filter,
                    page_size,
                    page_token: page_token.as_deref(),
                })
                .await?;
            records.extend(page.records);

            match (page.has_more, page.page_token) {
                (true, Some(token)) => page_token = Some(token),
                (true, None) => return Err(TableError::MissingPageToken),
                (false, _) => break,
            }
        }

        Ok(records)
    }
}

/// Failure raised by a table adapter.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to read table export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: column '{column}' holds '{value}', expected a whole number")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("record {0} not found")]
    RecordNotFound(RecordId),
    #[error("page reported more records but carried no page token")]
    MissingPageToken,
    #[error("duplicate record id {0}")]
    DuplicateRecord(RecordId),
    #[error("invalid page token '{0}'")]
    InvalidPageToken(String),
    #[error("table unavailable: {0}")]
    Unavailable(String),
}
