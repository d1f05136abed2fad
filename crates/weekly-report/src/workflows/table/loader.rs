use super::{CellValue, InMemoryTable, RecordId, SelectOption, TableError};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

const RECORD_ID_COLUMN: &str = "record_id";
const LIST_SEPARATOR: char = ';';

/// How a CSV column is turned into cell values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    RichText,
    Number,
    SingleSelect,
    /// `;`-separated option labels.
    MultiSelect,
    /// `;`-separated record ids.
    Link,
}

/// Builds an [`InMemoryTable`] from a CSV export whose header row names the fields.
///
/// Columns without a registered kind are read as rich text. An optional `record_id`
/// column supplies identifiers; otherwise rows are numbered `rec1`, `rec2`, ...
#[derive(Debug, Clone, Default)]
pub struct CsvTableLoader {
    kinds: HashMap<String, ColumnKind>,
}

impl CsvTableLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.kinds.insert(name.into(), kind);
        self
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<InMemoryTable, TableError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = std::fs::File::open(path)?;
        self.from_reader(name, file)
    }

    pub fn from_reader<R: Read>(
        &self,
        table_name: impl Into<String>,
        reader: R,
    ) -> Result<InMemoryTable, TableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut table = InMemoryTable::new(
            table_name,
            headers
                .iter()
                .filter(|header| header.as_str() != RECORD_ID_COLUMN),
        );

        for (index, row) in csv_reader.records().enumerate() {
            let row = row?;
            let row_number = index + 1;
            let mut record_id = RecordId::new(format!("rec{row_number}"));
            let mut cells = Vec::with_capacity(headers.len());

            for (column, raw) in headers.iter().zip(row.iter()) {
                if column == RECORD_ID_COLUMN {
                    if !raw.is_empty() {
                        record_id = RecordId::new(raw);
                    }
                    continue;
                }
                if let Some(value) = self.parse_cell(row_number, column, raw)? {
                    cells.push((column.as_str(), value));
                }
            }

            table.insert(record_id, cells)?;
        }

        debug!(rows = table.len(), "loaded table from CSV export");
        Ok(table)
    }

    fn parse_cell(
        &self,
        row: usize,
        column: &str,
        raw: &str,
    ) -> Result<Option<CellValue>, TableError> {
        if raw.is_empty() {
            return Ok(None);
        }

        let kind = self
            .kinds
            .get(column)
            .copied()
            .unwrap_or(ColumnKind::RichText);
        let value = match kind {
            ColumnKind::RichText => CellValue::text(raw),
            ColumnKind::SingleSelect => CellValue::single_select(raw),
            ColumnKind::MultiSelect => {
                CellValue::MultiSelect(split_list(raw).map(SelectOption::new).collect())
            }
            ColumnKind::Link => CellValue::Link(split_list(raw).map(RecordId::new).collect()),
            ColumnKind::Number => {
                let number = raw.parse::<i64>().map_err(|_| TableError::InvalidCell {
                    row,
                    column: column.to_string(),
                    value: raw.to_string(),
                })?;
                CellValue::Number(number)
            }
        };

        Ok(Some(value))
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::table::TaskTable;

    fn loader() -> CsvTableLoader {
        CsvTableLoader::new()
            .with_column("finish_week", ColumnKind::Number)
            .with_column("task_group", ColumnKind::MultiSelect)
            .with_column("Parent items", ColumnKind::Link)
    }

    #[tokio::test]
    async fn parses_typed_columns() {
        let csv = "record_id,task_description,task_group,finish_week,Parent items\n\
r1,Ship it,Design; Ops,5,\n\
,Sub step,,5,r1\n";
        let table = loader()
            .from_reader("Tasks", csv.as_bytes())
            .expect("csv loads");
        assert_eq!(table.len(), 2);
        assert_eq!(table.fields().len(), 4);

        let group = table
            .field_by_name("task_group")
            .await
            .expect("lookup")
            .expect("group field");
        let value = table
            .cell(&group, &RecordId::new("r1"))
            .await
            .expect("cell");
        assert_eq!(value, Some(CellValue::multi_select(["Design", "Ops"])));

        let parent = table
            .field_by_name("Parent items")
            .await
            .expect("lookup")
            .expect("parent field");
        let value = table
            .cell(&parent, &RecordId::new("rec2"))
            .await
            .expect("cell");
        assert_eq!(value, Some(CellValue::link("r1")));
    }

    #[test]
    fn rejects_non_numeric_weeks() {
        let csv = "task_description,finish_week\nShip it,soon\n";
        let error = loader()
            .from_reader("Tasks", csv.as_bytes())
            .expect_err("week must be numeric");
        match error {
            TableError::InvalidCell { row, column, value } => {
                assert_eq!(row, 1);
                assert_eq!(column, "finish_week");
                assert_eq!(value, "soon");
            }
            other => panic!("expected invalid cell, got {other:?}"),
        }
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = loader()
            .from_path("./does-not-exist.csv")
            .expect_err("expected io error");
        assert!(matches!(error, TableError::Io(_)));
    }
}
