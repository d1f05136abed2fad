use super::{
    CellValue, FieldHandle, FilterExpr, RecordId, RecordPage, RecordQuery, TableError,
    TableRecord, TaskTable,
};
use async_trait::async_trait;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct MemoryRow {
    record_id: RecordId,
    cells: HashMap<String, CellValue>,
}

/// Table held entirely in memory. Pages are served with an offset token.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTable {
    name: String,
    fields: Vec<FieldHandle>,
    field_ids: HashMap<String, String>,
    rows: Vec<MemoryRow>,
    row_index: HashMap<RecordId, usize>,
}

impl InMemoryTable {
    pub fn new<I, S>(name: impl Into<String>, field_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self {
            name: name.into(),
            ..Self::default()
        };
        for field_name in field_names {
            table.add_field(field_name);
        }
        table
    }

    /// Adds a column, returning the existing handle when the name is already taken.
    pub fn add_field(&mut self, name: impl Into<String>) -> FieldHandle {
        let name = name.into();
        if let Some(existing) = self.field_by_name_sync(&name) {
            return existing;
        }

        let handle = FieldHandle {
            id: format!("fld{}", self.fields.len() + 1),
            name: name.clone(),
        };
        self.field_ids.insert(name, handle.id.clone());
        self.fields.push(handle.clone());
        handle
    }

    /// Appends a row. Cells are keyed by field name; empty values are dropped.
    pub fn insert<I, S>(&mut self, record_id: RecordId, cells: I) -> Result<(), TableError>
    where
        I: IntoIterator<Item = (S, CellValue)>,
        S: AsRef<str>,
    {
        if self.row_index.contains_key(&record_id) {
            return Err(TableError::DuplicateRecord(record_id));
        }

        let mut row = MemoryRow {
            record_id: record_id.clone(),
            cells: HashMap::new(),
        };
        for (field_name, value) in cells {
            let field_name = field_name.as_ref();
            let field_id = self
                .field_ids
                .get(field_name)
                .ok_or_else(|| TableError::UnknownField(field_name.to_string()))?;
            if !value.is_empty() {
                row.cells.insert(field_id.clone(), value);
            }
        }

        self.row_index.insert(record_id, self.rows.len());
        self.rows.push(row);
        Ok(())
    }

    pub fn fields(&self) -> &[FieldHandle] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn field_by_name_sync(&self, name: &str) -> Option<FieldHandle> {
        self.fields.iter().find(|field| field.name == name).cloned()
    }

    fn matching_rows<'a>(
        &'a self,
        filter: &'a FilterExpr,
    ) -> impl Iterator<Item = &'a MemoryRow> + 'a {
        self.rows.iter().filter(move |row| {
            let row: &MemoryRow = row;
            let lookup = |name: &str| {
                self.field_ids
                    .get(name)
                    .and_then(|field_id| row.cells.get(field_id))
            };
            filter.matches(&lookup)
        })
    }
}

#[async_trait]
impl TaskTable for InMemoryTable {
    async fn name(&self) -> Result<String, TableError> {
        Ok(self.name.clone())
    }

    async fn field_by_name(&self, name: &str) -> Result<Option<FieldHandle>, TableError> {
        Ok(self.field_by_name_sync(name))
    }

    async fn fetch_page(&self, query: RecordQuery<'_>) -> Result<RecordPage, TableError> {
        let offset = match query.page_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| TableError::InvalidPageToken(token.to_string()))?,
            None => 0,
        };
        let page_size = query.page_size.max(1);

        let mut matching = self.matching_rows(query.filter).skip(offset);
        let records: Vec<TableRecord> = matching
            .by_ref()
            .take(page_size)
            .map(|row| TableRecord {
                record_id: row.record_id.clone(),
            })
            .collect();
        let has_more = matching.next().is_some();
        let page_token = has_more.then(|| (offset + records.len()).to_string());

        Ok(RecordPage {
            records,
            has_more,
            page_token,
        })
    }

    async fn cell(
        &self,
        field: &FieldHandle,
        record: &RecordId,
    ) -> Result<Option<CellValue>, TableError> {
        let index = self
            .row_index
            .get(record)
            .ok_or_else(|| TableError::RecordNotFound(record.clone()))?;
        Ok(self
            .rows
            .get(*index)
            .and_then(|row| row.cells.get(&field.id))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::table::CompareOp;

    fn numbered_table(rows: usize) -> InMemoryTable {
        let mut table = InMemoryTable::new("Tasks", ["finish_week"]);
        for index in 0..rows {
            table
                .insert(
                    RecordId::new(format!("rec{index}")),
                    [("finish_week", CellValue::Number(index as i64))],
                )
                .expect("row inserts");
        }
        table
    }

    #[tokio::test]
    async fn fetch_records_follows_page_tokens() {
        let table = numbered_table(7);
        let filter = FilterExpr::number("finish_week", CompareOp::Gte, 1);

        let first = table
            .fetch_page(RecordQuery {
                filter: &filter,
                page_size: 4,
                page_token: None,
            })
            .await
            .expect("first page");
        assert_eq!(first.records.len(), 4);
        assert!(first.has_more);
        assert_eq!(first.page_token.as_deref(), Some("4"));

        let all = table.fetch_records(&filter, 4).await.expect("all pages");
        let ids: Vec<&str> = all.iter().map(|record| record.record_id.as_str()).collect();
        assert_eq!(ids, ["rec1", "rec2", "rec3", "rec4", "rec5", "rec6"]);
    }

    /// Keeps `has_more` but drops the continuation token.
    struct TokenlessPages(InMemoryTable);

    #[async_trait]
    impl TaskTable for TokenlessPages {
        async fn name(&self) -> Result<String, TableError> {
            self.0.name().await
        }

        async fn field_by_name(&self, name: &str) -> Result<Option<FieldHandle>, TableError> {
            self.0.field_by_name(name).await
        }

        async fn fetch_page(&self, query: RecordQuery<'_>) -> Result<RecordPage, TableError> {
            let mut page = self.0.fetch_page(query).await?;
            page.page_token = None;
            Ok(page)
        }

        async fn cell(
            &self,
            field: &FieldHandle,
            record: &RecordId,
        ) -> Result<Option<CellValue>, TableError> {
            self.0.cell(field, record).await
        }
    }

    #[tokio::test]
    async fn fetch_records_rejects_pages_without_continuation_token() {
        let table = TokenlessPages(numbered_table(6));
        let filter = FilterExpr::number("finish_week", CompareOp::Gte, 1);

        let error = table
            .fetch_records(&filter, 2)
            .await
            .expect_err("truncated listing is an error");
        assert!(matches!(error, TableError::MissingPageToken));

        let single_page = table
            .fetch_records(&filter, 10)
            .await
            .expect("last page needs no token");
        assert_eq!(single_page.len(), 5);
    }

    #[tokio::test]
    async fn cell_lookup_reports_unknown_records() {
        let table = numbered_table(1);
        let field = table
            .field_by_name("finish_week")
            .await
            .expect("lookup succeeds")
            .expect("field present");

        let value = table
            .cell(&field, &RecordId::new("rec0"))
            .await
            .expect("cell reads");
        assert_eq!(value, Some(CellValue::Number(0)));

        let error = table
            .cell(&field, &RecordId::new("missing"))
            .await
            .expect_err("unknown record");
        assert!(matches!(error, TableError::RecordNotFound(_)));
    }

    #[test]
    fn insert_rejects_unknown_fields_and_duplicates() {
        let mut table = numbered_table(1);
        let error = table
            .insert(RecordId::new("rec9"), [("nope", CellValue::Number(1))])
            .expect_err("unknown field");
        assert!(matches!(error, TableError::UnknownField(name) if name == "nope"));

        let error = table
            .insert(RecordId::new("rec0"), Vec::<(&str, CellValue)>::new())
            .expect_err("duplicate id");
        assert!(matches!(error, TableError::DuplicateRecord(_)));
    }

    #[tokio::test]
    async fn missing_fields_resolve_to_none() {
        let table = numbered_table(0);
        assert!(table
            .field_by_name("task_group")
            .await
            .expect("lookup succeeds")
            .is_none());
    }
}
