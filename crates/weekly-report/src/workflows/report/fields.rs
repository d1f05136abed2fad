use super::{ReportError, ValidationError};
use crate::workflows::table::{ColumnKind, CsvTableLoader, FieldHandle, TableError, TaskTable};
use serde::{Deserialize, Serialize};

/// Logical column names the report reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFields {
    pub description: String,
    pub group: String,
    pub state: String,
    pub finish_week: String,
    pub parent: String,
}

impl Default for ReportFields {
    fn default() -> Self {
        Self {
            description: "task_description".to_string(),
            group: "task_group".to_string(),
            state: "state".to_string(),
            finish_week: "finish_week".to_string(),
            parent: "Parent items".to_string(),
        }
    }
}

impl ReportFields {
    /// CSV loader that types the report's columns.
    pub fn csv_loader(&self) -> CsvTableLoader {
        CsvTableLoader::new()
            .with_column(&self.description, ColumnKind::RichText)
            .with_column(&self.group, ColumnKind::MultiSelect)
            .with_column(&self.state, ColumnKind::SingleSelect)
            .with_column(&self.finish_week, ColumnKind::Number)
            .with_column(&self.parent, ColumnKind::Link)
    }

    /// Resolves the columns on `table`. Only the description column is mandatory.
    pub async fn resolve<T>(&self, table: &T) -> Result<ResolvedFields, ReportError>
    where
        T: TaskTable + ?Sized,
    {
        let (description, group, state, parent) = futures::try_join!(
            table.field_by_name(&self.description),
            table.field_by_name(&self.group),
            table.field_by_name(&self.state),
            table.field_by_name(&self.parent),
        )?;

        let description = description.ok_or_else(|| ValidationError::MissingDescriptionField {
            field: self.description.clone(),
        })?;

        Ok(ResolvedFields {
            description,
            group,
            state,
            parent,
        })
    }

    pub(crate) async fn has_finish_week<T>(&self, table: &T) -> Result<bool, TableError>
    where
        T: TaskTable + ?Sized,
    {
        Ok(table.field_by_name(&self.finish_week).await?.is_some())
    }
}

/// Column handles resolved once per exporter. A table without a group column is a
/// supported layout, so `group` stays optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFields {
    pub description: FieldHandle,
    pub group: Option<FieldHandle>,
    pub state: Option<FieldHandle>,
    pub parent: Option<FieldHandle>,
}
