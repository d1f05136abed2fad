use super::flatten::flatten_segments;
use super::{ReportVocabulary, ResolvedFields};
use crate::workflows::table::{CellValue, FieldHandle, RecordId, TableError, TableRecord, TaskTable};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// One numbered section of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportGroup {
    pub name: String,
    pub items: Vec<String>,
}

/// Group name to rendered descriptions, in first-seen order. The sentinel bucket is
/// always present and always first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedReport {
    groups: Vec<ReportGroup>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl GroupedReport {
    pub fn new(sentinel: impl Into<String>) -> Self {
        let sentinel = sentinel.into();
        let mut index = HashMap::new();
        index.insert(sentinel.clone(), 0);

        Self {
            groups: vec![ReportGroup {
                name: sentinel,
                items: Vec::new(),
            }],
            index,
        }
    }

    pub fn groups(&self) -> &[ReportGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&ReportGroup> {
        self.index
            .get(name)
            .and_then(|position| self.groups.get(*position))
    }

    pub fn sentinel(&self) -> &ReportGroup {
        &self.groups[0]
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|group| group.items.len()).sum()
    }

    fn sentinel_items(&mut self) -> &mut Vec<String> {
        &mut self.groups[0].items
    }

    /// Appends to `name`, opening a new bucket at the end when it is first seen.
    fn push(&mut self, name: String, item: String) {
        let position = match self.index.get(&name) {
            Some(position) => *position,
            None => {
                let position = self.groups.len();
                self.index.insert(name.clone(), position);
                self.groups.push(ReportGroup {
                    name,
                    items: Vec::new(),
                });
                position
            }
        };
        self.groups[position].items.push(item);
    }
}

/// Records whose cells are read concurrently. Each record issues four lookups.
pub const MAX_RECORDS_IN_FLIGHT: usize = 16;

/// A reportable record after its cells have been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportEntry {
    pub(crate) description: String,
    pub(crate) group: Option<String>,
}

/// Buckets filtered records by their group tag.
pub struct GroupingEngine<'a> {
    fields: &'a ResolvedFields,
    vocabulary: &'a ReportVocabulary,
}

impl<'a> GroupingEngine<'a> {
    pub fn new(fields: &'a ResolvedFields, vocabulary: &'a ReportVocabulary) -> Self {
        Self { fields, vocabulary }
    }

    /// Cell lookups run for at most [`MAX_RECORDS_IN_FLIGHT`] records at a time; results
    /// keep record order.
    pub async fn group<T>(
        &self,
        table: &T,
        records: &[TableRecord],
    ) -> Result<GroupedReport, TableError>
    where
        T: TaskTable + ?Sized,
    {
        let lookups: Vec<_> = records
            .iter()
            .map(|record| self.resolve_entry(table, &record.record_id))
            .collect();
        let entries: Vec<Option<ReportEntry>> = stream::iter(lookups)
            .buffered(MAX_RECORDS_IN_FLIGHT)
            .try_collect()
            .await?;

        Ok(self.assemble(entries))
    }

    async fn resolve_entry<T>(
        &self,
        table: &T,
        record: &RecordId,
    ) -> Result<Option<ReportEntry>, TableError>
    where
        T: TaskTable + ?Sized,
    {
        let (description, state, parent, group) = futures::try_join!(
            read_cell(table, Some(&self.fields.description), record),
            read_cell(table, self.fields.state.as_ref(), record),
            read_cell(table, self.fields.parent.as_ref(), record),
            read_cell(table, self.fields.group.as_ref(), record),
        )?;

        // Only top-level tasks are reported.
        if parent.is_some() {
            debug!(%record, "skipping sub-item");
            return Ok(None);
        }

        let mut description = match description
            .as_ref()
            .and_then(CellValue::text_segments)
            .map(flatten_segments)
        {
            Some(text) if !text.is_empty() => text,
            _ => {
                debug!(%record, "skipping record without description");
                return Ok(None);
            }
        };

        if state
            .as_ref()
            .and_then(CellValue::label)
            .is_some_and(|label| self.vocabulary.is_in_progress(&label))
        {
            description.push_str(&self.vocabulary.unfinished_marker);
        }

        let group = group
            .as_ref()
            .and_then(CellValue::first_label)
            .map(|label| label.into_owned());

        Ok(Some(ReportEntry { description, group }))
    }

    /// Folds resolved entries into buckets. Skipped records arrive as `None`.
    pub(crate) fn assemble(&self, entries: Vec<Option<ReportEntry>>) -> GroupedReport {
        let mut report = GroupedReport::new(self.vocabulary.other_group.clone());
        let entries = entries.into_iter().flatten();

        if self.fields.group.is_none() {
            report
                .sentinel_items()
                .extend(entries.map(|entry| entry.description));
            return report;
        }

        for entry in entries {
            match entry.group {
                Some(name) => report.push(name, entry.description),
                None => report.sentinel_items().push(entry.description),
            }
        }

        report
    }
}

async fn read_cell<T>(
    table: &T,
    field: Option<&FieldHandle>,
    record: &RecordId,
) -> Result<Option<CellValue>, TableError>
where
    T: TaskTable + ?Sized,
{
    match field {
        Some(field) => Ok(table
            .cell(field, record)
            .await?
            .filter(|value| !value.is_empty())),
        None => Ok(None),
    }
}
