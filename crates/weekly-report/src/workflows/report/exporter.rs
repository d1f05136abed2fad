use super::filter::{RecordFilter, WeekRange, DEFAULT_PAGE_SIZE};
use super::grouping::{GroupedReport, GroupingEngine};
use super::render::render;
use super::{ReportError, ReportFields, ReportVocabulary, ResolvedFields, ValidationError};
use crate::workflows::table::TaskTable;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Field names, vocabulary, and paging shared by every exporter built from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    pub fields: ReportFields,
    pub vocabulary: ReportVocabulary,
    pub page_size: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            fields: ReportFields::default(),
            vocabulary: ReportVocabulary::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExporterState {
    Uninitialized,
    Ready,
    Configured,
}

/// Builds the weekly report for one table: resolve columns, filter by week range and
/// lifecycle state, group by tag, render.
///
/// ```text
/// Uninitialized --init()--> Ready --set_filter_range()--> Configured
/// ```
///
/// Only a `Configured` exporter produces reports; earlier states fail with
/// [`ReportError::NotInitialized`] or [`ReportError::RangeNotConfigured`].
pub struct ReportExporter<T: ?Sized> {
    table: Arc<T>,
    settings: ReportSettings,
    resolved: Option<ResolvedFields>,
    range: Option<WeekRange>,
}

impl<T> ReportExporter<T>
where
    T: TaskTable + ?Sized,
{
    pub fn new(table: Arc<T>) -> Self {
        Self::with_settings(table, ReportSettings::default())
    }

    pub fn with_settings(table: Arc<T>, settings: ReportSettings) -> Self {
        Self {
            table,
            settings,
            resolved: None,
            range: None,
        }
    }

    pub fn state(&self) -> ExporterState {
        match (&self.resolved, self.range) {
            (None, _) => ExporterState::Uninitialized,
            (Some(_), None) => ExporterState::Ready,
            (Some(_), Some(_)) => ExporterState::Configured,
        }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    pub fn filter_range(&self) -> Option<WeekRange> {
        self.range
    }

    /// Resolves the report columns. Leaves the exporter uninitialized when the
    /// description column is missing.
    pub async fn init(&mut self) -> Result<(), ReportError> {
        match self.settings.fields.resolve(self.table.as_ref()).await {
            Ok(resolved) => {
                if resolved.group.is_none() {
                    info!(
                        field = %self.settings.fields.group,
                        "group column missing; all tasks will be reported under the sentinel group"
                    );
                }
                self.resolved = Some(resolved);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to initialise report exporter");
                Err(err)
            }
        }
    }

    /// Sets the inclusive finish-week bounds. May be called again before each report.
    pub fn set_filter_range(&mut self, start: i64, end: i64) {
        self.range = Some(WeekRange::new(start, end));
    }

    pub async fn table_name(&self) -> Result<String, ReportError> {
        Ok(self.table.name().await?)
    }

    /// Confirms the description column resolved and a finish-week column exists.
    pub async fn validate_report_table(&self) -> Result<(), ReportError> {
        if self.resolved.is_none() {
            return Err(ReportError::NotInitialized);
        }

        let fields = &self.settings.fields;
        if !fields.has_finish_week(self.table.as_ref()).await? {
            warn!(field = %fields.finish_week, "table is not valid for report generation");
            return Err(ValidationError::MissingFinishWeekField {
                field: fields.finish_week.clone(),
            }
            .into());
        }

        Ok(())
    }

    /// Runs validation, fetch, and grouping, returning the structured report.
    pub async fn build_report(&self) -> Result<GroupedReport, ReportError> {
        let resolved = self.resolved.as_ref().ok_or(ReportError::NotInitialized)?;
        let range = self.range.ok_or(ReportError::RangeNotConfigured)?;

        self.validate_report_table().await?;

        let settings = &self.settings;
        let records = RecordFilter::new(
            &settings.fields,
            &settings.vocabulary,
            range,
            settings.page_size,
        )
        .fetch_desired_records(self.table.as_ref())
        .await?;

        let report = GroupingEngine::new(resolved, &settings.vocabulary)
            .group(self.table.as_ref(), &records)
            .await?;

        info!(
            start_week = range.start,
            end_week = range.end,
            records = records.len(),
            groups = report.groups().len(),
            items = report.item_count(),
            "weekly report built"
        );

        Ok(report)
    }

    pub async fn get_report_text(&self) -> Result<String, ReportError> {
        let report = self.build_report().await?;
        Ok(render(&report))
    }
}
