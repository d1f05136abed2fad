use super::{ReportFields, ReportVocabulary};
use crate::workflows::table::{CompareOp, FilterExpr, TableError, TableRecord, TaskTable};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Records are fetched in pages of this size unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// Inclusive finish-week bounds. `start > end` is allowed and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: i64,
    pub end: i64,
}

impl WeekRange {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub const fn contains(self, week: i64) -> bool {
        self.start <= week && week <= self.end
    }
}

impl Default for WeekRange {
    fn default() -> Self {
        Self::new(1, 52)
    }
}

/// Selects finished or in-progress tasks whose finish week falls inside a range.
#[derive(Debug, Clone)]
pub struct RecordFilter<'a> {
    fields: &'a ReportFields,
    vocabulary: &'a ReportVocabulary,
    range: WeekRange,
    page_size: usize,
}

impl<'a> RecordFilter<'a> {
    pub fn new(
        fields: &'a ReportFields,
        vocabulary: &'a ReportVocabulary,
        range: WeekRange,
        page_size: usize,
    ) -> Self {
        Self {
            fields,
            vocabulary,
            range,
            page_size,
        }
    }

    /// `state ∈ {completed, in progress} AND start <= finish_week <= end`.
    pub fn expression(&self) -> FilterExpr {
        let state = &self.fields.state;
        let week = &self.fields.finish_week;

        FilterExpr::And(vec![
            FilterExpr::Or(vec![
                FilterExpr::text_eq(state, &self.vocabulary.completed_state),
                FilterExpr::text_eq(state, &self.vocabulary.in_progress_state),
            ]),
            FilterExpr::And(vec![
                FilterExpr::number(week, CompareOp::Gte, self.range.start),
                FilterExpr::number(week, CompareOp::Lte, self.range.end),
            ]),
        ])
    }

    pub async fn fetch_desired_records<T>(&self, table: &T) -> Result<Vec<TableRecord>, TableError>
    where
        T: TaskTable + ?Sized,
    {
        let filter = self.expression();
        debug!(%filter, page_size = self.page_size, "fetching report records");
        table.fetch_records(&filter, self.page_size).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_matches_hosted_formula() {
        let fields = ReportFields::default();
        let vocabulary = ReportVocabulary::english();
        let filter = RecordFilter::new(&fields, &vocabulary, WeekRange::new(1, 10), 500);

        assert_eq!(
            filter.expression().to_string(),
            "AND(OR(CurrentValue.[state] = \"processing-complete\", \
CurrentValue.[state] = \"processing\"), \
AND(CurrentValue.[finish_week] >= 1, CurrentValue.[finish_week] <= 10))"
        );
    }

    #[test]
    fn week_range_is_inclusive() {
        let range = WeekRange::new(1, 52);
        assert!(range.contains(1));
        assert!(range.contains(52));
        assert!(!range.contains(53));
        assert!(!WeekRange::new(5, 4).contains(5));
    }
}
