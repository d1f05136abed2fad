use crate::workflows::report::flatten::flatten_segments;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Opaque identifier of a row in a task table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved reference to one named column on a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldHandle {
    pub id: String,
    pub name: String,
}

/// A row returned by a record fetch. Cell values are looked up separately through the
/// owning table so adapters can load them lazily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    pub record_id: RecordId,
}

/// One run of text inside a rich-text cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    pub text: String,
}

impl TextSegment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub text: String,
}

impl SelectOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Value stored in a single cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Text(Vec<TextSegment>),
    Number(i64),
    SingleSelect(SelectOption),
    MultiSelect(Vec<SelectOption>),
    Link(Vec<RecordId>),
}

impl CellValue {
    /// Rich-text cell holding a single segment.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(vec![TextSegment::new(value)])
    }

    pub fn single_select(value: impl Into<String>) -> Self {
        Self::SingleSelect(SelectOption::new(value))
    }

    pub fn multi_select<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MultiSelect(values.into_iter().map(SelectOption::new).collect())
    }

    pub fn link(record_id: impl Into<String>) -> Self {
        Self::Link(vec![RecordId::new(record_id)])
    }

    pub fn text_segments(&self) -> Option<&[TextSegment]> {
        match self {
            Self::Text(segments) => Some(segments),
            _ => None,
        }
    }

    pub fn number(&self) -> Option<i64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Text of a single-select or rich-text cell. Rich text is flattened, so a label
    /// reads the same here as it does in [`FilterExpr::matches`](super::FilterExpr::matches).
    pub fn label(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::SingleSelect(option) => Some(Cow::Borrowed(option.text.as_str())),
            Self::Text(segments) => match segments.as_slice() {
                [] => None,
                [segment] => Some(Cow::Borrowed(segment.text.as_str())),
                segments => Some(Cow::Owned(flatten_segments(segments))),
            },
            _ => None,
        }
    }

    /// Group tag reading: the first option of a multi-select, otherwise [`Self::label`].
    pub fn first_label(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::MultiSelect(options) => options
                .first()
                .map(|option| Cow::Borrowed(option.text.as_str())),
            other => other.label(),
        }
    }

    /// Empty collections are reported as absent by the hosted store.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(segments) => segments.is_empty(),
            Self::MultiSelect(options) => options.is_empty(),
            Self::Link(records) => records.is_empty(),
            Self::Number(_) | Self::SingleSelect(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_label_reads_first_option_of_multi_select() {
        let value = CellValue::multi_select(["Design", "Ops"]);
        assert_eq!(value.first_label().as_deref(), Some("Design"));
        assert_eq!(value.label(), None);
        assert_eq!(
            CellValue::single_select("processing").first_label().as_deref(),
            Some("processing")
        );
    }

    #[test]
    fn label_flattens_rich_text() {
        assert_eq!(
            CellValue::single_select("processing").label().as_deref(),
            Some("processing")
        );
        assert_eq!(CellValue::text("Design").first_label().as_deref(), Some("Design"));

        let split = CellValue::Text(vec![TextSegment::new("process"), TextSegment::new("ing")]);
        assert_eq!(split.label().as_deref(), Some("processing"));
        assert_eq!(CellValue::Text(Vec::new()).label(), None);
        assert_eq!(CellValue::Number(3).label(), None);
    }

    #[test]
    fn empty_collections_count_as_empty() {
        assert!(CellValue::Link(Vec::new()).is_empty());
        assert!(CellValue::MultiSelect(Vec::new()).is_empty());
        assert!(!CellValue::link("rec1").is_empty());
        assert!(!CellValue::Number(0).is_empty());
    }
}
