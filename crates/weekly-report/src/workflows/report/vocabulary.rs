use serde::{Deserialize, Serialize};

/// Lifecycle literals stored in the state column and the labels the report prints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVocabulary {
    pub completed_state: String,
    pub in_progress_state: String,
    /// Appended verbatim to in-progress descriptions, separator included.
    pub unfinished_marker: String,
    /// Name of the sentinel bucket for ungrouped tasks.
    pub other_group: String,
}

impl ReportVocabulary {
    pub fn english() -> Self {
        Self {
            completed_state: "processing-complete".to_string(),
            in_progress_state: "processing".to_string(),
            unfinished_marker: " (unfinished)".to_string(),
            other_group: "Other".to_string(),
        }
    }

    /// Literals used by Chinese-language task tables.
    pub fn simplified_chinese() -> Self {
        Self {
            completed_state: "处理完成".to_string(),
            in_progress_state: "处理中".to_string(),
            unfinished_marker: "（未完成）".to_string(),
            other_group: "其他".to_string(),
        }
    }

    /// Looks up a preset by short code (`en`, `zh`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Self::english()),
            "zh" | "zh-cn" | "chinese" => Some(Self::simplified_chinese()),
            _ => None,
        }
    }

    pub fn is_in_progress(&self, state: &str) -> bool {
        state == self.in_progress_state
    }
}

impl Default for ReportVocabulary {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_resolve_by_code() {
        assert_eq!(ReportVocabulary::from_code(" EN "), Some(ReportVocabulary::english()));
        let chinese = ReportVocabulary::from_code("zh").expect("zh preset");
        assert_eq!(chinese.other_group, "其他");
        assert!(chinese.is_in_progress("处理中"));
        assert!(ReportVocabulary::from_code("fr").is_none());
    }
}
