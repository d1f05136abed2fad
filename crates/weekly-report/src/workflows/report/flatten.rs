use crate::workflows::table::TextSegment;

/// Concatenates the segments of a rich-text cell, in order, with no separator.
pub fn flatten_segments(segments: &[TextSegment]) -> String {
    segments.iter().map(TextSegment::text).collect()
}
