//! Timeline-to-rendered-text position mapping.
//!
//! A greedy, forward-only, two-pointer scan: for each timeline word in
//! order, the next rendered position with the same normalized text is
//! consumed. Rendered text that never matches (filtered or hidden words)
//! is skipped; timeline entries with no match anywhere ahead map to `None`
//! and do not move the cursor. This is not an edit-distance matcher;
//! out-of-order text stays unmatched.

use crate::alignment::WordSegment;

/// Case-insensitive comparison key with edge punctuation stripped.
pub fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Map each timeline word to an index into `rendered`, or `None`.
///
/// No rendered index is ever assigned to two timeline entries. The mapping
/// is rebuilt whenever the rendered positions or the timeline change.
pub fn map_positions<S: AsRef<str>>(
    timeline: &[WordSegment],
    rendered: &[S],
) -> Vec<Option<usize>> {
    let keys: Vec<String> = rendered.iter().map(|s| normalize_word(s.as_ref())).collect();
    let mut mapping = Vec::with_capacity(timeline.len());
    let mut cursor = 0usize;

    for segment in timeline {
        let want = normalize_word(&segment.word);
        if want.is_empty() {
            mapping.push(None);
            continue;
        }
        let found = keys[cursor..]
            .iter()
            .position(|k| *k == want)
            .map(|offset| cursor + offset);
        if let Some(i) = found {
            cursor = i + 1;
        }
        mapping.push(found);
    }
    mapping
}
