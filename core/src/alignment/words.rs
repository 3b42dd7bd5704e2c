//! Word segment derivation from character-level alignment.

use super::{Alignment, WordSegment};

/// Scan the alignment left to right and emit one segment per maximal run of
/// non-whitespace characters. Whitespace is a boundary and is excluded from
/// the emitted word; punctuation stays attached to its word. Each segment
/// takes the first character's start time and the last character's end time.
pub fn word_segments(alignment: &Alignment) -> Vec<WordSegment> {
    let mut segments = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, &c) in alignment.chars.iter().enumerate() {
        if c.is_whitespace() {
            if let Some(start) = run_start.take() {
                segments.push(segment(alignment, start, i));
            }
        } else if run_start.is_none() {
            run_start = Some(i);
        }
    }
    if let Some(start) = run_start {
        segments.push(segment(alignment, start, alignment.len()));
    }
    segments
}

fn segment(alignment: &Alignment, start: usize, end: usize) -> WordSegment {
    WordSegment {
        word: alignment.chars[start..end].iter().collect(),
        start_time: alignment.start_times[start],
        end_time: alignment.end_times[end - 1],
        start_char: start,
        end_char: end,
    }
}
