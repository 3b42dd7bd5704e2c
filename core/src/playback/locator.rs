//! Playback-time word resolution.
//!
//! Maps a continuously advancing (and occasionally seeking) playback clock
//! to the index of the currently-spoken word. Runs on every clock tick, so
//! normal forward playback must stay amortized O(1); seeks fall back to a
//! binary search.

use crate::alignment::WordSegment;

/// Minimum tolerance around an entry, in seconds. Absorbs clock jitter and
/// tiny inter-word gaps.
pub const BASE_WINDOW: f64 = 0.025;

/// Tolerance cap, so long entries do not swallow large gaps around them.
pub const MAX_WINDOW: f64 = 0.25;

/// Resolves the currently-spoken entry index for a playback time.
pub struct PlaybackLocator {
    entries: Vec<WordSegment>,
}

impl PlaybackLocator {
    /// Entries must be ordered by start time (the word segmenter's output
    /// already is).
    pub fn new(entries: Vec<WordSegment>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Wider tolerance for naturally longer entries, capped.
    fn window(entry: &WordSegment) -> f64 {
        ((entry.end_time - entry.start_time).abs().max(BASE_WINDOW) / 2.0).min(MAX_WINDOW)
    }

    fn contains(entry: &WordSegment, t: f64) -> bool {
        let w = Self::window(entry);
        t >= entry.start_time - w && t <= entry.end_time + w
    }

    /// Resolve the entry index for playback time `t`, given the previously
    /// resolved index. Returns `None` when no entry is being spoken yet.
    /// Never panics for out-of-range `t`.
    pub fn locate(&self, t: f64, last: Option<usize>) -> Option<usize> {
        let entries = &self.entries;
        if entries.is_empty() {
            return None;
        }

        if let Some(idx) = last.filter(|&i| i < entries.len()) {
            let entry = &entries[idx];
            // Fast path: still inside the last entry's widened range.
            if Self::contains(entry, t) {
                return Some(idx);
            }
            // Single-step neighbor walk for small forward/backward drift.
            let w = Self::window(entry);
            if t > entry.end_time + w && idx + 1 < entries.len() {
                if Self::contains(&entries[idx + 1], t) {
                    return Some(idx + 1);
                }
            } else if t < entry.start_time - w && idx > 0 && Self::contains(&entries[idx - 1], t) {
                return Some(idx - 1);
            }
        }

        // Before the first word: nothing is being spoken.
        if t < entries[0].start_time - BASE_WINDOW {
            return None;
        }

        // Seek: greatest index whose (window-adjusted) start is at or
        // before `t`.
        let upper = entries.partition_point(|e| e.start_time - BASE_WINDOW <= t);
        let idx = upper - 1;
        let entry = &entries[idx];
        if t <= entry.end_time + Self::window(entry) {
            return Some(idx);
        }
        // Past this entry's window. Advance only if `t` already reached the
        // next entry's window; otherwise we are in a gap and stay put.
        match entries.get(idx + 1) {
            Some(next) if t >= next.start_time - Self::window(next) => Some(idx + 1),
            _ => Some(idx),
        }
    }
}
