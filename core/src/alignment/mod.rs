//! Character- and word-level timing data for synthesized speech
//!
//! The vendor returns a per-character mapping from synthesized text to
//! start/end times in the audio. This module holds that representation,
//! the combiner that stitches per-paragraph alignments into one
//! document-level alignment, and the derivation of word segments.

mod combiner;
mod words;

pub use combiner::combine;
pub use words::word_segments;

use crate::{LectorError, Result};
use serde::{Deserialize, Serialize};

/// Vendor-produced per-character timing for one stretch of synthesized audio.
///
/// Parallel sequences: `chars[i]` was spoken from `start_times[i]` to
/// `end_times[i]` seconds. Invariants: equal lengths, `start <= end` per
/// character, and times non-decreasing across the sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub chars: Vec<char>,
    pub start_times: Vec<f64>,
    pub end_times: Vec<f64>,
}

impl Alignment {
    pub fn new(chars: Vec<char>, start_times: Vec<f64>, end_times: Vec<f64>) -> Result<Self> {
        let alignment = Self {
            chars,
            start_times,
            end_times,
        };
        alignment.validate()?;
        Ok(alignment)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// End time of the last character, or zero for an empty alignment.
    ///
    /// This is the effective duration used when stitching paragraphs;
    /// vendor trailing silence past the last character is not reflected.
    pub fn last_end(&self) -> f64 {
        self.end_times.last().copied().unwrap_or(0.0)
    }

    /// The synthesized text this alignment covers.
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.chars.len() != self.start_times.len() || self.chars.len() != self.end_times.len() {
            return Err(LectorError::InvalidAlignment(format!(
                "length mismatch: {} chars, {} starts, {} ends",
                self.chars.len(),
                self.start_times.len(),
                self.end_times.len()
            )));
        }
        for i in 0..self.chars.len() {
            if self.start_times[i] > self.end_times[i] {
                return Err(LectorError::InvalidAlignment(format!(
                    "char {} starts after it ends ({} > {})",
                    i, self.start_times[i], self.end_times[i]
                )));
            }
            if i > 0
                && (self.start_times[i] < self.start_times[i - 1]
                    || self.end_times[i] < self.end_times[i - 1])
            {
                return Err(LectorError::InvalidAlignment(format!(
                    "times decrease at char {}",
                    i
                )));
            }
        }
        Ok(())
    }
}

/// A maximal non-whitespace run in the alignment, with derived timing.
///
/// `start_char..end_char` indexes back into the document alignment
/// (`end_char` exclusive). Segments are ordered and non-overlapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordSegment {
    pub word: String,
    pub start_time: f64,
    pub end_time: f64,
    pub start_char: usize,
    pub end_char: usize,
}
