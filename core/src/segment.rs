//! Paragraph segmentation for narration
//!
//! Splits raw article text into paragraph-sized chunks bounded by the
//! configured min/max sizes. Each chunk is an independent unit of synthesis
//! and caching: small paragraphs are merged forward so the vendor is not
//! billed for fragments, and oversized paragraphs are split at sentence
//! boundaries to stay under vendor request limits.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Bounds for paragraph chunking, in characters.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    pub min_chars: usize,
    pub max_chars: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_chars: 120,
            max_chars: 2_400,
        }
    }
}

/// One independently cached/synthesized chunk of article text.
///
/// Derived fresh per request and never persisted; the hash is the sole
/// durable identity of the chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphInfo {
    pub index: usize,
    pub text: String,
    pub hash: String,
    pub character_count: usize,
}

/// Lowercase hex SHA-256 of the chunk text.
///
/// Identical content always yields the identical hash, which is what makes
/// concurrent cache writes race-safe.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Split raw spoken text into paragraph chunks within the configured bounds.
pub fn segment_text(text: &str, cfg: &SegmenterConfig) -> Vec<ParagraphInfo> {
    let mut pieces: Vec<String> = Vec::new();
    for block in blocks(text) {
        pieces.extend(split_oversized(&block, cfg.max_chars));
    }

    // Merge runs of small paragraphs forward until they clear the minimum.
    let mut merged: Vec<String> = Vec::new();
    let mut pending = String::new();
    for piece in pieces {
        if pending.is_empty() {
            pending = piece;
        } else if pending.chars().count() + 1 + piece.chars().count() > cfg.max_chars {
            // Merging would breach the vendor limit; the small chunk
            // stands alone even though it is under the minimum.
            merged.push(std::mem::take(&mut pending));
            pending = piece;
        } else {
            pending.push('\n');
            pending.push_str(&piece);
        }
        if pending.chars().count() >= cfg.min_chars {
            merged.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        // A small trailing remainder merges backward, unless that would
        // push the previous chunk past the maximum.
        match merged.last_mut() {
            Some(last) if last.chars().count() + 1 + pending.chars().count() <= cfg.max_chars => {
                last.push('\n');
                last.push_str(&pending);
            }
            _ => merged.push(pending),
        }
    }

    merged
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let hash = content_hash(&text);
            let character_count = text.chars().count();
            ParagraphInfo {
                index,
                text,
                hash,
                character_count,
            }
        })
        .collect()
}

/// Group lines into blocks separated by blank lines, rejoining wrapped lines.
fn blocks(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !cur.is_empty() {
                out.push(std::mem::take(&mut cur));
            }
        } else {
            if !cur.is_empty() {
                cur.push(' ');
            }
            cur.push_str(line);
        }
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

/// Split a block that exceeds `max_chars` at sentence boundaries, greedily
/// packing sentences up to the bound. A single sentence longer than the
/// bound is hard-split at the last word break before it.
fn split_oversized(block: &str, max_chars: usize) -> Vec<String> {
    if block.chars().count() <= max_chars {
        return vec![block.to_string()];
    }
    let mut out = Vec::new();
    let mut cur = String::new();
    for sentence in sentence_spans(block)
        .into_iter()
        .flat_map(|s| hard_split(s, max_chars))
    {
        let sep = usize::from(!cur.is_empty());
        if !cur.is_empty() && cur.chars().count() + sep + sentence.chars().count() > max_chars {
            out.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(&sentence);
    }
    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

/// Sentence boundaries: terminal punctuation followed by whitespace.
fn sentence_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut start = 0usize;
    let mut after_terminal = false;
    for (i, c) in text.char_indices() {
        if after_terminal && c.is_whitespace() {
            let span = text[start..i].trim();
            if !span.is_empty() {
                spans.push(span);
            }
            start = i;
        }
        after_terminal = matches!(c, '.' | '!' | '?');
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        spans.push(tail);
    }
    spans
}

fn hard_split(s: &str, max_chars: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = s;
    while rest.chars().count() > max_chars {
        let cut = rest
            .char_indices()
            .nth(max_chars)
            .map(|(b, _)| b)
            .unwrap_or(rest.len());
        let head = &rest[..cut];
        let split_at = match head.rfind(' ') {
            Some(0) | None => cut,
            Some(b) => b,
        };
        out.push(rest[..split_at].trim().to_string());
        rest = rest[split_at..].trim_start();
    }
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}
