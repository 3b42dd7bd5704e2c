//! Storage key derivation for cached narration artifacts.
//!
//! All paths are pure functions of slug + content hash, so identical
//! content always resolves to identical storage locations.

use crate::segment::{content_hash, ParagraphInfo};

pub const AUDIO_EXT: &str = "mp3";
pub const ALIGNMENT_EXT: &str = "json";

/// Deterministic storage paths for one paragraph's artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub paragraph_hash: String,
    pub audio_path: String,
    pub alignment_path: String,
}

impl CacheKey {
    pub fn new(slug: &str, paragraph_hash: &str) -> Self {
        Self {
            paragraph_hash: paragraph_hash.to_string(),
            audio_path: format!("audio/{slug}/{paragraph_hash}.{AUDIO_EXT}"),
            alignment_path: format!("alignments/{slug}/{paragraph_hash}.{ALIGNMENT_EXT}"),
        }
    }
}

/// Deterministic storage paths for a stitched full-document result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestKey {
    pub document_hash: String,
    pub audio_path: String,
    pub alignment_path: String,
    pub record_path: String,
}

impl ManifestKey {
    pub fn new(slug: &str, document_hash: &str) -> Self {
        Self {
            document_hash: document_hash.to_string(),
            audio_path: format!("audio/{slug}/doc-{document_hash}.{AUDIO_EXT}"),
            alignment_path: format!("alignments/{slug}/doc-{document_hash}.{ALIGNMENT_EXT}"),
            record_path: format!("manifests/{slug}/{document_hash}.{ALIGNMENT_EXT}"),
        }
    }
}

/// Hash of the ordered list of paragraph hashes.
///
/// The same paragraphs in the same order always produce the same manifest;
/// any edit, insertion, or reorder produces a new one.
pub fn manifest_hash(paragraphs: &[ParagraphInfo]) -> String {
    let mut joined = String::with_capacity(paragraphs.len() * 65);
    for p in paragraphs {
        joined.push_str(&p.hash);
        joined.push('\n');
    }
    content_hash(&joined)
}
