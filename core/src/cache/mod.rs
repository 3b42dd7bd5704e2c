//! Content-addressed paragraph cache
//!
//! Synthesized audio and its character alignment are stored per paragraph,
//! keyed by the hash of the paragraph text. Editing one paragraph changes
//! only that paragraph's hash, so repeated builds re-synthesize nothing
//! that already exists, and concurrent writers of identical content are
//! race-safe by construction.
//!
//! Document reads are all-or-nothing: if any paragraph is missing the read
//! reports a miss immediately, never a partial assembly. A fully cached
//! document is fetched with concurrent per-paragraph reads, stitched, and
//! memoized under a manifest key derived from the ordered paragraph hashes.

mod keys;

pub use keys::{manifest_hash, CacheKey, ManifestKey};

use crate::alignment::{combine, Alignment};
use crate::segment::ParagraphInfo;
use crate::store::{ObjectStore, PutOptions};
use crate::{LectorError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Small record memoizing where a stitched document landed.
#[derive(Debug, Serialize, Deserialize)]
struct ManifestRecord {
    audio_url: String,
}

/// Caller-facing output for a fully assembled document.
#[derive(Debug, Clone)]
pub struct DocumentAudio {
    pub audio_url: String,
    pub audio: Vec<u8>,
    pub alignment: Alignment,
}

/// Content-addressed store for per-paragraph narration artifacts.
#[derive(Clone)]
pub struct ParagraphCache {
    store: Arc<dyn ObjectStore>,
}

impl ParagraphCache {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Whether both the audio and alignment blobs exist for this key.
    ///
    /// Checks the deterministic path first, then falls back to a prefix
    /// scan matched by file extension. Early entries were written under
    /// non-deterministic suffixed paths; the fallback keeps them readable.
    pub async fn is_cached(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.resolve(&key.audio_path).await?.is_some()
            && self.resolve(&key.alignment_path).await?.is_some())
    }

    /// Resolve a deterministic path to the concrete stored path, if any.
    async fn resolve(&self, path: &str) -> Result<Option<String>> {
        if self.store.head(path).await?.is_some() {
            return Ok(Some(path.to_string()));
        }
        let (prefix, ext) = match path.rsplit_once('.') {
            Some(parts) => parts,
            None => return Ok(None),
        };
        let candidates = self.store.list(prefix).await?;
        Ok(candidates
            .into_iter()
            .find(|p| p.rsplit_once('.').map(|(_, e)| e == ext).unwrap_or(false)))
    }

    /// Write both artifacts for one paragraph, concurrently, with overwrite.
    pub async fn write(&self, key: &CacheKey, audio: Vec<u8>, alignment: &Alignment) -> Result<()> {
        let alignment_bytes = serde_json::to_vec(alignment)?;
        let (audio_res, alignment_res) = tokio::join!(
            self.store.put(&key.audio_path, audio, PutOptions::audio()),
            self.store
                .put(&key.alignment_path, alignment_bytes, PutOptions::json()),
        );
        audio_res?;
        alignment_res?;
        debug!(target: "cache", hash = %key.paragraph_hash, "cached paragraph artifacts");
        Ok(())
    }

    /// Assemble the full document from cache, or report a miss.
    ///
    /// Returns `Ok(None)` when any paragraph is absent; no partial result
    /// and no synthesis happens here. A paragraph that reported cached but
    /// then failed to fetch also degrades the whole read to a miss.
    pub async fn read_document(
        &self,
        slug: &str,
        paragraphs: &[ParagraphInfo],
    ) -> Result<Option<DocumentAudio>> {
        if paragraphs.is_empty() {
            return Ok(None);
        }

        let manifest = ManifestKey::new(slug, &manifest_hash(paragraphs));

        // A previously stitched result for this exact hash sequence short-
        // circuits the per-paragraph fan-out.
        if let Some(doc) = self.read_manifest(&manifest).await {
            debug!(target: "cache", slug, "serving memoized document manifest");
            return Ok(Some(doc));
        }

        // Existence fan-out; the first miss ends the read. Paragraphs are
        // identified by their position in the input slice, not the embedded
        // index field, which callers are free to fill arbitrarily.
        let mut checks = JoinSet::new();
        for (pos, p) in paragraphs.iter().enumerate() {
            let cache = self.clone();
            let key = CacheKey::new(slug, &p.hash);
            checks.spawn(async move { (pos, cache.is_cached(&key).await) });
        }
        while let Some(joined) = checks.join_next().await {
            let (pos, cached) =
                joined.map_err(|e| LectorError::Storage(format!("existence check: {e}")))?;
            if !cached? {
                debug!(target: "cache", slug, paragraph = pos, "cache miss");
                return Ok(None);
            }
        }

        // Fetch fan-out; reassembled in slice order at the join point.
        let mut fetches = JoinSet::new();
        for (pos, p) in paragraphs.iter().enumerate() {
            let cache = self.clone();
            let key = CacheKey::new(slug, &p.hash);
            fetches.spawn(async move { (pos, cache.fetch_paragraph(&key).await) });
        }
        let mut parts: Vec<Option<(Vec<u8>, Alignment)>> = vec![None; paragraphs.len()];
        while let Some(joined) = fetches.join_next().await {
            let (pos, fetched) =
                joined.map_err(|e| LectorError::Storage(format!("paragraph fetch: {e}")))?;
            match fetched {
                Ok(part) => parts[pos] = Some(part),
                Err(e) => {
                    // Degrade to a full miss rather than serve partial audio.
                    warn!(target: "cache", slug, paragraph = pos, error = %e,
                          "cached paragraph failed to fetch; treating document as uncached");
                    return Ok(None);
                }
            }
        }

        let mut audio = Vec::new();
        let mut alignments = Vec::with_capacity(paragraphs.len());
        for part in parts.into_iter().flatten() {
            audio.extend_from_slice(&part.0);
            alignments.push(part.1);
        }
        let alignment = combine(&alignments);

        // Persist the stitched result; identical hash sequence means an
        // identical manifest, so the overwrite is a no-op on repeat builds.
        let alignment_bytes = serde_json::to_vec(&alignment)?;
        let (audio_url, alignment_res) = tokio::join!(
            self.store
                .put(&manifest.audio_path, audio.clone(), PutOptions::audio()),
            self.store
                .put(&manifest.alignment_path, alignment_bytes, PutOptions::json()),
        );
        let audio_url = audio_url?;
        alignment_res?;
        let record = serde_json::to_vec(&ManifestRecord {
            audio_url: audio_url.clone(),
        })?;
        self.store
            .put(&manifest.record_path, record, PutOptions::json())
            .await?;

        info!(target: "cache", slug, paragraphs = paragraphs.len(),
              bytes = audio.len(), "assembled document from cache");
        Ok(Some(DocumentAudio {
            audio_url,
            audio,
            alignment,
        }))
    }

    async fn fetch_paragraph(&self, key: &CacheKey) -> Result<(Vec<u8>, Alignment)> {
        let audio_path = self.resolve(&key.audio_path).await?.ok_or_else(|| {
            LectorError::Assembly(format!("audio object missing for {}", key.paragraph_hash))
        })?;
        let alignment_path = self.resolve(&key.alignment_path).await?.ok_or_else(|| {
            LectorError::Assembly(format!("alignment object missing for {}", key.paragraph_hash))
        })?;

        let (audio, alignment_bytes) = tokio::join!(
            self.store.get(&audio_path),
            self.store.get(&alignment_path),
        );
        let audio = audio?.ok_or_else(|| {
            LectorError::Assembly(format!("audio object vanished for {}", key.paragraph_hash))
        })?;
        let alignment_bytes = alignment_bytes?.ok_or_else(|| {
            LectorError::Assembly(format!("alignment object vanished for {}", key.paragraph_hash))
        })?;
        let alignment: Alignment = serde_json::from_slice(&alignment_bytes)?;
        Ok((audio, alignment))
    }

    async fn read_manifest(&self, manifest: &ManifestKey) -> Option<DocumentAudio> {
        let record_bytes = self.store.get(&manifest.record_path).await.ok()??;
        let record: ManifestRecord = serde_json::from_slice(&record_bytes).ok()?;
        let audio = self.store.get(&manifest.audio_path).await.ok()??;
        let alignment_bytes = self.store.get(&manifest.alignment_path).await.ok()??;
        let alignment: Alignment = serde_json::from_slice(&alignment_bytes).ok()?;
        Some(DocumentAudio {
            audio_url: record.audio_url,
            audio,
            alignment,
        })
    }
}
