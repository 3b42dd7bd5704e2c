//! Playback session state and the clock-tick scheduler.
//!
//! A session is an explicit value owned by the caller; concurrent sessions
//! (several open documents) share no state. Document loads run on spawned
//! tasks and are cancellable: starting a newer load aborts the previous one,
//! and a generation counter guarantees a stale result is never applied.

use super::sync::HighlightSync;
use crate::alignment::{word_segments, Alignment, WordSegment};
use crate::cache::ParagraphCache;
use crate::segment::ParagraphInfo;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Read model of the playback clock, polled once per tick.
pub trait PlaybackClock: Send + Sync {
    fn position_secs(&self) -> f64;
    fn is_playing(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub tick_hz: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { tick_hz: 60 }
    }
}

/// A fully assembled document ready for playback.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub slug: String,
    pub audio_url: String,
    pub alignment: Alignment,
    pub timeline: Vec<WordSegment>,
}

/// Per-document playback state: owns the loaded narration and the load
/// lifecycle. Dropping the session aborts any in-flight load.
pub struct PlaybackSession {
    cache: ParagraphCache,
    generation: Arc<AtomicU64>,
    document: Arc<RwLock<Option<LoadedDocument>>>,
    load_task: Option<JoinHandle<()>>,
}

impl PlaybackSession {
    pub fn new(cache: ParagraphCache) -> Self {
        Self {
            cache,
            generation: Arc::new(AtomicU64::new(0)),
            document: Arc::new(RwLock::new(None)),
            load_task: None,
        }
    }

    /// Start loading a document from cache. Any in-flight load is aborted;
    /// its result, were it to arrive anyway, is discarded by generation.
    pub fn load_document(&mut self, slug: &str, paragraphs: Vec<ParagraphInfo>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.load_task.take() {
            previous.abort();
        }

        let cache = self.cache.clone();
        let counter = Arc::clone(&self.generation);
        let slot = Arc::clone(&self.document);
        let slug = slug.to_string();

        self.load_task = Some(tokio::spawn(async move {
            let result = cache.read_document(&slug, &paragraphs).await;
            if counter.load(Ordering::SeqCst) != generation {
                debug!(target: "playback", slug, "stale document load discarded");
                return;
            }
            match result {
                Ok(Some(doc)) => {
                    let timeline = word_segments(&doc.alignment);
                    info!(target: "playback", slug, words = timeline.len(), "document loaded");
                    *slot.write().await = Some(LoadedDocument {
                        slug,
                        audio_url: doc.audio_url,
                        alignment: doc.alignment,
                        timeline,
                    });
                }
                Ok(None) => {
                    // Narration unavailable: the consumer degrades to "no
                    // narration", never an error surface.
                    debug!(target: "playback", slug, "document not cached; no narration");
                    *slot.write().await = None;
                }
                Err(e) => {
                    warn!(target: "playback", slug, error = %e, "document load failed; no narration");
                    *slot.write().await = None;
                }
            }
        }));
    }

    /// Await the in-flight load, if any. Intended for tests and batch tools;
    /// interactive callers just poll `document()`.
    pub async fn finish_loading(&mut self) {
        if let Some(task) = self.load_task.take() {
            let _ = task.await;
        }
    }

    pub async fn document(&self) -> Option<LoadedDocument> {
        self.document.read().await.clone()
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        if let Some(task) = self.load_task.take() {
            task.abort();
        }
    }
}

/// Single clock-tick loop feeding the highlight sync. The suspension point
/// is the per-tick interval; the locator's fast path keeps each tick O(1)
/// during normal playback. Abort the returned handle to stop the loop.
pub fn spawn_tick_loop(
    mut sync: HighlightSync,
    clock: Arc<dyn PlaybackClock>,
    cfg: SessionConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs_f64(1.0 / f64::from(cfg.tick_hz.max(1)));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            sync.on_tick(clock.position_secs(), clock.is_playing(), Instant::now());
        }
    })
}
