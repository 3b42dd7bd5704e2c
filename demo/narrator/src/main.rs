mod config;
use config::NarratorConfig;
use lector_core::playback::{spawn_tick_loop, SessionConfig};
use lector_core::{
    map_positions, segment_text, BatchConfig, BatchSynthesizer, HighlightRenderer, HighlightSync,
    HighlightSyncConfig, HttpSynthesisClient, ParagraphCache, PlaybackClock, PlaybackLocator,
    PlaybackSession, RocksStore,
};
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal;
use tracing::{info, warn};

/// Prints each word as its highlight lands, so the console "reads along"
/// with the playback clock.
struct ConsoleRenderer {
    words: Vec<String>,
}

impl HighlightRenderer for ConsoleRenderer {
    fn apply(&mut self, rendered_index: usize) {
        if let Some(word) = self.words.get(rendered_index) {
            print!("{word} ");
            let _ = std::io::stdout().flush();
        }
    }
    fn clear(&mut self, _rendered_index: usize) {}
    fn needs_scroll(&self, _rendered_index: usize) -> bool {
        false
    }
    fn scroll_into_view(&mut self, _rendered_index: usize) {}
}

/// Wall clock standing in for an audio player's position.
struct WallClock {
    started: Instant,
}

impl PlaybackClock for WallClock {
    fn position_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
    fn is_playing(&self) -> bool {
        true
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging / tracing
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,lector_core=info,narrator=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let cfg = NarratorConfig::load();
    let slug = cfg.slug();
    info!(target: "narrator", input = %cfg.input.display(), slug = %slug, "Starting narrator demo");

    let text = tokio::fs::read_to_string(&cfg.input).await?;
    let paragraphs = segment_text(&text, &cfg.segmenter());
    info!(target: "narrator", paragraphs = paragraphs.len(), "Segmented input");

    let store = Arc::new(RocksStore::new(&cfg.data_dir)?);
    let cache = ParagraphCache::new(store);

    // Fill cache gaps before playback, if the vendor is configured.
    if cfg.synthesize {
        match HttpSynthesisClient::from_env() {
            Ok(client) => {
                let batch = BatchSynthesizer::new(
                    Arc::new(client),
                    cache.clone(),
                    BatchConfig {
                        inter_call_delay_ms: cfg.synth_delay_ms,
                    },
                );
                let report = batch.ensure_document(&slug, &paragraphs).await?;
                info!(target: "narrator", synthesized = report.synthesized,
                      cached = report.cached, failed = report.failed.len(), "Synthesis pass done");
            }
            Err(e) => {
                warn!(target: "narrator", error = %e, "Synthesis unavailable; serving cache only");
            }
        }
    }

    let mut session = PlaybackSession::new(cache);
    session.load_document(&slug, paragraphs);
    session.finish_loading().await;
    let doc = match session.document().await {
        Some(doc) => doc,
        None => {
            info!(target: "narrator", "Document not fully cached; nothing to play");
            return Ok(());
        }
    };
    info!(target: "narrator", audio_url = %doc.audio_url, words = doc.timeline.len(),
          duration_secs = doc.alignment.last_end(), "Document ready");

    let rendered: Vec<String> = doc
        .alignment
        .text()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let mapping = map_positions(&doc.timeline, &rendered);
    let sync = HighlightSync::new(
        PlaybackLocator::new(doc.timeline.clone()),
        mapping,
        Box::new(ConsoleRenderer { words: rendered }),
        HighlightSyncConfig::default(),
    );

    let clock = Arc::new(WallClock {
        started: Instant::now(),
    });
    let tick_handle = spawn_tick_loop(sync, clock, SessionConfig { tick_hz: cfg.tick_hz });

    let playback = tokio::time::sleep(Duration::from_secs_f64(doc.alignment.last_end() + 0.5));
    tokio::select! {
        _ = playback => {
            println!();
            info!(target: "narrator", "Playback finished");
        }
        _ = signal::ctrl_c() => {
            println!();
            info!(target: "narrator", "Shutting down...");
        }
    }

    tick_handle.abort();
    Ok(())
}
