// Lector Core Library
// Incremental narration cache and word-accurate playback sync

pub mod alignment;
pub mod cache;
pub mod playback;
pub mod segment;
pub mod store;
pub mod synthesis;

// Export core types
pub use alignment::{combine, word_segments, Alignment, WordSegment};
pub use cache::{CacheKey, DocumentAudio, ManifestKey, ParagraphCache};
pub use playback::{
    map_positions, HighlightRenderer, HighlightSync, HighlightSyncConfig, PlaybackClock,
    PlaybackLocator, PlaybackSession, ScrollState,
};
pub use segment::{content_hash, segment_text, ParagraphInfo, SegmenterConfig};
pub use store::{MemoryStore, ObjectMeta, ObjectStore, PutOptions, RocksStore};
pub use synthesis::{
    BatchConfig, BatchReport, BatchSynthesizer, HttpSynthesisClient, HttpSynthesisConfig,
    SynthesisClient, SynthesisOutput,
};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LectorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("Assembly failed: {0}")]
    Assembly(String),

    #[error("Invalid alignment data: {0}")]
    InvalidAlignment(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
pub type Result<T> = std::result::Result<T, LectorError>;
