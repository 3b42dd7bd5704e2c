//! Speech synthesis boundary
//!
//! One paragraph in, audio plus character alignment out. The trait keeps
//! the cache and playback layers independent of the vendor; the bundled
//! `HttpSynthesisClient` talks to a character-timestamp TTS endpoint, and
//! `BatchSynthesizer` fills cache gaps for a whole document with
//! deliberately serialized vendor calls.

mod batch;
mod http;

pub use batch::{BatchConfig, BatchReport, BatchSynthesizer};
pub use http::{HttpSynthesisClient, HttpSynthesisConfig};

use crate::alignment::Alignment;
use crate::Result;
use async_trait::async_trait;

/// One paragraph's synthesized speech.
#[derive(Debug, Clone)]
pub struct SynthesisOutput {
    pub audio: Vec<u8>,
    pub alignment: Alignment,
}

/// Vendor boundary: turn one paragraph of text into audio + alignment.
#[async_trait]
pub trait SynthesisClient: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<SynthesisOutput>;
}
