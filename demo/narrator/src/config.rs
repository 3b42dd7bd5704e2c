use std::fs;
use std::path::{Path, PathBuf};

use lector_core::SegmenterConfig;

/// High-level configuration for the narrator demo
#[derive(Clone, Debug)]
pub struct NarratorConfig {
    /// Plain-text input document
    pub input: PathBuf,
    /// Storage slug; derived from the input file name when unset
    pub slug: Option<String>,
    /// RocksDB cache directory
    pub data_dir: PathBuf,
    /// Whether to fill cache gaps via the synthesis vendor before playback
    pub synthesize: bool,
    pub min_paragraph_chars: usize,
    pub max_paragraph_chars: usize,
    pub tick_hz: u32,
    pub synth_delay_ms: u64,
}

impl Default for NarratorConfig {
    fn default() -> Self {
        let segmenter = SegmenterConfig::default();
        Self {
            input: PathBuf::from(
                std::env::var("NARRATOR_INPUT").unwrap_or_else(|_| "article.txt".to_string()),
            ),
            slug: std::env::var("NARRATOR_SLUG").ok().filter(|s| !s.is_empty()),
            data_dir: PathBuf::from(
                std::env::var("NARRATOR_DATA_DIR")
                    .unwrap_or_else(|_| ".narrator-cache".to_string()),
            ),
            synthesize: std::env::var("NARRATOR_SYNTHESIZE")
                .map(|v| !matches!(v.as_str(), "0" | "false" | "no"))
                .unwrap_or(true),
            min_paragraph_chars: segmenter.min_chars,
            max_paragraph_chars: segmenter.max_chars,
            tick_hz: std::env::var("NARRATOR_TICK_HZ")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(60),
            synth_delay_ms: std::env::var("LECTOR_SYNTH_DELAY_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(500),
        }
    }
}

impl NarratorConfig {
    /// Load configuration from a TOML file (path via NARRATOR_CONFIG or
    /// ./narrator.toml), overlaying values onto env-driven defaults.
    pub fn load() -> Self {
        let default = Self::default();
        let path = std::env::var("NARRATOR_CONFIG").unwrap_or_else(|_| "narrator.toml".into());
        let p = Path::new(&path);
        if !p.exists() {
            tracing::info!(target: "narrator", path = %path, "No TOML config found; using defaults/env");
            return default;
        }
        match fs::read_to_string(p) {
            Ok(s) => match toml::from_str::<NarratorToml>(&s) {
                Ok(t) => t.overlay(default),
                Err(e) => {
                    tracing::warn!(target: "narrator", error = %e, "Failed to parse TOML; using defaults");
                    default
                }
            },
            Err(e) => {
                tracing::warn!(target: "narrator", error = %e, "Failed to read TOML; using defaults");
                default
            }
        }
    }

    pub fn segmenter(&self) -> SegmenterConfig {
        SegmenterConfig {
            min_chars: self.min_paragraph_chars,
            max_chars: self.max_paragraph_chars,
        }
    }

    /// Storage slug for the current input.
    pub fn slug(&self) -> String {
        if let Some(s) = &self.slug {
            return s.clone();
        }
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase().replace(' ', "-"))
            .unwrap_or_else(|| "document".to_string())
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
struct NarratorToml {
    pub input: Option<PathBuf>,
    pub slug: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub synthesize: Option<bool>,
    pub min_paragraph_chars: Option<usize>,
    pub max_paragraph_chars: Option<usize>,
    pub tick_hz: Option<u32>,
    pub synth_delay_ms: Option<u64>,
}

impl NarratorToml {
    fn overlay(self, mut base: NarratorConfig) -> NarratorConfig {
        if let Some(x) = self.input {
            base.input = x;
        }
        if let Some(x) = self.slug {
            base.slug = Some(x);
        }
        if let Some(x) = self.data_dir {
            base.data_dir = x;
        }
        if let Some(x) = self.synthesize {
            base.synthesize = x;
        }
        if let Some(x) = self.min_paragraph_chars {
            base.min_paragraph_chars = x;
        }
        if let Some(x) = self.max_paragraph_chars {
            base.max_paragraph_chars = x;
        }
        if let Some(x) = self.tick_hz {
            base.tick_hz = x;
        }
        if let Some(x) = self.synth_delay_ms {
            base.synth_delay_ms = x;
        }
        base
    }
}
