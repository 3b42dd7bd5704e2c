//! Document-level synthesis batching.
//!
//! Fills cache gaps for a document. Vendor calls are deliberately
//! serialized with an inter-call delay to control cost and request rate;
//! this is distinct from the parallel cache-read path, which stays fully
//! concurrent.

use super::SynthesisClient;
use crate::cache::{CacheKey, ParagraphCache};
use crate::segment::ParagraphInfo;
use crate::{LectorError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub inter_call_delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            inter_call_delay_ms: std::env::var("LECTOR_SYNTH_DELAY_MS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(500),
        }
    }
}

/// Outcome of one document pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub synthesized: usize,
    pub cached: usize,
    /// Indices of paragraphs whose vendor call failed. Each failure is
    /// isolated; the caller may retry later.
    pub failed: Vec<usize>,
}

pub struct BatchSynthesizer {
    client: Arc<dyn SynthesisClient>,
    cache: ParagraphCache,
    cfg: BatchConfig,
}

impl BatchSynthesizer {
    pub fn new(client: Arc<dyn SynthesisClient>, cache: ParagraphCache, cfg: BatchConfig) -> Self {
        Self { client, cache, cfg }
    }

    /// Synthesize and cache every paragraph that is not already cached.
    ///
    /// Configuration errors abort the batch; a single paragraph's vendor
    /// failure is logged, recorded in the report, and does not affect its
    /// siblings.
    pub async fn ensure_document(
        &self,
        slug: &str,
        paragraphs: &[ParagraphInfo],
    ) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        let mut called_vendor = false;

        for p in paragraphs {
            let key = CacheKey::new(slug, &p.hash);
            if self.cache.is_cached(&key).await? {
                debug!(target: "synthesis", slug, paragraph = p.index, "already cached; skipping");
                report.cached += 1;
                continue;
            }

            if called_vendor && self.cfg.inter_call_delay_ms > 0 {
                sleep(Duration::from_millis(self.cfg.inter_call_delay_ms)).await;
            }
            called_vendor = true;

            match self.client.synthesize(&p.text).await {
                Ok(out) => {
                    self.cache.write(&key, out.audio, &out.alignment).await?;
                    report.synthesized += 1;
                }
                Err(e @ LectorError::Configuration(_)) => return Err(e),
                Err(e) => {
                    warn!(target: "synthesis", slug, paragraph = p.index, error = %e,
                          "paragraph synthesis failed; continuing with siblings");
                    report.failed.push(p.index);
                }
            }
        }

        info!(target: "synthesis", slug, synthesized = report.synthesized,
              cached = report.cached, failed = report.failed.len(), "document batch complete");
        Ok(report)
    }
}
