//! Highlight orchestration.
//!
//! Turns locator output into apply/clear/scroll calls on a renderer owned
//! by the playback session. Auto-scroll is gated on a timed debounce of
//! user scroll input, and the engine's own programmatic scroll suppresses
//! that flag so it is never mistaken for the user.

use super::locator::PlaybackLocator;
use std::time::{Duration, Instant};
use tracing::warn;

/// Presentation-layer seam. Implementations live with the rendering layer;
/// the core only hands them opaque rendered-position indices. One renderer
/// is constructed per playback session and disposed with it.
pub trait HighlightRenderer: Send {
    fn apply(&mut self, rendered_index: usize);
    fn clear(&mut self, rendered_index: usize);
    /// Whether the rendered element sits outside the vertical inset band
    /// and needs scrolling to stay visible.
    fn needs_scroll(&self, rendered_index: usize) -> bool;
    fn scroll_into_view(&mut self, rendered_index: usize);
}

/// Timed debounce for scroll input. Not a lock: everything is driven from
/// the single tick loop.
#[derive(Debug, Clone)]
pub struct ScrollState {
    debounce: Duration,
    user_active_until: Option<Instant>,
    suppressed_until: Option<Instant>,
}

impl ScrollState {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            user_active_until: None,
            suppressed_until: None,
        }
    }

    /// Record scroll/touch input. Ignored while a programmatic scroll is
    /// in flight, so the engine's own scrolling never reads as the user's.
    pub fn note_user_input(&mut self, now: Instant) {
        if !self.is_suppressed(now) {
            self.user_active_until = Some(now + self.debounce);
        }
    }

    pub fn is_user_scrolling(&self, now: Instant) -> bool {
        self.user_active_until.map(|t| now < t).unwrap_or(false)
    }

    pub fn suppress_for(&mut self, duration: Duration, now: Instant) {
        self.suppressed_until = Some(now + duration);
    }

    fn is_suppressed(&self, now: Instant) -> bool {
        self.suppressed_until.map(|t| now < t).unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct HighlightSyncConfig {
    pub auto_scroll: bool,
    /// How long after the last scroll/touch input the user still counts
    /// as actively scrolling.
    pub scroll_debounce: Duration,
    /// How long a programmatic scroll suppresses user-input tracking.
    pub programmatic_scroll: Duration,
}

impl Default for HighlightSyncConfig {
    fn default() -> Self {
        Self {
            auto_scroll: true,
            scroll_debounce: Duration::from_millis(1_500),
            programmatic_scroll: Duration::from_millis(600),
        }
    }
}

/// Drives highlight apply/clear/scroll from the playback clock.
pub struct HighlightSync {
    locator: PlaybackLocator,
    mapping: Vec<Option<usize>>,
    renderer: Box<dyn HighlightRenderer>,
    cfg: HighlightSyncConfig,
    scroll: ScrollState,
    last_index: Option<usize>,
    last_rendered: Option<usize>,
    enabled: bool,
}

impl HighlightSync {
    pub fn new(
        locator: PlaybackLocator,
        mapping: Vec<Option<usize>>,
        renderer: Box<dyn HighlightRenderer>,
        cfg: HighlightSyncConfig,
    ) -> Self {
        // No renderable text matched at all: highlighting is silently
        // disabled while playback continues unaffected.
        let enabled = mapping.iter().any(Option::is_some);
        if !enabled && !locator.is_empty() {
            warn!(target: "playback", "no timeline word matched rendered text; highlighting disabled");
        }
        let scroll = ScrollState::new(cfg.scroll_debounce);
        Self {
            locator,
            mapping,
            renderer,
            cfg,
            scroll,
            last_index: None,
            last_rendered: None,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn current_index(&self) -> Option<usize> {
        self.last_index
    }

    /// Forwarded by the rendering layer on scroll/touch input.
    pub fn note_user_scroll(&mut self, now: Instant) {
        self.scroll.note_user_input(now);
    }

    /// Called on every playback-time tick.
    pub fn on_tick(&mut self, t: f64, playing: bool, now: Instant) {
        if !playing || !self.enabled {
            return;
        }
        let index = self.locator.locate(t, self.last_index);
        if index == self.last_index {
            return;
        }

        if let Some(prev) = self.last_rendered.take() {
            self.renderer.clear(prev);
        }
        self.last_index = index;

        let rendered = match index.and_then(|i| self.mapping.get(i).copied().flatten()) {
            Some(r) => r,
            None => return,
        };
        self.renderer.apply(rendered);
        self.last_rendered = Some(rendered);

        if self.cfg.auto_scroll
            && !self.scroll.is_user_scrolling(now)
            && self.renderer.needs_scroll(rendered)
        {
            self.scroll.suppress_for(self.cfg.programmatic_scroll, now);
            self.renderer.scroll_into_view(rendered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::WordSegment;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Apply(usize),
        Clear(usize),
        Scroll(usize),
    }

    #[derive(Clone, Default)]
    struct RecordingRenderer {
        calls: Arc<Mutex<Vec<Call>>>,
        offscreen: Arc<Mutex<Vec<usize>>>,
    }

    impl HighlightRenderer for RecordingRenderer {
        fn apply(&mut self, i: usize) {
            self.calls.lock().unwrap().push(Call::Apply(i));
        }
        fn clear(&mut self, i: usize) {
            self.calls.lock().unwrap().push(Call::Clear(i));
        }
        fn needs_scroll(&self, i: usize) -> bool {
            self.offscreen.lock().unwrap().contains(&i)
        }
        fn scroll_into_view(&mut self, i: usize) {
            self.calls.lock().unwrap().push(Call::Scroll(i));
        }
    }

    fn timeline(n: usize) -> Vec<WordSegment> {
        (0..n)
            .map(|i| WordSegment {
                word: format!("w{i}"),
                start_time: i as f64 * 0.5,
                end_time: (i + 1) as f64 * 0.5,
                start_char: i * 3,
                end_char: i * 3 + 2,
            })
            .collect()
    }

    fn sync_with(
        n: usize,
        mapping: Vec<Option<usize>>,
        cfg: HighlightSyncConfig,
    ) -> (HighlightSync, RecordingRenderer) {
        let renderer = RecordingRenderer::default();
        let sync = HighlightSync::new(
            PlaybackLocator::new(timeline(n)),
            mapping,
            Box::new(renderer.clone()),
            cfg,
        );
        (sync, renderer)
    }

    #[test]
    fn test_applies_then_clears_on_index_change() {
        let (mut sync, renderer) = sync_with(
            3,
            vec![Some(0), Some(1), Some(2)],
            HighlightSyncConfig {
                auto_scroll: false,
                ..Default::default()
            },
        );
        let now = Instant::now();
        sync.on_tick(0.25, true, now);
        sync.on_tick(0.30, true, now);
        sync.on_tick(0.80, true, now);
        assert_eq!(
            renderer.calls.lock().unwrap().clone(),
            vec![Call::Apply(0), Call::Clear(0), Call::Apply(1)]
        );
    }

    #[test]
    fn test_unchanged_index_is_a_no_op() {
        let (mut sync, renderer) = sync_with(2, vec![Some(0), Some(1)], HighlightSyncConfig::default());
        let now = Instant::now();
        sync.on_tick(0.25, true, now);
        sync.on_tick(0.26, true, now);
        sync.on_tick(0.27, true, now);
        assert_eq!(renderer.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_paused_playback_does_nothing() {
        let (mut sync, renderer) = sync_with(2, vec![Some(0), Some(1)], HighlightSyncConfig::default());
        sync.on_tick(0.25, false, Instant::now());
        assert!(renderer.calls.lock().unwrap().is_empty());
        assert_eq!(sync.current_index(), None);
    }

    #[test]
    fn test_unmatched_word_clears_but_applies_nothing() {
        let (mut sync, renderer) = sync_with(
            2,
            vec![Some(4), None],
            HighlightSyncConfig {
                auto_scroll: false,
                ..Default::default()
            },
        );
        let now = Instant::now();
        sync.on_tick(0.25, true, now);
        sync.on_tick(0.80, true, now);
        assert_eq!(
            renderer.calls.lock().unwrap().clone(),
            vec![Call::Apply(4), Call::Clear(4)]
        );
    }

    #[test]
    fn test_fully_unmatched_mapping_disables_highlighting() {
        let (mut sync, renderer) = sync_with(2, vec![None, None], HighlightSyncConfig::default());
        assert!(!sync.is_enabled());
        sync.on_tick(0.25, true, Instant::now());
        assert!(renderer.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_auto_scroll_only_when_target_offscreen() {
        let (mut sync, renderer) = sync_with(2, vec![Some(0), Some(1)], HighlightSyncConfig::default());
        renderer.offscreen.lock().unwrap().push(1);
        let now = Instant::now();
        sync.on_tick(0.25, true, now);
        sync.on_tick(0.80, true, now);
        let calls = renderer.calls.lock().unwrap().clone();
        assert!(!calls.contains(&Call::Scroll(0)));
        assert!(calls.contains(&Call::Scroll(1)));
    }

    #[test]
    fn test_user_scroll_debounce_blocks_auto_scroll() {
        let (mut sync, renderer) = sync_with(2, vec![Some(0), Some(1)], HighlightSyncConfig::default());
        renderer.offscreen.lock().unwrap().extend([0, 1]);
        let now = Instant::now();
        sync.note_user_scroll(now);
        sync.on_tick(0.25, true, now);
        // Debounce expired: scrolling resumes.
        let later = now + Duration::from_secs(2);
        sync.on_tick(0.80, true, later);
        let calls = renderer.calls.lock().unwrap().clone();
        assert!(!calls.contains(&Call::Scroll(0)));
        assert!(calls.contains(&Call::Scroll(1)));
    }

    #[test]
    fn test_programmatic_scroll_suppresses_user_flag() {
        let mut scroll = ScrollState::new(Duration::from_millis(1_500));
        let now = Instant::now();
        scroll.suppress_for(Duration::from_millis(600), now);

        // Input during the programmatic scroll is the engine's own.
        scroll.note_user_input(now + Duration::from_millis(100));
        assert!(!scroll.is_user_scrolling(now + Duration::from_millis(200)));

        // Input after it is the user's.
        scroll.note_user_input(now + Duration::from_millis(700));
        assert!(scroll.is_user_scrolling(now + Duration::from_millis(800)));
    }
}
