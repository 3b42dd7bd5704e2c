//! Playback-time word resolution and highlight orchestration
//!
//! Everything here works against opaque rendered-position indices supplied
//! by the rendering layer; no presentation primitives leak into the core.

mod locator;
mod mapper;
mod session;
mod sync;

pub use locator::{PlaybackLocator, BASE_WINDOW, MAX_WINDOW};
pub use mapper::{map_positions, normalize_word};
pub use session::{
    spawn_tick_loop, LoadedDocument, PlaybackClock, PlaybackSession, SessionConfig,
};
pub use sync::{HighlightRenderer, HighlightSync, HighlightSyncConfig, ScrollState};
