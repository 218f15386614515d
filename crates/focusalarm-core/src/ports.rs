//! Side-effect ports.
//!
//! The engine never touches a speaker or a notification surface directly;
//! it drives these two traits. Hosts inject real backends (platform audio,
//! a persistent notification), the CLI injects console-backed ones, and
//! tests inject recorders.

use std::sync::Arc;

use crate::error::AudioError;

/// Short per-level alert sounds.
///
/// Backends load assets asynchronously: [`is_ready`](AudioSink::is_ready)
/// may report `false` right after startup, and callers are expected to
/// retry with a bounded backoff rather than block. The underlying playback
/// channel is exclusive; [`stop_all`](AudioSink::stop_all) is issued before
/// each new utterance at level boundaries so at most one sound is audible.
pub trait AudioSink: Send + Sync {
    /// Whether the sound asset for `level` has finished loading.
    fn is_ready(&self, level: u8) -> bool;

    /// Play the sound bound to `level` once.
    fn play_level(&self, level: u8) -> Result<(), AudioError>;

    /// Stop anything currently playing.
    fn stop_all(&self);

    /// Release backend resources. Releasing twice reports
    /// [`AudioError::AlreadyReleased`], which callers treat as satisfied.
    fn release(&self) -> Result<(), AudioError>;
}

/// Persistent, user-visible urgency readout. A single slot: each
/// [`show`](StatusSurface::show) overwrites the previous text.
pub trait StatusSurface: Send + Sync {
    /// Render `"Urgency Level: {level}"` for the given level.
    fn show(&self, level: u8);

    /// Tear the status down.
    fn clear(&self);
}

/// Status line rendered for a level.
pub fn status_text(level: u8) -> String {
    format!("Urgency Level: {level}")
}

pub type SharedAudio = Arc<dyn AudioSink>;
pub type SharedStatus = Arc<dyn StatusSurface>;
