//! Console-backed ports: the CLI's stand-ins for platform audio and a
//! persistent notification surface.

use std::sync::atomic::{AtomicBool, Ordering};

use focusalarm_core::{status_text, AudioError, AudioSink, StatusSurface};

/// Prints beeps to stdout. Always "loaded"; playback cannot fail.
#[derive(Default)]
pub struct ConsoleAudio {
    released: AtomicBool,
}

impl AudioSink for ConsoleAudio {
    fn is_ready(&self, _level: u8) -> bool {
        true
    }

    fn play_level(&self, level: u8) -> Result<(), AudioError> {
        if self.released.load(Ordering::SeqCst) {
            return Err(AudioError::Backend("audio released".into()));
        }
        println!("[audio] beep (level {level})");
        Ok(())
    }

    fn stop_all(&self) {
        println!("[audio] stop all");
    }

    fn release(&self) -> Result<(), AudioError> {
        if self.released.swap(true, Ordering::SeqCst) {
            return Err(AudioError::AlreadyReleased);
        }
        Ok(())
    }
}

/// Prints the urgency readout to stdout.
#[derive(Default)]
pub struct ConsoleStatus;

impl StatusSurface for ConsoleStatus {
    fn show(&self, level: u8) {
        println!("[status] {}", status_text(level));
    }

    fn clear(&self) {
        println!("[status] cleared");
    }
}
