//! Playback errors

use keyplay_core::ScanCode;
use std::fmt;
use thiserror::Error;

/// Direction of a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Up,
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAction::Down => f.write_str("key-down"),
            KeyAction::Up => f.write_str("key-up"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The OS key injection facility could not be reached; fatal to `play`
    #[error("automation unavailable: {0}")]
    InjectionUnavailable(String),

    /// A single key event failed; playback continues
    #[error("{action} for {code} failed: {reason}")]
    InjectionFailure {
        code: ScanCode,
        action: KeyAction,
        reason: String,
    },

    /// The playback worker exited before acknowledging the session start
    #[error("playback worker terminated unexpectedly")]
    EngineTerminated,

    #[error("failed to spawn playback worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}
