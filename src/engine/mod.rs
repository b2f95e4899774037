//! Playback engine: a single worker thread per session, dispatching keys at
//! absolute deadlines.

pub mod playback_engine;
pub mod timing;

pub use playback_engine::{PlaybackEngine, SessionEvent, SessionId, SessionStats, StartedSession};
