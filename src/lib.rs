//! # keyplay
//!
//! Plays song sheets into a game window as timed keyboard presses.
//!
//! A song is a list of `(time, logical key)` notes. The schedule compiler in
//! [`keyplay_core`] maps each logical key to a physical scan code for the
//! selected game profile and produces an absolute-time plan. This crate runs
//! that plan against the OS keyboard.
//!
//! ## Modules
//!
//! - `engine`: the playback worker, dispatching key-down/key-up pairs at
//!   absolute deadlines with immediate cancellation.
//! - `session`: [`SessionController`], the play/stop/seek/speed surface over
//!   the engine.
//! - `input`: key injection backends (the OS keyboard and a recorder used for
//!   tests and dry runs).
//! - `song`, `library`, `playlist`: loading song files and choosing what to
//!   play next.
//! - `repl`, `commands`: the interactive terminal front end.

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod library;
pub mod logging;
pub mod playlist;
pub mod repl;
pub mod session;
pub mod song;

pub use crate::engine::{SessionEvent, SessionId};
pub use crate::error::PlaybackError;
pub use crate::session::{EngineConfig, SessionController};
pub use keyplay_core::{GameMode, NoteEvent};
