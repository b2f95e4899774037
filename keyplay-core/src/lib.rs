//! # keyplay core
//!
//! Pure building blocks for keyplay: game key maps and the schedule compiler.
//! Nothing in this crate spawns threads, sleeps or touches the OS; the
//! playback engine in the `keyplay` crate consumes what is compiled here.
//!
//! ## Features
//!
//! - **serde**: derive `Serialize`/`Deserialize` for the public data types
//!
//! ## Example
//!
//! ```
//! use keyplay_core::{compile, NoteEvent};
//!
//! let notes = vec![NoteEvent::new(0, "1Key0"), NoteEvent::new(200, "1Key2")];
//! let schedule = compile(&notes, "sky", 2.0, 0.0);
//! assert_eq!(schedule.entries[1].fire_at_ms, 100.0);
//! ```

pub mod compiler;
pub mod keymap;
pub mod types;

pub use compiler::{compile, compile_for};
pub use keymap::{resolve, GameMode, KeyMapRegistry, KeyProfile};
pub use types::{CompiledSchedule, NoteEvent, PlaybackSpeed, ScanCode, ScheduledKey};
