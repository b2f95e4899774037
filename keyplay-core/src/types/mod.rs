// keyplay-core/src/types/mod.rs

pub mod note;
pub mod scan_code;
pub mod schedule;
pub mod speed;

pub use note::NoteEvent;
pub use scan_code::ScanCode;
pub use schedule::{CompiledSchedule, ScheduledKey};
pub use speed::PlaybackSpeed;
