//! Keyboard injection backends
//!
//! The playback engine talks to the keyboard through [`KeyInjector`]. A
//! connection is opened per session by an [`InjectorFactory`], on the
//! playback thread itself: some platform backends are not `Send`.

pub mod os;
pub mod recorder;

use crate::error::PlaybackError;
use keyplay_core::ScanCode;

pub use os::OsKeyboard;
pub use recorder::{KeyRecorder, RecordedKey};

/// An open connection to a keyboard injection facility
pub trait KeyInjector {
    fn key_down(&mut self, code: ScanCode) -> Result<(), PlaybackError>;
    fn key_up(&mut self, code: ScanCode) -> Result<(), PlaybackError>;
}

/// Opens injector connections
pub trait InjectorFactory: Send + Sync {
    /// Fails with [`PlaybackError::InjectionUnavailable`] when the facility cannot be used
    fn connect(&self) -> Result<Box<dyn KeyInjector>, PlaybackError>;

    /// Short backend name for status output
    fn name(&self) -> &str;
}
