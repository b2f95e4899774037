//! OS keyboard injection through `enigo`
//!
//! Sends raw scan codes so the game sees physical key positions regardless
//! of the active keyboard layout. On Windows the scan code goes through
//! unchanged; on X11 it is sent as the matching X keycode (evdev code + 8).

use crate::error::{KeyAction, PlaybackError};
use crate::input::{InjectorFactory, KeyInjector};
use enigo::{Direction, Enigo, Keyboard, Settings};
use keyplay_core::ScanCode;

/// Factory for real keyboard connections
#[derive(Debug, Default, Clone, Copy)]
pub struct OsKeyboard;

impl OsKeyboard {
    pub fn new() -> Self {
        Self
    }
}

impl InjectorFactory for OsKeyboard {
    fn connect(&self) -> Result<Box<dyn KeyInjector>, PlaybackError> {
        if !platform_supported() {
            return Err(PlaybackError::InjectionUnavailable(format!(
                "scan-code injection is not supported on {}",
                std::env::consts::OS
            )));
        }
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| PlaybackError::InjectionUnavailable(e.to_string()))?;
        tracing::debug!("connected to OS keyboard");
        Ok(Box::new(EnigoInjector { enigo }))
    }

    fn name(&self) -> &str {
        "os"
    }
}

struct EnigoInjector {
    enigo: Enigo,
}

impl EnigoInjector {
    fn send(&mut self, code: ScanCode, action: KeyAction) -> Result<(), PlaybackError> {
        let direction = match action {
            KeyAction::Down => Direction::Press,
            KeyAction::Up => Direction::Release,
        };
        self.enigo
            .raw(native_keycode(code), direction)
            .map_err(|e| PlaybackError::InjectionFailure {
                code,
                action,
                reason: e.to_string(),
            })
    }
}

impl KeyInjector for EnigoInjector {
    fn key_down(&mut self, code: ScanCode) -> Result<(), PlaybackError> {
        self.send(code, KeyAction::Down)
    }

    fn key_up(&mut self, code: ScanCode) -> Result<(), PlaybackError> {
        self.send(code, KeyAction::Up)
    }
}

fn platform_supported() -> bool {
    cfg!(any(target_os = "windows", target_os = "linux"))
}

/// Translate a set-1 scan code to the keycode the platform backend expects
fn native_keycode(code: ScanCode) -> u16 {
    if cfg!(target_os = "linux") {
        code.get() + 8
    } else {
        code.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_keycode() {
        let code = ScanCode::new(0x15);
        if cfg!(target_os = "linux") {
            // KEY_Y (21) is X keycode 29
            assert_eq!(native_keycode(code), 29);
        } else {
            assert_eq!(native_keycode(code), 0x15);
        }
    }

    #[test]
    fn test_factory_name() {
        assert_eq!(OsKeyboard::new().name(), "os");
    }
}
