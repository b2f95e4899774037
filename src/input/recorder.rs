//! Recording injector
//!
//! Records key events instead of sending them to the OS. Used by the test
//! suite and by `--dry-run`, where every event is also logged.

use crate::error::{KeyAction, PlaybackError};
use crate::input::{InjectorFactory, KeyInjector};
use keyplay_core::ScanCode;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// A key event as seen by the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedKey {
    pub at: Instant,
    pub action: KeyAction,
    pub code: ScanCode,
}

/// Factory whose connections append to a shared log
#[derive(Clone, Default)]
pub struct KeyRecorder {
    log: Arc<Mutex<Vec<RecordedKey>>>,
    failing: Arc<HashSet<ScanCode>>,
    unavailable: Option<String>,
    echo: bool,
}

impl KeyRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every event at info level as it is recorded
    pub fn with_echo(mut self) -> Self {
        self.echo = true;
        self
    }

    /// Make events for these codes fail (they are not recorded)
    pub fn with_failing(mut self, codes: impl IntoIterator<Item = ScanCode>) -> Self {
        self.failing = Arc::new(codes.into_iter().collect());
        self
    }

    /// Make `connect` fail as if the facility were missing
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            unavailable: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<RecordedKey> {
        lock(&self.log).clone()
    }

    /// Codes of recorded key-downs, in order
    pub fn pressed(&self) -> Vec<ScanCode> {
        lock(&self.log)
            .iter()
            .filter(|e| e.action == KeyAction::Down)
            .map(|e| e.code)
            .collect()
    }
}

impl InjectorFactory for KeyRecorder {
    fn connect(&self) -> Result<Box<dyn KeyInjector>, PlaybackError> {
        if let Some(reason) = &self.unavailable {
            return Err(PlaybackError::InjectionUnavailable(reason.clone()));
        }
        Ok(Box::new(RecorderConnection {
            log: self.log.clone(),
            failing: self.failing.clone(),
            echo: self.echo,
        }))
    }

    fn name(&self) -> &str {
        "recorder"
    }
}

struct RecorderConnection {
    log: Arc<Mutex<Vec<RecordedKey>>>,
    failing: Arc<HashSet<ScanCode>>,
    echo: bool,
}

impl RecorderConnection {
    fn record(&mut self, action: KeyAction, code: ScanCode) -> Result<(), PlaybackError> {
        if self.failing.contains(&code) {
            return Err(PlaybackError::InjectionFailure {
                code,
                action,
                reason: "rejected by recorder".to_string(),
            });
        }
        if self.echo {
            tracing::info!(target: "keyplay::dry_run", "{} {}", action, code);
        }
        lock(&self.log).push(RecordedKey {
            at: Instant::now(),
            action,
            code,
        });
        Ok(())
    }
}

impl KeyInjector for RecorderConnection {
    fn key_down(&mut self, code: ScanCode) -> Result<(), PlaybackError> {
        self.record(KeyAction::Down, code)
    }

    fn key_up(&mut self, code: ScanCode) -> Result<(), PlaybackError> {
        self.record(KeyAction::Up, code)
    }
}

fn lock(log: &Mutex<Vec<RecordedKey>>) -> MutexGuard<'_, Vec<RecordedKey>> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connections_share_one_log() {
        let recorder = KeyRecorder::new();
        let mut a = recorder.connect().unwrap();
        let mut b = recorder.connect().unwrap();

        a.key_down(ScanCode::new(0x15)).unwrap();
        b.key_up(ScanCode::new(0x15)).unwrap();

        let events = recorder.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, KeyAction::Down);
        assert_eq!(events[1].action, KeyAction::Up);
        assert_eq!(recorder.pressed(), vec![ScanCode::new(0x15)]);
    }

    #[test]
    fn test_unavailable_recorder_refuses_connection() {
        let recorder = KeyRecorder::unavailable("no display");
        match recorder.connect() {
            Err(PlaybackError::InjectionUnavailable(reason)) => assert_eq!(reason, "no display"),
            _ => panic!("expected InjectionUnavailable"),
        }
    }

    #[test]
    fn test_failing_codes_are_not_recorded() {
        let recorder = KeyRecorder::new().with_failing([ScanCode::new(0x16)]);
        let mut conn = recorder.connect().unwrap();

        assert!(conn.key_down(ScanCode::new(0x16)).is_err());
        assert!(conn.key_down(ScanCode::new(0x17)).is_ok());
        assert_eq!(recorder.pressed(), vec![ScanCode::new(0x17)]);
    }
}
