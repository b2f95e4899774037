//! Compiled dispatch plans
//!
//! A [`CompiledSchedule`] is the output of the schedule compiler: every note
//! that survived filtering, resolved to a physical code and placed on an
//! absolute timeline relative to the session epoch.

use crate::keymap::GameMode;
use crate::types::{PlaybackSpeed, ScanCode};
use std::collections::BTreeSet;

/// A key press scheduled relative to the session epoch
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledKey {
    /// Milliseconds after the epoch at which the key goes down
    pub fire_at_ms: f64,
    /// Physical code to inject
    pub code: ScanCode,
    /// Logical key the code was resolved from
    pub key: String,
    /// Position of the source note in the song
    pub song_time_ms: u64,
}

/// Ordered dispatch plan for one playback session
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchedule {
    /// Entries in non-decreasing `fire_at_ms` order
    pub entries: Vec<ScheduledKey>,
    pub mode: GameMode,
    pub speed: PlaybackSpeed,
    /// Song position the schedule starts from
    pub offset_ms: f64,
    /// Notes dropped because they lie before `offset_ms`
    pub skipped_before_offset: usize,
    /// Logical keys with no mapping in `mode`
    pub unresolved: BTreeSet<String>,
}

impl CompiledSchedule {
    pub fn empty(mode: GameMode, speed: PlaybackSpeed, offset_ms: f64) -> Self {
        Self {
            entries: Vec::new(),
            mode,
            speed,
            offset_ms,
            skipped_before_offset: 0,
            unresolved: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScheduledKey> {
        self.entries.iter()
    }

    /// Fire time of the last entry, 0 for an empty schedule
    pub fn duration_ms(&self) -> f64 {
        self.entries.last().map(|e| e.fire_at_ms).unwrap_or(0.0)
    }

    /// Map wall-clock time elapsed since the epoch back to a song position
    pub fn song_time_at(&self, elapsed_ms: f64) -> f64 {
        self.offset_ms + elapsed_ms.max(0.0) * self.speed.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(fire_at_ms: f64, code: u16) -> ScheduledKey {
        ScheduledKey {
            fire_at_ms,
            code: ScanCode::new(code),
            key: String::new(),
            song_time_ms: fire_at_ms as u64,
        }
    }

    #[test]
    fn test_duration_is_last_fire_time() {
        let mut schedule = CompiledSchedule::empty(GameMode::Sky, PlaybackSpeed::NORMAL, 0.0);
        assert_eq!(schedule.duration_ms(), 0.0);

        schedule.entries.push(entry(0.0, 0x15));
        schedule.entries.push(entry(750.0, 0x16));
        assert_eq!(schedule.duration_ms(), 750.0);
        assert_eq!(schedule.len(), 2);
    }

    #[test]
    fn test_song_time_at_accounts_for_offset_and_speed() {
        let schedule = CompiledSchedule::empty(GameMode::Sky, PlaybackSpeed::new(2.0), 1000.0);
        assert_eq!(schedule.song_time_at(0.0), 1000.0);
        assert_eq!(schedule.song_time_at(250.0), 1500.0);
        // Lead-in time before the epoch maps to the offset itself
        assert_eq!(schedule.song_time_at(-300.0), 1000.0);
    }
}
