//! Schedule compiler
//!
//! Turns a raw note list into an absolute-time dispatch plan. Pure: no
//! timers, no I/O, the same inputs always give the same schedule.

use crate::keymap::{GameMode, KeyMapRegistry};
use crate::types::{CompiledSchedule, NoteEvent, PlaybackSpeed, ScheduledKey};

/// Compile `notes` for playback under `game_mode`, starting `offset_ms` into the song.
///
/// - notes before `offset_ms` are skipped (seek/resume)
/// - notes whose key has no mapping are dropped and listed in `unresolved`
/// - `fire_at_ms = (time - offset_ms) / speed`, with `speed` clamped by [`PlaybackSpeed`]
///
/// Input order does not matter; notes are stable-sorted by time first.
pub fn compile(
    notes: &[NoteEvent],
    game_mode: &str,
    speed: f64,
    offset_ms: f64,
) -> CompiledSchedule {
    compile_for(notes, GameMode::from_name(game_mode), PlaybackSpeed::new(speed), offset_ms)
}

/// Same as [`compile`] with an already-parsed mode and speed
pub fn compile_for(
    notes: &[NoteEvent],
    mode: GameMode,
    speed: PlaybackSpeed,
    offset_ms: f64,
) -> CompiledSchedule {
    let offset_ms = if offset_ms.is_finite() && offset_ms > 0.0 {
        offset_ms
    } else {
        0.0
    };
    let profile = KeyMapRegistry::global().profile(mode);
    let mut schedule = CompiledSchedule::empty(mode, speed, offset_ms);

    let mut ordered: Vec<&NoteEvent> = notes.iter().collect();
    ordered.sort_by_key(|note| note.time);

    for note in ordered {
        let time = note.time as f64;
        if time < offset_ms {
            schedule.skipped_before_offset += 1;
            continue;
        }
        let Some(code) = profile.resolve(&note.key) else {
            schedule.unresolved.insert(note.key.clone());
            continue;
        };
        schedule.entries.push(ScheduledKey {
            fire_at_ms: (time - offset_ms) / speed.get(),
            code,
            key: note.key.clone(),
            song_time_ms: note.time,
        });
    }

    schedule
}
