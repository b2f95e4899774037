//! Session control
//!
//! [`SessionController`] is the public face of playback: it compiles note
//! lists, owns the [`PlaybackEngine`], and turns seek and speed changes into
//! cancel-and-restart cycles. At most one session is ever live.

use crate::engine::{PlaybackEngine, SessionEvent, SessionId, StartedSession};
use crate::error::PlaybackError;
use crate::input::InjectorFactory;
use crossbeam_channel::Receiver;
use keyplay_core::{
    compile_for, CompiledSchedule, GameMode, KeyMapRegistry, NoteEvent, PlaybackSpeed,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default pause between `play` and the first key, giving the user time to
/// focus the game window
pub const DEFAULT_LEAD_IN: Duration = Duration::from_secs(2);

/// Timing knobs for new sessions
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Delay before the first key of a fresh `play` (not used on restarts)
    pub lead_in: Duration,
    /// Hold applied to every profile, overriding the profile default
    pub hold: Option<Duration>,
    /// Per-profile hold overrides; these win over `hold`
    pub profile_hold: HashMap<GameMode, Duration>,
}

impl EngineConfig {
    /// Key hold duration for `mode`
    pub fn hold_for(&self, mode: GameMode) -> Duration {
        self.profile_hold
            .get(&mode)
            .copied()
            .or(self.hold)
            .unwrap_or_else(|| KeyMapRegistry::global().profile(mode).hold)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lead_in: DEFAULT_LEAD_IN,
            hold: None,
            profile_hold: HashMap::new(),
        }
    }
}

/// What the live session was compiled from
struct Current {
    id: SessionId,
    epoch: Instant,
    /// Entry-free copy of the schedule, for mapping wall time to song time
    timeline: CompiledSchedule,
}

impl Current {
    /// Lead-in still to run before the first key
    fn remaining_lead_in(&self) -> Duration {
        self.epoch.saturating_duration_since(Instant::now())
    }
}

pub struct SessionController {
    engine: PlaybackEngine,
    config: EngineConfig,
    speed: PlaybackSpeed,
    mode: GameMode,
    notes: Vec<NoteEvent>,
    current: Option<Current>,
    ready_at: Option<Instant>,
}

impl SessionController {
    pub fn new(config: EngineConfig, factory: Arc<dyn InjectorFactory>) -> Self {
        Self {
            engine: PlaybackEngine::new(factory),
            config,
            speed: PlaybackSpeed::NORMAL,
            mode: GameMode::default(),
            notes: Vec::new(),
            current: None,
            ready_at: None,
        }
    }

    /// Session events (`Ready`, `Finished`); pass each one to [`on_event`](Self::on_event)
    pub fn events(&self) -> Receiver<SessionEvent> {
        self.engine.events()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &str {
        self.engine.backend_name()
    }

    /// Play `notes` from the start, replacing whatever is playing.
    ///
    /// Unknown game modes fall back to the default profile. Notes whose key
    /// has no mapping are dropped with a single warning.
    pub fn play(
        &mut self,
        notes: Vec<NoteEvent>,
        game_mode: &str,
    ) -> Result<SessionId, PlaybackError> {
        self.stop();
        self.mode = GameMode::from_name(game_mode);
        self.notes = notes;
        let started = self.restart(0.0, self.speed, self.config.lead_in)?;
        Ok(started.id)
    }

    /// Cancel the live session; no-op when idle
    pub fn stop(&mut self) {
        self.engine.cancel();
        self.current = None;
        self.ready_at = None;
    }

    /// Jump to `time_ms` in the song.
    ///
    /// Returns `Ok(false)` when nothing is playing.
    pub fn seek(&mut self, time_ms: f64) -> Result<bool, PlaybackError> {
        let lead_in = match &self.current {
            Some(current) if self.is_playing() => current.remaining_lead_in(),
            _ => return Ok(false),
        };
        self.engine.cancel();
        self.current = None;
        self.restart(time_ms, self.speed, lead_in)?;
        Ok(true)
    }

    /// Change playback speed. While playing, restarts from the current song
    /// position at the new rate and returns `Ok(true)`; otherwise the speed
    /// is kept for the next `play`.
    pub fn set_speed(&mut self, speed: f64) -> Result<bool, PlaybackError> {
        let speed = PlaybackSpeed::new(speed);
        let (position, lead_in) = match (&self.current, self.position_ms()) {
            (Some(current), Some(position)) if self.is_playing() => {
                (position, current.remaining_lead_in())
            }
            _ => {
                self.speed = speed;
                return Ok(false);
            }
        };
        self.engine.cancel();
        self.current = None;
        self.speed = speed;
        self.restart(position, speed, lead_in)?;
        Ok(true)
    }

    /// Current song time of the live session; holds at the start offset
    /// during the lead-in
    pub fn position_ms(&self) -> Option<f64> {
        let current = self.current.as_ref()?;
        let elapsed = Instant::now().saturating_duration_since(current.epoch);
        Some(current.timeline.song_time_at(elapsed.as_secs_f64() * 1000.0))
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some() && self.engine.is_running()
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.current.as_ref().map(|current| current.id)
    }

    /// Speed used by the live session, or by the next `play`
    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Wall time since the live session dispatched its first key
    pub fn playing_for(&self) -> Option<Duration> {
        self.ready_at.map(|at| at.elapsed())
    }

    /// Apply a session event. Returns `false` for events from sessions that
    /// have since been stopped or replaced.
    pub fn on_event(&mut self, event: &SessionEvent) -> bool {
        if self.current_session() != Some(event.session()) {
            tracing::debug!(?event, "ignoring stale session event");
            return false;
        }
        match event {
            SessionEvent::Ready { .. } => self.ready_at = Some(Instant::now()),
            SessionEvent::Finished { .. } => {
                self.engine.reap();
                self.current = None;
            }
        }
        true
    }

    fn restart(
        &mut self,
        offset_ms: f64,
        speed: PlaybackSpeed,
        lead_in: Duration,
    ) -> Result<StartedSession, PlaybackError> {
        let schedule = compile_for(&self.notes, self.mode, speed, offset_ms);
        if !schedule.unresolved.is_empty() {
            let keys: Vec<&str> = schedule.unresolved.iter().map(String::as_str).collect();
            tracing::warn!(
                mode = %self.mode,
                "skipping notes with unmapped keys: {}",
                keys.join(", ")
            );
        }
        let timeline = CompiledSchedule::empty(schedule.mode, schedule.speed, schedule.offset_ms);
        let hold = self.config.hold_for(self.mode);

        self.ready_at = None;
        let started = self.engine.start(schedule, hold, lead_in)?;
        self.current = Some(Current {
            id: started.id,
            epoch: started.epoch,
            timeline,
        });
        Ok(started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyRecorder;
    use keyplay_core::ScanCode;

    fn quick_config() -> EngineConfig {
        EngineConfig {
            lead_in: Duration::ZERO,
            ..EngineConfig::default()
        }
    }

    fn notes(pairs: &[(u64, &str)]) -> Vec<NoteEvent> {
        pairs.iter().map(|&(t, k)| NoteEvent::new(t, k)).collect()
    }

    /// Feed events into the controller until the current session finishes
    fn run_to_end(controller: &mut SessionController) -> bool {
        let events = controller.events();
        let deadline = Instant::now() + Duration::from_secs(5);
        while let Ok(event) = events.recv_deadline(deadline) {
            if controller.on_event(&event) && matches!(event, SessionEvent::Finished { .. }) {
                return true;
            }
        }
        false
    }

    #[test]
    fn test_hold_resolution_order() {
        let mut config = EngineConfig::default();
        assert_eq!(config.hold_for(GameMode::Sky), Duration::from_millis(20));

        config.hold = Some(Duration::from_millis(35));
        assert_eq!(config.hold_for(GameMode::Genshin), Duration::from_millis(35));

        config
            .profile_hold
            .insert(GameMode::Genshin, Duration::from_millis(50));
        assert_eq!(config.hold_for(GameMode::Genshin), Duration::from_millis(50));
        assert_eq!(config.hold_for(GameMode::Sky), Duration::from_millis(35));
    }

    #[test]
    fn test_stop_while_idle_is_noop() {
        let recorder = KeyRecorder::new();
        let mut controller = SessionController::new(quick_config(), Arc::new(recorder.clone()));
        controller.stop();
        controller.stop();
        assert!(!controller.is_playing());
        assert_eq!(controller.current_session(), None);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_play_runs_to_finish() {
        let recorder = KeyRecorder::new();
        let mut controller = SessionController::new(quick_config(), Arc::new(recorder.clone()));

        controller
            .play(notes(&[(0, "1Key0"), (30, "1Key1")]), "sky")
            .unwrap();
        assert!(run_to_end(&mut controller));
        assert!(!controller.is_playing());
        assert!(controller.playing_for().is_some());
        assert_eq!(
            recorder.pressed(),
            vec![ScanCode::new(0x15), ScanCode::new(0x16)]
        );
    }

    #[test]
    fn test_second_play_replaces_first() {
        let recorder = KeyRecorder::new();
        let mut controller = SessionController::new(quick_config(), Arc::new(recorder.clone()));

        let a = controller
            .play(notes(&[(300, "1Key0"), (400, "1Key1")]), "sky")
            .unwrap();
        let b = controller.play(notes(&[(0, "1Key14")]), "sky").unwrap();
        assert_ne!(a, b);
        assert!(!controller.on_event(&SessionEvent::Finished { session: a }));

        assert!(run_to_end(&mut controller));
        assert_eq!(recorder.pressed(), vec![ScanCode::new(0x35)]);
    }

    #[test]
    fn test_seek_restarts_from_offset() {
        let recorder = KeyRecorder::new();
        let mut controller = SessionController::new(quick_config(), Arc::new(recorder.clone()));

        let first = controller
            .play(
                notes(&[(0, "1Key0"), (2_000, "1Key1"), (2_100, "1Key2")]),
                "sky",
            )
            .unwrap();
        assert!(controller.seek(2_050.0).unwrap());
        assert_ne!(controller.current_session(), Some(first));

        let position = controller.position_ms().unwrap();
        assert!(position >= 2_050.0);

        assert!(run_to_end(&mut controller));
        assert_eq!(recorder.pressed().last(), Some(&ScanCode::new(0x17)));
        assert!(!recorder.pressed().contains(&ScanCode::new(0x16)));
    }

    #[test]
    fn test_seek_and_speed_while_idle() {
        let recorder = KeyRecorder::new();
        let mut controller = SessionController::new(quick_config(), Arc::new(recorder));

        assert!(!controller.seek(1_000.0).unwrap());
        assert!(!controller.set_speed(1.5).unwrap());
        assert_eq!(controller.speed().get(), 1.5);
        assert!(!controller.set_speed(9.0).unwrap());
        assert_eq!(controller.speed().get(), 2.0);
    }

    #[test]
    fn test_set_speed_restarts_live_session() {
        let recorder = KeyRecorder::new();
        let mut controller = SessionController::new(quick_config(), Arc::new(recorder.clone()));

        let first = controller
            .play(notes(&[(0, "1Key0"), (400, "1Key1")]), "sky")
            .unwrap();
        assert!(controller.set_speed(2.0).unwrap());
        assert_ne!(controller.current_session(), Some(first));
        assert_eq!(controller.speed().get(), 2.0);

        assert!(run_to_end(&mut controller));
        assert_eq!(recorder.pressed().last(), Some(&ScanCode::new(0x16)));
    }

    #[test]
    fn test_speed_change_keeps_remaining_lead_in() {
        let recorder = KeyRecorder::new();
        let config = EngineConfig {
            lead_in: Duration::from_millis(300),
            ..EngineConfig::default()
        };
        let mut controller = SessionController::new(config, Arc::new(recorder.clone()));

        let before = Instant::now();
        controller.play(notes(&[(0, "1Key0")]), "sky").unwrap();
        assert_eq!(controller.position_ms(), Some(0.0));
        assert!(controller.set_speed(1.5).unwrap());
        assert!(controller.seek(0.0).unwrap());

        assert!(run_to_end(&mut controller));
        let first = recorder.events()[0].at;
        assert!(first.duration_since(before) >= Duration::from_millis(300));
    }

    #[test]
    fn test_playing_for_counts_from_first_key() {
        let recorder = KeyRecorder::new();
        let mut controller = SessionController::new(quick_config(), Arc::new(recorder));
        assert_eq!(controller.playing_for(), None);

        controller
            .play(notes(&[(0, "1Key0"), (300, "1Key1")]), "sky")
            .unwrap();
        let events = controller.events();
        let event = events.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(event, SessionEvent::Ready { .. }));
        assert!(controller.on_event(&event));
        assert!(controller.playing_for().is_some());

        controller.stop();
        assert_eq!(controller.playing_for(), None);
    }

    #[test]
    fn test_unavailable_backend_leaves_controller_idle() {
        let mut controller = SessionController::new(
            quick_config(),
            Arc::new(KeyRecorder::unavailable("no display")),
        );
        let result = controller.play(notes(&[(0, "1Key0")]), "sky");
        assert!(matches!(result, Err(PlaybackError::InjectionUnavailable(_))));
        assert!(!controller.is_playing());
        assert_eq!(controller.current_session(), None);
    }

    #[test]
    fn test_unknown_mode_uses_default_profile() {
        let recorder = KeyRecorder::new();
        let mut controller = SessionController::new(quick_config(), Arc::new(recorder.clone()));

        controller.play(notes(&[(0, "1Key0")]), "piano").unwrap();
        assert_eq!(controller.mode(), GameMode::Sky);
        assert!(run_to_end(&mut controller));
        assert_eq!(recorder.pressed(), vec![ScanCode::new(0x15)]);
    }
}
