//! Timed key dispatch
//!
//! The engine owns at most one playback session at a time. Each session runs
//! on its own worker thread that walks a [`CompiledSchedule`], waiting for
//! each entry's absolute fire instant and emitting key-down/key-up pairs.
//! Starting a session always cancels and joins the previous worker first, so
//! events from two schedules can never interleave.

use crate::engine::timing::{self, Wait};
use crate::error::PlaybackError;
use crate::input::{InjectorFactory, KeyInjector};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use keyplay_core::{CompiledSchedule, ScanCode};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Identifies one playback session
pub type SessionId = u64;

/// Notifications emitted by a session worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The first key of the session was dispatched
    Ready { session: SessionId },
    /// The schedule ran to completion without being cancelled
    Finished { session: SessionId },
}

impl SessionEvent {
    pub fn session(&self) -> SessionId {
        match self {
            SessionEvent::Ready { session } | SessionEvent::Finished { session } => *session,
        }
    }
}

/// Counters reported by a session worker when it exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub dispatched: usize,
    pub failed: usize,
    pub cancelled: bool,
}

/// A session that was successfully started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartedSession {
    pub id: SessionId,
    /// Instant that schedule offsets are measured from (start + lead-in)
    pub epoch: Instant,
}

struct ActiveSession {
    id: SessionId,
    cancel_tx: Sender<()>,
    thread: JoinHandle<SessionStats>,
}

/// Owner of the single active playback session
pub struct PlaybackEngine {
    factory: Arc<dyn InjectorFactory>,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
    next_session: SessionId,
    active: Option<ActiveSession>,
}

impl PlaybackEngine {
    pub fn new(factory: Arc<dyn InjectorFactory>) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            factory,
            events_tx,
            events_rx,
            next_session: 1,
            active: None,
        }
    }

    /// Receiver for [`SessionEvent`]s from every session this engine runs
    pub fn events(&self) -> Receiver<SessionEvent> {
        self.events_rx.clone()
    }

    /// Name of the injection backend in use
    pub fn backend_name(&self) -> &str {
        self.factory.name()
    }

    /// Start a new session, replacing any active one.
    ///
    /// Returns once the worker has opened its injector connection. If the
    /// connection fails the error is returned and the engine stays idle.
    pub fn start(
        &mut self,
        schedule: CompiledSchedule,
        hold: Duration,
        lead_in: Duration,
    ) -> Result<StartedSession, PlaybackError> {
        self.cancel();

        let id = self.next_session;
        self.next_session += 1;

        let (cancel_tx, cancel_rx) = bounded(1);
        let (ack_tx, ack_rx) = bounded::<Result<Instant, PlaybackError>>(1);
        let factory = self.factory.clone();
        let events_tx = self.events_tx.clone();
        let entries = schedule.len();

        let thread = thread::Builder::new()
            .name(format!("keyplay-session-{}", id))
            .spawn(move || {
                let injector = match factory.connect() {
                    Ok(injector) => injector,
                    Err(e) => {
                        let _ = ack_tx.send(Err(e));
                        return SessionStats::default();
                    }
                };
                let epoch = Instant::now() + lead_in;
                if ack_tx.send(Ok(epoch)).is_err() {
                    return SessionStats::default();
                }
                SessionWorker::new(id, injector, cancel_rx, events_tx, hold).run(schedule, epoch)
            })?;

        match ack_rx.recv() {
            Ok(Ok(epoch)) => {
                tracing::info!(
                    session = id,
                    entries,
                    hold_ms = hold.as_millis() as u64,
                    lead_in_ms = lead_in.as_millis() as u64,
                    "session started"
                );
                self.active = Some(ActiveSession {
                    id,
                    cancel_tx,
                    thread,
                });
                Ok(StartedSession { id, epoch })
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(PlaybackError::EngineTerminated)
            }
        }
    }

    /// Cancel the active session and wait for its worker to exit.
    ///
    /// No-op when idle. Keys held at the time of cancellation are released
    /// before this returns.
    pub fn cancel(&mut self) -> Option<SessionStats> {
        let active = self.active.take()?;
        let _ = active.cancel_tx.try_send(());
        match active.thread.join() {
            Ok(stats) => {
                tracing::debug!(session = active.id, ?stats, "session cancelled");
                Some(stats)
            }
            Err(_) => {
                tracing::error!(session = active.id, "playback worker panicked");
                None
            }
        }
    }

    /// True while a worker is still dispatching (or holding) keys
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.thread.is_finished())
    }

    /// Id of the session last started and not yet cancelled or reaped
    pub fn current_session(&self) -> Option<SessionId> {
        self.active.as_ref().map(|active| active.id)
    }

    /// Join the worker if it has already finished on its own
    pub fn reap(&mut self) -> Option<SessionStats> {
        if self.is_running() {
            return None;
        }
        let active = self.active.take()?;
        active.thread.join().ok()
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The loop running on a session's worker thread
struct SessionWorker {
    id: SessionId,
    injector: Box<dyn KeyInjector>,
    cancel_rx: Receiver<()>,
    events_tx: Sender<SessionEvent>,
    hold: Duration,
    /// Keys currently down, with their release instants
    held: Vec<(Instant, ScanCode)>,
    stats: SessionStats,
}

impl SessionWorker {
    fn new(
        id: SessionId,
        injector: Box<dyn KeyInjector>,
        cancel_rx: Receiver<()>,
        events_tx: Sender<SessionEvent>,
        hold: Duration,
    ) -> Self {
        Self {
            id,
            injector,
            cancel_rx,
            events_tx,
            hold,
            held: Vec::new(),
            stats: SessionStats::default(),
        }
    }

    fn run(mut self, schedule: CompiledSchedule, epoch: Instant) -> SessionStats {
        let mut entries = schedule.entries.into_iter().peekable();

        loop {
            let next_press = entries
                .peek()
                .map(|entry| timing::at_offset(epoch, entry.fire_at_ms));
            let next_release = self.held.iter().map(|&(at, _)| at).min();

            // Releases win ties so a repeated key is up before it goes down again
            let (target, press) = match (next_press, next_release) {
                (None, None) => break,
                (Some(p), Some(r)) if r <= p => (r, false),
                (Some(p), _) => (p, true),
                (None, Some(r)) => (r, false),
            };

            if timing::wait_until(target, &self.cancel_rx) == Wait::Cancelled {
                self.stats.cancelled = true;
                break;
            }

            if press {
                if let Some(entry) = entries.next() {
                    self.press(entry.code);
                }
            } else {
                self.release_due(Instant::now());
            }
        }

        self.release_all();

        if self.stats.cancelled {
            tracing::debug!(session = self.id, "worker stopped by cancel");
        } else {
            tracing::info!(
                session = self.id,
                dispatched = self.stats.dispatched,
                failed = self.stats.failed,
                "session finished"
            );
            let _ = self.events_tx.send(SessionEvent::Finished { session: self.id });
        }
        self.stats
    }

    fn press(&mut self, code: ScanCode) {
        if let Some(pos) = self.held.iter().position(|&(_, held)| held == code) {
            self.held.remove(pos);
            self.release(code);
        }

        match self.injector.key_down(code) {
            Ok(()) => {
                tracing::trace!(session = self.id, %code, "key down");
                self.held.push((Instant::now() + self.hold, code));
                self.stats.dispatched += 1;
                if self.stats.dispatched == 1 {
                    let _ = self.events_tx.send(SessionEvent::Ready { session: self.id });
                }
            }
            Err(e) => {
                tracing::warn!(session = self.id, "{}", e);
                self.stats.failed += 1;
            }
        }
    }

    fn release(&mut self, code: ScanCode) {
        match self.injector.key_up(code) {
            Ok(()) => tracing::trace!(session = self.id, %code, "key up"),
            Err(e) => {
                tracing::warn!(session = self.id, "{}", e);
                self.stats.failed += 1;
            }
        }
    }

    fn release_due(&mut self, now: Instant) {
        let (due, pending): (Vec<_>, Vec<_>) =
            self.held.drain(..).partition(|&(at, _)| at <= now);
        self.held = pending;
        for (_, code) in due {
            self.release(code);
        }
    }

    fn release_all(&mut self) {
        for (_, code) in std::mem::take(&mut self.held) {
            self.release(code);
        }
    }
}
