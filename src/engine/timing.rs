//! Absolute-deadline waits for the playback worker
//!
//! Every wait targets an instant computed from the session epoch, never a
//! relative sleep, so per-event overhead does not accumulate into drift.

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

/// How a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// The target instant was reached
    Reached,
    /// The cancel channel fired (or its sender is gone)
    Cancelled,
}

/// Instant `ms` milliseconds after `epoch`
pub fn at_offset(epoch: Instant, ms: f64) -> Instant {
    if ms.is_finite() && ms > 0.0 {
        epoch + Duration::from_secs_f64(ms / 1000.0)
    } else {
        epoch
    }
}

/// Block until `target`, returning early if `cancel` receives a message.
///
/// A pending cancellation wins even when the target is already in the past.
pub fn wait_until(target: Instant, cancel: &Receiver<()>) -> Wait {
    if Instant::now() >= target {
        return match cancel.try_recv() {
            Err(TryRecvError::Empty) => Wait::Reached,
            Ok(()) | Err(TryRecvError::Disconnected) => Wait::Cancelled,
        };
    }
    match cancel.recv_deadline(target) {
        Err(RecvTimeoutError::Timeout) => Wait::Reached,
        Ok(()) | Err(RecvTimeoutError::Disconnected) => Wait::Cancelled,
    }
}
