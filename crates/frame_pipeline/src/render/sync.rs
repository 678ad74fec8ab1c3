//! Thread synchronization for frame handoff
//!
//! An [`Event`] is a binary signal a thread can block on. The
//! [`SubmissionGate`] pairs two of them so the simulation thread and the
//! render thread alternate ownership of the two frame slots:
//!
//! ```text
//! simulation: wait(ready) -> submit... -> signal(complete) -> wait(ready) -> ...
//! render:     wait(complete) -> swap -> signal(ready) -> draw... -> wait(complete) -> ...
//! ```
//!
//! The render thread raises `ready_for_submission` right after the swap and
//! before drawing, so the next frame's submission overlaps this frame's draws.

use std::sync::{Condvar, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Synchronization errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The wait primitive failed
    #[error("Waiting on '{0}' failed")]
    WaitFailed(&'static str),

    /// The event's lock was poisoned when a thread tried to signal it
    #[error("Signaling '{0}' failed")]
    SignalFailed(&'static str),

    /// The event's lock was poisoned when a thread tried to wait on it
    #[error("Event '{0}' lock poisoned")]
    Poisoned(&'static str),

    /// The event was shut down; no further signals will arrive
    #[error("Event '{0}' shut down")]
    ShutDown(&'static str),
}

/// Outcome of a wait that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The event was signaled and the signal consumed
    Signaled,
    /// The timeout elapsed first
    TimedOut,
}

#[derive(Debug, Default)]
struct EventState {
    signaled: bool,
    shut_down: bool,
}

/// Auto-reset binary signal with optional timeout on wait
///
/// A successful wait consumes the signal, so each `signal` releases at most
/// one waiter.
#[derive(Debug)]
pub struct Event {
    name: &'static str,
    state: Mutex<EventState>,
    condvar: Condvar,
}

impl Event {
    /// Create an event
    pub fn new(name: &'static str, initially_signaled: bool) -> Self {
        Self {
            name,
            state: Mutex::new(EventState {
                signaled: initially_signaled,
                shut_down: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Name used in logs and errors
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Raise the signal, waking one waiter
    pub fn signal(&self) -> Result<(), SyncError> {
        let mut state = self.state.lock().map_err(|_| SyncError::SignalFailed(self.name))?;
        if state.shut_down {
            return Err(SyncError::ShutDown(self.name));
        }
        state.signaled = true;
        drop(state);

        self.condvar.notify_one();
        Ok(())
    }

    /// Block until signaled, the timeout elapses, or the event shuts down
    ///
    /// `None` waits without a timeout.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<WaitOutcome, SyncError> {
        let state = self.state.lock().map_err(|_| SyncError::Poisoned(self.name))?;
        let blocked = |state: &mut EventState| !state.signaled && !state.shut_down;

        let mut state = match timeout {
            None => self
                .condvar
                .wait_while(state, blocked)
                .map_err(|_| SyncError::WaitFailed(self.name))?,
            Some(timeout) => {
                let (state, _) = self
                    .condvar
                    .wait_timeout_while(state, timeout, blocked)
                    .map_err(|_| SyncError::WaitFailed(self.name))?;
                if !state.signaled && !state.shut_down {
                    return Ok(WaitOutcome::TimedOut);
                }
                state
            }
        };

        if state.shut_down {
            return Err(SyncError::ShutDown(self.name));
        }
        state.signaled = false;
        Ok(WaitOutcome::Signaled)
    }

    /// Wake every waiter with [`SyncError::ShutDown`]; later signals and waits fail the same way
    pub fn shut_down(&self) {
        // A poisoned lock still holds valid booleans
        let mut state = self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        state.shut_down = true;
        drop(state);
        self.condvar.notify_all();
    }

    /// Poison the event's lock by panicking while holding it
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = self.state.lock();
                    panic!("poisoning event '{}'", self.name);
                })
                .join()
        });
    }
}

/// The pair of auto-reset events that hand frame slots between threads
#[derive(Debug)]
pub struct SubmissionGate {
    /// Raised by the simulation thread once a frame is fully submitted
    submission_complete: Event,
    /// Raised by the render thread once it has swapped slots
    ready_for_submission: Event,
}

impl Default for SubmissionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionGate {
    /// Create the gate; submission may begin immediately
    pub fn new() -> Self {
        Self {
            submission_complete: Event::new("submission complete", false),
            ready_for_submission: Event::new("ready for submission", true),
        }
    }

    /// Simulation side: block until the previous frame has been taken by the renderer
    pub fn wait_until_ready_for_submission(&self, timeout: Option<Duration>) -> Result<WaitOutcome, SyncError> {
        self.ready_for_submission.wait(timeout)
    }

    /// Simulation side: hand the submitted frame to the renderer
    pub fn signal_submission_complete(&self) -> Result<(), SyncError> {
        self.submission_complete.signal()
    }

    /// Render side: block until a frame has been submitted
    pub fn wait_for_submission(&self, timeout: Option<Duration>) -> Result<WaitOutcome, SyncError> {
        self.submission_complete.wait(timeout)
    }

    /// Render side: let the simulation start writing the next frame
    pub fn signal_ready_for_submission(&self) -> Result<(), SyncError> {
        self.ready_for_submission.signal()
    }

    /// Wake both threads and make every later wait/signal fail with `ShutDown`
    pub fn shut_down(&self) {
        self.submission_complete.shut_down();
        self.ready_for_submission.shut_down();
    }

    /// Poison the lock behind `ready_for_submission`
    #[cfg(test)]
    pub(crate) fn poison_ready_for_submission(&self) {
        self.ready_for_submission.poison();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const SHORT: Duration = Duration::from_millis(20);

    #[test]
    fn test_auto_reset_consumes_signal() {
        let event = Event::new("test", true);
        assert_eq!(event.wait(Some(SHORT)), Ok(WaitOutcome::Signaled));
        assert_eq!(event.wait(Some(SHORT)), Ok(WaitOutcome::TimedOut));
    }

    #[test]
    fn test_poisoned_event_fails_signal_and_wait() {
        let event = Event::new("test", false);
        event.poison();
        assert_eq!(event.signal(), Err(SyncError::SignalFailed("test")));
        assert_eq!(event.wait(Some(SHORT)), Err(SyncError::Poisoned("test")));
    }

    #[test]
    fn test_signal_wakes_blocked_waiter() {
        let event = Arc::new(Event::new("test", false));
        let waiter = {
            let event = Arc::clone(&event);
            thread::spawn(move || event.wait(None))
        };

        thread::sleep(SHORT);
        event.signal().unwrap();
        assert_eq!(waiter.join().unwrap(), Ok(WaitOutcome::Signaled));
        assert_eq!(event.wait(Some(SHORT)), Ok(WaitOutcome::TimedOut));
    }

    #[test]
    fn test_shut_down_wakes_unbounded_wait() {
        let event = Arc::new(Event::new("test", false));
        let waiter = {
            let event = Arc::clone(&event);
            thread::spawn(move || event.wait(None))
        };

        thread::sleep(SHORT);
        event.shut_down();
        assert_eq!(waiter.join().unwrap(), Err(SyncError::ShutDown("test")));
        assert_eq!(event.signal(), Err(SyncError::ShutDown("test")));
    }

    #[test]
    fn test_gate_initial_state() {
        let gate = SubmissionGate::new();
        assert_eq!(gate.wait_until_ready_for_submission(Some(SHORT)), Ok(WaitOutcome::Signaled));
        assert_eq!(gate.wait_for_submission(Some(SHORT)), Ok(WaitOutcome::TimedOut));
        assert_eq!(gate.wait_until_ready_for_submission(Some(SHORT)), Ok(WaitOutcome::TimedOut));
    }

    #[test]
    fn test_gate_alternates() {
        let gate = SubmissionGate::new();
        for _ in 0..3 {
            assert_eq!(gate.wait_until_ready_for_submission(Some(SHORT)), Ok(WaitOutcome::Signaled));
            gate.signal_submission_complete().unwrap();
            assert_eq!(gate.wait_for_submission(Some(SHORT)), Ok(WaitOutcome::Signaled));
            gate.signal_ready_for_submission().unwrap();
        }
    }
}
