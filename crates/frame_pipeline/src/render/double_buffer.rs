//! Two-slot frame arena
//!
//! Exactly two [`FrameData`] slots live for the lifetime of the render
//! system. One index names the slot the simulation writes ("submit"); the
//! other slot is the one the render thread reads ("render"). `swap` flips the
//! index and never moves frame data.
//!
//! The [`SubmissionGate`](crate::render::sync::SubmissionGate) decides who may
//! touch which slot. Each slot still sits in a `Mutex` so the borrow is
//! checked, but access uses `try_lock`: under the gate protocol a slot is
//! never contended, so contention is reported as a protocol violation
//! instead of being waited out.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use thiserror::Error;

use crate::render::frame_data::FrameData;

/// Number of frame slots
pub const SLOT_COUNT: usize = 2;

/// Slot access errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// The other thread is using this slot; the handoff protocol was broken
    #[error("Frame slot {0} is in use by the other thread")]
    Contended(usize),

    /// A thread panicked while holding the slot
    #[error("Frame slot {0} lock poisoned")]
    Poisoned(usize),
}

/// Fixed pair of frame slots with an index swap
#[derive(Debug)]
pub struct FrameSlots {
    slots: [Mutex<FrameData>; SLOT_COUNT],
    submit_index: AtomicUsize,
}

impl FrameSlots {
    /// Create both slots; slot 0 starts in the submit role
    pub fn new(make_slot: impl Fn() -> FrameData) -> Self {
        Self {
            slots: [Mutex::new(make_slot()), Mutex::new(make_slot())],
            submit_index: AtomicUsize::new(0),
        }
    }

    /// Index of the slot in the submit role
    pub fn submit_index(&self) -> usize {
        self.submit_index.load(Ordering::Acquire)
    }

    /// Index of the slot in the render role
    pub fn render_index(&self) -> usize {
        1 - self.submit_index()
    }

    /// Exchange the submit and render roles
    ///
    /// Only the render thread calls this, after it has consumed the
    /// submission-complete signal.
    pub fn swap(&self) {
        let previous = self.submit_index.fetch_xor(1, Ordering::AcqRel);
        log::trace!("Frame slots swapped: submit {} -> {}", previous, previous ^ 1);
    }

    fn try_lock(&self, index: usize) -> Result<MutexGuard<'_, FrameData>, SlotError> {
        self.slots[index].try_lock().map_err(|error| match error {
            TryLockError::WouldBlock => SlotError::Contended(index),
            TryLockError::Poisoned(_) => SlotError::Poisoned(index),
        })
    }

    /// Write access to the slot in the submit role
    pub fn current_submit_slot(&self) -> Result<MutexGuard<'_, FrameData>, SlotError> {
        self.try_lock(self.submit_index())
    }

    /// Access to the slot in the render role
    pub fn current_render_slot(&self) -> Result<MutexGuard<'_, FrameData>, SlotError> {
        self.try_lock(self.render_index())
    }

    /// Release every entry in both slots, regardless of role
    ///
    /// Used at shutdown. Blocks on each slot and recovers poisoned slots,
    /// since entries must be released even if a thread died mid-frame.
    pub fn drain_all(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).clear_entries())
            .sum()
    }
}
