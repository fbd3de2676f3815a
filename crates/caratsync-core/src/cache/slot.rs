//! Reclaimable in-memory slot for one cached value.
//!
//! A slot holds its value strongly while it is in use. Once the value has not
//! been accessed for the idle TTL, [`CacheSlot::sweep`] demotes it to a
//! [`Weak`] reference: the memory is released as soon as no reader still
//! holds an `Arc` to it, and the next access reloads it from the store.
//! Callers never see the difference between a hit and a reload.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

enum SlotState<T> {
    Empty,
    Resident { value: Arc<T>, last_access: Instant },
    Reclaimable(Weak<T>),
}

pub struct CacheSlot<T> {
    state: Mutex<SlotState<T>>,
    idle_ttl: Duration,
}

impl<T> CacheSlot<T> {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            state: Mutex::new(SlotState::Empty),
            idle_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        // Slot state is replaced whole, so a poisoned lock still holds a valid state
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the live value, or run `load` and cache its result.
    ///
    /// The lock is held while loading, so concurrent misses trigger a single
    /// reload.
    pub fn get_or_load(&self, load: impl FnOnce() -> Option<T>) -> Option<Arc<T>> {
        let mut state = self.lock();

        let live = match &*state {
            SlotState::Resident { value, .. } => Some(Arc::clone(value)),
            SlotState::Reclaimable(weak) => weak.upgrade(),
            SlotState::Empty => None,
        };

        let value = match live {
            Some(value) => value,
            None => Arc::new(load()?),
        };

        *state = SlotState::Resident {
            value: Arc::clone(&value),
            last_access: Instant::now(),
        };
        Some(value)
    }

    /// Return the live value without touching the backing store.
    pub fn peek(&self) -> Option<Arc<T>> {
        match &*self.lock() {
            SlotState::Resident { value, .. } => Some(Arc::clone(value)),
            SlotState::Reclaimable(weak) => weak.upgrade(),
            SlotState::Empty => None,
        }
    }

    /// Replace the slot contents in a single swap.
    pub fn put(&self, value: Arc<T>) {
        *self.lock() = SlotState::Resident {
            value,
            last_access: Instant::now(),
        };
    }

    /// Demote the value to a reclaimable reference if it has been idle for
    /// longer than the TTL. Returns true if a demotion happened.
    pub fn sweep(&self) -> bool {
        self.sweep_at(Instant::now())
    }

    fn sweep_at(&self, now: Instant) -> bool {
        let mut state = self.lock();
        let weak = match &*state {
            SlotState::Resident { value, last_access }
                if now.saturating_duration_since(*last_access) >= self.idle_ttl =>
            {
                Arc::downgrade(value)
            }
            _ => return false,
        };
        *state = SlotState::Reclaimable(weak);
        true
    }

    /// Drop the cached value entirely.
    pub fn invalidate(&self) {
        *self.lock() = SlotState::Empty;
    }

    /// True if the value is held strongly by the slot.
    pub fn is_resident(&self) -> bool {
        matches!(&*self.lock(), SlotState::Resident { .. })
    }
}
