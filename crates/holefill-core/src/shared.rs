//! Mutex-guarded allocator handle.
//!
//! The allocator itself is single-owner and assumes serial callers. When a
//! driver wants to share one allocator (the interactive loop, or any future
//! concurrent adaptation), the whole allocator goes behind a single
//! `parking_lot::Mutex`: block and hole mutations are coupled, so there is
//! nothing finer-grained to lock.

use parking_lot::Mutex;

use crate::allocator::Allocator;
use crate::interval::LayoutSnapshot;

/// A shared handle running each operation to completion under one lock.
#[derive(Debug)]
pub struct SharedAllocator {
    inner: Mutex<Allocator>,
}

impl SharedAllocator {
    #[must_use]
    pub fn new(allocator: Allocator) -> Self {
        Self {
            inner: Mutex::new(allocator),
        }
    }

    /// Runs `f` with exclusive access to the allocator.
    ///
    /// The closure observes and mutates a consistent state; no partial
    /// operation is ever visible outside it.
    pub fn with<R>(&self, f: impl FnOnce(&mut Allocator) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Snapshot of the current layout.
    #[must_use]
    pub fn layout(&self) -> LayoutSnapshot {
        self.inner.lock().layout()
    }

    /// Consumes the handle, returning the allocator.
    #[must_use]
    pub fn into_inner(self) -> Allocator {
        self.inner.into_inner()
    }
}
