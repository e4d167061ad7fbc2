//! Debug-only reentrancy guard for the map's entry points.
//!
//! The only user code the map ever runs is its hash strategy, and it runs
//! while a probe or a rebuild may have the buffer half-walked. In debug
//! builds a nested entry into the same map panics; in release builds the
//! guard is a zero-sized no-op.

use core::cell::Cell;
use core::marker::PhantomData;

#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // The map is single-threaded; keep it !Send + !Sync.
    _nosend: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _nosend: PhantomData,
        }
    }

    /// Mark the map busy until the returned guard drops.
    #[inline]
    pub(crate) fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "reentrancy detected: hash strategy re-entered the map"
            );
            ReentrancyGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            ReentrancyGuard { _z: PhantomData }
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.busy.set(false);
    }
}
