//! Debug-only reentrancy detection.
//!
//! Map methods run user `Eq` and `Hash` code while probing chains, at points
//! where the entry log and the bucket index can be transiently out of step.
//! Calling back into the same map from that user code would observe the torn
//! state. In debug builds this guard turns such reentry into a panic; in
//! release builds it compiles to nothing.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map flag. Public entry points hold a [`HeldGuard`] for their whole
/// body via `let _g = self.reentrancy.enter();`.
///
/// The raw-pointer marker keeps the owning map `!Send + !Sync`, enforcing
/// the single-threaded contract at the type level.
#[derive(Debug, Default)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    entered: Cell<bool>,
    _single_thread: PhantomData<*mut ()>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            entered: Cell::new(false),
            _single_thread: PhantomData,
        }
    }

    /// Enter a guarded section. In debug builds, panics if one is live.
    #[inline]
    pub(crate) fn enter(&self) -> HeldGuard<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.entered.replace(true),
                "map method reentered while another call is in progress"
            );
            return HeldGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return HeldGuard {
                _marker: PhantomData,
            };
        }
    }
}

/// RAII guard returned by [`DebugReentrancy::enter`].
pub(crate) struct HeldGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _marker: PhantomData<&'a ()>,
}

impl Drop for HeldGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        self.owner.entered.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::DebugReentrancy;

    #[test]
    fn sequential_sections_are_fine() {
        let r = DebugReentrancy::new();
        drop(r.enter());
        drop(r.enter());
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_panics_in_debug() {
        let r = DebugReentrancy::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = r.enter();
            let _inner = r.enter();
        }));
        assert!(res.is_err(), "expected nested entry to panic in debug");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_entry_is_noop_in_release() {
        let r = DebugReentrancy::new();
        let _outer = r.enter();
        let _inner = r.enter();
    }
}
