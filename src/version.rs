use alloc::sync::Arc;
use core::sync::atomic::{AtomicU64, Ordering};

/// A shared, monotonically increasing version counter.
///
/// A [`ListBuilder`](crate::ListBuilder) bumps its fence once per structural mutation.
/// Enumerators hold a clone, capture the version when they start and compare it on every
/// step. This is best-effort detection of a change that already happened, not
/// synchronization: nothing prevents the mutation.
#[derive(Clone, Debug, Default)]
pub struct VersionFence(Arc<AtomicU64>);

impl VersionFence {
    /// Creates a fence at version 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current version.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    /// Advances the version by one and returns the new value.
    pub(crate) fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(VersionFence: Send, Sync, Clone);

    #[test]
    fn clones_observe_bumps() {
        let fence = VersionFence::new();
        let observer = fence.clone();
        assert_eq!(observer.version(), 0);

        assert_eq!(fence.bump(), 1);
        assert_eq!(fence.bump(), 2);
        assert_eq!(observer.version(), 2);
    }

    #[test]
    fn fresh_fences_are_independent() {
        let a = VersionFence::new();
        let b = VersionFence::new();
        a.bump();
        assert_eq!(b.version(), 0);
    }
}
