/// Errors reported by enumerators and windowed list operations.
///
/// Argument errors ([`StartOutOfRange`](Error::StartOutOfRange) and
/// [`WindowOutOfRange`](Error::WindowOutOfRange)) are raised at construction, before any
/// traversal. The other two are raised by [`Enumerator::advance`](crate::Enumerator::advance)
/// and [`Enumerator::current`](crate::Enumerator::current).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The window's start index lies outside the sequence.
    #[error("window start {start} is out of range for a sequence of length {len}")]
    StartOutOfRange {
        /// The requested start index.
        start: usize,
        /// The length of the sequence.
        len: usize,
    },

    /// The window runs past either end of the sequence.
    #[error("window of {count} elements from index {start} (reversed: {reversed}) exceeds a sequence of length {len}")]
    WindowOutOfRange {
        /// The resolved start index.
        start: usize,
        /// The requested element count.
        count: usize,
        /// The length of the sequence.
        len: usize,
        /// Whether the window walks backwards from `start`.
        reversed: bool,
    },

    /// The enumerator is not positioned on an element, either because it has not been
    /// advanced yet or because it is exhausted.
    #[error("enumerator is not positioned on an element")]
    NotPositioned,

    /// The builder backing the enumerated snapshot was modified after the enumerator
    /// captured its version.
    #[error("sequence was modified during enumeration (captured version {expected}, found {found})")]
    ConcurrentMutation {
        /// The version captured at construction or the last reset.
        expected: u64,
        /// The builder's version when the mismatch was detected.
        found: u64,
    },
}

impl Error {
    /// Returns `true` for errors caused by an invalid window, as opposed to misuse of a
    /// live enumerator.
    #[must_use]
    pub const fn is_argument_error(&self) -> bool {
        matches!(self, Error::StartOutOfRange { .. } | Error::WindowOutOfRange { .. })
    }
}

/// A `Result` alias defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn argument_errors_are_classified() {
        assert!(Error::StartOutOfRange { start: 4, len: 3 }.is_argument_error());
        assert!(
            Error::WindowOutOfRange {
                start: 2,
                count: 9,
                len: 3,
                reversed: false
            }
            .is_argument_error()
        );
        assert!(!Error::NotPositioned.is_argument_error());
        assert!(!Error::ConcurrentMutation { expected: 1, found: 2 }.is_argument_error());
    }

    #[test]
    fn messages_name_the_offending_values() {
        let message = Error::ConcurrentMutation { expected: 3, found: 5 }.to_string();
        assert!(message.contains("captured version 3"));
        assert!(message.contains("found 5"));

        let message = Error::StartOutOfRange { start: 11, len: 10 }.to_string();
        assert_eq!(message, "window start 11 is out of range for a sequence of length 10");
    }
}
