use crate::error::{Error, Result};

/// Selects the slice of a sequence an [`Enumerator`](crate::Enumerator) walks.
///
/// A window is a start index, an element count and a direction. Both the start and the
/// count have defaults: a forward window starts at the first element, a reversed one at
/// the last, and the count defaults to every element from the start to the end of the
/// sequence in the chosen direction.
///
/// # Examples
///
/// ```
/// use wabi_seq::{ImmutableList, Window};
///
/// let list: ImmutableList<i32> = (1..=10).collect();
///
/// let forward: Vec<_> = list.iter_window(Window::all().starting_at(2).take(4)).unwrap().copied().collect();
/// assert_eq!(forward, [3, 4, 5, 6]);
///
/// let backward: Vec<_> = list.iter_window(Window::all().reversed().starting_at(7).take(4)).unwrap().copied().collect();
/// assert_eq!(backward, [8, 7, 6, 5]);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Window {
    start: Option<usize>,
    count: Option<usize>,
    reversed: bool,
}

/// A window resolved against a concrete length.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) count: usize,
}

impl Window {
    /// The forward window over every element.
    #[must_use]
    pub const fn all() -> Self {
        Window {
            start: None,
            count: None,
            reversed: false,
        }
    }

    /// Starts the window at `start` instead of the default end.
    #[must_use]
    pub const fn starting_at(mut self, start: usize) -> Self {
        self.start = Some(start);
        self
    }

    /// Limits the window to `count` elements.
    #[must_use]
    pub const fn take(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Walks the window from `start` towards the front of the sequence.
    #[must_use]
    pub const fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    /// Returns the explicit start index, if one was given.
    #[must_use]
    pub const fn start(&self) -> Option<usize> {
        self.start
    }

    /// Returns the explicit element count, if one was given.
    #[must_use]
    pub const fn count(&self) -> Option<usize> {
        self.count
    }

    /// Returns `true` if the window walks backwards.
    #[must_use]
    pub const fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Fills in the defaults for a sequence of `len` elements and checks that the window
    /// fits inside it.
    pub(crate) fn resolve(&self, len: usize) -> Result<Span> {
        let start = match self.start {
            Some(start) => start,
            None if self.reversed => len.saturating_sub(1),
            None => 0,
        };
        if start > len {
            return Err(Error::StartOutOfRange { start, len });
        }

        // Elements available from `start` in the chosen direction.
        let available = if self.reversed {
            if start < len { start + 1 } else { 0 }
        } else {
            len - start
        };

        let count = self.count.unwrap_or(available);
        if count > available {
            return Err(Error::WindowOutOfRange {
                start,
                count,
                len,
                reversed: self.reversed,
            });
        }

        Ok(Span { start, count })
    }
}
