//! Windowed, bidirectional enumeration over a [`Node`] snapshot.
//!
//! The [`Enumerator`] combines two ways of walking a tree:
//!
//! - an explicit stack of ancestors, used while the current subtree is taller than
//!   [`INDEXED_HEIGHT`], and
//! - direct positional access ([`Node::get_at`]) once the subtree is short enough that a
//!   lookup costs only a handful of steps.
//!
//! Only branches taller than [`INDEXED_HEIGHT`] are pushed, and they always lie on one
//! root-to-leaf path, so the stack holds at most `height - INDEXED_HEIGHT` entries and
//! fits in [`STACK_CAPACITY`](crate::STACK_CAPACITY) inline slots. Enumeration therefore
//! never allocates, starts in O(log n) regardless of where the window begins, and
//! produces each element in amortized O(1).

use core::fmt;
use core::iter::FusedIterator;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::node::{Branch, Node};
use crate::raw::NodeStack;
use crate::version::VersionFence;
use crate::window::{Span, Window};

/// Subtrees at most this tall are enumerated by position instead of through the stack.
pub const INDEXED_HEIGHT: u8 = 4;

/// The subtree preceding `node` in traversal order.
#[inline]
fn near<T>(node: &Node<T>, reversed: bool) -> &Node<T> {
    if reversed { node.right() } else { node.left() }
}

/// The subtree following `node` in traversal order.
#[inline]
fn far<T>(node: &Node<T>, reversed: bool) -> &Node<T> {
    if reversed { node.left() } else { node.right() }
}

/// A cursor over a window of an immutable tree.
///
/// An enumerator starts out *fresh*: [`current`](Self::current) fails until
/// [`advance`](Self::advance) has returned `true`. Once `advance` returns `false` the
/// enumerator is *exhausted* and stays that way until [`reset`](Self::reset).
///
/// When created with a [`VersionFence`], every `advance` and `current` first compares the
/// fence against the version captured at construction (or the last reset) and fails with
/// [`Error::ConcurrentMutation`] if the backing builder has changed since.
///
/// Dropping an enumerator releases nothing: the tree is immutable and merely borrowed.
///
/// # Examples
///
/// ```
/// use wabi_seq::{ImmutableList, Window};
///
/// let list: ImmutableList<i32> = (1..=10).collect();
/// let mut cursor = list.enumerator(Window::all().starting_at(2).take(4)).unwrap();
///
/// let mut seen = Vec::new();
/// while cursor.advance().unwrap() {
///     seen.push(*cursor.current().unwrap());
/// }
/// assert_eq!(seen, [3, 4, 5, 6]);
/// assert!(cursor.current().is_err());
/// ```
#[must_use = "enumerators are lazy and do nothing unless advanced"]
pub struct Enumerator<'a, T> {
    root: &'a Node<T>,
    fence: Option<&'a VersionFence>,
    fenced_version: u64,
    window: Window,
    span: Span,
    remaining: usize,
    stack: NodeStack<'a, T>,
    index_node: &'a Node<T>,
    index_offset: usize,
    current: Option<&'a Branch<T>>,
}

impl<'a, T> Enumerator<'a, T> {
    /// Creates an enumerator over `window` of the tree rooted at `root`.
    ///
    /// If `fence` is given, the enumerator fails fast once the fence's version moves past
    /// the one observed here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StartOutOfRange`] or [`Error::WindowOutOfRange`] if the window does
    /// not fit inside the tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn new(root: &'a Node<T>, fence: Option<&'a VersionFence>, window: Window) -> Result<Self> {
        let span = window.resolve(root.count())?;
        Ok(Self::with_span(root, fence, window, span))
    }

    /// Creates an enumerator from an already validated span.
    pub(crate) fn with_span(root: &'a Node<T>, fence: Option<&'a VersionFence>, window: Window, span: Span) -> Self {
        let mut enumerator = Enumerator {
            root,
            fence,
            fenced_version: 0,
            window,
            span,
            remaining: 0,
            stack: NodeStack::new(),
            index_node: root,
            index_offset: 0,
            current: None,
        };
        enumerator.reset();
        enumerator
    }

    /// Returns the element the enumerator is positioned on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConcurrentMutation`] if the fenced builder changed, and
    /// [`Error::NotPositioned`] before the first successful [`advance`](Self::advance) or
    /// after exhaustion.
    pub fn current(&self) -> Result<&'a T> {
        self.check_fence()?;
        self.current.map(Branch::value).ok_or(Error::NotPositioned)
    }

    /// Moves to the next element of the window.
    ///
    /// Returns `Ok(false)` once the window is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConcurrentMutation`] if the fenced builder changed.
    ///
    /// # Complexity
    ///
    /// Amortized O(1), worst case O(log n).
    pub fn advance(&mut self) -> Result<bool> {
        self.check_fence()?;
        Ok(self.step().is_some())
    }

    /// Rewinds to the start of the window and recaptures the fence version.
    ///
    /// After a reset the enumerator walks the same root it was created with, even if the
    /// builder has moved on.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn reset(&mut self) {
        if let Some(fence) = self.fence {
            self.fenced_version = fence.version();
        }
        self.current = None;
        self.remaining = self.span.count;
        self.seek_start();

        trace!(
            start = self.span.start,
            count = self.span.count,
            reversed = self.window.is_reversed(),
            len = self.root.count(),
            depth = self.stack.len(),
            "enumerator positioned"
        );
    }

    /// Returns the number of elements left in the window.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Returns the window this enumerator walks.
    #[must_use]
    pub const fn window(&self) -> Window {
        self.window
    }

    fn check_fence(&self) -> Result<()> {
        match self.fence {
            Some(fence) => {
                let found = fence.version();
                if found == self.fenced_version {
                    Ok(())
                } else {
                    debug!(expected = self.fenced_version, found, "enumerated sequence was modified");
                    Err(Error::ConcurrentMutation {
                        expected: self.fenced_version,
                        found,
                    })
                }
            }
            None => Ok(()),
        }
    }

    /// Descends from the root to the first element of the window without visiting any of
    /// the skipped elements.
    fn seek_start(&mut self) {
        let reversed = self.window.is_reversed();
        self.stack.clear();

        // An exhausted cursor on the root: nothing to produce until something is pushed.
        self.index_node = self.root;
        self.index_offset = self.root.count();
        if self.span.count == 0 {
            return;
        }

        let mut node = self.root;
        let mut skip = if reversed {
            self.root.count() - 1 - self.span.start
        } else {
            self.span.start
        };

        while let Node::Branch(branch) = node {
            if branch.height() <= INDEXED_HEIGHT {
                break;
            }

            let near_node = near(node, reversed);
            let near_count = near_node.count();
            if skip < near_count {
                // Revisit this branch once its near side is consumed.
                self.stack.push(branch);
                node = near_node;
            } else if skip == near_count {
                // The window opens at this branch. Leave an exhausted cursor behind so
                // the first step pops it.
                self.stack.push(branch);
                self.index_node = near_node;
                self.index_offset = near_count;
                return;
            } else {
                skip -= near_count + 1;
                node = far(node, reversed);
            }
        }

        self.index_node = node;
        self.index_offset = skip;
    }

    /// Produces the next branch of the window, or `None` once it is exhausted.
    pub(crate) fn step(&mut self) -> Option<&'a Branch<T>> {
        if self.remaining == 0 {
            self.current = None;
            return None;
        }

        let reversed = self.window.is_reversed();
        let branch = if self.index_offset >= self.index_node.count() {
            let Some(popped) = self.stack.pop() else {
                self.current = None;
                self.remaining = 0;
                return None;
            };

            // Queue up the near spine of the popped branch's far subtree.
            let mut next = if reversed { popped.left() } else { popped.right() };
            while let Node::Branch(branch) = next {
                if branch.height() <= INDEXED_HEIGHT {
                    break;
                }
                self.stack.push(branch);
                next = near(next, reversed);
            }
            self.index_node = next;
            self.index_offset = 0;
            popped
        } else {
            let position = if reversed {
                self.index_node.count() - self.index_offset - 1
            } else {
                self.index_offset
            };
            self.index_offset += 1;
            self.index_node.get_at(position)
        };

        self.remaining -= 1;
        self.current = Some(branch);
        Some(branch)
    }

    #[cfg(test)]
    pub(crate) fn stack_depth(&self) -> usize {
        self.stack.len()
    }
}

impl<T> Clone for Enumerator<'_, T> {
    fn clone(&self) -> Self {
        Enumerator {
            root: self.root,
            fence: self.fence,
            fenced_version: self.fenced_version,
            window: self.window,
            span: self.span,
            remaining: self.remaining,
            stack: self.stack.clone(),
            index_node: self.index_node,
            index_offset: self.index_offset,
            current: self.current,
        }
    }
}

impl<T> fmt::Debug for Enumerator<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enumerator")
            .field("start", &self.span.start)
            .field("count", &self.span.count)
            .field("reversed", &self.window.is_reversed())
            .field("remaining", &self.remaining)
            .field("fenced", &self.fence.is_some())
            .finish()
    }
}

/// An iterator over a window of an [`ImmutableList`](crate::ImmutableList).
///
/// This `struct` is created by the [`iter`] and [`iter_window`] methods on
/// [`ImmutableList`](crate::ImmutableList). It walks an unfenced [`Enumerator`], so it never
/// fails.
///
/// [`iter`]: crate::ImmutableList::iter
/// [`iter_window`]: crate::ImmutableList::iter_window
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    inner: Enumerator<'a, T>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(root: &'a Node<T>, window: Window, span: Span) -> Self {
        Iter {
            inner: Enumerator::with_span(root, None, window, span),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.step().map(Branch::value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.inner.remaining, Some(self.inner.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.inner.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::node::tests::assert_invariants;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn collect<T: Copy>(enumerator: &mut Enumerator<'_, T>) -> Vec<T> {
        let mut items = Vec::new();
        while enumerator.advance().unwrap() {
            items.push(*enumerator.current().unwrap());
        }
        items
    }

    fn balanced(len: usize) -> Node<usize> {
        Node::from_exact_iter(&mut (0..len), len)
    }

    #[test]
    fn windows_over_one_to_ten() {
        let root = Node::from_exact_iter(&mut (1..=10), 10);

        let mut forward = Enumerator::new(&root, None, Window::all().starting_at(2).take(4)).unwrap();
        assert_eq!(collect(&mut forward), [3, 4, 5, 6]);

        let mut backward = Enumerator::new(&root, None, Window::all().reversed().starting_at(7).take(4)).unwrap();
        assert_eq!(collect(&mut backward), [8, 7, 6, 5]);
    }

    #[test]
    fn window_opening_at_a_stacked_branch() {
        // The root of a 1023-element perfect tree is element 511 and is taller than
        // `INDEXED_HEIGHT`, so the descent stops on it.
        let root = balanced(1023);
        assert!(root.height() > INDEXED_HEIGHT);

        let mut forward = Enumerator::new(&root, None, Window::all().starting_at(511).take(3)).unwrap();
        assert_eq!(forward.stack_depth(), 1);
        assert_eq!(collect(&mut forward), [511, 512, 513]);

        let mut backward = Enumerator::new(&root, None, Window::all().reversed().starting_at(511).take(3)).unwrap();
        assert_eq!(collect(&mut backward), [511, 510, 509]);
    }

    #[test]
    fn short_trees_never_use_the_stack() {
        let root = balanced(15);
        assert!(root.height() <= INDEXED_HEIGHT);

        let mut enumerator = Enumerator::new(&root, None, Window::all()).unwrap();
        assert_eq!(enumerator.stack_depth(), 0);
        assert_eq!(collect(&mut enumerator), (0..15).collect::<Vec<_>>());
        assert_eq!(enumerator.stack_depth(), 0);
    }

    #[test]
    fn exhausted_enumerator_stays_exhausted() {
        let root = balanced(100);
        let mut enumerator = Enumerator::new(&root, None, Window::all().starting_at(98)).unwrap();
        assert!(enumerator.advance().unwrap());
        assert!(enumerator.advance().unwrap());
        assert!(!enumerator.advance().unwrap());
        assert!(!enumerator.advance().unwrap());
        assert_eq!(enumerator.current(), Err(Error::NotPositioned));
        assert_eq!(enumerator.remaining(), 0);
    }

    #[test]
    fn clone_continues_independently() {
        let root = balanced(200);
        let mut enumerator = Enumerator::new(&root, None, Window::all().starting_at(50)).unwrap();
        assert!(enumerator.advance().unwrap());

        let mut copy = enumerator.clone();
        assert_eq!(collect(&mut copy), (51..200).collect::<Vec<_>>());
        assert_eq!(enumerator.current(), Ok(&50));
        assert_eq!(collect(&mut enumerator), (51..200).collect::<Vec<_>>());
    }

    #[test]
    fn fence_is_checked_before_exhaustion() {
        let fence = VersionFence::new();
        let root = balanced(3);
        let mut enumerator = Enumerator::new(&root, Some(&fence), Window::all().take(0)).unwrap();
        assert!(!enumerator.advance().unwrap());

        fence.bump();
        assert_eq!(enumerator.advance(), Err(Error::ConcurrentMutation { expected: 0, found: 1 }));

        enumerator.reset();
        assert!(!enumerator.advance().unwrap());
    }

    proptest! {
        #[test]
        fn every_window_matches_get_at(len in 0usize..600, a in any::<usize>(), b in any::<usize>(), reversed in any::<bool>()) {
            let root = balanced(len);
            let start = a % (len + 1);
            let (window, expected): (Window, Vec<usize>) = if reversed {
                let start = start.min(len.saturating_sub(1));
                let count = if len == 0 { 0 } else { b % (start + 2) };
                (
                    Window::all().reversed().starting_at(start).take(count),
                    (0..count).map(|i| *root.get_at(start - i).value()).collect(),
                )
            } else {
                let count = b % (len - start + 1);
                (
                    Window::all().starting_at(start).take(count),
                    (start..start + count).map(|i| *root.get_at(i).value()).collect(),
                )
            };

            let mut enumerator = Enumerator::new(&root, None, window).unwrap();
            prop_assert_eq!(collect(&mut enumerator), expected.clone());

            enumerator.reset();
            prop_assert_eq!(collect(&mut enumerator), expected);
        }

        #[test]
        fn stack_depth_is_bounded_by_height(
            values in prop::collection::vec((any::<usize>(), any::<u32>()), 1..2_000),
            a in any::<usize>(),
            reversed in any::<bool>(),
        ) {
            let mut root = Node::Empty;
            for (which, value) in values {
                root = root.insert_at(which % (root.count() + 1), value);
            }
            assert_invariants(&root);

            let bound = usize::from(root.height().saturating_sub(INDEXED_HEIGHT));
            let window = if reversed { Window::all().reversed() } else { Window::all() };
            let mut enumerator = Enumerator::new(&root, None, window.starting_at(a % root.count())).unwrap();

            prop_assert!(enumerator.stack_depth() <= bound);
            while enumerator.advance().unwrap() {
                prop_assert!(enumerator.stack_depth() <= bound);
            }
        }
    }
}
