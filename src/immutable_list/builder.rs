use core::fmt;
use core::ops::Index;

use tracing::trace;

use super::ImmutableList;
use crate::enumerator::{Enumerator, Iter};
use crate::error::{Error, Result};
use crate::node::Node;
use crate::version::VersionFence;
use crate::window::{Span, Window};

/// A single-owner, mutable companion to [`ImmutableList`].
///
/// A builder holds the current root of a tree and edits it in place, one path copy at a
/// time. Converting to and from [`ImmutableList`] is O(1) in both directions because the
/// two share nodes.
///
/// Every mutating call bumps the builder's [`VersionFence`] exactly once. Enumerators
/// created from a [`Snapshot`] compare against that fence and fail with
/// [`Error::ConcurrentMutation`] once the builder has moved on.
///
/// # Examples
///
/// ```
/// use wabi_seq::{Error, ListBuilder, Window};
///
/// let mut builder: ListBuilder<i32> = (1..=5).collect();
/// let snapshot = builder.snapshot();
/// let mut cursor = snapshot.enumerator(Window::all()).unwrap();
/// assert!(cursor.advance().unwrap());
///
/// builder.push(6);
/// assert!(matches!(cursor.advance(), Err(Error::ConcurrentMutation { .. })));
///
/// // The snapshot itself is unaffected.
/// assert_eq!(snapshot.list().len(), 5);
/// assert_eq!(builder.len(), 6);
/// ```
pub struct ListBuilder<T> {
    root: Node<T>,
    fence: VersionFence,
}

/// A frozen copy of a builder's contents, paired with the builder's live version fence.
///
/// Created by [`ListBuilder::snapshot`].
pub struct Snapshot<T> {
    list: ImmutableList<T>,
    fence: VersionFence,
    version: u64,
}

impl<T> ListBuilder<T> {
    /// Makes a new, empty `ListBuilder` at version 0.
    #[must_use]
    pub fn new() -> ListBuilder<T> {
        ListBuilder {
            root: Node::Empty,
            fence: VersionFence::new(),
        }
    }

    /// Returns the number of elements in the builder.
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Returns `true` if the builder contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Returns a reference to the element at `index`, or `None` if it is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.root.get(index)
    }

    /// Returns the number of mutations applied to this builder so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.fence.version()
    }

    /// Returns the builder's version fence.
    #[must_use]
    pub const fn fence(&self) -> &VersionFence {
        &self.fence
    }

    /// Gets an iterator over the current elements.
    pub fn iter(&self) -> Iter<'_, T> {
        let count = self.len();
        Iter::new(&self.root, Window::all(), Span { start: 0, count })
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.commit(Node::Empty, "clear");
    }

    /// Returns an [`ImmutableList`] holding the current elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn to_immutable(&self) -> ImmutableList<T> {
        ImmutableList::from_root(self.root.clone())
    }

    /// Freezes the current elements together with this builder's fence.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<T> {
        Snapshot {
            list: self.to_immutable(),
            fence: self.fence.clone(),
            version: self.fence.version(),
        }
    }

    fn commit(&mut self, root: Node<T>, operation: &'static str) {
        self.root = root;
        let version = self.fence.bump();
        trace!(operation, version, len = self.root.count(), "list builder mutated");
    }
}

impl<T: Clone> ListBuilder<T> {
    /// Appends `value` to the end.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn push(&mut self, value: T) {
        let root = self.root.insert_at(self.len(), value);
        self.commit(root, "push");
    }

    /// Inserts `value` at `index`, shifting later elements back.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) {
        assert!(index <= self.len(), "insertion index (is {index}) should be <= len (is {})", self.len());
        let root = self.root.insert_at(index, value);
        self.commit(root, "insert");
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(index < self.len(), "removal index (is {index}) should be < len (is {})", self.len());
        let removed = self.root.get_at(index).value().clone();
        let root = self.root.remove_at(index);
        self.commit(root, "remove");
        removed
    }

    /// Replaces the element at `index` with `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn set(&mut self, index: usize, value: T) {
        assert!(index < self.len(), "index out of bounds: the len is {} but the index is {index}", self.len());
        let root = self.root.replace_at(index, value);
        self.commit(root, "set");
    }
}

impl<T> Snapshot<T> {
    /// Returns the frozen list.
    #[must_use]
    pub const fn list(&self) -> &ImmutableList<T> {
        &self.list
    }

    /// Returns the builder version the snapshot was taken at.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns `true` while the builder has not been modified since the snapshot.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.fence.version() == self.version
    }

    /// Creates an [`Enumerator`] over `window` of the frozen list, fenced against further
    /// changes to the builder.
    ///
    /// # Errors
    ///
    /// Returns an argument error if the window does not fit inside the list, and
    /// [`Error::ConcurrentMutation`] if the builder already changed since the snapshot.
    pub fn enumerator(&self, window: Window) -> Result<Enumerator<'_, T>> {
        let found = self.fence.version();
        if found != self.version {
            return Err(Error::ConcurrentMutation {
                expected: self.version,
                found,
            });
        }
        Enumerator::new(self.list.root(), Some(&self.fence), window)
    }
}

impl<T> Default for ListBuilder<T> {
    fn default() -> Self {
        ListBuilder::new()
    }
}

impl<T> From<ImmutableList<T>> for ListBuilder<T> {
    fn from(list: ImmutableList<T>) -> Self {
        ListBuilder {
            root: list.root,
            fence: VersionFence::new(),
        }
    }
}

impl<T> FromIterator<T> for ListBuilder<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        ListBuilder::from(iter.into_iter().collect::<ImmutableList<T>>())
    }
}

impl<T: Clone> Extend<T> for ListBuilder<T> {
    /// Appends every item, bumping the version once for the whole batch.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let mut root = self.root.clone();
        for value in iter {
            root = root.insert_at(root.count(), value);
        }
        self.commit(root, "extend");
    }
}

impl<T> Index<usize> for ListBuilder<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.get(index).expect("index out of bounds")
    }
}

impl<T: fmt::Debug> fmt::Debug for ListBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("list", &self.list)
            .field("version", &self.version)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn every_mutation_bumps_the_version_once() {
        let mut builder = ListBuilder::new();
        assert_eq!(builder.version(), 0);

        builder.push(1);
        builder.insert(0, 0);
        builder.set(1, 10);
        assert_eq!(builder.version(), 3);

        assert_eq!(builder.remove(0), 0);
        builder.extend([20, 30, 40]);
        assert_eq!(builder.version(), 5);

        builder.clear();
        assert_eq!(builder.version(), 6);
        assert!(builder.is_empty());
    }

    #[test]
    fn to_immutable_is_detached_from_later_edits() {
        let mut builder: ListBuilder<u32> = (0..10).collect();
        let before = builder.to_immutable();
        builder.set(0, 100);
        builder.push(10);

        assert_eq!(before.iter().copied().collect::<Vec<_>>(), (0..10).collect::<Vec<_>>());
        assert_eq!(builder[0], 100);
        assert_eq!(builder.len(), 11);
    }

    #[test]
    fn stale_snapshot_refuses_new_enumerators() {
        let mut builder: ListBuilder<u32> = (0..3).collect();
        let snapshot = builder.snapshot();
        assert!(snapshot.is_current());

        builder.push(3);
        assert!(!snapshot.is_current());
        assert_eq!(
            snapshot.enumerator(Window::all()).unwrap_err(),
            Error::ConcurrentMutation { expected: 0, found: 1 }
        );
    }

    #[test]
    fn round_trip_through_immutable_list() {
        let list = ImmutableList::from([1, 2, 3]);
        let mut builder = list.to_builder();
        builder.push(4);
        assert_eq!(builder.to_immutable(), ImmutableList::from([1, 2, 3, 4]));
        assert_eq!(list.len(), 3);
    }
}
