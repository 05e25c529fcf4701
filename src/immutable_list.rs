use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Index;

use alloc::vec::Vec;

use crate::enumerator::{Enumerator, Iter};
use crate::error::Result;
use crate::node::Node;
use crate::window::{Span, Window};

mod builder;

pub use builder::{ListBuilder, Snapshot};

/// A persistent, indexable sequence backed by an AVL tree.
///
/// Every "modifying" method returns a new list and leaves the receiver untouched. The two
/// lists share every subtree the edit did not touch, so an edit costs O(log n) time and
/// memory, and cloning a list is O(1).
///
/// Elements are addressed by position. Iteration is driven by an [`Enumerator`], which can
/// walk any window of the list in either direction without allocating.
///
/// For a batch of edits, convert to a [`ListBuilder`] with [`to_builder`] and back with
/// [`ListBuilder::to_immutable`].
///
/// # Examples
///
/// ```
/// use wabi_seq::ImmutableList;
///
/// let empty = ImmutableList::new();
/// let one = empty.push_back("a");
/// let two = one.push_back("c").insert(1, "b");
///
/// assert!(empty.is_empty());
/// assert_eq!(one.len(), 1);
/// assert_eq!(two.iter().copied().collect::<Vec<_>>(), ["a", "b", "c"]);
/// assert_eq!(two[2], "c");
/// ```
///
/// [`to_builder`]: ImmutableList::to_builder
pub struct ImmutableList<T> {
    root: Node<T>,
}

impl<T> ImmutableList<T> {
    /// Makes a new, empty `ImmutableList`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn new() -> ImmutableList<T> {
        ImmutableList { root: Node::Empty }
    }

    pub(crate) const fn from_root(root: Node<T>) -> Self {
        ImmutableList { root }
    }

    /// Returns the number of elements in the list.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Returns `true` if the list contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Returns a reference to the element at `index`, or `None` if it is out of bounds.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_seq::ImmutableList;
    ///
    /// let list = ImmutableList::from([10, 20, 30]);
    /// assert_eq!(list.get(1), Some(&20));
    /// assert_eq!(list.get(3), None);
    /// ```
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.root.get(index)
    }

    /// Returns the first element, if any.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Returns the last element, if any.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|index| self.get(index))
    }

    /// Returns the root of the backing tree.
    #[must_use]
    pub const fn root(&self) -> &Node<T> {
        &self.root
    }

    /// Gets an iterator over the elements of the list, front to back.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_seq::ImmutableList;
    ///
    /// let list = ImmutableList::from([3, 1, 2]);
    /// let mut iter = list.iter();
    /// assert_eq!(iter.next(), Some(&3));
    /// assert_eq!(iter.len(), 2);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.root, Window::all(), Span { start: 0, count: self.len() })
    }

    /// Gets an iterator over `window` of the list.
    ///
    /// # Errors
    ///
    /// Returns an argument error if the window does not fit inside the list.
    ///
    /// # Complexity
    ///
    /// O(log n) to start, amortized O(1) per element.
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_seq::{ImmutableList, Window};
    ///
    /// let list: ImmutableList<_> = (0..100).collect();
    /// let tail: Vec<_> = list.iter_window(Window::all().reversed().take(3)).unwrap().collect();
    /// assert_eq!(tail, [&99, &98, &97]);
    /// assert!(list.iter_window(Window::all().starting_at(99).take(2)).is_err());
    /// ```
    pub fn iter_window(&self, window: Window) -> Result<Iter<'_, T>> {
        let span = window.resolve(self.len())?;
        Ok(Iter::new(&self.root, window, span))
    }

    /// Creates an unfenced [`Enumerator`] over `window` of the list.
    ///
    /// # Errors
    ///
    /// Returns an argument error if the window does not fit inside the list.
    pub fn enumerator(&self, window: Window) -> Result<Enumerator<'_, T>> {
        Enumerator::new(&self.root, None, window)
    }

    /// Creates a [`ListBuilder`] holding the same elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn to_builder(&self) -> ListBuilder<T> {
        ListBuilder::from(self.clone())
    }
}

impl<T: Clone> ImmutableList<T> {
    /// Returns a new list with `value` appended.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn push_back(&self, value: T) -> Self {
        self.insert(self.len(), value)
    }

    /// Returns a new list with `value` inserted at `index`, shifting later elements back.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn insert(&self, index: usize, value: T) -> Self {
        assert!(index <= self.len(), "insertion index (is {index}) should be <= len (is {})", self.len());
        ImmutableList::from_root(self.root.insert_at(index, value))
    }

    /// Returns a new list without the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_seq::ImmutableList;
    ///
    /// let list = ImmutableList::from([1, 2, 3]);
    /// let shorter = list.remove(0);
    /// assert_eq!(shorter, ImmutableList::from([2, 3]));
    /// assert_eq!(list.len(), 3);
    /// ```
    #[must_use]
    pub fn remove(&self, index: usize) -> Self {
        assert!(index < self.len(), "removal index (is {index}) should be < len (is {})", self.len());
        ImmutableList::from_root(self.root.remove_at(index))
    }

    /// Returns a new list with the element at `index` replaced by `value`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn set(&self, index: usize, value: T) -> Self {
        assert!(index < self.len(), "index out of bounds: the len is {} but the index is {index}", self.len());
        ImmutableList::from_root(self.root.replace_at(index, value))
    }

    /// Returns a new list holding `count` elements starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns an argument error if the range does not fit inside the list.
    ///
    /// # Complexity
    ///
    /// O(log n + count)
    ///
    /// # Examples
    ///
    /// ```
    /// use wabi_seq::ImmutableList;
    ///
    /// let list: ImmutableList<_> = (0..10).collect();
    /// assert_eq!(list.get_range(4, 3).unwrap(), ImmutableList::from([4, 5, 6]));
    /// assert!(list.get_range(8, 3).is_err());
    /// ```
    pub fn get_range(&self, start: usize, count: usize) -> Result<Self> {
        let mut items = self.iter_window(Window::all().starting_at(start).take(count))?.cloned();
        Ok(ImmutableList::from_root(Node::from_exact_iter(&mut items, count)))
    }
}

impl<T> Clone for ImmutableList<T> {
    fn clone(&self) -> Self {
        ImmutableList {
            root: self.root.clone(),
        }
    }
}

impl<T> Default for ImmutableList<T> {
    fn default() -> Self {
        ImmutableList::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ImmutableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for ImmutableList<T> {
    fn eq(&self, other: &ImmutableList<T>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for ImmutableList<T> {}

impl<T: Hash> Hash for ImmutableList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for element in self {
            element.hash(state);
        }
    }
}

impl<T> Index<usize> for ImmutableList<T> {
    type Output = T;

    /// Returns a reference to the element at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn index(&self, index: usize) -> &Self::Output {
        self.get(index).expect("index out of bounds")
    }
}

impl<T> FromIterator<T> for ImmutableList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let items: Vec<T> = iter.into_iter().collect();
        let len = items.len();
        ImmutableList::from_root(Node::from_exact_iter(&mut items.into_iter(), len))
    }
}

impl<T> From<Vec<T>> for ImmutableList<T> {
    fn from(items: Vec<T>) -> Self {
        let len = items.len();
        ImmutableList::from_root(Node::from_exact_iter(&mut items.into_iter(), len))
    }
}

impl<T, const N: usize> From<[T; N]> for ImmutableList<T> {
    /// Converts a `[T; N]` into an `ImmutableList<T>`.
    ///
    /// ```
    /// use wabi_seq::ImmutableList;
    ///
    /// let list1 = ImmutableList::from([1, 2, 3, 4]);
    /// let list2: ImmutableList<_> = [1, 2, 3, 4].into();
    /// assert_eq!(list1, list2);
    /// ```
    fn from(items: [T; N]) -> Self {
        ImmutableList::from_root(Node::from_exact_iter(&mut items.into_iter(), N))
    }
}

impl<'a, T> IntoIterator for &'a ImmutableList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::node::tests::assert_invariants;
    use static_assertions::assert_impl_all;

    assert_impl_all!(ImmutableList<u32>: Send, Sync, Clone);

    #[test]
    #[should_panic(expected = "insertion index (is 4) should be <= len (is 3)")]
    fn insert_past_end() {
        let _ = ImmutableList::from([1, 2, 3]).insert(4, 0);
    }

    #[test]
    #[should_panic(expected = "removal index (is 3) should be < len (is 3)")]
    fn remove_past_end() {
        let _ = ImmutableList::from([1, 2, 3]).remove(3);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn index_past_end() {
        let list = ImmutableList::from([1, 2, 3]);
        let _value = list[3];
    }

    #[test]
    fn collected_lists_are_balanced() {
        let list: ImmutableList<u32> = (0..5_000).collect();
        assert_invariants(list.root());
        assert_eq!(list.first(), Some(&0));
        assert_eq!(list.last(), Some(&4_999));
    }

    #[test]
    fn clones_share_the_root() {
        let list: ImmutableList<u32> = (0..10).collect();
        let copy = list.clone();
        match (list.root(), copy.root()) {
            (Node::Branch(a), Node::Branch(b)) => assert!(alloc::sync::Arc::ptr_eq(a, b)),
            _ => panic!("expected branch roots"),
        }
    }

    #[test]
    fn empty_list() {
        let list: ImmutableList<u32> = ImmutableList::default();
        assert!(list.is_empty());
        assert_eq!(list.first(), None);
        assert_eq!(list.last(), None);
        assert_eq!(list.iter().next(), None);
        assert_eq!(list.get_range(0, 0).unwrap(), list);
    }
}
