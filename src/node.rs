//! The persistent AVL node backing [`ImmutableList`](crate::ImmutableList).
//!
//! A [`Node`] is either empty or a shared, immutable [`Branch`]. Every branch caches the
//! height and element count of its subtree, which makes positional lookup
//! ([`Node::get_at`]) O(log n) and lets enumerators skip whole subtrees without visiting
//! them.
//!
//! Nodes are never mutated after creation. Edits copy the path from the root to the
//! edited position and share every other subtree with the original tree.

use alloc::sync::Arc;
use core::cmp::Ordering;
use core::fmt;

/// A possibly empty AVL subtree.
///
/// Invariants upheld by every constructor in this crate:
///
/// - an empty node has count 0 and height 0;
/// - a branch has `count = left.count + right.count + 1` and
///   `height = 1 + max(left.height, right.height)`;
/// - the heights of a branch's children differ by at most one.
pub enum Node<T> {
    /// The empty subtree.
    Empty,
    /// A non-empty subtree.
    Branch(Arc<Branch<T>>),
}

/// A non-empty subtree: a value plus its two children.
pub struct Branch<T> {
    value: T,
    left: Node<T>,
    right: Node<T>,
    height: u8,
    count: usize,
}

impl<T> Branch<T> {
    /// Returns the value stored at this branch.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> &T {
        &self.value
    }

    /// Returns the subtree holding the elements before this one.
    #[inline]
    #[must_use]
    pub const fn left(&self) -> &Node<T> {
        &self.left
    }

    /// Returns the subtree holding the elements after this one.
    #[inline]
    #[must_use]
    pub const fn right(&self) -> &Node<T> {
        &self.right
    }

    /// Returns the height of this subtree. A single element has height 1.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u8 {
        self.height
    }

    /// Returns the number of elements in this subtree.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }
}

impl<T> Node<T> {
    /// Returns `true` if this subtree holds no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    /// Returns the number of elements in this subtree.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Node::Empty => 0,
            Node::Branch(branch) => branch.count,
        }
    }

    /// Returns the height of this subtree, 0 when empty.
    #[inline]
    #[must_use]
    pub fn height(&self) -> u8 {
        match self {
            Node::Empty => 0,
            Node::Branch(branch) => branch.height,
        }
    }

    /// Returns the value at the root of this subtree.
    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.as_branch().map(Branch::value)
    }

    /// Returns the left child. The children of an empty node are empty.
    #[inline]
    #[must_use]
    pub fn left(&self) -> &Node<T> {
        match self {
            Node::Empty => self,
            Node::Branch(branch) => &branch.left,
        }
    }

    /// Returns the right child. The children of an empty node are empty.
    #[inline]
    #[must_use]
    pub fn right(&self) -> &Node<T> {
        match self {
            Node::Empty => self,
            Node::Branch(branch) => &branch.right,
        }
    }

    /// Returns the branch at the root of this subtree, if any.
    #[inline]
    #[must_use]
    pub fn as_branch(&self) -> Option<&Branch<T>> {
        match self {
            Node::Empty => None,
            Node::Branch(branch) => Some(branch),
        }
    }

    /// Returns the branch at zero-based in-order position `index` within this subtree.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.count()`.
    ///
    /// # Complexity
    ///
    /// O(height)
    #[must_use]
    pub fn get_at(&self, index: usize) -> &Branch<T> {
        assert!(index < self.count(), "`Node::get_at()` - `index` >= `count`!");

        let mut node = self;
        let mut index = index;
        loop {
            let branch = node.expect_branch();
            let left_count = branch.left.count();
            match index.cmp(&left_count) {
                Ordering::Equal => return branch,
                Ordering::Less => node = &branch.left,
                Ordering::Greater => {
                    index -= left_count + 1;
                    node = &branch.right;
                }
            }
        }
    }

    /// Returns the value at zero-based in-order position `index`, or `None` if `index` is
    /// out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        (index < self.count()).then(|| self.get_at(index).value())
    }

    /// Creates a subtree holding a single element.
    pub(crate) fn leaf(value: T) -> Self {
        Node::branch(Node::Empty, value, Node::Empty)
    }

    /// Creates a branch over two subtrees, computing its height and count.
    ///
    /// The caller is responsible for the balance invariant.
    pub(crate) fn branch(left: Node<T>, value: T, right: Node<T>) -> Self {
        debug_assert!(left.height().abs_diff(right.height()) <= 1, "`Node::branch()` - unbalanced children!");
        let height = 1 + left.height().max(right.height());
        let count = left.count() + right.count() + 1;
        Node::Branch(Arc::new(Branch {
            value,
            left,
            right,
            height,
            count,
        }))
    }

    /// Builds a perfectly balanced subtree from the next `len` items of `items`, in order.
    ///
    /// # Panics
    ///
    /// Panics if `items` yields fewer than `len` items.
    pub(crate) fn from_exact_iter<I>(items: &mut I, len: usize) -> Self
    where
        I: Iterator<Item = T>,
    {
        if len == 0 {
            return Node::Empty;
        }

        let left_len = (len - 1) / 2;
        let left = Node::from_exact_iter(items, left_len);
        let Some(value) = items.next() else {
            panic!("`Node::from_exact_iter()` - iterator ended early!");
        };
        let right = Node::from_exact_iter(items, len - 1 - left_len);
        Node::branch(left, value, right)
    }

    fn expect_branch(&self) -> &Branch<T> {
        match self {
            Node::Branch(branch) => branch,
            Node::Empty => panic!("expected branch node"),
        }
    }
}

impl<T: Clone> Node<T> {
    /// Creates a branch over two subtrees whose heights differ by at most two, rotating
    /// once or twice to restore balance.
    pub(crate) fn balanced(left: Node<T>, value: T, right: Node<T>) -> Self {
        let (left_height, right_height) = (left.height(), right.height());

        if left_height > right_height + 1 {
            let l = left.expect_branch();
            if l.left.height() >= l.right.height() {
                // Single right rotation.
                Node::branch(l.left.clone(), l.value.clone(), Node::branch(l.right.clone(), value, right))
            } else {
                // Left-right double rotation.
                let lr = l.right.expect_branch();
                Node::branch(
                    Node::branch(l.left.clone(), l.value.clone(), lr.left.clone()),
                    lr.value.clone(),
                    Node::branch(lr.right.clone(), value, right),
                )
            }
        } else if right_height > left_height + 1 {
            let r = right.expect_branch();
            if r.right.height() >= r.left.height() {
                // Single left rotation.
                Node::branch(Node::branch(left, value, r.left.clone()), r.value.clone(), r.right.clone())
            } else {
                // Right-left double rotation.
                let rl = r.left.expect_branch();
                Node::branch(
                    Node::branch(left, value, rl.left.clone()),
                    rl.value.clone(),
                    Node::branch(rl.right.clone(), r.value.clone(), r.right.clone()),
                )
            }
        } else {
            Node::branch(left, value, right)
        }
    }

    /// Returns a new subtree with `value` inserted at position `index`.
    ///
    /// `index` must be at most `self.count()`.
    pub(crate) fn insert_at(&self, index: usize, value: T) -> Self {
        match self {
            Node::Empty => {
                debug_assert_eq!(index, 0, "`Node::insert_at()` - `index` > `count`!");
                Node::leaf(value)
            }
            Node::Branch(branch) => {
                let left_count = branch.left.count();
                if index <= left_count {
                    Node::balanced(branch.left.insert_at(index, value), branch.value.clone(), branch.right.clone())
                } else {
                    Node::balanced(
                        branch.left.clone(),
                        branch.value.clone(),
                        branch.right.insert_at(index - left_count - 1, value),
                    )
                }
            }
        }
    }

    /// Returns a new subtree without the element at position `index`.
    ///
    /// `index` must be less than `self.count()`.
    pub(crate) fn remove_at(&self, index: usize) -> Self {
        let branch = self.expect_branch();
        let left_count = branch.left.count();

        match index.cmp(&left_count) {
            Ordering::Less => {
                Node::balanced(branch.left.remove_at(index), branch.value.clone(), branch.right.clone())
            }
            Ordering::Greater => Node::balanced(
                branch.left.clone(),
                branch.value.clone(),
                branch.right.remove_at(index - left_count - 1),
            ),
            Ordering::Equal => match (&branch.left, &branch.right) {
                (Node::Empty, right) => right.clone(),
                (left, Node::Empty) => left.clone(),
                (left, right) => {
                    // Replace with the in-order successor.
                    let successor = right.get_at(0).value.clone();
                    Node::balanced(left.clone(), successor, right.remove_at(0))
                }
            },
        }
    }

    /// Returns a new subtree with the element at position `index` replaced by `value`.
    ///
    /// `index` must be less than `self.count()`.
    pub(crate) fn replace_at(&self, index: usize, value: T) -> Self {
        let branch = self.expect_branch();
        let left_count = branch.left.count();

        match index.cmp(&left_count) {
            Ordering::Equal => Node::branch(branch.left.clone(), value, branch.right.clone()),
            Ordering::Less => Node::branch(branch.left.replace_at(index, value), branch.value.clone(), branch.right.clone()),
            Ordering::Greater => Node::branch(
                branch.left.clone(),
                branch.value.clone(),
                branch.right.replace_at(index - left_count - 1, value),
            ),
        }
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Node::Empty => Node::Empty,
            Node::Branch(branch) => Node::Branch(Arc::clone(branch)),
        }
    }
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Node::Empty
    }
}

impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("count", &self.count())
            .field("height", &self.height())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
pub(crate) mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    // `Node` is a tagged pointer thanks to the `Arc` niche.
    assert_eq_size!(Node<u64>, Arc<Branch<u64>>);

    /// Walks the whole subtree asserting the height, count and balance invariants.
    pub(crate) fn assert_invariants<T>(node: &Node<T>) {
        if let Node::Branch(branch) = node {
            assert_invariants(&branch.left);
            assert_invariants(&branch.right);

            let (left, right) = (branch.left.height(), branch.right.height());
            assert!(left.abs_diff(right) <= 1, "unbalanced: left {left}, right {right}");
            assert_eq!(branch.height, 1 + left.max(right));
            assert_eq!(branch.count, branch.left.count() + branch.right.count() + 1);
        }
    }

    pub(crate) fn to_vec<T: Clone>(node: &Node<T>) -> Vec<T> {
        (0..node.count()).map(|i| node.get_at(i).value().clone()).collect()
    }

    #[test]
    fn empty_node() {
        let node: Node<u32> = Node::Empty;
        assert!(node.is_empty());
        assert_eq!(node.count(), 0);
        assert_eq!(node.height(), 0);
        assert!(node.value().is_none());
        assert!(node.left().is_empty());
        assert!(node.right().is_empty());
        assert!(node.get(0).is_none());
    }

    #[test]
    #[should_panic(expected = "`Node::get_at()` - `index` >= `count`!")]
    fn get_at_out_of_range() {
        let node = Node::leaf(1);
        let _ = node.get_at(1);
    }

    #[test]
    fn sequential_inserts_stay_balanced() {
        let mut node = Node::Empty;
        for i in 0..1_000u32 {
            node = node.insert_at(node.count(), i);
        }
        assert_invariants(&node);
        assert_eq!(node.count(), 1_000);
        // 1.4405 * log2(1002) is just under 14.4.
        assert!(node.height() <= 14);
        assert_eq!(to_vec(&node), (0..1_000).collect::<Vec<_>>());
    }

    #[test]
    fn edits_leave_the_original_untouched() {
        let original = Node::from_exact_iter(&mut (0..100u32), 100);
        let inserted = original.insert_at(50, 1_000);
        let removed = original.remove_at(0);
        let replaced = original.replace_at(99, 7);

        assert_eq!(to_vec(&original), (0..100).collect::<Vec<_>>());
        assert_eq!(inserted.get(50), Some(&1_000));
        assert_eq!(removed.get(0), Some(&1));
        assert_eq!(replaced.get(99), Some(&7));
        assert_eq!(replaced.height(), original.height());
    }

    #[test]
    #[should_panic(expected = "`Node::from_exact_iter()` - iterator ended early!")]
    fn from_exact_iter_short_iterator() {
        let _ = Node::from_exact_iter(&mut (0..3u32), 4);
    }

    proptest! {
        #[test]
        fn from_exact_iter_is_balanced(len in 0usize..2_048) {
            let node = Node::from_exact_iter(&mut (0..len), len);
            assert_invariants(&node);
            prop_assert_eq!(to_vec(&node), (0..len).collect::<Vec<_>>());
        }

        #[test]
        fn node_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..512)) {
            let mut model: Vec<u32> = Vec::new();
            let mut node: Node<u32> = Node::Empty;

            for operation in operations {
                match operation {
                    Operation::Insert(which, value) => {
                        let index = which % (model.len() + 1);
                        node = node.insert_at(index, value);
                        model.insert(index, value);
                    }
                    Operation::Remove(which) => {
                        if model.is_empty() {
                            continue;
                        }
                        let index = which % model.len();
                        node = node.remove_at(index);
                        model.remove(index);
                    }
                    Operation::Replace(which, value) => {
                        if model.is_empty() {
                            continue;
                        }
                        let index = which % model.len();
                        node = node.replace_at(index, value);
                        model[index] = value;
                    }
                }

                prop_assert_eq!(node.count(), model.len());
            }

            assert_invariants(&node);
            prop_assert_eq!(to_vec(&node), model);
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Insert(usize, u32),
        Remove(usize),
        Replace(usize, u32),
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            10 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::Insert(which, value)),
            5 => any::<usize>().prop_map(Operation::Remove),
            2 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::Replace(which, value)),
        ]
    }
}
