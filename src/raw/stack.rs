use smallvec::SmallVec;

use crate::node::Branch;

/// The number of slots in an enumerator's stack.
///
/// Only branches taller than [`INDEXED_HEIGHT`](crate::INDEXED_HEIGHT) are ever pushed, and
/// they always lie on a single root-to-leaf path. An AVL tree of height 68 already holds
/// more than 10^14 elements, so 64 slots are never exhausted by a balanced tree.
pub const STACK_CAPACITY: usize = 64;

/// A fixed-capacity stack of borrowed branches that never touches the heap.
pub(crate) struct NodeStack<'a, T> {
    slots: SmallVec<[&'a Branch<T>; STACK_CAPACITY]>,
}

impl<'a, T> NodeStack<'a, T> {
    pub(crate) fn new() -> Self {
        Self { slots: SmallVec::new() }
    }

    #[inline]
    pub(crate) fn push(&mut self, branch: &'a Branch<T>) {
        assert!(
            self.slots.len() < STACK_CAPACITY,
            "`NodeStack::push()` - stack is full, the tree is not balanced!"
        );
        self.slots.push(branch);
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> Option<&'a Branch<T>> {
        self.slots.pop()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}

impl<T> Clone for NodeStack<'_, T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}
