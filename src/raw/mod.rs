mod stack;

pub(crate) use stack::NodeStack;
pub use stack::STACK_CAPACITY;
