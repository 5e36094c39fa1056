//! Per-document mutation counter.
//!
//! Every mutation that can change a computed style (attribute writes, tree
//! insertions and removals, text changes, stylesheet edits) bumps the counter.
//! Caches compare the value they were computed at against the current value.

use std::cell::Cell;
use std::rc::Rc;

/// A shared, monotonically increasing mutation counter.
///
/// Cloning yields another handle to the same counter, so a stylesheet can
/// hold a handle and bump the document's generation when a rule is inserted.
#[derive(Debug, Clone, Default)]
pub struct MutationGeneration(Rc<Cell<u64>>);

impl MutationGeneration {
    /// Create a new counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current generation.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.0.get()
    }

    /// Record a mutation. Returns the new generation.
    pub fn bump(&self) -> u64 {
        let next = self.0.get().wrapping_add(1);
        self.0.set(next);
        next
    }

    /// True if both handles point at the same counter.
    #[must_use]
    pub fn same_counter(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_counter() {
        let a = MutationGeneration::new();
        let b = a.clone();
        let _ = b.bump();
        let _ = b.bump();
        assert_eq!(a.current(), 2);
        assert!(a.same_counter(&b));
        assert!(!a.same_counter(&MutationGeneration::new()));
    }
}
