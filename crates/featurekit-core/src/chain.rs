//! Ancestor chain traversal.
//!
//! Yields a class and then each ancestor, most-derived first, ending at the
//! root boundary (the class with no parent). The walk is lazy and borrows the
//! chain; calling [`crate::HostClass::chain`] again restarts it.

use std::iter::FusedIterator;

use crate::class::HostClass;

#[derive(Debug, Clone)]
pub struct ChainWalker<'a> {
    next: Option<&'a HostClass>,
}

impl<'a> ChainWalker<'a> {
    pub fn new(leaf: &'a HostClass) -> Self {
        Self { next: Some(leaf) }
    }

    /// Class names from leaf to root.
    pub fn names(self) -> Vec<String> {
        self.map(|class| class.name().to_string()).collect()
    }
}

impl<'a> Iterator for ChainWalker<'a> {
    type Item = &'a HostClass;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent().map(|parent| parent.as_ref());
        Some(current)
    }
}

impl FusedIterator for ChainWalker<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walks_leaf_to_root() {
        let root = HostClass::builder("Root").build();
        let mid = HostClass::builder("Mid").extends(&root).build();
        let leaf = HostClass::builder("Leaf").extends(&mid).build();

        assert_eq!(leaf.chain().names(), vec!["Leaf", "Mid", "Root"]);
        assert_eq!(mid.chain().names(), vec!["Mid", "Root"]);
    }

    #[test]
    fn test_walk_is_restartable() {
        let root = HostClass::builder("Root").build();
        let leaf = HostClass::builder("Leaf").extends(&root).build();

        let mut first = leaf.chain();
        assert_eq!(first.next().map(|c| c.name()), Some("Leaf"));

        // A fresh walk starts from the leaf again.
        assert_eq!(leaf.chain().count(), 2);

        assert_eq!(first.next().map(|c| c.name()), Some("Root"));
        assert!(first.next().is_none());
        assert!(first.next().is_none());
    }

    #[test]
    fn test_root_alone() {
        let root = HostClass::builder("Root").build();
        assert_eq!(root.chain().names(), vec!["Root"]);
    }
}
