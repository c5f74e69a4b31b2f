//! Tree traversal iterators.

use crate::{DomTree, NodeId};

/// Pre-order, depth-first walk over the elements of a subtree.
///
/// The start node is always yielded first, whatever its kind, so
/// "search starting at N" includes N itself. Below the start node only
/// elements are visited (text is skipped, together with anything under it,
/// which is nothing).
///
/// The walk keeps its own stack of `(node, next element-child index)` frames
/// instead of recursing, so depth is bounded by memory only. Every call to
/// [`DomTree::elements`] starts a fresh walk; cloning an iterator forks it.
#[derive(Debug, Clone)]
pub struct ElementIterator<'a> {
    tree: &'a DomTree,
    start: Option<NodeId>,
    stack: Vec<(NodeId, usize)>,
}

impl<'a> ElementIterator<'a> {
    pub(crate) const fn new(tree: &'a DomTree, start: NodeId) -> Self {
        Self {
            tree,
            start: Some(start),
            stack: Vec::new(),
        }
    }
}

impl Iterator for ElementIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(start) = self.start.take() {
            if self.tree.get(start).is_none() {
                return None;
            }
            self.stack.push((start, 0));
            return Some(start);
        }

        while let Some((node, next_index)) = self.stack.last_mut() {
            let children = self.tree.children(*node);
            if let Some(&child) = children.get(*next_index) {
                *next_index += 1;
                self.stack.push((child, 0));
                return Some(child);
            }
            let _ = self.stack.pop();
        }
        None
    }
}

/// Iterator over ancestors of a node, from parent to root.
#[derive(Debug, Clone)]
pub struct AncestorIterator<'a> {
    pub(crate) tree: &'a DomTree,
    pub(crate) current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent_node(id);
        Some(id)
    }
}

/// Iterator over the element siblings before a node, nearest first.
#[derive(Debug, Clone)]
pub struct PrecedingElementSiblings<'a> {
    pub(crate) tree: &'a DomTree,
    pub(crate) current: Option<NodeId>,
}

impl Iterator for PrecedingElementSiblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.previous_element_sibling(id);
        Some(id)
    }
}
