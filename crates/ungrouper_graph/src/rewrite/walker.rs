// SPDX-License-Identifier: MIT OR Apache-2.0
//! Depth-first enumeration of group nodes.

use crate::document::{Document, TreeId};
use crate::node::NodeId;
use std::collections::HashSet;

/// A group node and the tree that contains it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupSite {
    /// The group node
    pub node: NodeId,
    /// Tree holding the group node
    pub tree: TreeId,
}

struct Frame {
    tree: TreeId,
    nodes: Vec<NodeId>,
    cursor: usize,
    /// Group whose interior this frame walks, yielded once the frame is done
    owner: Option<GroupSite>,
}

/// Lazy, innermost-first walk over the group nodes below a root tree.
///
/// For each group node the walk first descends into its interior and then
/// yields the node itself. Visited group nodes are deselected, since the
/// ungroup transform acts on the selection. Each tree is descended into at
/// most once per walk, which also stops self-referencing groups from
/// recursing forever. Node lists are snapshotted when a tree is entered, so
/// callers should build a fresh walker after mutating the document.
pub struct GroupWalker<'a> {
    document: &'a mut Document,
    stack: Vec<Frame>,
    visited: HashSet<TreeId>,
    excluded: Option<&'a HashSet<NodeId>>,
}

impl<'a> GroupWalker<'a> {
    /// Start a walk at `root`
    pub fn new(document: &'a mut Document, root: TreeId) -> Self {
        let mut walker = Self {
            document,
            stack: Vec::new(),
            visited: HashSet::new(),
            excluded: None,
        };
        walker.enter(root, None);
        walker
    }

    /// Skip these group nodes and everything inside them
    pub fn excluding(mut self, excluded: &'a HashSet<NodeId>) -> Self {
        self.excluded = Some(excluded);
        self
    }

    fn enter(&mut self, tree: TreeId, owner: Option<GroupSite>) -> bool {
        if !self.visited.insert(tree) {
            return false;
        }
        let Some(graph) = self.document.tree(tree) else {
            return false;
        };
        self.stack.push(Frame {
            tree,
            nodes: graph.node_ids().collect(),
            cursor: 0,
            owner,
        });
        true
    }

    fn is_excluded(&self, node: NodeId) -> bool {
        self.excluded.is_some_and(|set| set.contains(&node))
    }
}

impl Iterator for GroupWalker<'_> {
    type Item = GroupSite;

    fn next(&mut self) -> Option<GroupSite> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(&node_id) = frame.nodes.get(frame.cursor) else {
                let done = self.stack.pop()?;
                if let Some(owner) = done.owner {
                    return Some(owner);
                }
                continue;
            };
            frame.cursor += 1;
            let tree = frame.tree;

            if self.is_excluded(node_id) {
                continue;
            }
            let Some(node) = self.document.tree_mut(tree).and_then(|g| g.node_mut(node_id)) else {
                continue;
            };
            if !node.is_group() {
                continue;
            }
            node.selected = false;
            let interior = node.node_tree;
            let site = GroupSite { node: node_id, tree };

            match interior {
                Some(interior) if self.enter(interior, Some(site)) => continue,
                _ => return Some(site),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    /// Root holding `depth` groups nested one inside the next
    fn nested(depth: usize) -> (Document, TreeId, Vec<GroupSite>) {
        let mut doc = Document::new();
        let root = doc.add_tree(Graph::new("Material"));
        let mut sites = Vec::new();
        let mut parent = root;
        for level in 0..depth {
            let interior = doc.add_tree(Graph::new(format!("Level {level}")));
            let node = doc.instantiate_group(parent, interior, format!("Group {level}")).unwrap();
            sites.push(GroupSite { node, tree: parent });
            parent = interior;
        }
        (doc, root, sites)
    }

    #[test]
    fn test_innermost_first() {
        let (mut doc, root, sites) = nested(3);
        let walked: Vec<GroupSite> = GroupWalker::new(&mut doc, root).collect();
        let expected: Vec<GroupSite> = sites.into_iter().rev().collect();
        assert_eq!(walked, expected);
    }

    #[test]
    fn test_visited_groups_are_deselected() {
        let (mut doc, root, sites) = nested(1);
        doc.tree_mut(root).unwrap().node_mut(sites[0].node).unwrap().selected = true;
        let count = GroupWalker::new(&mut doc, root).count();
        assert_eq!(count, 1);
        assert!(!doc.tree(root).unwrap().node(sites[0].node).unwrap().selected);
    }

    #[test]
    fn test_shared_interior_descended_once() {
        let mut doc = Document::new();
        let root = doc.add_tree(Graph::new("Material"));
        let shared = doc.add_tree(Graph::new("Shared"));
        let leaf = doc.add_tree(Graph::new("Leaf"));
        let inner = doc.instantiate_group(shared, leaf, "Leaf").unwrap();
        let a = doc.instantiate_group(root, shared, "A").unwrap();
        let b = doc.instantiate_group(root, shared, "B").unwrap();

        let walked: Vec<GroupSite> = GroupWalker::new(&mut doc, root).collect();
        assert_eq!(
            walked,
            vec![
                GroupSite { node: inner, tree: shared },
                GroupSite { node: a, tree: root },
                GroupSite { node: b, tree: root },
            ]
        );
    }

    #[test]
    fn test_self_reference_terminates() {
        let mut doc = Document::new();
        let root = doc.add_tree(Graph::new("Material"));
        let node = doc.instantiate_group(root, root, "Loop").unwrap();
        let walked: Vec<GroupSite> = GroupWalker::new(&mut doc, root).collect();
        assert_eq!(walked, vec![GroupSite { node, tree: root }]);
    }

    #[test]
    fn test_excluded_nodes_are_skipped_with_their_interior() {
        let (mut doc, root, sites) = nested(2);
        let excluded: HashSet<NodeId> = [sites[0].node].into_iter().collect();
        assert_eq!(GroupWalker::new(&mut doc, root).excluding(&excluded).next(), None);
    }

    #[test]
    fn test_walk_is_lazy() {
        let (mut doc, root, sites) = nested(2);
        let sibling_tree = doc.add_tree(Graph::new("Sibling"));
        let sibling = doc.instantiate_group(root, sibling_tree, "Sibling").unwrap();
        doc.tree_mut(root).unwrap().node_mut(sibling).unwrap().selected = true;

        let mut walker = GroupWalker::new(&mut doc, root);
        assert_eq!(walker.next(), Some(sites[1]));
        drop(walker);

        // Nothing past the first yield has been visited
        assert!(doc.tree(root).unwrap().node(sibling).unwrap().selected);
    }
}
