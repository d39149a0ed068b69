// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document holding every node tree, addressed by [`TreeId`].
//!
//! Group nodes refer to their interior by ID, so one group definition can be
//! instanced at several sites (or even inside itself) without the trees
//! owning each other.

use crate::graph::Graph;
use crate::node::{types, Node, NodeId};
use crate::port::Port;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a node tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeId(pub Uuid);

impl TreeId {
    /// Create a new random tree ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TreeId {
    fn default() -> Self {
        Self::new()
    }
}

/// All node trees of a scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    trees: IndexMap<TreeId, Graph>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tree and return its ID
    pub fn add_tree(&mut self, graph: Graph) -> TreeId {
        let id = TreeId::new();
        self.trees.insert(id, graph);
        id
    }

    /// Get a tree
    pub fn tree(&self, id: TreeId) -> Option<&Graph> {
        self.trees.get(&id)
    }

    /// Get a mutable tree
    pub fn tree_mut(&mut self, id: TreeId) -> Option<&mut Graph> {
        self.trees.get_mut(&id)
    }

    /// Whether the tree exists
    pub fn contains(&self, id: TreeId) -> bool {
        self.trees.contains_key(&id)
    }

    /// Iterate over all trees
    pub fn trees(&self) -> impl Iterator<Item = (TreeId, &Graph)> {
        self.trees.iter().map(|(id, g)| (*id, g))
    }

    /// Whether `target` is `from` or is instanced somewhere below it
    pub fn reaches(&self, from: TreeId, target: TreeId) -> bool {
        let mut stack = vec![from];
        let mut seen = std::collections::HashSet::new();
        while let Some(tree) = stack.pop() {
            if tree == target {
                return true;
            }
            if !seen.insert(tree) {
                continue;
            }
            if let Some(graph) = self.tree(tree) {
                stack.extend(graph.nodes().filter_map(|n| n.node_tree));
            }
        }
        false
    }

    /// Number of group nodes in `tree` and every tree nested below it
    pub fn count_groups(&self, tree: TreeId) -> usize {
        let mut seen = std::collections::HashSet::new();
        self.count_groups_inner(tree, &mut seen)
    }

    fn count_groups_inner(
        &self,
        tree: TreeId,
        seen: &mut std::collections::HashSet<TreeId>,
    ) -> usize {
        if !seen.insert(tree) {
            return 0;
        }
        let Some(graph) = self.tree(tree) else {
            return 0;
        };
        graph
            .nodes()
            .filter(|n| n.is_group())
            .map(|n| 1 + n.node_tree.map_or(0, |inner| self.count_groups_inner(inner, seen)))
            .sum()
    }

    /// Create a group node in `parent` instancing `interior`.
    ///
    /// The group's sockets mirror the interior boundary: outputs of the
    /// `group_input` node become inputs, inputs of the `group_output` node
    /// become outputs.
    pub fn instantiate_group(
        &mut self,
        parent: TreeId,
        interior: TreeId,
        name: impl Into<String>,
    ) -> Result<NodeId, DocumentError> {
        let inner = self.tree(interior).ok_or(DocumentError::TreeNotFound(interior))?;
        let boundary = |type_id: &str, pick: fn(&Node) -> &Vec<Port>| -> Vec<Port> {
            inner
                .nodes()
                .find(|n| n.node_type == type_id)
                .map(|n| pick(n).iter().map(Port::mirrored).collect())
                .unwrap_or_default()
        };
        let inputs = boundary(types::GROUP_INPUT, |n| &n.outputs);
        let outputs = boundary(types::GROUP_OUTPUT, |n| &n.inputs);

        let node = Node::group(interior, inputs, outputs).with_name(name);
        let graph = self.tree_mut(parent).ok_or(DocumentError::TreeNotFound(parent))?;
        Ok(graph.add_node(node))
    }
}

/// Error when addressing trees in a document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// Tree not found
    #[error("Node tree not found: {0:?}")]
    TreeNotFound(TreeId),
}
