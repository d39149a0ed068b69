// SPDX-License-Identifier: MIT OR Apache-2.0
//! The host's ungroup operation, as seen by the orchestrator.

use crate::context::EditorContext;
use crate::document::{Document, TreeId};
use crate::graph::ConnectionError;
use crate::node::NodeId;

/// Replaces the active group node of a tree with its interior.
///
/// Implementations may rely on the tree having exactly one selected node,
/// the active one, and on a node editor in `context` showing `tree`.
pub trait UngroupTransform {
    /// Flatten the active group node of `tree`
    fn ungroup(
        &mut self,
        document: &mut Document,
        context: &EditorContext,
        tree: TreeId,
    ) -> Result<(), TransformError>;
}

impl<T: UngroupTransform + ?Sized> UngroupTransform for &mut T {
    fn ungroup(
        &mut self,
        document: &mut Document,
        context: &EditorContext,
        tree: TreeId,
    ) -> Result<(), TransformError> {
        (**self).ungroup(document, context, tree)
    }
}

impl<T: UngroupTransform + ?Sized> UngroupTransform for Box<T> {
    fn ungroup(
        &mut self,
        document: &mut Document,
        context: &EditorContext,
        tree: TreeId,
    ) -> Result<(), TransformError> {
        (**self).ungroup(document, context, tree)
    }
}

/// Reasons the ungroup operation rejects the current state
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// No node editor is showing the tree
    #[error("No node editor is showing tree {0:?}")]
    EditorNotBound(TreeId),

    /// Tree not found
    #[error("Node tree not found: {0:?}")]
    TreeNotFound(TreeId),

    /// The tree has no active node
    #[error("No active node")]
    NoActiveNode,

    /// The active node is not a group
    #[error("Active node is not a group: {0:?}")]
    NotAGroup(NodeId),

    /// The group node has no interior tree
    #[error("Group node has no node tree: {0:?}")]
    MissingInterior(NodeId),

    /// The group's interior contains the tree the group sits in
    #[error("Group node contains its own tree: {0:?}")]
    RecursiveGroup(NodeId),

    /// Link bookkeeping failed
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The host refused for its own reasons
    #[error("Ungroup rejected: {0}")]
    Rejected(String),
}
