// SPDX-License-Identifier: MIT OR Apache-2.0
//! Placeholder sources for unlinked inputs.
//!
//! Ungrouping drops the literal default of a group socket for some socket
//! types, so every unlinked scalar, vector or color input gets an explicit
//! source node carrying that default before the group is flattened.

use crate::connection::Endpoint;
use crate::document::{Document, DocumentError, TreeId};
use crate::graph::{ConnectionError, Graph};
use crate::graphs::material::VECTOR_MATH_ADD;
use crate::node::{types, Node, NodeId, NodeRegistry};
use crate::port::{Port, PortType, PortValue};
use std::collections::HashSet;

/// Horizontal distance between a consumer and its placeholders
const PLACEHOLDER_OFFSET_X: f32 = -220.0;
/// Vertical spacing between stacked placeholders
const PLACEHOLDER_SPACING_Y: f32 = -110.0;

/// Counts from a synthesis run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthesisReport {
    /// Placeholder nodes created
    pub created: usize,
    /// Unlinked inputs of a type without a placeholder
    pub unsupported: usize,
}

impl SynthesisReport {
    fn absorb(&mut self, other: Self) {
        self.created += other.created;
        self.unsupported += other.unsupported;
    }
}

/// Error while creating placeholders
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    /// Node not found in its tree
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// The registry lacks a placeholder node type
    #[error("Node type not registered: {0}")]
    UnknownNodeType(String),

    /// Placeholder type has no output socket
    #[error("Node type has no output: {0}")]
    NoOutput(String),

    /// Tree lookup failed
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Linking the placeholder failed
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

/// Link a literal source into every unlinked input of `node_id`.
///
/// Scalars get a `value` node, vectors an additive-identity `vector_math`
/// node with the default in its second operand, colors an `rgb` node.
/// Other socket types are left alone and only counted.
pub fn synthesize_placeholders(
    graph: &mut Graph,
    registry: &NodeRegistry,
    node_id: NodeId,
) -> Result<SynthesisReport, SynthesisError> {
    let node = graph.node(node_id).ok_or(SynthesisError::NodeNotFound(node_id))?;
    let origin = node.position;
    let node_name = node.display_name();
    let unlinked: Vec<Port> = node
        .inputs
        .iter()
        .filter(|p| !graph.is_linked(p.id))
        .cloned()
        .collect();

    let mut report = SynthesisReport::default();
    let mut row = 0.0_f32;
    for socket in &unlinked {
        let Some(mut placeholder) = placeholder_for(registry, socket)? else {
            tracing::debug!(
                "No placeholder for {:?} input {} on {}",
                socket.port_type,
                socket.name,
                node_name
            );
            report.unsupported += 1;
            continue;
        };
        placeholder.position = [origin[0] + PLACEHOLDER_OFFSET_X, origin[1] + row * PLACEHOLDER_SPACING_Y];
        row += 1.0;

        let source_port = placeholder
            .outputs
            .first()
            .map(|p| p.id)
            .ok_or_else(|| SynthesisError::NoOutput(placeholder.node_type.clone()))?;
        let source = Endpoint::new(graph.add_node(placeholder), source_port);
        graph.link(source, Endpoint::new(node_id, socket.id))?;
        report.created += 1;

        tracing::debug!(
            "Set {:?} value {:?} for input {} on {}",
            socket.port_type,
            socket.default_value,
            socket.name,
            node_name
        );
    }
    Ok(report)
}

/// Patch the inputs of every group node in `tree` and below it.
///
/// Nested groups are handled before the group that contains them. Trees
/// shared between several group nodes are only descended into once.
pub fn synthesize_tree(
    document: &mut Document,
    registry: &NodeRegistry,
    tree: TreeId,
) -> Result<SynthesisReport, SynthesisError> {
    let mut visited = HashSet::new();
    synthesize_tree_inner(document, registry, tree, &mut visited)
}

fn synthesize_tree_inner(
    document: &mut Document,
    registry: &NodeRegistry,
    tree: TreeId,
    visited: &mut HashSet<TreeId>,
) -> Result<SynthesisReport, SynthesisError> {
    let mut report = SynthesisReport::default();
    if !visited.insert(tree) {
        return Ok(report);
    }

    let groups: Vec<(NodeId, Option<TreeId>)> = document
        .tree(tree)
        .ok_or(DocumentError::TreeNotFound(tree))?
        .nodes()
        .filter(|n| n.is_group())
        .map(|n| (n.id, n.node_tree))
        .collect();

    for (group, interior) in groups {
        if let Some(interior) = interior {
            report.absorb(synthesize_tree_inner(document, registry, interior, visited)?);
        }
        let graph = document.tree_mut(tree).ok_or(DocumentError::TreeNotFound(tree))?;
        report.absorb(synthesize_placeholders(graph, registry, group)?);
    }
    Ok(report)
}

fn create(registry: &NodeRegistry, type_id: &str) -> Result<Node, SynthesisError> {
    registry
        .create_node(type_id)
        .ok_or_else(|| SynthesisError::UnknownNodeType(type_id.to_string()))
}

fn placeholder_for(registry: &NodeRegistry, socket: &Port) -> Result<Option<Node>, SynthesisError> {
    let default = socket.default_value.as_ref();
    let node = match socket.port_type {
        PortType::Float => {
            let value = default.and_then(PortValue::as_float).unwrap_or(0.0);
            let mut node = create(registry, types::VALUE)?;
            set_output_default(&mut node, PortValue::Float(value));
            node
        }
        PortType::Vector => {
            let value = default.and_then(PortValue::as_vector).unwrap_or([0.0, 0.0, 0.0]);
            let mut node = create(registry, types::VECTOR_MATH)?
                .with_property("operation", PortValue::String(VECTOR_MATH_ADD.to_string()));
            if let [identity, operand, ..] = node.inputs.as_mut_slice() {
                identity.default_value = Some(PortValue::Vector([0.0, 0.0, 0.0]));
                operand.default_value = Some(PortValue::Vector(value));
            }
            node
        }
        PortType::Color => {
            let value = default.and_then(PortValue::as_color).unwrap_or([1.0, 1.0, 1.0, 1.0]);
            let mut node = create(registry, types::RGB)?;
            set_output_default(&mut node, PortValue::Color(value));
            node
        }
        _ => return Ok(None),
    };
    Ok(Some(node))
}

fn set_output_default(node: &mut Node, value: PortValue) {
    if let Some(output) = node.outputs.first_mut() {
        output.default_value = Some(value);
    }
}
