// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-process ungroup that splices a group's interior into its parent tree.
//!
//! Used when no host transform is attached (headless runs and tests). The
//! interior tree itself is left untouched so other instances of the same
//! group keep working.

use super::transform::{TransformError, UngroupTransform};
use crate::connection::{Connection, Endpoint};
use crate::context::EditorContext;
use crate::document::{Document, TreeId};
use crate::node::{Node, NodeKind};
use crate::port::PortId;
use std::collections::HashMap;

/// Splicing ungroup transform
#[derive(Debug, Clone, Copy, Default)]
pub struct SpliceUngroup;

impl SpliceUngroup {
    /// Create the transform
    pub fn new() -> Self {
        Self
    }
}

impl UngroupTransform for SpliceUngroup {
    fn ungroup(
        &mut self,
        document: &mut Document,
        context: &EditorContext,
        tree: TreeId,
    ) -> Result<(), TransformError> {
        if !context.shows_tree(tree) {
            return Err(TransformError::EditorNotBound(tree));
        }

        let parent = document.tree(tree).ok_or(TransformError::TreeNotFound(tree))?;
        let group_id = parent.active().ok_or(TransformError::NoActiveNode)?;
        let group = parent.node(group_id).ok_or(TransformError::NoActiveNode)?.clone();
        if !group.is_group() {
            return Err(TransformError::NotAGroup(group_id));
        }
        let interior_id = group.node_tree.ok_or(TransformError::MissingInterior(group_id))?;
        if document.reaches(interior_id, tree) {
            return Err(TransformError::RecursiveGroup(group_id));
        }
        let interior = document
            .tree(interior_id)
            .ok_or(TransformError::TreeNotFound(interior_id))?
            .clone();

        // External wiring of the group, indexed like its sockets
        let incoming: Vec<Option<Endpoint>> = group
            .inputs
            .iter()
            .map(|p| parent.connections_to(p.id).next().map(Connection::source))
            .collect();
        let outgoing: Vec<Vec<Endpoint>> = group
            .outputs
            .iter()
            .map(|p| parent.connections_from(p.id).map(Connection::target).collect())
            .collect();

        let parent = document.tree_mut(tree).ok_or(TransformError::TreeNotFound(tree))?;

        let mut copied: HashMap<PortId, Endpoint> = HashMap::new();
        let mut spliced = Vec::new();
        for node in interior.nodes() {
            if matches!(node.kind(), NodeKind::GroupInput | NodeKind::GroupOutput) {
                continue;
            }
            let (mut copy, mapping) = node.duplicate();
            copy.position = [
                copy.position[0] + group.position[0],
                copy.position[1] + group.position[1],
            ];
            for (old, new) in mapping {
                copied.insert(old, Endpoint::new(copy.id, new));
            }
            spliced.push(parent.add_node(copy));
        }

        // Where an interior link source ends up in the parent tree
        let resolve = |source: Endpoint| -> Option<Endpoint> {
            let node = interior.node(source.node)?;
            if node.kind() == NodeKind::GroupInput {
                let index = boundary_index(node, source.port)?;
                return incoming.get(index).copied().flatten();
            }
            copied.get(&source.port).copied()
        };

        let mut pending_defaults = Vec::new();
        for link in interior.connections() {
            let Some(target_node) = interior.node(link.to_node) else {
                continue;
            };

            if target_node.kind() == NodeKind::GroupOutput {
                let Some(index) = boundary_index(target_node, link.to_port) else {
                    continue;
                };
                let Some(source) = resolve(link.source()) else {
                    continue;
                };
                for target in outgoing.get(index).into_iter().flatten() {
                    if let Err(e) = parent.link(source, *target) {
                        tracing::warn!("Skipped output link while ungrouping {}: {}", group.name, e);
                    }
                }
                continue;
            }

            let Some(&target) = copied.get(&link.to_port) else {
                continue;
            };
            match resolve(link.source()) {
                Some(source) => {
                    if let Err(e) = parent.link(source, target) {
                        tracing::warn!("Skipped interior link while ungrouping {}: {}", group.name, e);
                    }
                }
                None => {
                    // Unlinked group input: its literal default moves to the consumer
                    let default = interior
                        .node(link.from_node)
                        .and_then(|n| boundary_index(n, link.from_port))
                        .and_then(|i| group.inputs.get(i))
                        .and_then(|p| p.default_value.clone());
                    if let Some(value) = default {
                        pending_defaults.push((target, value));
                    }
                }
            }
        }

        for (target, value) in pending_defaults {
            if let Some(port) = parent.node_mut(target.node).and_then(|n| n.port_mut(&target.port)) {
                port.default_value = Some(value);
            }
        }

        parent.remove_node(group_id);
        parent.set_active(None)?;
        for id in &spliced {
            if let Some(node) = parent.node_mut(*id) {
                node.selected = true;
            }
        }

        tracing::debug!(
            "Ungrouped {} into {} ({} nodes)",
            group.display_name(),
            parent.name,
            spliced.len()
        );
        Ok(())
    }
}

fn boundary_index(node: &Node, port: PortId) -> Option<usize> {
    node.port_index(&port).map(|(_, index)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::graphs::material::create_shader_registry;
    use crate::node::NodeId;
    use crate::port::{Port, PortType, PortValue};

    struct Scene {
        doc: Document,
        root: TreeId,
        group: NodeId,
        output: NodeId,
    }

    /// Root: group -> `material_output`; interior: input.Fac -> math -> emission -> output
    fn scene() -> Scene {
        let registry = create_shader_registry();
        let mut doc = Document::new();

        let mut interior = Graph::new("Glow");
        let boundary_in = interior.add_node(Node::group_input(vec![
            Port::output("Fac", PortType::Float).with_default(PortValue::Float(0.25)),
        ]));
        let boundary_out = interior.add_node(Node::group_output(vec![Port::input("Shader", PortType::Shader)]));
        let math = interior.add_node(registry.create_node("math").unwrap());
        let emission = interior.add_node(registry.create_node("emission").unwrap());
        let port = |g: &Graph, n: NodeId, input: bool, i: usize| {
            let node = g.node(n).unwrap();
            if input { node.inputs[i].id } else { node.outputs[i].id }
        };
        let (a, b) = (port(&interior, boundary_in, false, 0), port(&interior, math, true, 0));
        interior.connect(boundary_in, a, math, b).unwrap();
        let (a, b) = (port(&interior, math, false, 0), port(&interior, emission, true, 1));
        interior.connect(math, a, emission, b).unwrap();
        let (a, b) = (port(&interior, emission, false, 0), port(&interior, boundary_out, true, 0));
        interior.connect(emission, a, boundary_out, b).unwrap();
        let interior = doc.add_tree(interior);

        let root = doc.add_tree(Graph::new("Material"));
        let group = doc.instantiate_group(root, interior, "Glow").unwrap();
        let graph = doc.tree_mut(root).unwrap();
        let output = graph.add_node(registry.create_node("material_output").unwrap());
        let group_out = graph.node(group).unwrap().outputs[0].id;
        let surface = graph.node(output).unwrap().inputs[0].id;
        graph.connect(group, group_out, output, surface).unwrap();
        graph.set_active(Some(group)).unwrap();

        Scene { doc, root, group, output }
    }

    fn bound_context(tree: TreeId) -> EditorContext {
        let mut ctx = EditorContext::with_node_editor();
        let _binding = ctx.bind_node_editor(tree).unwrap();
        ctx
    }

    #[test]
    fn test_splice_rewires_boundary() {
        let Scene { mut doc, root, group, output } = scene();
        let ctx = bound_context(root);

        SpliceUngroup::new().ungroup(&mut doc, &ctx, root).unwrap();

        let graph = doc.tree(root).unwrap();
        assert!(graph.node(group).is_none());
        assert_eq!(graph.node_count(), 3);

        let surface = graph.node(output).unwrap().inputs[0].id;
        let link = graph.connections_to(surface).next().unwrap();
        assert_eq!(graph.node(link.from_node).unwrap().node_type, "emission");

        // Unlinked group input default lands on the interior consumer
        let math = graph.nodes().find(|n| n.node_type == "math").unwrap();
        assert_eq!(math.inputs[0].default_value, Some(PortValue::Float(0.25)));
        assert!(math.selected);
        assert_eq!(graph.active(), None);
    }

    #[test]
    fn test_linked_group_input_feeds_interior() {
        let Scene { mut doc, root, group, .. } = scene();
        let registry = create_shader_registry();
        let graph = doc.tree_mut(root).unwrap();
        let value = graph.add_node(registry.create_node("value").unwrap());
        let value_out = graph.node(value).unwrap().outputs[0].id;
        let fac = graph.node(group).unwrap().inputs[0].id;
        graph.connect(value, value_out, group, fac).unwrap();
        graph.set_active(Some(group)).unwrap();
        let ctx = bound_context(root);

        SpliceUngroup::new().ungroup(&mut doc, &ctx, root).unwrap();

        let graph = doc.tree(root).unwrap();
        let math = graph.nodes().find(|n| n.node_type == "math").unwrap();
        let link = graph.connections_to(math.inputs[0].id).next().unwrap();
        assert_eq!(link.from_node, value);
    }

    #[test]
    fn test_preconditions() {
        let Scene { mut doc, root, output, .. } = scene();

        let unbound = EditorContext::with_node_editor();
        assert_eq!(
            SpliceUngroup::new().ungroup(&mut doc, &unbound, root),
            Err(TransformError::EditorNotBound(root))
        );

        let ctx = bound_context(root);
        doc.tree_mut(root).unwrap().set_active(Some(output)).unwrap();
        assert_eq!(
            SpliceUngroup::new().ungroup(&mut doc, &ctx, root),
            Err(TransformError::NotAGroup(output))
        );

        doc.tree_mut(root).unwrap().set_active(None).unwrap();
        assert_eq!(
            SpliceUngroup::new().ungroup(&mut doc, &ctx, root),
            Err(TransformError::NoActiveNode)
        );

        let looped = doc.instantiate_group(root, root, "Loop").unwrap();
        doc.tree_mut(root).unwrap().set_active(Some(looped)).unwrap();
        let nodes = doc.tree(root).unwrap().node_count();
        assert_eq!(
            SpliceUngroup::new().ungroup(&mut doc, &ctx, root),
            Err(TransformError::RecursiveGroup(looped))
        );
        assert_eq!(doc.tree(root).unwrap().node_count(), nodes);
    }
}
