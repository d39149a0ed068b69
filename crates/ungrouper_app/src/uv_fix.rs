// SPDX-License-Identifier: MIT OR Apache-2.0
//! UV map repair.
//!
//! A UV map node naming a layer the mesh does not have (or no layer at all)
//! silently samples nothing once the groups are gone, so before ungrouping
//! those nodes are pointed at the object's first UV layer.

use crate::scene::{ObjectKind, Scene};
use std::collections::HashSet;
use ungrouper_graph::node::types;
use ungrouper_graph::{Document, PortValue, TreeId};

/// Property holding the layer name on UV map nodes
pub const UV_MAP_PROPERTY: &str = "uv_map";

/// Reassign broken UV map nodes on every mesh object. Returns the number of nodes changed.
pub fn fix_uv_maps(scene: &mut Scene) -> usize {
    let Scene {
        objects,
        materials,
        document,
        ..
    } = scene;

    let mut fixed = 0;
    for object in objects.iter().filter(|o| o.kind == ObjectKind::Mesh) {
        let Some(first) = object.uv_layers.first() else {
            continue;
        };

        let mut seen = HashSet::new();
        for material in object.slot_materials() {
            let Some(root) = materials
                .get(material)
                .filter(|m| m.use_nodes)
                .and_then(|m| m.node_tree)
            else {
                continue;
            };
            if !seen.insert(material) {
                continue;
            }

            let count = fix_tree(document, root, &object.uv_layers, first);
            if count > 0 {
                tracing::info!(
                    "Reassigned {} UV map node(s) in material {} on {} to layer {}",
                    count,
                    material,
                    object.name,
                    first
                );
            }
            fixed += count;
        }
    }
    fixed
}

/// Fix UV map nodes in `root` and every tree nested below it
fn fix_tree(document: &mut Document, root: TreeId, layers: &[String], first: &str) -> usize {
    let mut fixed = 0;
    let mut stack = vec![root];
    let mut visited = HashSet::new();

    while let Some(tree) = stack.pop() {
        if !visited.insert(tree) {
            continue;
        }
        let Some(graph) = document.tree_mut(tree) else {
            continue;
        };

        for node_id in graph.node_ids().collect::<Vec<_>>() {
            let Some(node) = graph.node_mut(node_id) else {
                continue;
            };
            if let Some(inner) = node.node_tree {
                stack.push(inner);
            }
            if node.node_type != types::UV_MAP {
                continue;
            }

            let current = node.properties.get(UV_MAP_PROPERTY).and_then(PortValue::as_str);
            let valid = current.is_some_and(|name| !name.is_empty() && layers.iter().any(|l| l == name));
            if !valid {
                node.properties
                    .insert(UV_MAP_PROPERTY.to_string(), PortValue::String(first.to_string()));
                fixed += 1;
            }
        }
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneObject;
    use ungrouper_graph::graphs::material::create_shader_registry;
    use ungrouper_graph::{Graph, NodeId};

    fn uv_node(graph: &mut Graph, layer: Option<&str>) -> NodeId {
        let registry = create_shader_registry();
        let mut node = registry.create_node(types::UV_MAP).unwrap();
        if let Some(layer) = layer {
            node = node.with_property(UV_MAP_PROPERTY, PortValue::String(layer.to_string()));
        }
        graph.add_node(node)
    }

    fn layer_of(scene: &Scene, tree: TreeId, node: NodeId) -> Option<String> {
        scene
            .document
            .tree(tree)
            .and_then(|g| g.node(node))
            .and_then(|n| n.properties.get(UV_MAP_PROPERTY))
            .and_then(PortValue::as_str)
            .map(str::to_string)
    }

    #[test]
    fn test_broken_nodes_use_first_layer() {
        let mut scene = Scene::new();
        let mut graph = Graph::new("Painted");
        let empty = uv_node(&mut graph, Some(""));
        let unset = uv_node(&mut graph, None);
        let stale = uv_node(&mut graph, Some("OldUV"));
        let good = uv_node(&mut graph, Some("Detail"));
        let tree = scene.document.add_tree(graph);
        scene.add_material("Painted", tree);

        let mut cube = SceneObject::mesh("Cube", &["Painted", "Painted"]);
        cube.uv_layers = vec!["UVMap".to_string(), "Detail".to_string()];
        scene.add_object(cube);

        assert_eq!(fix_uv_maps(&mut scene), 3);
        for node in [empty, unset, stale] {
            assert_eq!(layer_of(&scene, tree, node).as_deref(), Some("UVMap"));
        }
        assert_eq!(layer_of(&scene, tree, good).as_deref(), Some("Detail"));
        assert_eq!(fix_uv_maps(&mut scene), 0);
    }

    #[test]
    fn test_nested_trees_are_fixed() {
        let mut scene = Scene::new();
        let mut interior = Graph::new("Inner");
        let inner_uv = uv_node(&mut interior, Some("Missing"));
        let interior = scene.document.add_tree(interior);
        let root = scene.document.add_tree(Graph::new("Outer"));
        scene.document.instantiate_group(root, interior, "Group").unwrap();
        scene.add_material("Outer", root);

        let mut cube = SceneObject::mesh("Cube", &["Outer"]);
        cube.uv_layers = vec!["UVMap".to_string()];
        scene.add_object(cube);

        assert_eq!(fix_uv_maps(&mut scene), 1);
        assert_eq!(layer_of(&scene, interior, inner_uv).as_deref(), Some("UVMap"));
    }

    #[test]
    fn test_objects_without_layers_are_skipped() {
        let mut scene = Scene::new();
        let mut graph = Graph::new("Plain");
        let node = uv_node(&mut graph, None);
        let tree = scene.document.add_tree(graph);
        scene.add_material("Plain", tree);
        scene.add_object(SceneObject::mesh("Cube", &["Plain"]));

        assert_eq!(fix_uv_maps(&mut scene), 0);
        assert_eq!(layer_of(&scene, tree, node), None);
    }
}
