// SPDX-License-Identifier: MIT OR Apache-2.0
//! Incremental processing of every material in a scene.
//!
//! One [`MaterialBatch::tick`] handles the materials of one object so the
//! caller can hand control back to the event loop in between.

use crate::scene::{ObjectScope, Scene};
use std::collections::HashMap;
use ungrouper_graph::rewrite::UngroupReport;
use ungrouper_graph::{EditorContext, UngroupTransform, Ungrouper};

/// Cells in the textual progress bar
pub const PROGRESS_BAR_WIDTH: usize = 20;

/// Whether a batch has more work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    /// More objects remain
    Continue,
    /// Every object has been visited
    Finished,
}

/// Totals over all materials of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Group nodes flattened
    pub ungrouped: usize,
    /// Group nodes left in place
    pub failed: usize,
    /// Placeholder nodes created
    pub placeholders: usize,
    /// Reroute nodes removed
    pub reroutes_removed: usize,
    /// Materials whose run was aborted
    pub aborted_materials: usize,
}

impl BatchSummary {
    fn absorb(&mut self, report: &UngroupReport) {
        self.ungrouped += report.ungrouped;
        self.failed += report.failed;
        self.placeholders += report.placeholders;
        self.reroutes_removed += report.reroutes_removed;
    }
}

/// Walks the objects of a scene one tick at a time
#[derive(Debug, Clone)]
pub struct MaterialBatch {
    objects: Vec<usize>,
    cursor: usize,
    /// Material name to the index of the object it was first seen on
    processed: HashMap<String, usize>,
    total_materials: usize,
    processed_count: usize,
    summary: BatchSummary,
}

impl MaterialBatch {
    /// Size a batch over the objects in `scope`
    pub fn new(scene: &Scene, scope: ObjectScope) -> Self {
        Self {
            objects: scene.objects_in_scope(scope),
            cursor: 0,
            processed: HashMap::new(),
            total_materials: scene.unique_material_count(scope),
            processed_count: 0,
            summary: BatchSummary::default(),
        }
    }

    /// Process the materials of the next object
    pub fn tick<T: UngroupTransform>(
        &mut self,
        scene: &mut Scene,
        context: &mut EditorContext,
        ungrouper: &mut Ungrouper<T>,
    ) -> TickResult {
        let Some(&object_index) = self.objects.get(self.cursor) else {
            return TickResult::Finished;
        };
        self.cursor += 1;

        let Some(object) = scene.objects.get(object_index) else {
            return self.state();
        };
        if !object.has_material_slots() {
            return self.state();
        }

        let object_name = object.name.clone();
        let materials: Vec<String> = object.slot_materials().map(str::to_string).collect();
        for material in materials {
            if self.processed.contains_key(&material) {
                continue;
            }
            self.processed.insert(material.clone(), object_index);
            self.processed_count += 1;

            let Some(root) = scene.node_tree_of(&material) else {
                tracing::debug!("Material {} has no node tree", material);
                continue;
            };

            tracing::info!("Processing material {} on {}", material, object_name);
            match ungrouper.run(&mut scene.document, context, root) {
                Ok(report) => self.summary.absorb(&report),
                Err(e) => {
                    tracing::error!("Failed to process material {}: {}", material, e);
                    self.summary.aborted_materials += 1;
                }
            }
        }

        self.state()
    }

    fn state(&self) -> TickResult {
        if self.cursor >= self.objects.len() {
            TickResult::Finished
        } else {
            TickResult::Continue
        }
    }

    /// Whether every object has been visited
    pub fn is_finished(&self) -> bool {
        self.state() == TickResult::Finished
    }

    /// Percentage of distinct materials processed; 0 for an empty batch
    pub fn progress(&self) -> f32 {
        if self.total_materials == 0 {
            return 0.0;
        }
        self.processed_count as f32 / self.total_materials as f32 * 100.0
    }

    /// Status line with a textual progress bar
    pub fn progress_text(&self) -> String {
        progress_text(self.progress())
    }

    /// Materials handled so far and where they were first seen
    pub fn processed(&self) -> &HashMap<String, usize> {
        &self.processed
    }

    /// Number of distinct materials in scope
    pub fn total_materials(&self) -> usize {
        self.total_materials
    }

    /// Totals so far
    pub fn summary(&self) -> &BatchSummary {
        &self.summary
    }
}

/// `Processing materials: [====                ] 20.00% done`
pub fn progress_text(percent: f32) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 5.0) as usize).min(PROGRESS_BAR_WIDTH);
    format!(
        "Processing materials: [{:<width$}] {:.2}% done",
        "=".repeat(filled),
        percent,
        width = PROGRESS_BAR_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneObject;
    use ungrouper_graph::{Graph, Node, Port, PortType, SpliceUngroup};

    /// Scene whose materials each hold one group with a passthrough interior
    fn grouped_scene(materials: &[&str], objects: &[&[&str]]) -> Scene {
        let mut scene = Scene::new();
        for name in materials {
            let mut interior = Graph::new(format!("{name} Group"));
            let input = interior.add_node(Node::group_input(vec![Port::output("Fac", PortType::Float)]));
            let output = interior.add_node(Node::group_output(vec![Port::input("Fac", PortType::Float)]));
            let from = interior.node(input).unwrap().outputs[0].id;
            let to = interior.node(output).unwrap().inputs[0].id;
            interior.connect(input, from, output, to).unwrap();
            let interior = scene.document.add_tree(interior);

            let root = scene.document.add_tree(Graph::new(*name));
            scene.document.instantiate_group(root, interior, "Group").unwrap();
            scene.add_material(*name, root);
        }
        for (i, slots) in objects.iter().enumerate() {
            scene.add_object(SceneObject::mesh(format!("Object {i}"), slots));
        }
        scene
    }

    #[test]
    fn test_progress_text() {
        assert_eq!(
            progress_text(0.0),
            "Processing materials: [                    ] 0.00% done"
        );
        assert_eq!(
            progress_text(12.5),
            "Processing materials: [==                  ] 12.50% done"
        );
        assert_eq!(
            progress_text(100.0),
            "Processing materials: [====================] 100.00% done"
        );
    }

    #[test]
    fn test_empty_batch_reports_zero() {
        let scene = Scene::new();
        let batch = MaterialBatch::new(&scene, ObjectScope::All);
        assert_eq!(batch.progress(), 0.0);
        assert!(batch.is_finished());
    }

    #[test]
    fn test_shared_materials_processed_once() {
        let mut scene = grouped_scene(&["Metal", "Wood"], &[&["Metal", "Metal"], &["Wood", "Metal"]]);
        let mut context = EditorContext::with_node_editor();
        let mut ungrouper = Ungrouper::new(SpliceUngroup::new());
        let mut batch = MaterialBatch::new(&scene, ObjectScope::All);
        assert_eq!(batch.total_materials(), 2);

        assert_eq!(batch.tick(&mut scene, &mut context, &mut ungrouper), TickResult::Continue);
        assert_eq!(batch.progress(), 50.0);
        assert_eq!(batch.tick(&mut scene, &mut context, &mut ungrouper), TickResult::Finished);
        assert_eq!(batch.progress(), 100.0);

        assert_eq!(batch.processed().get("Metal"), Some(&0));
        assert_eq!(batch.processed().get("Wood"), Some(&1));
        assert_eq!(batch.summary().ungrouped, 2);
        for name in ["Metal", "Wood"] {
            let root = scene.node_tree_of(name).unwrap();
            assert_eq!(scene.document.count_groups(root), 0);
        }
    }

    #[test]
    fn test_selected_scope() {
        let mut scene = grouped_scene(&["Metal", "Wood"], &[&["Metal"], &["Wood"]]);
        scene.objects[1].selected = true;
        let mut context = EditorContext::with_node_editor();
        let mut ungrouper = Ungrouper::new(SpliceUngroup::new());
        let mut batch = MaterialBatch::new(&scene, ObjectScope::Selected);

        assert_eq!(batch.tick(&mut scene, &mut context, &mut ungrouper), TickResult::Finished);
        let metal = scene.node_tree_of("Metal").unwrap();
        let wood = scene.node_tree_of("Wood").unwrap();
        assert_eq!(scene.document.count_groups(metal), 1);
        assert_eq!(scene.document.count_groups(wood), 0);
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let mut scene = grouped_scene(&["Metal", "Wood"], &[&["Metal"], &["Wood"]]);
        let mut context = EditorContext::headless();
        let mut ungrouper = Ungrouper::new(SpliceUngroup::new());
        let mut batch = MaterialBatch::new(&scene, ObjectScope::All);

        while batch.tick(&mut scene, &mut context, &mut ungrouper) == TickResult::Continue {}
        assert_eq!(batch.summary().failed, 2);
        assert_eq!(batch.progress(), 100.0);
    }
}
