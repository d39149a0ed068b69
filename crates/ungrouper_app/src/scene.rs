// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene model: objects, material slots and node-based materials.
//!
//! Scenes are stored as RON, or JSON when the file name ends in `.json`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use ungrouper_graph::context::{EditorContext, Screen, Window};
use ungrouper_graph::{Document, TreeId};

/// Current scene file format version
pub const SCENE_FORMAT_VERSION: u32 = 1;

/// Scene loading and saving errors
#[derive(Debug, Error)]
pub enum SceneError {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed RON
    #[error("Invalid scene file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// RON serialization error
    #[error("Failed to write scene: {0}")]
    Write(#[from] ron::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File written by a newer version
    #[error("Scene version {0} is newer than supported version {SCENE_FORMAT_VERSION}")]
    UnsupportedVersion(u32),
}

/// Which objects a batch visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ObjectScope {
    /// Every object in the scene
    #[default]
    All,
    /// Only selected objects
    Selected,
}

/// Object type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Polygon mesh; the only kind with materials
    Mesh,
    /// Light
    Light,
    /// Camera
    Camera,
    /// Empty
    Empty,
}

/// A material slot on an object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSlot {
    /// Name of the material in the slot
    pub material: Option<String>,
}

/// An object in the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObject {
    /// Object name
    pub name: String,
    /// Object type
    pub kind: ObjectKind,
    /// Selection flag
    #[serde(default)]
    pub selected: bool,
    /// Material slots
    #[serde(default)]
    pub material_slots: Vec<MaterialSlot>,
    /// UV layer names of the mesh, first one is the default
    #[serde(default)]
    pub uv_layers: Vec<String>,
}

impl SceneObject {
    /// A mesh object using the given materials
    pub fn mesh(name: impl Into<String>, materials: &[&str]) -> Self {
        Self {
            name: name.into(),
            kind: ObjectKind::Mesh,
            selected: false,
            material_slots: materials
                .iter()
                .map(|m| MaterialSlot { material: Some((*m).to_string()) })
                .collect(),
            uv_layers: Vec::new(),
        }
    }

    /// Whether the object is a mesh with at least one slot
    pub fn has_material_slots(&self) -> bool {
        self.kind == ObjectKind::Mesh && !self.material_slots.is_empty()
    }

    /// Names of the materials in the slots, in slot order
    pub fn slot_materials(&self) -> impl Iterator<Item = &str> {
        self.material_slots.iter().filter_map(|s| s.material.as_deref())
    }
}

/// A material
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    /// Unique name
    pub name: String,
    /// Whether the material is node based
    pub use_nodes: bool,
    /// Root node tree
    pub node_tree: Option<TreeId>,
}

/// A scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Format version
    pub version: u32,
    /// Objects in scene order
    pub objects: Vec<SceneObject>,
    /// Materials by name
    pub materials: IndexMap<String, Material>,
    /// Every node tree of the scene
    pub document: Document,
    /// Window layout; a 3D view plus node editor when absent
    #[serde(default)]
    pub screen: Option<Screen>,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            version: SCENE_FORMAT_VERSION,
            objects: Vec::new(),
            materials: IndexMap::new(),
            document: Document::new(),
            screen: None,
        }
    }
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node-based material with the given root tree
    pub fn add_material(&mut self, name: impl Into<String>, node_tree: TreeId) {
        let name = name.into();
        self.materials.insert(
            name.clone(),
            Material {
                name,
                use_nodes: true,
                node_tree: Some(node_tree),
            },
        );
    }

    /// Add an object and return its index
    pub fn add_object(&mut self, object: SceneObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Root tree of a material if it is node based
    pub fn node_tree_of(&self, material: &str) -> Option<TreeId> {
        self.materials
            .get(material)
            .filter(|m| m.use_nodes)
            .and_then(|m| m.node_tree)
    }

    /// Indices of the objects a batch with `scope` visits
    pub fn objects_in_scope(&self, scope: ObjectScope) -> Vec<usize> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| scope == ObjectScope::All || o.selected)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of distinct materials on the mesh objects in `scope`
    pub fn unique_material_count(&self, scope: ObjectScope) -> usize {
        self.objects_in_scope(scope)
            .into_iter()
            .filter_map(|i| self.objects.get(i))
            .filter(|o| o.kind == ObjectKind::Mesh)
            .flat_map(SceneObject::slot_materials)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Editor context for running operators on this scene
    pub fn editor_context(&self) -> EditorContext {
        match &self.screen {
            Some(screen) => EditorContext {
                window: Some(Window { screen: screen.clone() }),
            },
            None => EditorContext::with_node_editor(),
        }
    }

    /// Load a scene file
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        let scene: Scene = if is_json(path) {
            serde_json::from_str(&content)?
        } else {
            ron::from_str(&content)?
        };

        if scene.version > SCENE_FORMAT_VERSION {
            return Err(SceneError::UnsupportedVersion(scene.version));
        }
        Ok(scene)
    }

    /// Save the scene
    pub fn save(&self, path: &Path) -> Result<(), SceneError> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            let config = ron::ser::PrettyConfig::default()
                .struct_names(true)
                .enumerate_arrays(false);
            ron::ser::to_string_pretty(self, config)?
        };
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ungrouper_graph::Graph;

    fn temp_path(extension: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ungrouper-{}.{extension}", uuid::Uuid::new_v4()))
    }

    fn sample() -> Scene {
        let mut scene = Scene::new();
        let tree = scene.document.add_tree(Graph::new("Metal"));
        scene.add_material("Metal", tree);
        let wood = scene.document.add_tree(Graph::new("Wood"));
        scene.add_material("Wood", wood);
        scene.add_object(SceneObject::mesh("Cube", &["Metal", "Wood", "Metal"]));
        let mut sphere = SceneObject::mesh("Sphere", &["Metal"]);
        sphere.selected = true;
        scene.add_object(sphere);
        scene.add_object(SceneObject {
            name: "Lamp".to_string(),
            kind: ObjectKind::Light,
            selected: true,
            material_slots: vec![MaterialSlot { material: Some("Glow".to_string()) }],
            uv_layers: Vec::new(),
        });
        scene
    }

    #[test]
    fn test_unique_material_count() {
        let scene = sample();
        assert_eq!(scene.unique_material_count(ObjectScope::All), 2);
        assert_eq!(scene.unique_material_count(ObjectScope::Selected), 1);
        assert_eq!(Scene::new().unique_material_count(ObjectScope::All), 0);
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let scene = sample();
        for extension in ["ron", "json"] {
            let path = temp_path(extension);
            scene.save(&path).unwrap();
            let loaded = Scene::load(&path).unwrap();
            std::fs::remove_file(&path).ok();
            assert_eq!(loaded.objects.len(), 3);
            assert_eq!(loaded.node_tree_of("Metal"), scene.node_tree_of("Metal"));
        }
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut scene = sample();
        scene.version = SCENE_FORMAT_VERSION + 1;
        let path = temp_path("ron");
        scene.save(&path).unwrap();
        let result = Scene::load(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(SceneError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_default_context_has_node_editor() {
        let scene = sample();
        let mut ctx = scene.editor_context();
        assert!(ctx.bind_node_editor(TreeId::new()).is_ok());
    }
}
