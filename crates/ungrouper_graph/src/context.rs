// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor context the ungroup transform runs against.
//!
//! The host only ungroups inside a node editor that is showing the tree in
//! question, so before each call an editor area gets bound to the containing
//! tree and the previous binding is put back afterwards.

use crate::document::TreeId;
use serde::{Deserialize, Serialize};

/// Kind of editor shown in an area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaKind {
    /// 3D viewport
    View3D,
    /// Shader node editor
    NodeEditor,
    /// Properties editor
    Properties,
    /// Outliner
    Outliner,
}

/// Region inside an area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionKind {
    /// Header bar
    Header,
    /// Main drawing region
    Window,
    /// Sidebar
    Ui,
    /// Tool shelf
    Toolbar,
}

/// A screen area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// Editor kind
    pub kind: AreaKind,
    /// Regions of the area
    pub regions: Vec<RegionKind>,
    /// Tree shown by a node editor
    #[serde(default)]
    pub node_tree: Option<TreeId>,
}

impl Area {
    /// Area with the usual header, window and sidebar regions
    pub fn new(kind: AreaKind) -> Self {
        Self {
            kind,
            regions: vec![RegionKind::Header, RegionKind::Window, RegionKind::Ui],
            node_tree: None,
        }
    }

    fn has_window_region(&self) -> bool {
        self.regions.contains(&RegionKind::Window)
    }
}

/// Screen layout of a window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Screen {
    /// Areas of the screen
    pub areas: Vec<Area>,
}

/// Host window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// Active screen
    pub screen: Screen,
}

/// Context passed to operators and the ungroup transform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorContext {
    /// Current window, absent when running without UI
    pub window: Option<Window>,
}

/// Record of a temporary node editor binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "restore the binding once the transform returns"]
pub struct EditorBinding {
    /// Index of the bound area
    pub area: usize,
    /// Tree the area showed before
    pub previous: Option<TreeId>,
}

impl EditorContext {
    /// Context without any window
    pub fn headless() -> Self {
        Self { window: None }
    }

    /// Context with a 3D viewport and a node editor
    pub fn with_node_editor() -> Self {
        Self {
            window: Some(Window {
                screen: Screen {
                    areas: vec![Area::new(AreaKind::View3D), Area::new(AreaKind::NodeEditor)],
                },
            }),
        }
    }

    fn node_editor_index(&self) -> Result<usize, ContextError> {
        let window = self.window.as_ref().ok_or(ContextError::NoWindow)?;
        let (index, area) = window
            .screen
            .areas
            .iter()
            .enumerate()
            .find(|(_, a)| a.kind == AreaKind::NodeEditor)
            .ok_or(ContextError::NoNodeEditor)?;
        if !area.has_window_region() {
            return Err(ContextError::NoWindowRegion);
        }
        Ok(index)
    }

    /// Point the first node editor at `tree`
    pub fn bind_node_editor(&mut self, tree: TreeId) -> Result<EditorBinding, ContextError> {
        let index = self.node_editor_index()?;
        let area = self
            .window
            .as_mut()
            .and_then(|w| w.screen.areas.get_mut(index))
            .ok_or(ContextError::NoNodeEditor)?;
        let previous = area.node_tree.replace(tree);
        Ok(EditorBinding { area: index, previous })
    }

    /// Undo a binding made by [`EditorContext::bind_node_editor`]
    pub fn restore(&mut self, binding: EditorBinding) {
        if let Some(area) = self
            .window
            .as_mut()
            .and_then(|w| w.screen.areas.get_mut(binding.area))
        {
            area.node_tree = binding.previous;
        }
    }

    /// Whether a node editor with a drawing region currently shows `tree`
    pub fn shows_tree(&self, tree: TreeId) -> bool {
        self.window.as_ref().is_some_and(|w| {
            w.screen.areas.iter().any(|a| {
                a.kind == AreaKind::NodeEditor && a.has_window_region() && a.node_tree == Some(tree)
            })
        })
    }
}

/// Missing pieces of editor context
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// No window available
    #[error("No window available")]
    NoWindow,

    /// No node editor area on the screen
    #[error("No node editor area found on the screen")]
    NoNodeEditor,

    /// Node editor area without a drawing region
    #[error("Node editor area has no window region")]
    NoWindowRegion,
}
