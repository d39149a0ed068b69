// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::document::TreeId;
use crate::port::{Port, PortDirection, PortId, PortType, PortValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Type identifiers the rewrite passes care about.
pub mod types {
    /// Node whose body is a nested tree
    pub const GROUP: &str = "group";
    /// Interior boundary node exposing the group's inputs
    pub const GROUP_INPUT: &str = "group_input";
    /// Interior boundary node collecting the group's outputs
    pub const GROUP_OUTPUT: &str = "group_output";
    /// Pure passthrough
    pub const REROUTE: &str = "reroute";
    /// Scalar constant
    pub const VALUE: &str = "value";
    /// Solid color source
    pub const RGB: &str = "rgb";
    /// Vector arithmetic
    pub const VECTOR_MATH: &str = "vector_math";
    /// UV map selector
    pub const UV_MAP: &str = "uv_map";
}

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node type category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Input nodes (constants, attributes)
    Input,
    /// Output nodes
    Output,
    /// Shader closures
    Shader,
    /// Texture operations
    Texture,
    /// Color operations
    Color,
    /// Vector operations
    Vector,
    /// Converters and math
    Converter,
    /// Groups, reroutes and other layout nodes
    Layout,
}

/// How the rewrite passes treat a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Has a nested tree
    Group,
    /// Passthrough with one input and one output
    Reroute,
    /// Group interior input boundary
    GroupInput,
    /// Group interior output boundary
    GroupOutput,
    /// Literal source (value, color, vector placeholder)
    Literal,
    /// Anything else
    Ordinary,
}

impl NodeKind {
    /// Classify a node type identifier
    pub fn from_type_id(type_id: &str) -> Self {
        match type_id {
            types::GROUP => Self::Group,
            types::REROUTE => Self::Reroute,
            types::GROUP_INPUT => Self::GroupInput,
            types::GROUP_OUTPUT => Self::GroupOutput,
            types::VALUE | types::RGB => Self::Literal,
            _ => Self::Ordinary,
        }
    }
}

/// Node type definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeType {
    /// Unique type identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Category
    pub category: NodeCategory,
    /// Description
    pub description: String,
    /// Default input ports
    pub inputs: Vec<Port>,
    /// Default output ports
    pub outputs: Vec<Port>,
}

/// A node instance in a tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Node type ID
    pub node_type: String,
    /// Unique name inside its tree
    pub name: String,
    /// Optional user-facing label
    #[serde(default)]
    pub label: String,
    /// Position in the editor
    pub position: [f32; 2],
    /// Input ports
    pub inputs: Vec<Port>,
    /// Output ports
    pub outputs: Vec<Port>,
    /// Selection flag
    #[serde(default)]
    pub selected: bool,
    /// Nested tree, group nodes only
    #[serde(default)]
    pub node_tree: Option<TreeId>,
    /// Type-specific settings (`operation`, `uv_map`, ...)
    #[serde(default)]
    pub properties: IndexMap<String, PortValue>,
}

impl Node {
    /// Create a new node from a type definition
    pub fn new(node_type: &NodeType) -> Self {
        Self {
            id: NodeId::new(),
            node_type: node_type.id.clone(),
            name: node_type.name.clone(),
            label: String::new(),
            position: [0.0, 0.0],
            inputs: node_type.inputs.iter().map(Port::with_fresh_id).collect(),
            outputs: node_type.outputs.iter().map(Port::with_fresh_id).collect(),
            selected: false,
            node_tree: None,
            properties: IndexMap::new(),
        }
    }

    fn bare(node_type: &str, name: &str, inputs: Vec<Port>, outputs: Vec<Port>) -> Self {
        Self {
            id: NodeId::new(),
            node_type: node_type.to_string(),
            name: name.to_string(),
            label: String::new(),
            position: [0.0, 0.0],
            inputs,
            outputs,
            selected: false,
            node_tree: None,
            properties: IndexMap::new(),
        }
    }

    /// A reroute node
    pub fn reroute() -> Self {
        Self::bare(
            types::REROUTE,
            "Reroute",
            vec![Port::input("Input", PortType::Any)],
            vec![Port::output("Output", PortType::Any)],
        )
    }

    /// Interior input boundary with the given output sockets
    pub fn group_input(outputs: Vec<Port>) -> Self {
        Self::bare(types::GROUP_INPUT, "Group Input", Vec::new(), outputs)
    }

    /// Interior output boundary with the given input sockets
    pub fn group_output(inputs: Vec<Port>) -> Self {
        Self::bare(types::GROUP_OUTPUT, "Group Output", inputs, Vec::new())
    }

    /// A group node referring to `tree`
    pub fn group(tree: TreeId, inputs: Vec<Port>, outputs: Vec<Port>) -> Self {
        let mut node = Self::bare(types::GROUP, "Group", inputs, outputs);
        node.node_tree = Some(tree);
        node
    }

    /// Set the position
    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.position = [x, y];
        self
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set a type-specific property
    pub fn with_property(mut self, key: impl Into<String>, value: PortValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Classify the node for the rewrite passes
    pub fn kind(&self) -> NodeKind {
        NodeKind::from_type_id(&self.node_type)
    }

    /// Whether this is a group node
    pub fn is_group(&self) -> bool {
        self.kind() == NodeKind::Group
    }

    /// Name with the label appended when one is set
    pub fn display_name(&self) -> String {
        if self.label.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.label)
        }
    }

    /// Get an input port by index
    pub fn input(&self, index: usize) -> Option<&Port> {
        self.inputs.get(index)
    }

    /// Get an output port by index
    pub fn output(&self, index: usize) -> Option<&Port> {
        self.outputs.get(index)
    }

    /// Get a port by ID
    pub fn port(&self, port_id: &PortId) -> Option<&Port> {
        self.inputs.iter().find(|p| p.id == *port_id)
            .or_else(|| self.outputs.iter().find(|p| p.id == *port_id))
    }

    /// Get a mutable port by ID
    pub fn port_mut(&mut self, port_id: &PortId) -> Option<&mut Port> {
        let Self { inputs, outputs, .. } = self;
        inputs.iter_mut().chain(outputs.iter_mut()).find(|p| p.id == *port_id)
    }

    /// Index of a port within its direction's list
    pub fn port_index(&self, port_id: &PortId) -> Option<(PortDirection, usize)> {
        if let Some(i) = self.inputs.iter().position(|p| p.id == *port_id) {
            return Some((PortDirection::Input, i));
        }
        self.outputs
            .iter()
            .position(|p| p.id == *port_id)
            .map(|i| (PortDirection::Output, i))
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Copy of this node with fresh node and port IDs, plus the old-to-new port mapping
    pub fn duplicate(&self) -> (Self, HashMap<PortId, PortId>) {
        let mut copy = self.clone();
        copy.id = NodeId::new();
        let mut mapping = HashMap::new();
        for port in copy.inputs.iter_mut().chain(copy.outputs.iter_mut()) {
            let fresh = PortId::new();
            mapping.insert(port.id, fresh);
            port.id = fresh;
        }
        (copy, mapping)
    }
}

/// Registry of available node types
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    /// Registered node types by ID
    types: IndexMap<String, NodeType>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Register a node type
    pub fn register(&mut self, node_type: NodeType) {
        self.types.insert(node_type.id.clone(), node_type);
    }

    /// Get a node type by ID
    pub fn get(&self, id: &str) -> Option<&NodeType> {
        self.types.get(id)
    }

    /// Create a node from a type ID
    pub fn create_node(&self, type_id: &str) -> Option<Node> {
        self.get(type_id).map(Node::new)
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
