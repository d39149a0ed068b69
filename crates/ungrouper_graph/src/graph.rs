// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node tree containing nodes, links and the active-node cursor.

use crate::connection::{Connection, ConnectionId, Endpoint};
use crate::node::{Node, NodeId};
use crate::port::{PortDirection, PortId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Tree name
    pub name: String,
    /// Nodes in the tree
    nodes: IndexMap<NodeId, Node>,
    /// Links between nodes
    connections: IndexMap<ConnectionId, Connection>,
    /// The active node; at most one per tree
    #[serde(default)]
    active: Option<NodeId>,
}

impl Graph {
    /// Create a new empty tree
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
            active: None,
        }
    }

    /// Add a node to the tree
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node together with every link touching it
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|_, c| !c.involves_node(node_id));
        if self.active == Some(node_id) {
            self.active = None;
        }
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// IDs of every node with the given type identifier
    pub fn nodes_of_type(&self, type_id: &str) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.node_type == type_id)
            .map(|n| n.id)
            .collect()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add a link between ports
    pub fn connect(
        &mut self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
    ) -> Result<ConnectionId, ConnectionError> {
        let multi_connect = self.check_link(from_node, from_port, to_node, to_port)?;
        if !multi_connect && self.is_linked(to_port) {
            return Err(ConnectionError::PortAlreadyConnected(to_port));
        }
        Ok(self.insert_link(from_node, from_port, to_node, to_port))
    }

    /// Link two endpoints, replacing whatever currently feeds the input.
    ///
    /// The tree is left unchanged when the new link is invalid.
    pub fn link(&mut self, from: Endpoint, to: Endpoint) -> Result<ConnectionId, ConnectionError> {
        self.check_link(from.node, from.port, to.node, to.port)?;
        let existing: Vec<ConnectionId> = self.connections_to(to.port).map(|c| c.id).collect();
        for id in &existing {
            self.connections.shift_remove(id);
        }
        Ok(self.insert_link(from.node, from.port, to.node, to.port))
    }

    /// Validate a link without looking at existing ones; returns whether the
    /// target accepts several links
    fn check_link(
        &self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
    ) -> Result<bool, ConnectionError> {
        let source_node = self.nodes.get(&from_node)
            .ok_or(ConnectionError::NodeNotFound(from_node))?;
        let target_node = self.nodes.get(&to_node)
            .ok_or(ConnectionError::NodeNotFound(to_node))?;

        let source_port = source_node.port(&from_port)
            .ok_or(ConnectionError::PortNotFound(from_port))?;
        let target_port = target_node.port(&to_port)
            .ok_or(ConnectionError::PortNotFound(to_port))?;

        if source_port.direction != PortDirection::Output
            || target_port.direction != PortDirection::Input
        {
            return Err(ConnectionError::WrongDirection);
        }

        if !source_port.can_connect(target_port) {
            return Err(ConnectionError::IncompatiblePorts);
        }

        if from_node == to_node {
            return Err(ConnectionError::SelfLoop);
        }

        Ok(target_port.multi_connect)
    }

    fn insert_link(
        &mut self,
        from_node: NodeId,
        from_port: PortId,
        to_node: NodeId,
        to_port: PortId,
    ) -> ConnectionId {
        let connection = Connection::new(from_node, from_port, to_node, to_port);
        let id = connection.id;
        self.connections.insert(id, connection);
        id
    }

    /// Remove a link
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        self.connections.shift_remove(&connection_id)
    }

    /// Get all links
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get links leaving a specific port
    pub fn connections_from(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.from_port == port_id)
    }

    /// Get links arriving at a specific port
    pub fn connections_to(&self, port_id: PortId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.to_port == port_id)
    }

    /// Whether any link touches the port
    pub fn is_linked(&self, port_id: PortId) -> bool {
        self.connections.values().any(|c| c.involves_port(port_id))
    }

    /// Get the number of links
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The active node, if any
    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// Make `node_id` the only selected node and the active one.
    ///
    /// Passing `None` clears selection and the active cursor.
    pub fn set_active(&mut self, node_id: Option<NodeId>) -> Result<(), ConnectionError> {
        if let Some(id) = node_id {
            if !self.nodes.contains_key(&id) {
                return Err(ConnectionError::NodeNotFound(id));
            }
        }
        self.deselect_all();
        if let Some(node) = node_id.and_then(|id| self.nodes.get_mut(&id)) {
            node.selected = true;
        }
        self.active = node_id;
        Ok(())
    }

    /// Clear the selection flag on every node
    pub fn deselect_all(&mut self) {
        for node in self.nodes.values_mut() {
            node.selected = false;
        }
    }

    /// IDs of selected nodes
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.nodes.values().filter(|n| n.selected).map(|n| n.id).collect()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Shader Nodetree")
    }
}

/// Error when creating a link
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Port not found
    #[error("Port not found: {0:?}")]
    PortNotFound(PortId),

    /// Links must run from an output to an input
    #[error("Links must run from an output to an input")]
    WrongDirection,

    /// Incompatible port types
    #[error("Incompatible port types")]
    IncompatiblePorts,

    /// Port is already connected
    #[error("Port already connected: {0:?}")]
    PortAlreadyConnected(PortId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,
}
