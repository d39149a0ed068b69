// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader node graph model and group flattening.
//!
//! Some consumers of a material's node tree (exporters, renderers) cannot
//! follow group nodes. This crate rewrites a tree so that every group is
//! replaced by its interior while the shading result stays the same.
//!
//! ## Architecture
//!
//! - A [`Document`] owns every node tree; group nodes point at their
//!   interior by [`TreeId`]
//! - [`Graph`] provides the node, socket and link operations the rewrites use
//! - [`rewrite`] holds the rewrite passes and the [`Ungrouper`] that drives
//!   them against an [`UngroupTransform`]

pub mod node;
pub mod port;
pub mod connection;
pub mod graph;
pub mod document;
pub mod context;
pub mod graphs;
pub mod rewrite;

pub use node::{Node, NodeId, NodeKind, NodeType};
pub use port::{Port, PortId, PortType, PortDirection, PortValue};
pub use connection::{Connection, ConnectionId, Endpoint};
pub use graph::Graph;
pub use document::{Document, TreeId};
pub use context::EditorContext;
pub use rewrite::{SpliceUngroup, UngroupTransform, Ungrouper};
