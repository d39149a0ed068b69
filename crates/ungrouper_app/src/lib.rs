// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene Ungrouper
//!
//! Host-side plumbing around [`ungrouper_graph`]:
//! - Scene files with objects, material slots and node trees
//! - A modal operator that flattens one object's materials per timer tick
//! - The "Scene Ungrouper" sidebar panel
//! - Settings and command line handling for the headless runner

pub mod batch;
pub mod cli;
pub mod operator;
pub mod panel;
pub mod scene;
pub mod settings;
pub mod uv_fix;

pub use batch::{MaterialBatch, TickResult};
pub use operator::{HostEvent, OperatorError, OperatorResult, StatusChannel, TimerRegistry, UngroupSceneOperator};
pub use scene::{ObjectScope, Scene, SceneError};
pub use settings::UngrouperSettings;
