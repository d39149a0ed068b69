// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rewrites that flatten group nodes out of a material tree.
//!
//! - [`synthesize`]: literal sources for unlinked group inputs
//! - [`reroute`]: bypass of passthrough reroute nodes
//! - [`walker`]: innermost-first enumeration of group nodes
//! - [`ungroup`]: the fixpoint loop tying them to an [`UngroupTransform`]

pub mod reroute;
pub mod splice;
pub mod synthesize;
pub mod transform;
pub mod ungroup;
pub mod walker;

pub use reroute::{reduce_reroutes, RerouteReport};
pub use splice::SpliceUngroup;
pub use synthesize::{synthesize_placeholders, synthesize_tree, SynthesisError, SynthesisReport};
pub use transform::{TransformError, UngroupTransform};
pub use ungroup::{
    GroupFailure, GroupOutcome, GroupState, UngroupError, UngroupOptions, UngroupReport, Ungrouper,
};
pub use walker::{GroupSite, GroupWalker};
