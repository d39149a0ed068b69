// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flattening a material tree until no group node is left.

use super::reroute::reduce_reroutes;
use super::synthesize::{synthesize_placeholders, synthesize_tree, SynthesisError};
use super::transform::{TransformError, UngroupTransform};
use super::walker::{GroupSite, GroupWalker};
use crate::context::{ContextError, EditorContext};
use crate::document::{Document, DocumentError, TreeId};
use crate::graph::ConnectionError;
use crate::graphs::material::create_shader_registry;
use crate::node::{NodeId, NodeRegistry};
use std::collections::HashSet;

/// Default bound on ungroup attempts per root tree
pub const DEFAULT_MAX_PASSES: usize = 4096;

/// Orchestrator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UngroupOptions {
    /// Upper bound on group nodes handled in one run
    pub max_passes: usize,
}

impl Default for UngroupOptions {
    fn default() -> Self {
        Self {
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

/// Where a group node ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    /// Found by the walker
    Discovered,
    /// Inputs patched and reroutes removed
    Prepared,
    /// Replaced by its interior
    Ungrouped,
    /// Left in place after an error
    UngroupFailed,
}

/// Why a group node could not be flattened
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GroupFailure {
    /// Placeholder synthesis failed
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// No usable editor surface
    #[error(transparent)]
    Context(#[from] ContextError),

    /// The ungroup operation rejected the state
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Selection or tree bookkeeping failed
    #[error(transparent)]
    Graph(#[from] ConnectionError),

    /// Tree lookup failed
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Record of one group node
#[derive(Debug, Clone, PartialEq)]
pub struct GroupOutcome {
    /// Where the node was found
    pub site: GroupSite,
    /// Node name and label
    pub name: String,
    /// Final state
    pub state: GroupState,
    /// Error for failed nodes
    pub failure: Option<GroupFailure>,
}

/// Totals from one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UngroupReport {
    /// Successful ungroup calls
    pub ungrouped: usize,
    /// Group nodes left in place
    pub failed: usize,
    /// Placeholder nodes created
    pub placeholders: usize,
    /// Reroute nodes removed
    pub reroutes_removed: usize,
    /// Per-node outcomes in processing order
    pub outcomes: Vec<GroupOutcome>,
}

/// Errors that abort a whole run
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UngroupError {
    /// Root tree not found
    #[error("Node tree not found: {0:?}")]
    TreeNotFound(TreeId),

    /// The fixpoint loop did not settle
    #[error("Gave up after {0} ungroup attempts")]
    PassLimit(usize),
}

/// Drives the walker, the input patching, the reroute bypass and the
/// ungroup transform until the root tree holds no group node.
pub struct Ungrouper<T> {
    registry: NodeRegistry,
    transform: T,
    options: UngroupOptions,
}

impl<T: UngroupTransform> Ungrouper<T> {
    /// Create an orchestrator around `transform` with the shader registry
    pub fn new(transform: T) -> Self {
        Self {
            registry: create_shader_registry(),
            transform,
            options: UngroupOptions::default(),
        }
    }

    /// Use a different node registry for placeholders
    pub fn with_registry(mut self, registry: NodeRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the options
    pub fn with_options(mut self, options: UngroupOptions) -> Self {
        self.options = options;
        self
    }

    /// The wrapped transform
    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Flatten every group node reachable from `root`.
    ///
    /// A node that fails is logged, recorded and skipped; the rest of the
    /// tree is still processed.
    pub fn run(
        &mut self,
        document: &mut Document,
        context: &mut EditorContext,
        root: TreeId,
    ) -> Result<UngroupReport, UngroupError> {
        if !document.contains(root) {
            return Err(UngroupError::TreeNotFound(root));
        }

        let mut report = UngroupReport::default();
        let mut failed: HashSet<NodeId> = HashSet::new();
        for _ in 0..self.options.max_passes {
            let Some(site) = GroupWalker::new(document, root).excluding(&failed).next() else {
                return Ok(report);
            };

            let outcome = self.process(document, context, site, &mut report);
            match outcome.state {
                GroupState::Ungrouped => report.ungrouped += 1,
                _ => {
                    failed.insert(site.node);
                    report.failed += 1;
                }
            }
            report.outcomes.push(outcome);
        }

        // One more look: the last pass may have finished the job
        if GroupWalker::new(document, root).excluding(&failed).next().is_none() {
            return Ok(report);
        }
        Err(UngroupError::PassLimit(self.options.max_passes))
    }

    fn process(
        &mut self,
        document: &mut Document,
        context: &mut EditorContext,
        site: GroupSite,
        report: &mut UngroupReport,
    ) -> GroupOutcome {
        let name = document
            .tree(site.tree)
            .and_then(|g| g.node(site.node))
            .map(|n| n.display_name())
            .unwrap_or_default();
        tracing::debug!("Group node name: {}", name);

        let mut outcome = GroupOutcome {
            site,
            name,
            state: GroupState::Discovered,
            failure: None,
        };

        let result = match self.prepare(document, site, report) {
            Ok(()) => {
                outcome.state = GroupState::Prepared;
                self.flatten(document, context, site)
            }
            Err(failure) => Err(failure),
        };

        match result {
            Ok(()) => outcome.state = GroupState::Ungrouped,
            Err(failure) => {
                tracing::error!("Failed to ungroup node {}: {}", outcome.name, failure);
                outcome.state = GroupState::UngroupFailed;
                outcome.failure = Some(failure);
            }
        }
        outcome
    }

    fn prepare(
        &self,
        document: &mut Document,
        site: GroupSite,
        report: &mut UngroupReport,
    ) -> Result<(), GroupFailure> {
        let graph = document
            .tree_mut(site.tree)
            .ok_or(DocumentError::TreeNotFound(site.tree))?;
        graph.set_active(Some(site.node))?;

        let own = synthesize_placeholders(graph, &self.registry, site.node)?;
        report.placeholders += own.created;

        let interior = graph.node(site.node).and_then(|n| n.node_tree);
        if let Some(interior) = interior {
            let nested = synthesize_tree(document, &self.registry, interior)?;
            report.placeholders += nested.created;

            let inner = document
                .tree_mut(interior)
                .ok_or(DocumentError::TreeNotFound(interior))?;
            report.reroutes_removed += reduce_reroutes(inner).removed;
        }
        Ok(())
    }

    fn flatten(
        &mut self,
        document: &mut Document,
        context: &mut EditorContext,
        site: GroupSite,
    ) -> Result<(), GroupFailure> {
        // Splicing an interior that holds this tree would copy the group back in
        let interior = document
            .tree(site.tree)
            .and_then(|g| g.node(site.node))
            .and_then(|n| n.node_tree);
        if interior.is_some_and(|inner| document.reaches(inner, site.tree)) {
            return Err(TransformError::RecursiveGroup(site.node).into());
        }

        let binding = context.bind_node_editor(site.tree)?;
        let result = self.transform.ungroup(document, context, site.tree);
        context.restore(binding);
        result?;

        // A transform that reports success must actually remove the node
        let still_there = document
            .tree(site.tree)
            .is_some_and(|g| g.node(site.node).is_some());
        if still_there {
            return Err(TransformError::Rejected("group node still present".to_string()).into());
        }
        Ok(())
    }
}
