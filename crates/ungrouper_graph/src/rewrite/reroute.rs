// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reroute bypass.
//!
//! Every reroute node is replaced by direct links from its upstream socket to
//! each of its consumers. A reroute without an incoming link carries nothing
//! and is simply removed along with its outgoing links.

use crate::connection::{Connection, Endpoint};
use crate::graph::Graph;
use crate::node::{types, NodeId};

/// Counts from a reduction run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RerouteReport {
    /// Reroute nodes removed
    pub removed: usize,
    /// Direct links created in their place
    pub relinked: usize,
    /// Passes needed to reach a tree without reroutes
    pub passes: usize,
}

/// Remove every reroute node from `graph`, rewiring consumers to the source.
///
/// Each reroute is resolved against whatever feeds it at the moment it is
/// removed, so chains collapse regardless of the order nodes are stored in.
/// The outer loop repeats until no reroute is left.
pub fn reduce_reroutes(graph: &mut Graph) -> RerouteReport {
    let mut report = RerouteReport::default();
    loop {
        let reroutes = graph.nodes_of_type(types::REROUTE);
        if reroutes.is_empty() {
            break;
        }
        report.passes += 1;
        for id in reroutes {
            report.relinked += bypass(graph, id);
            graph.remove_node(id);
            report.removed += 1;
        }
    }
    if report.removed > 0 {
        tracing::debug!(
            "Removed {} reroutes from {} ({} links rewired)",
            report.removed,
            graph.name,
            report.relinked
        );
    }
    report
}

fn bypass(graph: &mut Graph, id: NodeId) -> usize {
    let Some(node) = graph.node(id) else {
        return 0;
    };
    let (Some(input), Some(output)) = (node.input(0).map(|p| p.id), node.output(0).map(|p| p.id)) else {
        return 0;
    };

    let Some(upstream) = graph.connections_to(input).next().map(Connection::source) else {
        return 0;
    };
    let downstream: Vec<Endpoint> = graph.connections_from(output).map(Connection::target).collect();

    let mut relinked = 0;
    for target in downstream {
        match graph.link(upstream, target) {
            Ok(_) => relinked += 1,
            Err(e) => tracing::warn!("Dropped link through reroute {}: {}", graph.name, e),
        }
    }
    relinked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::material::create_shader_registry;
    use crate::node::Node;

    struct Fixture {
        graph: Graph,
        source: Endpoint,
    }

    fn fixture() -> Fixture {
        let registry = create_shader_registry();
        let mut graph = Graph::new("Interior");
        let node = registry.create_node("noise_texture").unwrap();
        let port = node.outputs[1].id;
        let id = graph.add_node(node);
        Fixture { graph, source: Endpoint::new(id, port) }
    }

    fn add_reroute(graph: &mut Graph) -> (NodeId, Endpoint, Endpoint) {
        let node = Node::reroute();
        let (input, output) = (node.inputs[0].id, node.outputs[0].id);
        let id = graph.add_node(node);
        (id, Endpoint::new(id, input), Endpoint::new(id, output))
    }

    fn add_consumer(graph: &mut Graph) -> Endpoint {
        let registry = create_shader_registry();
        let node = registry.create_node("mix_rgb").unwrap();
        let port = node.inputs[1].id;
        Endpoint::new(graph.add_node(node), port)
    }

    #[test]
    fn test_chain_collapses_to_one_link() {
        let Fixture { mut graph, source } = fixture();
        let consumer = add_consumer(&mut graph);

        // Build the chain back to front so storage order is downstream first
        let mut next = consumer;
        for _ in 0..4 {
            let (_, input, output) = add_reroute(&mut graph);
            graph.link(output, next).unwrap();
            next = input;
        }
        graph.link(source, next).unwrap();

        let report = reduce_reroutes(&mut graph);
        assert_eq!(report.removed, 4);
        assert!(graph.nodes_of_type(types::REROUTE).is_empty());
        assert_eq!(graph.connection_count(), 1);
        let link = graph.connections().next().unwrap();
        assert_eq!(link.source(), source);
        assert_eq!(link.target(), consumer);
    }

    #[test]
    fn test_fan_out_is_preserved() {
        let Fixture { mut graph, source } = fixture();
        let (_, input, output) = add_reroute(&mut graph);
        graph.link(source, input).unwrap();
        let consumers: Vec<Endpoint> = (0..3).map(|_| add_consumer(&mut graph)).collect();
        for consumer in &consumers {
            graph.link(output, *consumer).unwrap();
        }

        let report = reduce_reroutes(&mut graph);
        assert_eq!(report.relinked, 3);
        assert_eq!(graph.connection_count(), 3);
        for consumer in consumers {
            let links: Vec<_> = graph.connections_to(consumer.port).collect();
            assert_eq!(links.len(), 1);
            assert_eq!(links[0].source(), source);
        }
    }

    #[test]
    fn test_unlinked_reroute_is_dropped_without_new_links() {
        let Fixture { mut graph, .. } = fixture();
        let (reroute, _, output) = add_reroute(&mut graph);
        let consumer = add_consumer(&mut graph);
        graph.link(output, consumer).unwrap();

        let report = reduce_reroutes(&mut graph);
        assert_eq!(report, RerouteReport { removed: 1, relinked: 0, passes: 1 });
        assert!(graph.node(reroute).is_none());
        assert_eq!(graph.connection_count(), 0);
        assert!(!graph.is_linked(consumer.port));
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let Fixture { mut graph, source } = fixture();
        let (_, input, output) = add_reroute(&mut graph);
        let consumer = add_consumer(&mut graph);
        graph.link(source, input).unwrap();
        graph.link(output, consumer).unwrap();

        reduce_reroutes(&mut graph);
        let nodes = graph.node_count();
        let links: Vec<_> = graph.connections().map(|c| c.id).collect();

        assert_eq!(reduce_reroutes(&mut graph), RerouteReport::default());
        assert_eq!(graph.node_count(), nodes);
        assert_eq!(graph.connections().map(|c| c.id).collect::<Vec<_>>(), links);
    }
}
