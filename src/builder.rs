//! One-time topology construction.
//!
//! Layout, leaf-first:
//!
//! | Tier | Placement | Links |
//! |------|-----------|-------|
//! | Hub | scene center | ↔ every minihub |
//! | Minihub | fixed radius, middle of its group's sector | ↔ its group's regular nodes |
//! | Regular | blend of a hub-centered and a minihub-centered sample | ↔ nearest same-group regular nodes |
//!
//! Regular nodes are rejection-sampled against a minimum separation with no
//! retry limit. Neighbor search is quadratic per group, which is fine for a
//! graph built once.

use crate::config::FlowConfig;
use crate::graph::{Drift, Graph, NodeId, NodeTier};
use crate::spawn::SpawnRng;
use crate::visuals;
use glam::Vec2;
use std::f32::consts::TAU;

/// Rejections between progress messages while placing one node.
const REJECTION_REPORT_EVERY: u64 = 10_000;

/// Build the full node/edge topology around `center`.
///
/// `config` must already be validated.
pub fn build(config: &FlowConfig, center: Vec2, rng: &mut SpawnRng) -> Graph {
    let g = &config.graph;
    let mut graph = Graph::new();

    let hub = graph.add_node(NodeTier::Hub, None, center, Drift::STILL, g.hub_size, 0.0, 0.0);

    let groups = g.color_groups;
    let spread = TAU / groups as f32;
    let mut minihubs = Vec::with_capacity(groups);
    let mut members: Vec<Vec<NodeId>> = vec![Vec::with_capacity(g.regular_per_group); groups];

    for group in 0..groups {
        let base = spread * group as f32;
        let hue = visuals::group_hue(group, g);

        let minihub_pos = center + Vec2::from_angle(base + spread * 0.5) * g.minihub_radius;
        let drift = random_drift(config, rng);
        let minihub = graph.add_node(
            NodeTier::Minihub,
            Some(group),
            minihub_pos,
            drift,
            g.minihub_size,
            hue,
            g.saturation,
        );
        minihubs.push(minihub);

        for _ in 0..g.regular_per_group {
            let pos = place_regular(config, &graph, center, minihub_pos, base, spread, rng);
            let drift = random_drift(config, rng);
            let node = graph.add_node(
                NodeTier::Regular,
                Some(group),
                pos,
                drift,
                g.node_size,
                hue,
                g.saturation,
            );
            members[group].push(node);
        }
    }

    for &minihub in &minihubs {
        graph.link(hub, minihub, g);
    }

    for (group, &minihub) in minihubs.iter().enumerate() {
        for &node in &members[group] {
            graph.link(node, minihub, g);
        }
    }

    for group_nodes in &members {
        for &node in group_nodes {
            for neighbor in nearest_in_group(&graph, node, group_nodes, g.nearest_neighbors) {
                graph.link(node, neighbor, g);
            }
        }
    }

    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        groups,
        "built flow graph"
    );
    graph
}

fn random_drift(config: &FlowConfig, rng: &mut SpawnRng) -> Drift {
    Drift {
        phase: rng.angle(),
        amount: 0.0,
        direction: 1.0,
        speed: config.motion.drift_speed,
    }
}

/// Rejection-sample a regular node position until it clears every placed node.
fn place_regular(
    config: &FlowConfig,
    graph: &Graph,
    center: Vec2,
    minihub: Vec2,
    base: f32,
    spread: f32,
    rng: &mut SpawnRng,
) -> Vec2 {
    let g = &config.graph;
    let mut rejections: u64 = 0;
    loop {
        let blend = rng.random_range(g.blend_min, g.blend_max);

        let stray = spread * g.sector_fraction;
        let angle = base + rng.random_range(-stray, stray);
        let dist = g.min_radius + rng.random().sqrt() * (g.max_radius - g.min_radius);
        let hub_candidate = center + Vec2::from_angle(angle) * dist;

        let around = rng.random_range(g.minihub_spread_min, g.minihub_spread_max);
        let minihub_candidate = minihub + Vec2::from_angle(rng.angle()) * around;

        let candidate = hub_candidate.lerp(minihub_candidate, blend);
        let clear = graph
            .nodes()
            .iter()
            .all(|n| n.position().distance(candidate) >= g.min_separation);
        if clear {
            return candidate;
        }

        rejections += 1;
        if rejections % REJECTION_REPORT_EVERY == 0 {
            tracing::debug!(rejections, "still placing regular node");
        }
    }
}

/// Up to `k` nodes of `group` closest to `node`, nearest first. Equal
/// distances keep the group's order.
fn nearest_in_group(graph: &Graph, node: NodeId, group: &[NodeId], k: usize) -> Vec<NodeId> {
    let origin = graph.node(node).position();
    let mut ranked: Vec<(f32, NodeId)> = group
        .iter()
        .filter(|&&other| other != node)
        .map(|&other| (graph.node(other).position().distance(origin), other))
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranked.into_iter().take(k).map(|(_, id)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> FlowConfig {
        let mut config = FlowConfig::default();
        config.graph.color_groups = 3;
        config.graph.regular_per_group = 3;
        config
    }

    #[test]
    fn builds_expected_tiers() {
        let config = small_config();
        let mut rng = SpawnRng::new(11);
        let graph = build(&config, Vec2::new(400.0, 300.0), &mut rng);

        assert_eq!(graph.node_count(), config.graph.node_count());
        assert_eq!(graph.node_count(), 13);
        let hub = graph.node(graph.hub());
        assert!(hub.is_hub());
        assert_eq!(hub.position(), Vec2::new(400.0, 300.0));

        let minihubs = graph.nodes().iter().filter(|n| n.tier() == NodeTier::Minihub).count();
        let regular = graph.nodes().iter().filter(|n| n.tier() == NodeTier::Regular).count();
        assert_eq!(minihubs, 3);
        assert_eq!(regular, 9);
        assert!(graph.is_consistent());
    }

    #[test]
    fn edge_counts_match_construction() {
        let config = small_config();
        let mut rng = SpawnRng::new(5);
        let graph = build(&config, Vec2::ZERO, &mut rng);
        // hub<->minihub: 3*2, minihub<->regular: 9*2, neighbors: each of 9 nodes
        // links to its 2 same-group peers, both ways: 9*2*2.
        assert_eq!(graph.edge_count(), 6 + 18 + 36);
    }

    #[test]
    fn minihubs_sit_on_their_radius() {
        let config = small_config();
        let mut rng = SpawnRng::new(3);
        let graph = build(&config, Vec2::ZERO, &mut rng);
        for node in graph.nodes().iter().filter(|n| n.tier() == NodeTier::Minihub) {
            assert!((node.position().length() - config.graph.minihub_radius).abs() < 1e-3);
        }
    }

    #[test]
    fn nodes_respect_min_separation() {
        let config = FlowConfig::default();
        let mut rng = SpawnRng::new(99);
        let graph = build(&config, Vec2::ZERO, &mut rng);
        let nodes = graph.nodes();
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[..i] {
                if a.tier() == NodeTier::Regular {
                    assert!(a.position().distance(b.position()) >= config.graph.min_separation);
                }
            }
        }
    }

    #[test]
    fn regular_nodes_link_to_their_minihub_and_group() {
        let config = small_config();
        let mut rng = SpawnRng::new(21);
        let graph = build(&config, Vec2::ZERO, &mut rng);
        for node in graph.nodes().iter().filter(|n| n.tier() == NodeTier::Regular) {
            let targets: Vec<&crate::graph::Node> = node
                .outgoing()
                .iter()
                .map(|e| graph.node(graph.edge(*e).target()))
                .collect();
            assert!(targets.iter().any(|t| t.tier() == NodeTier::Minihub));
            assert!(targets.iter().all(|t| t.group() == node.group()));
        }
    }

    #[test]
    fn nearest_ties_keep_input_order() {
        let mut graph = Graph::new();
        let mk = |graph: &mut Graph, x: f32, y: f32| {
            graph.add_node(NodeTier::Regular, Some(0), Vec2::new(x, y), Drift::STILL, 5.0, 0.0, 90.0)
        };
        let origin = mk(&mut graph, 0.0, 0.0);
        let east = mk(&mut graph, 10.0, 0.0);
        let north = mk(&mut graph, 0.0, 10.0);
        let far = mk(&mut graph, 50.0, 0.0);
        let west = mk(&mut graph, -10.0, 0.0);
        let group = [origin, east, north, far, west];

        let picked = nearest_in_group(&graph, origin, &group, 3);
        assert_eq!(picked, vec![east, north, west]);
    }
}
