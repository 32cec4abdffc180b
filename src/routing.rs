//! Weighted edge choice at node arrival.
//!
//! When a particle reaches the end of its edge it picks one of the node's
//! outgoing edges with probability proportional to edge weight. Edges that
//! lead straight back to where the particle came from are skipped unless
//! nothing else leaves the node.

use crate::config::ParticleConfig;
use crate::graph::{EdgeId, Graph, NodeId};
use crate::particle::{DeathCause, Particle, ParticleState};
use crate::spawn::SpawnRng;

/// Pick one item with probability proportional to its weight.
///
/// Draws `r` uniformly from `[0, total)` and returns the first item whose
/// cumulative weight reaches `r`. Returns `None` for an empty slice or when
/// every weight is zero.
pub fn pick_weighted<T: Copy>(items: &[(T, u32)], rng: &mut SpawnRng) -> Option<T> {
    let total: u64 = items.iter().map(|&(_, w)| w as u64).sum();
    if total == 0 {
        return None;
    }
    let r = rng.random_below(total as f64);
    let mut cumulative = 0.0;
    for &(item, weight) in items {
        if weight == 0 {
            continue;
        }
        cumulative += weight as f64;
        if cumulative >= r {
            return Some(item);
        }
    }
    items.iter().rev().find(|&&(_, w)| w > 0).map(|&(item, _)| item)
}

/// Outgoing edges of `at` with their weights, skipping edges back to `came_from`.
/// Falls back to every outgoing edge if the filter would leave none.
pub fn candidates(graph: &Graph, at: NodeId, came_from: NodeId) -> Vec<(EdgeId, u32)> {
    let outgoing = graph.node(at).outgoing();
    let forward: Vec<(EdgeId, u32)> = outgoing
        .iter()
        .map(|&id| (id, graph.edge(id)))
        .filter(|(_, e)| e.target() != came_from)
        .map(|(id, e)| (id, e.weight()))
        .collect();
    if !forward.is_empty() {
        return forward;
    }
    outgoing.iter().map(|&id| (id, graph.edge(id).weight())).collect()
}

/// Move a particle that arrived at `at` onto its next edge, or kill it.
///
/// Counts the hop first; a particle that reaches the hop limit or a node with
/// no way out dies here. Otherwise its velocity turns partway toward the new
/// edge and its colors switch to the new endpoints.
pub fn route(particle: &mut Particle, at: NodeId, graph: &Graph, config: &ParticleConfig, rng: &mut SpawnRng) {
    particle.hops += 1;
    if particle.hops >= particle.max_hops {
        particle.kill(DeathCause::HopLimit);
        return;
    }

    let came_from = graph.edge(particle.edge).source();
    let Some(next) = pick_weighted(&candidates(graph, at, came_from), rng) else {
        particle.kill(DeathCause::DeadEnd);
        return;
    };

    let edge = graph.edge(next);
    particle.edge = next;
    particle.source_hue = graph.node(edge.source()).hue();
    particle.target_hue = graph.node(edge.target()).hue();

    let desired = edge.direction() * config.max_speed * config.turn_speed_fraction;
    particle.velocity = particle.velocity.lerp(desired, config.turn_blend);
    particle.state = ParticleState::Traveling;
}
