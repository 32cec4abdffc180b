//! Node motion: differential orbital rotation plus bounded drift.
//!
//! Every non-hub node's rest anchor orbits the scene center. Inner nodes turn
//! faster than outer ones, blending linearly across a transition band:
//!
//! ```text
//! multiplier
//!   inner ─────┐
//!              └──────┐
//!                     └───── outer
//!         transition_start  transition_end      distance from center
//! ```
//!
//! On top of the anchor each node drifts: the drift length grows to
//! `drift_range` and shrinks back to zero while its phase turns slowly, with
//! a random kick to the phase every time it turns outward again.

use crate::config::MotionConfig;
use crate::graph::{Drift, Graph};
use crate::spawn::SpawnRng;
use glam::Vec2;

/// Rotation multiplier for an anchor `distance` away from the center.
pub fn rotation_multiplier(distance: f32, config: &MotionConfig) -> f32 {
    if distance < config.transition_start {
        config.inner_multiplier
    } else if distance > config.transition_end {
        config.outer_multiplier
    } else {
        let span = config.transition_end - config.transition_start;
        let t = if span > 0.0 {
            (distance - config.transition_start) / span
        } else {
            1.0
        };
        config.inner_multiplier + (config.outer_multiplier - config.inner_multiplier) * t
    }
}

/// Rotate `anchor` about `center` by the distance-dependent step.
pub fn rotate_anchor(anchor: Vec2, center: Vec2, config: &MotionConfig) -> Vec2 {
    let offset = anchor - center;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return anchor;
    }
    let angle = offset.y.atan2(offset.x) + config.rotation_speed * rotation_multiplier(distance, config);
    center + Vec2::from_angle(angle) * distance
}

/// One drift step: turn the phase, grow or shrink the amount, bounce at the bounds.
pub fn advance_drift(drift: &mut Drift, config: &MotionConfig, rng: &mut SpawnRng) {
    drift.phase += config.drift_phase_step;
    drift.amount += config.drift_rate * drift.direction * drift.speed;

    if drift.amount > config.drift_range {
        drift.direction = -1.0;
    } else if drift.amount < 0.0 {
        drift.direction = 1.0;
        drift.phase += rng.random_range(config.reversal_jitter_min, config.reversal_jitter_max);
    }
}

/// Advance every non-hub node: rotate its anchor, drift, and recompute its position.
pub fn advance_nodes(graph: &mut Graph, config: &MotionConfig, center: Vec2, rng: &mut SpawnRng) {
    for node in graph.nodes_mut().iter_mut().filter(|n| !n.is_hub()) {
        node.rest_anchor = rotate_anchor(node.rest_anchor, center, config);
        advance_drift(&mut node.drift, config, rng);
        node.position = node.rest_anchor + node.drift.offset();
    }
}
