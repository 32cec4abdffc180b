//! Configuration types for nodeflow simulations.
//!
//! Every tuning value the engine reads lives here, grouped by the component
//! that consumes it. Configurations serialize to JSON and may be partial:
//! missing sections and fields fall back to their defaults.
//!
//! ```ignore
//! let mut config = FlowConfig::default();
//! config.graph.color_groups = 3;
//! config.graph.regular_per_group = 3;
//! config.save("three_groups.json")?;
//! ```
//!
//! [`FlowConfig::validate`] runs before any topology is built, so a bad value
//! fails initialization instead of producing a degenerate graph.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Largest trail the fixed ring buffer in [`Trail`](crate::particle::Trail) holds.
pub const MAX_TRAIL_LENGTH: usize = 16;

/// Default hue per color group (degrees), red through pink.
pub const DEFAULT_HUES: [f32; 14] = [
    0.0, 20.0, 30.0, 45.0, 60.0, 90.0, 120.0, 180.0, 210.0, 240.0, 260.0, 280.0, 300.0, 330.0,
];

/// Complete simulation configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlowConfig {
    pub graph: GraphConfig,
    pub motion: MotionConfig,
    pub particles: ParticleConfig,
    pub boundary: BoundaryConfig,
    pub perturbation: PerturbationConfig,
    pub pool: PoolConfig,
}

/// Topology and node placement.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphConfig {
    /// Number of color groups; one minihub each.
    pub color_groups: usize,
    /// Regular nodes placed around each minihub.
    pub regular_per_group: usize,
    /// Hue (degrees) per group. Groups beyond the list wrap around.
    pub hues: Vec<f32>,
    /// Saturation of non-hub nodes (0-100).
    pub saturation: f32,
    /// Distance of each minihub from the scene center.
    pub minihub_radius: f32,
    /// Inner edge of the hub-centered placement annulus.
    pub min_radius: f32,
    /// Outer edge of the hub-centered placement annulus.
    pub max_radius: f32,
    /// Distance range of the minihub-centered placement candidate.
    pub minihub_spread_min: f32,
    pub minihub_spread_max: f32,
    /// Range of the hub/minihub blend factor.
    pub blend_min: f32,
    pub blend_max: f32,
    /// Fraction of the group's angular sector a regular node may stray by.
    pub sector_fraction: f32,
    /// Minimum distance between any two nodes.
    pub min_separation: f32,
    /// Same-group neighbors each regular node links to.
    pub nearest_neighbors: usize,
    pub hub_size: f32,
    pub minihub_size: f32,
    pub node_size: f32,
    /// Routing weight of edges pointing at the hub.
    pub hub_weight: u32,
    /// Routing weight of edges pointing at a minihub.
    pub minihub_weight: u32,
    /// Routing weight of edges pointing at a regular node.
    pub regular_weight: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            color_groups: 14,
            regular_per_group: 7,
            hues: DEFAULT_HUES.to_vec(),
            saturation: 90.0,
            minihub_radius: 70.0,
            min_radius: 150.0,
            max_radius: 320.0,
            minihub_spread_min: 30.0,
            minihub_spread_max: 80.0,
            blend_min: 0.3,
            blend_max: 0.7,
            sector_fraction: 0.4,
            min_separation: 12.5,
            nearest_neighbors: 4,
            hub_size: 40.0,
            minihub_size: 15.0,
            node_size: 5.0,
            hub_weight: 4,
            minihub_weight: 2,
            regular_weight: 1,
        }
    }
}

impl GraphConfig {
    /// Total nodes the builder will place: hub, minihubs, regular nodes.
    pub fn node_count(&self) -> usize {
        1 + self.color_groups * (1 + self.regular_per_group)
    }
}

/// Differential rotation and drift of node anchors.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    /// Global rotation per tick (radians); also the base anchor rotation step.
    pub rotation_speed: f32,
    /// Rotation multiplier inside `transition_start`.
    pub inner_multiplier: f32,
    /// Rotation multiplier beyond `transition_end`.
    pub outer_multiplier: f32,
    pub transition_start: f32,
    pub transition_end: f32,
    /// Node motion runs every `motion_interval` ticks.
    pub motion_interval: u64,
    /// Edge directions refresh every `edge_refresh_interval` ticks.
    pub edge_refresh_interval: u64,
    pub drift_speed: f32,
    /// Largest drift offset from the rest anchor.
    pub drift_range: f32,
    /// Drift amount change per motion step, before `drift_speed`.
    pub drift_rate: f32,
    /// Drift phase change per motion step (radians).
    pub drift_phase_step: f32,
    /// Random phase kick applied when drift turns back outward.
    pub reversal_jitter_min: f32,
    pub reversal_jitter_max: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            rotation_speed: 0.0032,
            inner_multiplier: 1.5,
            outer_multiplier: 0.8,
            transition_start: 150.0,
            transition_end: 300.0,
            motion_interval: 2,
            edge_refresh_interval: 2,
            drift_speed: 1.6,
            drift_range: 15.0,
            drift_rate: 0.1,
            drift_phase_step: 0.02,
            reversal_jitter_min: 0.2,
            reversal_jitter_max: 0.5,
        }
    }
}

/// Particle steering, integration and routing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    /// Lifetime (ticks) of a regularly spawned particle.
    pub lifetime: f32,
    /// Lower bound of the lifetime drawn for burst particles.
    pub min_lifetime: f32,
    pub max_speed: f32,
    pub max_force: f32,
    pub initial_speed: f32,
    /// Velocity multiplier applied every tick (< 1).
    pub damping: f32,
    /// Fraction of `max_force` used to follow the edge direction.
    pub steer_scale: f32,
    /// Fraction of `max_force` used to pull back onto the edge.
    pub correction_scale: f32,
    /// Fraction of `edge_influence_radius` a particle may stray before correction.
    pub correction_threshold: f32,
    /// Upper bound on how much stronger the correction gets with distance.
    pub correction_max_boost: f32,
    pub edge_influence_radius: f32,
    pub node_influence_radius: f32,
    /// Fraction of `node_influence_radius` that counts as arrival.
    pub arrival_fraction: f32,
    /// Nodes a particle may pass before it dies.
    pub max_hops: u32,
    /// Speed (fraction of `max_speed`) the velocity bends toward after a turn.
    pub turn_speed_fraction: f32,
    /// How far the velocity bends toward the new edge (0 = not at all, 1 = snap).
    pub turn_blend: f32,
    /// Steering forces apply every `steer_interval` ticks.
    pub steer_interval: u64,
    /// Trail positions remembered per particle.
    pub trail_length: usize,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            lifetime: 1500.0,
            min_lifetime: 500.0,
            max_speed: 1.5,
            max_force: 0.05,
            initial_speed: 1.0,
            damping: 0.98,
            steer_scale: 0.8,
            correction_scale: 0.6,
            correction_threshold: 0.3,
            correction_max_boost: 3.0,
            edge_influence_radius: 25.0,
            node_influence_radius: 22.0,
            arrival_fraction: 0.5,
            max_hops: 3,
            turn_speed_fraction: 0.6,
            turn_blend: 0.4,
            steer_interval: 4,
            trail_length: 4,
        }
    }
}

impl ParticleConfig {
    /// Distance to the edge target that triggers routing.
    pub fn arrival_radius(&self) -> f32 {
        self.node_influence_radius * self.arrival_fraction
    }

    /// Distance from the edge beyond which the correction force kicks in.
    pub fn correction_distance(&self) -> f32 {
        self.edge_influence_radius * self.correction_threshold
    }
}

/// Soft containment near the viewport edges.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoundaryConfig {
    /// Width of the band along each viewport edge where containment applies.
    pub margin: f32,
    /// Inward force at full penetration.
    pub force: f32,
    /// Extra lifetime lost per tick at full penetration.
    pub fade_rate: f32,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            margin: 50.0,
            force: 0.4,
            fade_rate: 4.0,
        }
    }
}

/// Interaction points and the forces/spawns they cause.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PerturbationConfig {
    /// Active points kept; the oldest is evicted beyond this.
    pub max_points: usize,
    /// Events closer than this to a point update it instead of adding one.
    pub merge_radius: f32,
    /// Ticks a released point survives.
    pub ttl: f32,
    /// Repulsion radius at pressure 1.
    pub influence_radius: f32,
    /// Radial force next to the point at pressure 1.
    pub near_force: f32,
    /// Radial force at the rim of the influence radius at pressure 1.
    pub far_force: f32,
    /// Largest random jitter force.
    pub jitter: f32,
    /// Ticks a pushed particle spends being pulled back to its edge.
    pub return_ticks: u32,
    /// Fraction of `particles.max_force` used for the pull back.
    pub return_scale: f32,
    /// Pressure gained per held tick.
    pub pressure_growth: f32,
    /// Pressure ceiling.
    pub max_pressure: f32,
    /// Nodes within this distance of a point may burst.
    pub spawn_radius: f32,
    /// Spawn probability multiplier next to a point at pressure 1, minus one.
    pub spawn_boost: f32,
    /// Largest burst next to a point at pressure 1.
    pub burst_max: usize,
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self {
            max_points: 8,
            merge_radius: 30.0,
            ttl: 90.0,
            influence_radius: 120.0,
            near_force: 0.6,
            far_force: 0.05,
            jitter: 0.05,
            return_ticks: 45,
            return_scale: 1.2,
            pressure_growth: 0.02,
            max_pressure: 3.0,
            spawn_radius: 160.0,
            spawn_boost: 4.0,
            burst_max: 6,
        }
    }
}

/// Population budget and spawn cadence.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PoolConfig {
    /// Hard cap on live particles; also the per-tick processing cap.
    pub capacity: usize,
    /// Regular spawning only runs below this fraction of capacity.
    pub spawn_threshold: f32,
    /// Nodes sampled for spawning each tick (also limited to a third of all nodes).
    pub spawn_batch: usize,
    /// Chance a sampled node spawns a particle.
    pub spawn_probability: f32,
    /// Hard-cap enforcement runs every `hard_cap_interval` ticks.
    pub hard_cap_interval: u64,
    /// Enforcement triggers above this fraction of capacity...
    pub high_water: f32,
    /// ...and truncates down to this fraction.
    pub low_water: f32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: 1600,
            spawn_threshold: 0.8,
            spawn_batch: 20,
            spawn_probability: 0.08,
            hard_cap_interval: 30,
            high_water: 0.9,
            low_water: 0.7,
        }
    }
}

impl FlowConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: FlowConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value the engine relies on.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let g = &self.graph;
        count("graph.color_groups", g.color_groups)?;
        count("graph.regular_per_group", g.regular_per_group)?;
        count("graph.nearest_neighbors", g.nearest_neighbors)?;
        if g.hues.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        for hue in &g.hues {
            finite("graph.hues", *hue)?;
        }
        fraction("graph.saturation", g.saturation, 0.0, 100.0)?;
        positive("graph.minihub_radius", g.minihub_radius)?;
        non_negative("graph.min_radius", g.min_radius)?;
        positive("graph.max_radius", g.max_radius)?;
        ordered("graph.min_radius", g.min_radius, g.max_radius)?;
        non_negative("graph.minihub_spread_min", g.minihub_spread_min)?;
        positive("graph.minihub_spread_max", g.minihub_spread_max)?;
        ordered("graph.minihub_spread_min", g.minihub_spread_min, g.minihub_spread_max)?;
        fraction("graph.blend_min", g.blend_min, 0.0, 1.0)?;
        fraction("graph.blend_max", g.blend_max, 0.0, 1.0)?;
        ordered("graph.blend_min", g.blend_min, g.blend_max)?;
        fraction("graph.sector_fraction", g.sector_fraction, 0.0, 1.0)?;
        non_negative("graph.min_separation", g.min_separation)?;
        positive("graph.hub_size", g.hub_size)?;
        positive("graph.minihub_size", g.minihub_size)?;
        positive("graph.node_size", g.node_size)?;
        count("graph.hub_weight", g.hub_weight as usize)?;
        count("graph.minihub_weight", g.minihub_weight as usize)?;
        count("graph.regular_weight", g.regular_weight as usize)?;

        let m = &self.motion;
        non_negative("motion.rotation_speed", m.rotation_speed)?;
        non_negative("motion.inner_multiplier", m.inner_multiplier)?;
        non_negative("motion.outer_multiplier", m.outer_multiplier)?;
        non_negative("motion.transition_start", m.transition_start)?;
        positive("motion.transition_end", m.transition_end)?;
        ordered("motion.transition_start", m.transition_start, m.transition_end)?;
        count("motion.motion_interval", m.motion_interval as usize)?;
        count("motion.edge_refresh_interval", m.edge_refresh_interval as usize)?;
        non_negative("motion.drift_speed", m.drift_speed)?;
        non_negative("motion.drift_range", m.drift_range)?;
        non_negative("motion.drift_rate", m.drift_rate)?;
        finite("motion.drift_phase_step", m.drift_phase_step)?;
        non_negative("motion.reversal_jitter_min", m.reversal_jitter_min)?;
        ordered(
            "motion.reversal_jitter_min",
            m.reversal_jitter_min,
            m.reversal_jitter_max,
        )?;

        let p = &self.particles;
        positive("particles.lifetime", p.lifetime)?;
        positive("particles.min_lifetime", p.min_lifetime)?;
        ordered("particles.min_lifetime", p.min_lifetime, p.lifetime)?;
        positive("particles.max_speed", p.max_speed)?;
        positive("particles.max_force", p.max_force)?;
        non_negative("particles.initial_speed", p.initial_speed)?;
        fraction("particles.damping", p.damping, 0.0, 1.0)?;
        non_negative("particles.steer_scale", p.steer_scale)?;
        non_negative("particles.correction_scale", p.correction_scale)?;
        positive("particles.correction_threshold", p.correction_threshold)?;
        at_least_one("particles.correction_max_boost", p.correction_max_boost)?;
        positive("particles.edge_influence_radius", p.edge_influence_radius)?;
        positive("particles.node_influence_radius", p.node_influence_radius)?;
        fraction("particles.arrival_fraction", p.arrival_fraction, 0.0, 1.0)?;
        positive("particles.arrival_fraction", p.arrival_fraction)?;
        count("particles.max_hops", p.max_hops as usize)?;
        non_negative("particles.turn_speed_fraction", p.turn_speed_fraction)?;
        fraction("particles.turn_blend", p.turn_blend, 0.0, 1.0)?;
        count("particles.steer_interval", p.steer_interval as usize)?;
        count("particles.trail_length", p.trail_length)?;
        if p.trail_length > MAX_TRAIL_LENGTH {
            return Err(ConfigError::OutOfRange {
                field: "particles.trail_length",
                value: p.trail_length as f32,
                min: 1.0,
                max: MAX_TRAIL_LENGTH as f32,
            });
        }

        let b = &self.boundary;
        non_negative("boundary.margin", b.margin)?;
        non_negative("boundary.force", b.force)?;
        non_negative("boundary.fade_rate", b.fade_rate)?;

        let q = &self.perturbation;
        count("perturbation.max_points", q.max_points)?;
        non_negative("perturbation.merge_radius", q.merge_radius)?;
        positive("perturbation.ttl", q.ttl)?;
        positive("perturbation.influence_radius", q.influence_radius)?;
        non_negative("perturbation.near_force", q.near_force)?;
        non_negative("perturbation.far_force", q.far_force)?;
        non_negative("perturbation.jitter", q.jitter)?;
        non_negative("perturbation.return_scale", q.return_scale)?;
        non_negative("perturbation.pressure_growth", q.pressure_growth)?;
        at_least_one("perturbation.max_pressure", q.max_pressure)?;
        positive("perturbation.spawn_radius", q.spawn_radius)?;
        non_negative("perturbation.spawn_boost", q.spawn_boost)?;

        let pool = &self.pool;
        count("pool.capacity", pool.capacity)?;
        fraction("pool.spawn_threshold", pool.spawn_threshold, 0.0, 1.0)?;
        fraction("pool.spawn_probability", pool.spawn_probability, 0.0, 1.0)?;
        count("pool.hard_cap_interval", pool.hard_cap_interval as usize)?;
        fraction("pool.high_water", pool.high_water, 0.0, 1.0)?;
        fraction("pool.low_water", pool.low_water, 0.0, 1.0)?;
        ordered("pool.low_water", pool.low_water, pool.high_water)?;

        Ok(())
    }
}

fn count(field: &'static str, value: usize) -> std::result::Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroCount { field });
    }
    Ok(())
}

fn finite(field: &'static str, value: f32) -> std::result::Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { field });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> std::result::Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> std::result::Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

fn at_least_one(field: &'static str, value: f32) -> std::result::Result<(), ConfigError> {
    finite(field, value)?;
    if value < 1.0 {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min: 1.0,
            max: f32::MAX,
        });
    }
    Ok(())
}

fn fraction(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> std::result::Result<(), ConfigError> {
    finite(field, value)?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange { field, value, min, max });
    }
    Ok(())
}

fn ordered(field: &'static str, min: f32, max: f32) -> std::result::Result<(), ConfigError> {
    finite(field, max)?;
    if min > max {
        return Err(ConfigError::InvertedRange { field, min, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(FlowConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_node_count_matches_layout() {
        // 1 hub + 14 minihubs + 14 * 7 regular
        assert_eq!(GraphConfig::default().node_count(), 113);
    }

    #[test]
    fn zero_counts_are_rejected() {
        let mut config = FlowConfig::default();
        config.graph.regular_per_group = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCount { field: "graph.regular_per_group" })
        );

        let mut config = FlowConfig::default();
        config.pool.capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_radius_is_rejected() {
        let mut config = FlowConfig::default();
        config.graph.minihub_radius = -5.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "graph.minihub_radius", .. })
        ));

        let mut config = FlowConfig::default();
        config.graph.min_separation = -1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { .. })
        ));
    }

    #[test]
    fn nan_is_rejected() {
        let mut config = FlowConfig::default();
        config.particles.max_speed = f32::NAN;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "particles.max_speed" })
        );
    }

    #[test]
    fn infinite_ceilings_are_rejected() {
        let mut config = FlowConfig::default();
        config.perturbation.max_pressure = f32::INFINITY;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "perturbation.max_pressure" })
        );

        let mut config = FlowConfig::default();
        config.particles.correction_max_boost = f32::INFINITY;
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotFinite { field: "particles.correction_max_boost" })
        );

        let mut config = FlowConfig::default();
        config.perturbation.max_pressure = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { field: "perturbation.max_pressure", .. })
        ));
    }

    #[test]
    fn inverted_watermarks_are_rejected() {
        let mut config = FlowConfig::default();
        config.pool.low_water = 0.95;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange { field: "pool.low_water", .. })
        ));
    }

    #[test]
    fn oversized_trail_is_rejected() {
        let mut config = FlowConfig::default();
        config.particles.trail_length = MAX_TRAIL_LENGTH + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_palette_is_rejected() {
        let mut config = FlowConfig::default();
        config.graph.hues.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyPalette));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: FlowConfig =
            serde_json::from_str(r#"{ "pool": { "capacity": 64 } }"#).unwrap();
        assert_eq!(config.pool.capacity, 64);
        assert_eq!(config.pool.spawn_batch, PoolConfig::default().spawn_batch);
        assert_eq!(config.graph, GraphConfig::default());
    }

    #[test]
    fn json_roundtrip_preserves_values() {
        let mut config = FlowConfig::default();
        config.motion.rotation_speed = 0.0016;
        let json = serde_json::to_string(&config).unwrap();
        let back: FlowConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
