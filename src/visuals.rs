//! Visual attributes for nodes and particles.
//!
//! Colors are kept in HSB (hue in degrees, saturation and brightness 0-100)
//! until upload, where they become linear RGBA in the `#[repr(C)]` vertex
//! types below.
//!
//! A particle's tint follows its progress `t` along the current edge:
//!
//! | Edge | Hue | Saturation |
//! |------|-----|------------|
//! | toward the hub | source hue | fades to 0 |
//! | away from the hub | target hue | rises from 0 |
//! | otherwise | source → target | constant |
//!
//! so particles bleach as they approach the white hub and take on color as
//! they leave it.
//!
//! # Usage
//!
//! ```ignore
//! let frame = sim.snapshot();
//! let vertices: Vec<ParticleVertex> = frame.particle_vertices();
//! queue.write_buffer(&buffer, 0, bytemuck::cast_slice(&vertices));
//! ```

use crate::config::GraphConfig;
use crate::graph::{Graph, Node, NodeTier};
use crate::particle::Particle;
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4};

/// Highest particle opacity, at full lifetime.
pub const MAX_ALPHA: f32 = 0.9;

/// A color in HSB space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsb {
    /// Degrees, any range; wrapped on conversion.
    pub hue: f32,
    /// 0-100.
    pub saturation: f32,
    /// 0-100.
    pub brightness: f32,
}

impl Hsb {
    pub const WHITE: Hsb = Hsb {
        hue: 0.0,
        saturation: 0.0,
        brightness: 100.0,
    };

    pub fn new(hue: f32, saturation: f32, brightness: f32) -> Self {
        Self {
            hue,
            saturation,
            brightness,
        }
    }

    /// Convert to RGB in `[0, 1]`.
    pub fn to_rgb(self) -> Vec3 {
        let h = self.hue.rem_euclid(360.0) / 60.0;
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let v = (self.brightness / 100.0).clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = v - c;
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        Vec3::new(r + m, g + m, b + m)
    }
}

/// Hue of color group `group`. Groups beyond the palette wrap around.
pub fn group_hue(group: usize, config: &GraphConfig) -> f32 {
    if config.hues.is_empty() {
        return 0.0;
    }
    config.hues[group % config.hues.len()]
}

/// Full-brightness color of a node. The hub is white.
pub fn node_color(node: &Node) -> Hsb {
    match node.tier() {
        NodeTier::Hub => Hsb::WHITE,
        _ => Hsb::new(node.hue(), node.saturation(), 100.0),
    }
}

/// Tint of a particle at its current position along its edge.
pub fn particle_tint(graph: &Graph, particle: &Particle, config: &GraphConfig) -> Hsb {
    let edge = graph.edge(particle.edge());
    let t = graph.edge_progress(particle.edge(), particle.position());
    let saturation = config.saturation;

    if graph.node(edge.target()).is_hub() {
        Hsb::new(particle.source_hue(), saturation * (1.0 - t), 100.0)
    } else if graph.node(edge.source()).is_hub() {
        Hsb::new(particle.target_hue(), saturation * t, 100.0)
    } else {
        let hue = particle.source_hue() + (particle.target_hue() - particle.source_hue()) * t;
        Hsb::new(hue, saturation, 100.0)
    }
}

/// Opacity from the share of lifetime left.
pub fn particle_alpha(particle: &Particle) -> f32 {
    if particle.max_lifetime() <= 0.0 {
        return 0.0;
    }
    MAX_ALPHA * (particle.lifetime() / particle.max_lifetime()).clamp(0.0, 1.0)
}

// ========== GPU vertex types ==========

/// One node, ready for an instanced circle draw.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct NodeVertex {
    pub position: [f32; 2],
    pub size: f32,
    pub _pad: f32,
    pub color: [f32; 4],
}

impl NodeVertex {
    /// An opaque node vertex.
    pub fn new(position: Vec2, size: f32, color: Hsb) -> Self {
        Self {
            position: position.to_array(),
            size,
            _pad: 0.0,
            color: color.to_rgb().extend(1.0).to_array(),
        }
    }
}

/// One particle point.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl ParticleVertex {
    pub fn new(position: Vec2, color: Vec4) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParticleConfig;
    use crate::graph::{Drift, EdgeId};

    #[test]
    fn test_hsb_primaries() {
        assert!((Hsb::new(0.0, 100.0, 100.0).to_rgb() - Vec3::X).length() < 1e-5);
        assert!((Hsb::new(120.0, 100.0, 100.0).to_rgb() - Vec3::Y).length() < 1e-5);
        assert!((Hsb::new(240.0, 100.0, 100.0).to_rgb() - Vec3::Z).length() < 1e-5);
        assert!((Hsb::new(360.0, 100.0, 100.0).to_rgb() - Vec3::X).length() < 1e-5);
        assert_eq!(Hsb::WHITE.to_rgb(), Vec3::ONE);
    }

    #[test]
    fn test_group_hue_wraps() {
        let config = GraphConfig::default();
        assert_eq!(group_hue(0, &config), config.hues[0]);
        assert_eq!(group_hue(config.hues.len() + 2, &config), config.hues[2]);
    }

    /// hub - mini - regular in a line, linked both ways.
    fn chain() -> (Graph, [EdgeId; 4]) {
        let config = GraphConfig::default();
        let mut graph = Graph::new();
        let hub = graph.add_node(NodeTier::Hub, None, Vec2::ZERO, Drift::STILL, 40.0, 0.0, 0.0);
        let mini = graph.add_node(NodeTier::Minihub, Some(0), Vec2::new(100.0, 0.0), Drift::STILL, 15.0, 120.0, 90.0);
        let reg = graph.add_node(NodeTier::Regular, Some(0), Vec2::new(200.0, 0.0), Drift::STILL, 5.0, 200.0, 90.0);
        let (hm, mh) = graph.link(hub, mini, &config);
        let (mr, rm) = graph.link(mini, reg, &config);
        (graph, [hm, mh, mr, rm])
    }

    fn at(graph: &Graph, edge: EdgeId, t: f32) -> Particle {
        let mut p = Particle::spawn(graph, edge, 100.0, &ParticleConfig::default());
        let (a, b) = graph.endpoints(edge);
        p.position = a.lerp(b, t);
        p
    }

    #[test]
    fn test_tint_toward_hub_bleaches() {
        let config = GraphConfig::default();
        let (graph, [_, mh, _, _]) = chain();
        let start = particle_tint(&graph, &at(&graph, mh, 0.0), &config);
        let end = particle_tint(&graph, &at(&graph, mh, 1.0), &config);
        assert_eq!(start.hue, 120.0);
        assert!((start.saturation - config.saturation).abs() < 1e-4);
        assert!(end.saturation.abs() < 1e-4);
    }

    #[test]
    fn test_tint_from_hub_colors_in() {
        let config = GraphConfig::default();
        let (graph, [hm, ..]) = chain();
        let mid = particle_tint(&graph, &at(&graph, hm, 0.5), &config);
        assert_eq!(mid.hue, 120.0);
        assert!((mid.saturation - config.saturation / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_tint_between_regular_nodes_blends_hue() {
        let config = GraphConfig::default();
        let (graph, [_, _, mr, _]) = chain();
        let mid = particle_tint(&graph, &at(&graph, mr, 0.5), &config);
        assert!((mid.hue - 160.0).abs() < 1e-3);
        assert_eq!(mid.saturation, config.saturation);
    }

    #[test]
    fn test_alpha_tracks_lifetime() {
        let (graph, [hm, ..]) = chain();
        let mut p = at(&graph, hm, 0.0);
        assert!((particle_alpha(&p) - MAX_ALPHA).abs() < 1e-6);
        p.age(50.0);
        assert!((particle_alpha(&p) - MAX_ALPHA / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_vertices_are_pod() {
        let (graph, _) = chain();
        let vertices: Vec<NodeVertex> = graph
            .nodes()
            .iter()
            .map(|n| NodeVertex::new(n.position(), n.size(), node_color(n)))
            .collect();
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);
        assert_eq!(bytes.len(), vertices.len() * std::mem::size_of::<NodeVertex>());
        assert_eq!(vertices[0].color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(std::mem::size_of::<ParticleVertex>(), 24);
    }
}
