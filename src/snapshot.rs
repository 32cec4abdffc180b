//! Read-only view of one simulation state, for renderers.
//!
//! A [`Snapshot`] owns plain copies of everything a frame needs, so the
//! caller can hand it to another thread or serialize it while the
//! simulation keeps stepping.

use crate::config::{FlowConfig, GraphConfig};
use crate::graph::{Graph, NodeId, NodeTier};
use crate::particle::Particle;
use crate::perturbation::PerturbationField;
use crate::visuals::{self, Hsb, NodeVertex, ParticleVertex};
use glam::{Vec2, Vec4};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub id: NodeId,
    pub tier: NodeTier,
    pub position: Vec2,
    pub size: f32,
    pub color: Hsb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeView {
    pub from: Vec2,
    pub to: Vec2,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleView {
    pub position: Vec2,
    /// Recent positions, newest first.
    pub trail: Vec<Vec2>,
    pub tint: Hsb,
    pub alpha: f32,
    pub perturbed: bool,
}

impl ParticleView {
    /// Linear RGBA of this particle.
    pub fn color(&self) -> Vec4 {
        self.tint.to_rgb().extend(self.alpha)
    }
}

/// Interaction point as drawn: where and how far it reaches.
#[derive(Debug, Clone, PartialEq)]
pub struct PerturbationView {
    pub position: Vec2,
    pub radius: f32,
    pub pressure: f32,
    pub held: bool,
}

/// Everything drawn in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    /// Global rotation the scene is drawn with (radians).
    pub rotation: f32,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub particles: Vec<ParticleView>,
    pub perturbations: Vec<PerturbationView>,
}

impl Snapshot {
    pub(crate) fn capture(
        tick: u64,
        rotation: f32,
        graph: &Graph,
        particles: &[Particle],
        field: &PerturbationField,
        config: &FlowConfig,
    ) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|n| NodeView {
                id: n.id(),
                tier: n.tier(),
                position: n.position(),
                size: n.size(),
                color: visuals::node_color(n),
            })
            .collect();

        let edges = graph
            .edges()
            .iter()
            .map(|e| EdgeView {
                from: graph.node(e.source()).position(),
                to: graph.node(e.target()).position(),
                weight: e.weight(),
            })
            .collect();

        let particles = particles
            .iter()
            .filter(|p| p.is_alive())
            .map(|p| particle_view(graph, p, &config.graph))
            .collect();

        let perturbations = field
            .points()
            .map(|p| PerturbationView {
                position: p.position(),
                radius: p.influence_radius(&config.perturbation),
                pressure: p.pressure(),
                held: p.is_held(),
            })
            .collect();

        Self {
            tick,
            rotation,
            nodes,
            edges,
            particles,
            perturbations,
        }
    }

    /// Node vertices for GPU upload.
    pub fn node_vertices(&self) -> Vec<NodeVertex> {
        self.nodes
            .iter()
            .map(|n| NodeVertex::new(n.position, n.size, n.color))
            .collect()
    }

    /// Particle vertices for GPU upload.
    pub fn particle_vertices(&self) -> Vec<ParticleVertex> {
        self.particles
            .iter()
            .map(|p| ParticleVertex::new(p.position, p.color()))
            .collect()
    }
}

fn particle_view(graph: &Graph, particle: &Particle, config: &GraphConfig) -> ParticleView {
    ParticleView {
        position: particle.position(),
        trail: particle.trail().iter().collect(),
        tint: visuals::particle_tint(graph, particle, config),
        alpha: visuals::particle_alpha(particle),
        perturbed: particle.is_perturbed(),
    }
}
