//! # Nodeflow - particles streaming across a drifting, weighted graph
//!
//! A hub, a ring of colored minihubs and clusters of regular nodes are
//! wired into a directed graph. Particles spawn at nodes, follow edges,
//! pick their next edge by weight at every node, and die when their
//! lifetime or hop budget runs out. The whole graph slowly rotates and
//! breathes; pointer input pushes particles aside and makes nearby nodes
//! burst.
//!
//! Nodeflow is a headless engine: it steps the simulation and hands back a
//! [`Snapshot`] (plus `bytemuck`-ready vertices) for whatever renderer the
//! host uses.
//!
//! ## Quick Start
//!
//! ```ignore
//! use nodeflow::prelude::*;
//!
//! fn main() -> nodeflow::Result<()> {
//!     let viewport = Vec2::new(1280.0, 720.0);
//!     let mut sim = Simulation::new(FlowConfig::default(), viewport, 42)?;
//!
//!     sim.push_event(InteractionEvent::start(Vec2::new(640.0, 360.0), 0));
//!     for _ in 0..600 {
//!         sim.step(TickInput::new(viewport));
//!     }
//!
//!     let frame = sim.snapshot();
//!     println!("{} particles", frame.particles.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Graph
//!
//! Built once by [`builder::build`] from [`GraphConfig`]. Nodes live in an
//! arena addressed by [`NodeId`]; edges refer to their endpoints by id and
//! carry a routing weight set by the target's tier (hub > minihub > regular).
//!
//! ### Particles
//!
//! Each [`Particle`] travels one edge at a time: it seeks along the edge,
//! gets pulled back if it strays, and routes on arrival. See
//! [`particle`] and [`routing`].
//!
//! ### Perturbation
//!
//! Pointer presses become [`PerturbationPoint`]s that repel particles and
//! raise nearby spawn rates, more strongly the longer they are held. See
//! [`perturbation`].
//!
//! ### Pool
//!
//! [`ParticlePool`] bounds the population: spawn gating, in-place
//! compaction of the dead, and a periodic hard cap.
//!
//! ## Configuration
//!
//! | Section | Controls |
//! |---------|----------|
//! | `graph` | layout, sizes, hues, routing weights |
//! | `motion` | rotation and drift |
//! | `particles` | steering, speed, lifetime, hops, trail |
//! | `boundary` | soft viewport containment |
//! | `perturbation` | interaction forces, pressure, bursts |
//! | `pool` | capacity, spawn cadence, hard cap |

pub mod boundary;
pub mod builder;
pub mod config;
pub mod error;
pub mod graph;
pub mod input;
pub mod motion;
pub mod particle;
pub mod perturbation;
pub mod pool;
pub mod routing;
mod simulation;
pub mod snapshot;
pub mod spawn;
pub mod time;
pub mod visuals;

pub use bytemuck;
pub use config::{
    BoundaryConfig, FlowConfig, GraphConfig, MotionConfig, ParticleConfig, PerturbationConfig, PoolConfig,
};
pub use error::{ConfigError, FlowError, Result};
pub use glam::{Vec2, Vec3, Vec4};
pub use graph::{Edge, EdgeId, Graph, Node, NodeId, NodeTier};
pub use input::{map_interaction_point, InteractionEvent, InteractionPhase};
pub use particle::{DeathCause, Particle, ParticleState};
pub use perturbation::{PerturbationField, PerturbationPoint};
pub use pool::{ParticlePool, PoolStats};
pub use simulation::{Simulation, TickInput, TickStats};
pub use snapshot::Snapshot;
pub use visuals::{NodeVertex, ParticleVertex};

/// Convenient re-exports for common usage.
///
/// # Usage
///
/// ```ignore
/// use nodeflow::prelude::*;
/// ```
///
/// This imports:
/// - [`Simulation`], [`TickInput`] - the engine and its per-tick input
/// - [`FlowConfig`] - the full configuration
/// - [`InteractionEvent`], [`InteractionPhase`] - pointer events
/// - [`Snapshot`] and the vertex types - renderer hand-off
/// - [`Vec2`] - glam vector type
pub mod prelude {
    pub use crate::config::FlowConfig;
    pub use crate::graph::{NodeId, NodeTier};
    pub use crate::input::{InteractionEvent, InteractionPhase};
    pub use crate::simulation::{Simulation, TickInput, TickStats};
    pub use crate::snapshot::Snapshot;
    pub use crate::visuals::{NodeVertex, ParticleVertex};
    pub use crate::Vec2;
}
