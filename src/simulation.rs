//! The simulation aggregate and its per-tick pipeline.
//!
//! One [`Simulation`] owns the graph, the particle pool, the perturbation
//! field, the pending input and the random source. [`Simulation::step`] runs
//! one tick, in this order:
//!
//! 1. clock and global rotation;
//! 2. node motion (on its cadence);
//! 3. edge direction refresh (on its cadence, always after motion);
//! 4. particles steer, integrate, feel the boundary and route;
//! 5. queued interaction events are applied, then perturbation forces and bursts;
//! 6. dead particles are compacted out, and the hard cap is enforced on its cadence;
//! 7. regular spawns are sampled and every queued spawn is admitted.
//!
//! # Example
//!
//! ```ignore
//! use nodeflow::prelude::*;
//!
//! let viewport = Vec2::new(1280.0, 720.0);
//! let mut sim = Simulation::new(FlowConfig::default(), viewport, 42)?;
//! loop {
//!     sim.step(TickInput::new(viewport));
//!     draw(&sim.snapshot());
//! }
//! ```

use crate::builder;
use crate::config::FlowConfig;
use crate::error::{ConfigError, Result};
use crate::graph::{Graph, NodeId};
use crate::input::{self, Input, InteractionEvent, InteractionPhase};
use crate::motion;
use crate::particle::{Particle, StepContext};
use crate::perturbation::PerturbationField;
use crate::pool::{ParticlePool, PoolStats};
use crate::snapshot::Snapshot;
use crate::spawn::{SpawnQueue, SpawnRng};
use crate::time::TickClock;
use glam::Vec2;
use std::f32::consts::TAU;

/// Host input for one tick.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Current viewport width and height.
    pub viewport: Vec2,
    /// Pointer events since the last tick, oldest first.
    pub events: Vec<InteractionEvent>,
}

impl TickInput {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            viewport,
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, event: InteractionEvent) -> Self {
        self.events.push(event);
        self
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub tick: u64,
    /// Live particles at the end of the tick.
    pub population: usize,
    /// Particles stepped.
    pub processed: usize,
    pub died: usize,
    /// Removed by the hard cap.
    pub truncated: usize,
    /// Particles created (regular and burst).
    pub spawned: usize,
    /// Burst requests queued by perturbation points.
    pub bursts: usize,
    pub perturbations: usize,
}

/// A particle-flow simulation over a drifting, weighted graph.
pub struct Simulation {
    config: FlowConfig,
    viewport: Vec2,
    seed: u64,
    rng: SpawnRng,
    clock: TickClock,
    /// Global render rotation (radians, wrapped to `[0, TAU)`).
    rotation: f32,
    graph: Graph,
    pool: ParticlePool,
    field: PerturbationField,
    input: Input,
    queue: SpawnQueue,
    last: TickStats,
}

fn check_viewport(viewport: Vec2) -> std::result::Result<(), ConfigError> {
    for value in [viewport.x, viewport.y] {
        if !value.is_finite() {
            return Err(ConfigError::NotFinite { field: "viewport" });
        }
        if value <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "viewport",
                value,
            });
        }
    }
    Ok(())
}

impl Simulation {
    /// Validate `config`, build the topology centered in `viewport` and
    /// start with no particles.
    pub fn new(config: FlowConfig, viewport: Vec2, seed: u64) -> Result<Self> {
        config.validate()?;
        check_viewport(viewport)?;

        let mut rng = SpawnRng::new(seed);
        let graph = builder::build(&config, viewport * 0.5, &mut rng);
        let pool = ParticlePool::new(config.pool.capacity);

        tracing::info!(seed, capacity = config.pool.capacity, "simulation ready");
        Ok(Self {
            config,
            viewport,
            seed,
            rng,
            clock: TickClock::new(),
            rotation: 0.0,
            graph,
            pool,
            field: PerturbationField::new(),
            input: Input::new(),
            queue: SpawnQueue::new(),
            last: TickStats::default(),
        })
    }

    /// Rebuild the topology from the same seed and drop all particles,
    /// points and pending input.
    pub fn reset(&mut self) {
        self.rng = SpawnRng::new(self.seed);
        self.graph = builder::build(&self.config, self.viewport * 0.5, &mut self.rng);
        self.clock.reset();
        self.rotation = 0.0;
        self.pool.clear();
        self.field.clear();
        self.input.clear();
        self.queue.clear();
        self.last = TickStats::default();
        tracing::info!(seed = self.seed, "simulation reset");
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Live (and this tick's not yet compacted) particles, in spawn order.
    pub fn particles(&self) -> &[Particle] {
        self.pool.particles()
    }

    pub fn perturbations(&self) -> &PerturbationField {
        &self.field
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Counters of the most recent tick.
    pub fn stats(&self) -> TickStats {
        self.last
    }

    /// Running totals since creation or the last reset.
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    pub fn toggle_pause(&mut self) {
        self.clock.toggle_pause();
    }

    // ========== Interaction ==========

    /// Queue a pointer event for the next tick's perturbation phase.
    pub fn push_event(&mut self, event: InteractionEvent) {
        self.input.handle_event(event);
    }

    /// Scene position under a device point, undoing the current rotation.
    pub fn map_interaction_point(&self, device: Vec2) -> Vec2 {
        input::map_interaction_point(device, self.rotation, self.viewport)
    }

    /// Add a released perturbation point at a scene position.
    pub fn register_perturbation(&mut self, position: Vec2, pressure: f32) {
        self.field
            .register(position, pressure, &self.config.perturbation);
    }

    /// Spawn chance of `node` this tick: the base probability scaled by
    /// nearby perturbation points, capped at 1.
    pub fn node_spawn_probability(&self, node: NodeId) -> f32 {
        let position = self.graph.node(node).position();
        let multiplier = self
            .field
            .spawn_multiplier(position, &self.config.perturbation);
        (self.config.pool.spawn_probability * multiplier).min(1.0)
    }

    /// Capture everything a renderer needs for this frame.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(
            self.clock.tick(),
            self.rotation,
            &self.graph,
            self.pool.particles(),
            &self.field,
            &self.config,
        )
    }

    // ========== Stepping ==========

    /// Run one tick. While paused, events are queued but nothing moves.
    pub fn step(&mut self, input: TickInput) -> TickStats {
        if check_viewport(input.viewport).is_ok() {
            self.viewport = input.viewport;
        }
        self.input.begin_frame();
        for event in input.events {
            self.input.handle_event(event);
        }
        if !self.clock.advance() {
            return self.last;
        }

        self.rotation = (self.rotation + self.config.motion.rotation_speed).rem_euclid(TAU);

        let motion_cfg = &self.config.motion;
        if self.clock.every(motion_cfg.motion_interval) {
            motion::advance_nodes(&mut self.graph, motion_cfg, self.viewport * 0.5, &mut self.rng);
        }
        if self.clock.every(motion_cfg.edge_refresh_interval) {
            self.graph.refresh_directions();
        }

        let ctx = StepContext {
            graph: &self.graph,
            config: &self.config,
            viewport: self.viewport,
            steer: self.clock.every(self.config.particles.steer_interval),
        };
        let processed = self.pool.advance(&ctx, &mut self.rng);

        self.apply_events();
        self.field
            .apply_return(self.pool.particles_mut(), &self.graph, &self.config);
        self.field
            .apply_forces(self.pool.particles_mut(), &self.config, &mut self.rng);
        let bursts = self
            .field
            .request_bursts(&self.graph, &self.config, &mut self.rng, &mut self.queue);
        self.field.age(&self.config.perturbation);

        let died = self.pool.compact(processed);
        let truncated = if self.clock.every(self.config.pool.hard_cap_interval) {
            self.pool.enforce_hard_cap(&self.config.pool)
        } else {
            0
        };

        self.pool
            .sample_spawns(&self.graph, &self.config.pool, &mut self.rng, &mut self.queue);
        let spawned = self
            .pool
            .admit(&mut self.queue, &self.graph, &self.config, &mut self.rng);

        self.last = TickStats {
            tick: self.clock.tick(),
            population: self.pool.len(),
            processed,
            died,
            truncated,
            spawned,
            bursts,
            perturbations: self.field.len(),
        };
        tracing::debug!(
            tick = self.last.tick,
            population = self.last.population,
            died,
            spawned,
            bursts,
            "tick"
        );
        self.last
    }

    /// Turn queued pointer events into perturbation points.
    fn apply_events(&mut self) {
        let pc = &self.config.perturbation;
        for event in self.input.drain() {
            let scene = input::map_interaction_point(event.device, self.rotation, self.viewport);
            match event.phase {
                InteractionPhase::Start => self.field.press(scene, event.id, pc),
                InteractionPhase::Move => self.field.drag(scene, event.id, pc),
                InteractionPhase::End => self.field.release(event.id),
            }
        }
    }
}
