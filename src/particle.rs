//! Particle state, steering and integration.
//!
//! A particle always travels along exactly one edge. Each tick it:
//!
//! 1. checks its vitals (lifetime left, hop budget),
//! 2. steers toward the edge direction and, if it strayed, back onto the edge,
//! 3. integrates (bounded speed, damping),
//! 4. feels the soft boundary and ages,
//! 5. on reaching the edge target, routes onto a new edge or dies.
//!
//! ```text
//!            arrival                 picked edge
//! Traveling ─────────▶ Routing{at} ─────────────▶ Traveling
//!     │                    │
//!     │ lifetime ≤ 0       │ hop limit / dead end
//!     ▼                    ▼
//!   Dead(Expired|Faded)  Dead(HopLimit|DeadEnd)
//! ```

use crate::boundary;
use crate::config::{FlowConfig, ParticleConfig, MAX_TRAIL_LENGTH};
use crate::graph::{EdgeId, Graph, NodeId};
use crate::routing;
use crate::spawn::SpawnRng;
use glam::Vec2;

/// Why a particle died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// Lifetime ran out.
    Expired,
    /// Lifetime ran out while the boundary fade was eating into it.
    Faded,
    /// Passed the configured number of nodes.
    HopLimit,
    /// Arrived at a node with no outgoing edges.
    DeadEnd,
}

/// Where a particle is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleState {
    /// Integrating along the current edge.
    Traveling,
    /// Reached the current edge's target; a new edge is picked before the tick ends.
    Routing { at: NodeId },
    Dead(DeathCause),
}

/// Fixed-capacity ring buffer of recent positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trail {
    points: [Vec2; MAX_TRAIL_LENGTH],
    /// Slot of the newest point.
    head: usize,
    len: usize,
    capacity: usize,
}

impl Trail {
    /// A trail of `capacity` points (clamped to `1..=MAX_TRAIL_LENGTH`),
    /// filled with `start`.
    pub fn new(capacity: usize, start: Vec2) -> Self {
        let capacity = capacity.clamp(1, MAX_TRAIL_LENGTH);
        Self {
            points: [start; MAX_TRAIL_LENGTH],
            head: 0,
            len: capacity,
            capacity,
        }
    }

    /// Record a new position, overwriting the oldest once full.
    pub fn push(&mut self, point: Vec2) {
        self.head = (self.head + 1) % self.capacity;
        self.points[self.head] = point;
        self.len = (self.len + 1).min(self.capacity);
    }

    /// Positions from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.len).map(move |i| self.points[(self.head + self.capacity - i) % self.capacity])
    }

    pub fn newest(&self) -> Vec2 {
        self.points[self.head]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A particle flowing along the graph.
#[derive(Debug, Clone)]
pub struct Particle {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) acceleration: Vec2,
    pub(crate) edge: EdgeId,
    pub(crate) lifetime: f32,
    pub(crate) max_lifetime: f32,
    pub(crate) hops: u32,
    /// Hop budget captured at spawn.
    pub(crate) max_hops: u32,
    pub(crate) trail: Trail,
    pub(crate) perturbed: bool,
    pub(crate) return_timer: u32,
    pub(crate) source_hue: f32,
    pub(crate) target_hue: f32,
    pub(crate) state: ParticleState,
}

/// Shared read-only inputs for advancing particles within one tick.
pub struct StepContext<'a> {
    pub graph: &'a Graph,
    pub config: &'a FlowConfig,
    /// Viewport width and height.
    pub viewport: Vec2,
    /// Whether steering forces apply this tick.
    pub steer: bool,
}

impl Particle {
    /// A new particle at the source of `edge`, heading along it.
    pub fn spawn(graph: &Graph, edge: EdgeId, lifetime: f32, config: &ParticleConfig) -> Self {
        let e = graph.edge(edge);
        let source = graph.node(e.source());
        let target = graph.node(e.target());
        let position = source.position();
        Self {
            position,
            velocity: e.direction() * config.initial_speed,
            acceleration: Vec2::ZERO,
            edge,
            lifetime,
            max_lifetime: lifetime,
            hops: 0,
            max_hops: config.max_hops,
            trail: Trail::new(config.trail_length, position),
            perturbed: false,
            return_timer: 0,
            source_hue: source.hue(),
            target_hue: target.hue(),
            state: ParticleState::Traveling,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Forces accumulated since the last integration.
    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    /// The edge being travelled. Always an edge of the simulation's graph.
    pub fn edge(&self) -> EdgeId {
        self.edge
    }

    /// Ticks of life left.
    pub fn lifetime(&self) -> f32 {
        self.lifetime
    }

    /// Lifetime the particle was spawned with.
    pub fn max_lifetime(&self) -> f32 {
        self.max_lifetime
    }

    /// Nodes passed so far.
    pub fn hops(&self) -> u32 {
        self.hops
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn is_perturbed(&self) -> bool {
        self.perturbed
    }

    pub fn return_timer(&self) -> u32 {
        self.return_timer
    }

    pub fn source_hue(&self) -> f32 {
        self.source_hue
    }

    pub fn target_hue(&self) -> f32 {
        self.target_hue
    }

    pub fn state(&self) -> ParticleState {
        self.state
    }

    /// Hop budget the particle was spawned with.
    pub fn max_hops(&self) -> u32 {
        self.max_hops
    }

    /// False once dead, out of lifetime, or out of hops, even before the next
    /// [`check_vitals`](Self::check_vitals) records a cause.
    pub fn is_alive(&self) -> bool {
        !matches!(self.state, ParticleState::Dead(_)) && self.lifetime > 0.0 && self.hops < self.max_hops
    }

    pub(crate) fn kill(&mut self, cause: DeathCause) {
        self.state = ParticleState::Dead(cause);
    }

    #[inline]
    pub fn apply_force(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Kill the particle if its lifetime or hop budget is spent.
    /// Returns whether it is still alive.
    pub fn check_vitals(&mut self) -> bool {
        if matches!(self.state, ParticleState::Dead(_)) {
            return false;
        }
        if self.hops >= self.max_hops {
            self.kill(DeathCause::HopLimit);
        } else if self.lifetime <= 0.0 {
            self.kill(DeathCause::Expired);
        }
        self.is_alive()
    }

    /// Seek along the edge direction, plus a pull back onto the edge when the
    /// particle has strayed. The pull grows with distance, up to a bound.
    pub fn steer(&mut self, graph: &Graph, config: &ParticleConfig) {
        let mut force = graph.edge(self.edge).direction() * config.max_force * config.steer_scale;

        let threshold = config.correction_distance();
        let distance = graph.distance_to_edge(self.edge, self.position);
        if distance > threshold {
            let nearest = graph.nearest_point_on_edge(self.edge, self.position);
            let boost = (distance / threshold).clamp(1.0, config.correction_max_boost);
            force += (nearest - self.position).normalize_or_zero()
                * config.max_force
                * config.correction_scale
                * boost;
        }

        self.apply_force(force);
    }

    /// Apply accumulated forces with bounded speed and damping, then move.
    pub fn integrate(&mut self, config: &ParticleConfig) {
        self.trail.push(self.position);
        self.velocity += self.acceleration;
        self.velocity = self.velocity.clamp_length_max(config.max_speed);
        self.velocity *= config.damping;
        self.position += self.velocity;
        self.acceleration = Vec2::ZERO;
    }

    /// Lose `amount` ticks of lifetime. Lifetime never goes below zero.
    pub fn age(&mut self, amount: f32) {
        self.lifetime = (self.lifetime - amount.max(0.0)).max(0.0);
    }

    /// Switch to routing when close enough to the current edge's target.
    pub fn check_arrival(&mut self, graph: &Graph, config: &ParticleConfig) {
        let target = graph.edge(self.edge).target();
        if self.position.distance(graph.node(target).position()) < config.arrival_radius() {
            self.state = ParticleState::Routing { at: target };
        }
    }

    /// Flag as pushed off course; the return pull lasts `ticks`.
    pub fn mark_perturbed(&mut self, ticks: u32) {
        self.perturbed = true;
        self.return_timer = ticks;
    }

    /// While perturbed, pull toward the nearest point on the current edge and
    /// count the return timer down. Clears the flag when the timer runs out.
    pub fn pull_back(&mut self, graph: &Graph, strength: f32) {
        if !self.perturbed {
            return;
        }
        if self.return_timer == 0 {
            self.perturbed = false;
            return;
        }
        let nearest = graph.nearest_point_on_edge(self.edge, self.position);
        self.apply_force((nearest - self.position).normalize_or_zero() * strength);
        self.return_timer -= 1;
        if self.return_timer == 0 {
            self.perturbed = false;
        }
    }

    /// Advance one tick. Returns whether the particle is still alive.
    pub fn advance(&mut self, ctx: &StepContext<'_>, rng: &mut SpawnRng) -> bool {
        let config = &ctx.config.particles;
        if !self.check_vitals() {
            return false;
        }

        if ctx.steer {
            self.steer(ctx.graph, config);
        }
        self.integrate(config);

        let containment = boundary::contain(self.position, ctx.viewport, &ctx.config.boundary);
        self.apply_force(containment.force);
        self.age(1.0 + containment.penalty);
        if self.lifetime <= 0.0 {
            let cause = if containment.penalty > 0.0 {
                DeathCause::Faded
            } else {
                DeathCause::Expired
            };
            self.kill(cause);
            return false;
        }

        self.check_arrival(ctx.graph, config);
        if let ParticleState::Routing { at } = self.state {
            routing::route(self, at, ctx.graph, config, rng);
        }
        self.is_alive()
    }
}
