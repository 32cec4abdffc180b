//! Interaction points: local repulsion, return-to-path and spawn bursts.
//!
//! A [`PerturbationField`] holds a bounded FIFO of [`PerturbationPoint`]s.
//! Each point, while alive:
//!
//! - pushes nearby particles radially outward and marks them perturbed,
//! - raises the spawn chance of nearby nodes and queues bursts on success,
//! - grows in pressure while held, and counts its TTL down once released.
//!
//! Pressure scales everything a point does:
//!
//! ```text
//! pressure(held_ticks) = min(1 + pressure_growth * held_ticks, max_pressure)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut field = PerturbationField::new();
//! field.press(Vec2::new(300.0, 200.0), 1, &config.perturbation);
//! field.apply_forces(&mut particles, &config, &mut rng);
//! field.request_bursts(&graph, &config, &mut rng, &mut queue);
//! field.age(&config.perturbation);
//! ```

use crate::config::{FlowConfig, PerturbationConfig};
use crate::graph::Graph;
use crate::particle::Particle;
use crate::spawn::{SpawnKind, SpawnQueue, SpawnRequest, SpawnRng};
use glam::Vec2;
use std::collections::VecDeque;

/// Pressure after `held_ticks` ticks of holding. Monotonic and bounded.
pub fn pressure_curve(held_ticks: u32, config: &PerturbationConfig) -> f32 {
    (1.0 + config.pressure_growth * held_ticks as f32).min(config.max_pressure)
}

/// One active interaction point.
#[derive(Debug, Clone, PartialEq)]
pub struct PerturbationPoint {
    position: Vec2,
    ttl: f32,
    held_ticks: u32,
    pressure: f32,
    pointer: Option<u64>,
    held: bool,
}

impl PerturbationPoint {
    /// A released point. Negative pressure or TTL is raised to zero and NaN
    /// falls back to pressure 1 and `config.ttl`; pressure is capped at
    /// `config.max_pressure`.
    pub fn new(position: Vec2, pressure: f32, ttl: f32, config: &PerturbationConfig) -> Self {
        Self {
            position,
            ttl: sanitize(ttl, config.ttl, f32::INFINITY),
            held_ticks: 0,
            pressure: sanitize(pressure, 1.0, config.max_pressure),
            pointer: None,
            held: false,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Ticks left once released.
    pub fn ttl(&self) -> f32 {
        self.ttl
    }

    pub fn held_ticks(&self) -> u32 {
        self.held_ticks
    }

    pub fn pressure(&self) -> f32 {
        self.pressure
    }

    /// Pointer that owns this point while held.
    pub fn pointer(&self) -> Option<u64> {
        self.pointer
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn is_alive(&self) -> bool {
        self.held || self.ttl > 0.0
    }

    /// Repulsion radius at the current pressure.
    pub fn influence_radius(&self, config: &PerturbationConfig) -> f32 {
        config.influence_radius * self.pressure
    }

    /// Spawn multiplier at `position`: `1 + spawn_boost * falloff * pressure`
    /// inside `spawn_radius`, 1 outside.
    pub fn spawn_multiplier(&self, position: Vec2, config: &PerturbationConfig) -> f32 {
        match falloff(self.position.distance(position), config.spawn_radius) {
            Some(f) => 1.0 + config.spawn_boost * f * self.pressure,
            None => 1.0,
        }
    }
}

/// Clamp into `[0, max]`, replacing NaN with `fallback`.
fn sanitize(value: f32, fallback: f32, max: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, max)
    }
}

/// `1 - distance / radius` inside the radius, `None` outside.
fn falloff(distance: f32, radius: f32) -> Option<f32> {
    if radius > 0.0 && distance < radius {
        Some(1.0 - distance / radius)
    } else {
        None
    }
}

/// Bounded FIFO of perturbation points.
#[derive(Debug, Clone, Default)]
pub struct PerturbationField {
    points: VecDeque<PerturbationPoint>,
}

impl PerturbationField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active points, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &PerturbationPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Index of the point an event at `position` from `pointer` should update.
    /// The point owned by `pointer`, else an unowned point within `merge_radius`.
    /// Points held by another pointer never match by distance.
    fn find(&self, position: Vec2, pointer: Option<u64>, config: &PerturbationConfig) -> Option<usize> {
        pointer
            .and_then(|id| self.points.iter().position(|p| p.pointer == Some(id)))
            .or_else(|| {
                self.points.iter().position(|p| {
                    p.pointer.is_none() && p.position.distance(position) < config.merge_radius
                })
            })
    }

    fn push(&mut self, point: PerturbationPoint, config: &PerturbationConfig) {
        self.points.push_back(point);
        while self.points.len() > config.max_points {
            self.points.pop_front();
        }
    }

    /// Add a released point, or refresh the point already near it.
    pub fn insert(&mut self, point: PerturbationPoint, config: &PerturbationConfig) {
        match self.find(point.position, None, config) {
            Some(i) => {
                let existing = &mut self.points[i];
                existing.position = point.position;
                existing.ttl = existing.ttl.max(point.ttl);
                existing.pressure = existing.pressure.max(point.pressure);
            }
            None => self.push(point, config),
        }
    }

    /// Add a released point with the configured TTL.
    pub fn register(&mut self, position: Vec2, pressure: f32, config: &PerturbationConfig) {
        if !position.is_finite() {
            tracing::warn!(?position, "ignoring perturbation at non-finite position");
            return;
        }
        self.insert(PerturbationPoint::new(position, pressure, config.ttl, config), config);
    }

    /// A pointer went down: hold a point there.
    pub fn press(&mut self, position: Vec2, pointer: u64, config: &PerturbationConfig) {
        if !position.is_finite() {
            tracing::warn!(?position, pointer, "ignoring press at non-finite position");
            return;
        }
        match self.find(position, Some(pointer), config) {
            Some(i) => {
                let point = &mut self.points[i];
                point.position = position;
                point.ttl = config.ttl;
                point.pointer = Some(pointer);
                point.held = true;
            }
            None => {
                let mut point = PerturbationPoint::new(position, 1.0, config.ttl, config);
                point.pointer = Some(pointer);
                point.held = true;
                self.push(point, config);
            }
        }
    }

    /// A held pointer moved. A move without a prior press starts one.
    pub fn drag(&mut self, position: Vec2, pointer: u64, config: &PerturbationConfig) {
        if !position.is_finite() {
            return;
        }
        match self.points.iter_mut().find(|p| p.pointer == Some(pointer)) {
            Some(point) => {
                point.position = position;
                point.ttl = config.ttl;
            }
            None => self.press(position, pointer, config),
        }
    }

    /// A pointer went up: its point starts counting down.
    pub fn release(&mut self, pointer: u64) {
        for point in self.points.iter_mut().filter(|p| p.pointer == Some(pointer)) {
            point.held = false;
            point.pointer = None;
        }
    }

    /// Push live particles away from every point and mark them perturbed.
    ///
    /// The push changes velocity directly, so it shows on the same tick.
    pub fn apply_forces(&self, particles: &mut [Particle], config: &FlowConfig, rng: &mut SpawnRng) {
        let pc = &config.perturbation;
        for point in self.points.iter().filter(|p| p.is_alive()) {
            let radius = point.influence_radius(pc);
            if radius <= 0.0 {
                continue;
            }
            for particle in particles.iter_mut().filter(|p| p.is_alive()) {
                let offset = particle.position - point.position;
                let d = offset.length();
                if d >= radius {
                    continue;
                }
                let away = if d > f32::EPSILON {
                    offset / d
                } else {
                    Vec2::from_angle(rng.angle())
                };
                let strength = pc.near_force + (pc.far_force - pc.near_force) * (d / radius);
                let push = away * strength * point.pressure + rng.random_in_disk(pc.jitter);
                particle.velocity += push;
                particle.mark_perturbed(pc.return_ticks);
            }
        }
    }

    /// Pull perturbed particles back toward their edge.
    pub fn apply_return(&self, particles: &mut [Particle], graph: &Graph, config: &FlowConfig) {
        let strength = config.particles.max_force * config.perturbation.return_scale;
        for particle in particles.iter_mut().filter(|p| p.is_alive()) {
            particle.pull_back(graph, strength);
        }
    }

    /// Roll a burst for every node near a point and queue its requests.
    /// Returns the number of requests queued.
    pub fn request_bursts(
        &self,
        graph: &Graph,
        config: &FlowConfig,
        rng: &mut SpawnRng,
        queue: &mut SpawnQueue,
    ) -> usize {
        let pc = &config.perturbation;
        let base = config.pool.spawn_probability;
        let mut queued = 0;
        for point in self.points.iter().filter(|p| p.is_alive()) {
            for node in graph.nodes() {
                let Some(f) = falloff(node.position().distance(point.position), pc.spawn_radius) else {
                    continue;
                };
                if node.outgoing().is_empty() {
                    continue;
                }
                let chance = (base * (1.0 + pc.spawn_boost * f * point.pressure)).min(1.0);
                if !rng.chance(chance) {
                    continue;
                }
                let burst = ((pc.burst_max as f32 * f * point.pressure).round() as usize).max(1);
                for _ in 0..burst {
                    if let Some(&edge) = rng.pick(node.outgoing()) {
                        queue.push(SpawnRequest {
                            node: node.id(),
                            edge,
                            kind: SpawnKind::Burst,
                        });
                        queued += 1;
                    }
                }
            }
        }
        queued
    }

    /// Grow held points, count released ones down, drop the expired.
    pub fn age(&mut self, config: &PerturbationConfig) {
        for point in &mut self.points {
            if point.held {
                point.ttl = config.ttl;
                point.held_ticks = point.held_ticks.saturating_add(1);
                point.pressure = point.pressure.max(pressure_curve(point.held_ticks, config));
            } else {
                point.ttl = (point.ttl - 1.0).max(0.0);
            }
        }
        self.points.retain(|p| p.is_alive());
    }

    /// Combined spawn multiplier at `position`: the strongest point wins.
    pub fn spawn_multiplier(&self, position: Vec2, config: &PerturbationConfig) -> f32 {
        self.points
            .iter()
            .filter(|p| p.is_alive())
            .map(|p| p.spawn_multiplier(position, config))
            .fold(1.0, f32::max)
    }
}
