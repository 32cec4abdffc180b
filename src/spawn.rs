//! Randomness and spawn requests.
//!
//! [`SpawnRng`] wraps a seeded `SmallRng` with the handful of sampling
//! helpers the builder, motion model and spawners need. A simulation owns
//! exactly one, so a fixed seed reproduces a whole run.
//!
//! Spawns never create particles directly. Node spawners and perturbation
//! bursts push a [`SpawnRequest`] into a [`SpawnQueue`]; the pool admits the
//! queue at the end of the tick.

use crate::graph::{EdgeId, NodeId};
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

/// A seed taken from the system clock.
pub fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

/// Seeded random source with helpers for common sampling patterns.
#[derive(Debug, Clone)]
pub struct SpawnRng {
    rng: SmallRng,
}

impl SpawnRng {
    /// Create a generator from a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn random_range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Random f64 in `[0, max)`. Returns 0 for a non-positive bound.
    #[inline]
    pub fn random_below(&mut self, max: f64) -> f64 {
        if max > 0.0 {
            self.rng.gen_range(0.0..max)
        } else {
            0.0
        }
    }

    /// Random index in `0..len`. `len` must be non-zero.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// `true` with probability `p` (clamped to `[0, 1]`).
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.rng.gen::<f32>() < p.clamp(0.0, 1.0)
    }

    /// Random angle in `[0, TAU)`.
    #[inline]
    pub fn angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..TAU)
    }

    // ========== Vector helpers ==========

    /// Random vector with length at most `max_len`, uniform over the disk.
    pub fn random_in_disk(&mut self, max_len: f32) -> Vec2 {
        let r = max_len * self.random().sqrt();
        Vec2::from_angle(self.angle()) * r
    }

    /// Pick a random element of a slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.index(items.len())])
        }
    }
}

/// Where a spawn request came from. Decides the new particle's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    /// Regular per-tick node spawn: full configured lifetime.
    Node,
    /// Perturbation burst: lifetime drawn between the configured bounds.
    Burst,
}

/// A request to create one particle at a node, travelling along one of its edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub node: NodeId,
    pub edge: EdgeId,
    pub kind: SpawnKind,
}

/// Spawn requests collected during a tick, admitted in insertion order.
#[derive(Debug, Default, Clone)]
pub struct SpawnQueue {
    requests: Vec<SpawnRequest>,
}

impl SpawnQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: SpawnRequest) {
        self.requests.push(request);
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Take every queued request, leaving the queue empty.
    pub fn drain(&mut self) -> std::vec::Drain<'_, SpawnRequest> {
        self.requests.drain(..)
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}
