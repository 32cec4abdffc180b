//! Particle storage, compaction and spawn admission.
//!
//! The pool owns the live particles in one `Vec`, in spawn order. Per tick:
//!
//! 1. [`advance`](ParticlePool::advance) steps at most `capacity` particles;
//! 2. [`compact`](ParticlePool::compact) removes the dead in place, keeping
//!    survivors (and anything past the processing cap) in order;
//! 3. on the hard-cap cadence, [`enforce_hard_cap`](ParticlePool::enforce_hard_cap)
//!    truncates an overfull pool to the particles with the most life left;
//! 4. [`sample_spawns`](ParticlePool::sample_spawns) queues regular spawns and
//!    [`admit`](ParticlePool::admit) turns queued requests into particles while
//!    there is room.
//!
//! New particles are only stepped from the next tick on.

use crate::config::{FlowConfig, PoolConfig};
use crate::graph::Graph;
use crate::particle::{DeathCause, Particle, ParticleState, StepContext};
use crate::spawn::{SpawnKind, SpawnQueue, SpawnRequest, SpawnRng};

/// Deaths so far, by cause.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeathCounts {
    pub expired: u64,
    pub faded: u64,
    pub hop_limit: u64,
    pub dead_end: u64,
}

impl DeathCounts {
    fn record(&mut self, cause: DeathCause) {
        match cause {
            DeathCause::Expired => self.expired += 1,
            DeathCause::Faded => self.faded += 1,
            DeathCause::HopLimit => self.hop_limit += 1,
            DeathCause::DeadEnd => self.dead_end += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.expired + self.faded + self.hop_limit + self.dead_end
    }
}

/// Running pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Live particles after the last compaction/admission.
    pub population: usize,
    pub spawned: u64,
    /// Spawn requests turned away because the pool was full.
    pub dropped: u64,
    /// Particles removed by hard-cap truncation.
    pub truncated: u64,
    pub deaths: DeathCounts,
}

/// Owner of every particle.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
    stats: PoolStats,
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            stats: PoolStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Particles in spawn order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub(crate) fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Drop every particle and reset the counters.
    pub fn clear(&mut self) {
        self.particles.clear();
        self.stats = PoolStats::default();
    }

    /// Add a particle unless the pool is full. Returns whether it was added.
    pub fn push(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= self.capacity {
            self.stats.dropped += 1;
            return false;
        }
        self.particles.push(particle);
        self.stats.spawned += 1;
        self.stats.population = self.particles.len();
        true
    }

    // ========== Per-tick stages ==========

    /// Step the first `capacity` particles. Returns how many were stepped.
    pub fn advance(&mut self, ctx: &StepContext<'_>, rng: &mut SpawnRng) -> usize {
        let processed = self.particles.len().min(self.capacity);
        for particle in &mut self.particles[..processed] {
            particle.advance(ctx, rng);
        }
        processed
    }

    /// Remove dead particles among the first `processed`, in one pass and
    /// without allocating. Survivors keep their relative order and the
    /// unprocessed tail follows them unchanged. Returns how many were removed.
    pub fn compact(&mut self, processed: usize) -> usize {
        let processed = processed.min(self.particles.len());
        let mut write = 0;
        for read in 0..processed {
            let particle = &self.particles[read];
            if particle.is_alive() {
                self.particles.swap(write, read);
                write += 1;
            } else {
                let cause = match particle.state() {
                    ParticleState::Dead(cause) => cause,
                    _ if particle.hops() >= particle.max_hops() => DeathCause::HopLimit,
                    _ => DeathCause::Expired,
                };
                self.stats.deaths.record(cause);
            }
        }
        let removed = processed - write;
        for read in processed..self.particles.len() {
            self.particles.swap(write, read);
            write += 1;
        }
        self.particles.truncate(write);
        self.stats.population = self.particles.len();
        removed
    }

    /// If the pool is above the high-water mark, keep only the `low_water`
    /// share with the most lifetime left, in their existing order.
    /// Returns how many were removed.
    pub fn enforce_hard_cap(&mut self, config: &PoolConfig) -> usize {
        let len = self.particles.len();
        let high = (config.high_water * self.capacity as f32) as usize;
        if len <= high {
            return 0;
        }
        let target = (config.low_water * self.capacity as f32) as usize;

        let mut order: Vec<usize> = (0..len).collect();
        order.sort_by(|&a, &b| {
            self.particles[b]
                .lifetime()
                .total_cmp(&self.particles[a].lifetime())
        });
        let mut keep = vec![false; len];
        for &i in order.iter().take(target) {
            keep[i] = true;
        }
        let mut index = 0;
        self.particles.retain(|_| {
            let kept = keep[index];
            index += 1;
            kept
        });

        let removed = len - self.particles.len();
        self.stats.truncated += removed as u64;
        self.stats.population = self.particles.len();
        tracing::debug!(removed, population = self.particles.len(), "hard cap enforced");
        removed
    }

    /// Queue regular spawns: while below the spawn threshold, sample random
    /// nodes and give each a chance to emit along a uniformly chosen edge.
    /// Returns the number of requests queued.
    pub fn sample_spawns(
        &self,
        graph: &Graph,
        config: &PoolConfig,
        rng: &mut SpawnRng,
        queue: &mut SpawnQueue,
    ) -> usize {
        let threshold = config.spawn_threshold * self.capacity as f32;
        if self.particles.len() as f32 >= threshold || graph.node_count() == 0 {
            return 0;
        }
        let samples = config.spawn_batch.min(graph.node_count() / 3);
        let mut queued = 0;
        for _ in 0..samples {
            let node = &graph.nodes()[rng.index(graph.node_count())];
            if !rng.chance(config.spawn_probability) {
                continue;
            }
            if let Some(&edge) = rng.pick(node.outgoing()) {
                queue.push(SpawnRequest {
                    node: node.id(),
                    edge,
                    kind: SpawnKind::Node,
                });
                queued += 1;
            }
        }
        queued
    }

    /// Admit queued requests in order while there is room; drop the rest.
    /// Returns how many particles were created.
    pub fn admit(&mut self, queue: &mut SpawnQueue, graph: &Graph, config: &FlowConfig, rng: &mut SpawnRng) -> usize {
        let mut admitted = 0;
        let mut dropped = 0;
        for request in queue.drain() {
            if self.particles.len() >= self.capacity || !graph.contains_edge(request.edge) {
                dropped += 1;
                continue;
            }
            let pc = &config.particles;
            let lifetime = match request.kind {
                SpawnKind::Node => pc.lifetime,
                SpawnKind::Burst => rng.random_range(pc.min_lifetime, pc.lifetime),
            };
            self.particles.push(Particle::spawn(graph, request.edge, lifetime, pc));
            admitted += 1;
        }
        if dropped > 0 {
            tracing::warn!(dropped, capacity = self.capacity, "spawn requests dropped");
        }
        self.stats.spawned += admitted as u64;
        self.stats.dropped += dropped as u64;
        self.stats.population = self.particles.len();
        admitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::graph::{Drift, EdgeId, NodeId, NodeTier};
    use glam::Vec2;

    fn pair() -> (Graph, EdgeId) {
        let config = GraphConfig::default();
        let mut graph = Graph::new();
        let a = graph.add_node(NodeTier::Regular, Some(0), Vec2::new(100.0, 100.0), Drift::STILL, 5.0, 0.0, 90.0);
        let b = graph.add_node(NodeTier::Regular, Some(0), Vec2::new(300.0, 100.0), Drift::STILL, 5.0, 0.0, 90.0);
        let (ab, _) = graph.link(a, b, &config);
        (graph, ab)
    }

    /// Pool whose particles carry lifetimes `lifetimes`; zero means dead.
    fn pool_with(lifetimes: &[f32], capacity: usize) -> ParticlePool {
        let (graph, ab) = pair();
        let config = FlowConfig::default();
        let mut pool = ParticlePool::new(capacity);
        for &lifetime in lifetimes {
            let mut p = Particle::spawn(&graph, ab, lifetime, &config.particles);
            if lifetime <= 0.0 {
                p.kill(DeathCause::Expired);
            }
            pool.push(p);
        }
        pool
    }

    fn lifetimes(pool: &ParticlePool) -> Vec<f32> {
        pool.particles().iter().map(|p| p.lifetime()).collect()
    }

    #[test]
    fn compaction_preserves_order() {
        let mut pool = pool_with(&[1.0, 0.0, 2.0, 0.0, 0.0, 3.0, 4.0], 16);
        let removed = pool.compact(7);
        assert_eq!(removed, 3);
        assert_eq!(lifetimes(&pool), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(pool.stats().deaths.expired, 3);
        assert_eq!(pool.stats().population, 4);
    }

    #[test]
    fn compaction_drops_particles_out_of_hops() {
        let mut pool = pool_with(&[1.0, 2.0, 3.0], 16);
        let max_hops = pool.particles()[1].max_hops();
        pool.particles_mut()[1].hops = max_hops;
        assert_eq!(pool.compact(3), 1);
        assert_eq!(lifetimes(&pool), vec![1.0, 3.0]);
        assert_eq!(pool.stats().deaths.hop_limit, 1);
    }

    #[test]
    fn compaction_keeps_unprocessed_tail() {
        let mut pool = pool_with(&[0.0, 1.0, 0.0, 2.0, 5.0, 6.0], 16);
        // Only the first four were stepped this tick.
        pool.compact(4);
        assert_eq!(lifetimes(&pool), vec![1.0, 2.0, 5.0, 6.0]);
    }

    #[test]
    fn push_respects_capacity() {
        let mut pool = pool_with(&[1.0, 2.0, 3.0], 2);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.stats().dropped, 1);
    }

    #[test]
    fn hard_cap_keeps_longest_lived_in_order() {
        let config = PoolConfig {
            high_water: 0.9,
            low_water: 0.5,
            ..PoolConfig::default()
        };
        let mut pool = pool_with(&[5.0, 9.0, 1.0, 7.0, 3.0, 8.0, 2.0, 6.0, 4.0, 10.0], 10);
        let removed = pool.enforce_hard_cap(&config);
        assert_eq!(removed, 5);
        assert_eq!(lifetimes(&pool), vec![9.0, 7.0, 8.0, 6.0, 10.0]);
        assert!(pool.len() <= (config.high_water * 10.0) as usize);
        assert_eq!(pool.stats().truncated, 5);
    }

    #[test]
    fn hard_cap_leaves_small_pool_alone() {
        let config = PoolConfig::default();
        let mut pool = pool_with(&[1.0, 2.0], 10);
        assert_eq!(pool.enforce_hard_cap(&config), 0);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn admission_stops_at_capacity() {
        let (graph, ab) = pair();
        let config = FlowConfig::default();
        let mut rng = SpawnRng::new(1);
        let mut pool = ParticlePool::new(3);
        let mut queue = SpawnQueue::new();
        for _ in 0..5 {
            queue.push(SpawnRequest {
                node: NodeId(0),
                edge: ab,
                kind: SpawnKind::Node,
            });
        }
        assert_eq!(pool.admit(&mut queue, &graph, &config, &mut rng), 3);
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.stats().dropped, 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn burst_lifetimes_are_drawn_in_range() {
        let (graph, ab) = pair();
        let config = FlowConfig::default();
        let mut rng = SpawnRng::new(2);
        let mut pool = ParticlePool::new(100);
        let mut queue = SpawnQueue::new();
        for kind in [SpawnKind::Node, SpawnKind::Burst, SpawnKind::Burst, SpawnKind::Burst] {
            queue.push(SpawnRequest {
                node: NodeId(0),
                edge: ab,
                kind,
            });
        }
        pool.admit(&mut queue, &graph, &config, &mut rng);
        let pc = &config.particles;
        assert_eq!(pool.particles()[0].lifetime(), pc.lifetime);
        for p in &pool.particles()[1..] {
            assert!(p.lifetime() >= pc.min_lifetime && p.lifetime() <= pc.lifetime);
        }
    }

    #[test]
    fn sampling_stops_above_threshold() {
        let (graph, _) = pair();
        let config = PoolConfig {
            spawn_probability: 1.0,
            ..PoolConfig::default()
        };
        let mut rng = SpawnRng::new(3);
        let mut queue = SpawnQueue::new();
        let full = pool_with(&[1.0; 9], 10);
        assert_eq!(full.sample_spawns(&graph, &config, &mut rng, &mut queue), 0);
    }

    #[test]
    fn sampling_batch_is_limited_by_node_count() {
        let mut graph = Graph::new();
        let gc = GraphConfig::default();
        let ids: Vec<NodeId> = (0..9)
            .map(|i| {
                graph.add_node(NodeTier::Regular, Some(0), Vec2::new(i as f32 * 20.0, 0.0), Drift::STILL, 5.0, 0.0, 90.0)
            })
            .collect();
        for w in ids.windows(2) {
            graph.link(w[0], w[1], &gc);
        }
        let config = PoolConfig {
            spawn_probability: 1.0,
            spawn_batch: 20,
            ..PoolConfig::default()
        };
        let mut rng = SpawnRng::new(4);
        let mut queue = SpawnQueue::new();
        let pool = ParticlePool::new(100);
        assert_eq!(pool.sample_spawns(&graph, &config, &mut rng, &mut queue), 3);
        assert!(queue.drain().all(|r| r.kind == SpawnKind::Node && graph.edge(r.edge).source() == r.node));
    }
}
