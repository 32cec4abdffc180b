//! Node/edge arena and the edge model.
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Edges live in
//! a second `Vec`, addressed by [`EdgeId`], and refer to their endpoints by id
//! only, so the node → edge → node cycle never needs shared ownership and the
//! motion model can rewrite every position in one pass.
//!
//! Topology is frozen once [`builder`](crate::builder) returns: after that
//! only node positions move and edge directions are refreshed from them.

use crate::config::GraphConfig;
use glam::Vec2;

/// Stable index of a node in its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Stable index of an edge in its [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl EdgeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Node tier. Decides size, color and the routing weight of edges pointing at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTier {
    Hub,
    Minihub,
    Regular,
}

/// Oscillating displacement of a node from its rest anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drift {
    /// Direction of the offset (radians).
    pub phase: f32,
    /// Length of the offset, between 0 and the configured range.
    pub amount: f32,
    /// +1 while growing, -1 while shrinking.
    pub direction: f32,
    /// Speed multiplier; zero for the hub.
    pub speed: f32,
}

impl Drift {
    /// A drift that never moves.
    pub const STILL: Drift = Drift {
        phase: 0.0,
        amount: 0.0,
        direction: 1.0,
        speed: 0.0,
    };

    /// Current offset from the rest anchor.
    #[inline]
    pub fn offset(&self) -> Vec2 {
        Vec2::from_angle(self.phase) * self.amount
    }
}

/// A graph node.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) tier: NodeTier,
    pub(crate) group: Option<usize>,
    pub(crate) rest_anchor: Vec2,
    pub(crate) position: Vec2,
    pub(crate) outgoing: Vec<EdgeId>,
    pub(crate) drift: Drift,
    pub(crate) size: f32,
    pub(crate) hue: f32,
    pub(crate) saturation: f32,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tier(&self) -> NodeTier {
        self.tier
    }

    /// Color group; `None` for the hub.
    pub fn group(&self) -> Option<usize> {
        self.group
    }

    pub fn is_hub(&self) -> bool {
        self.tier == NodeTier::Hub
    }

    /// Un-drifted reference position.
    pub fn rest_anchor(&self) -> Vec2 {
        self.rest_anchor
    }

    /// Current position: rest anchor plus drift offset.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Edges leaving this node.
    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    pub fn drift(&self) -> &Drift {
        &self.drift
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    /// Hue in degrees.
    pub fn hue(&self) -> f32 {
        self.hue
    }

    /// Saturation (0-100); the hub is white.
    pub fn saturation(&self) -> f32 {
        self.saturation
    }
}

/// A directed connection between two nodes.
#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) source: NodeId,
    pub(crate) target: NodeId,
    pub(crate) direction: Vec2,
    pub(crate) weight: u32,
}

impl Edge {
    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Unit vector from source to target as of the last refresh.
    /// Zero for a zero-length edge.
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Routing weight for an edge pointing at a node of `tier`.
    pub fn weight_for(tier: NodeTier, config: &GraphConfig) -> u32 {
        match tier {
            NodeTier::Hub => config.hub_weight,
            NodeTier::Minihub => config.minihub_weight,
            NodeTier::Regular => config.regular_weight,
        }
    }
}

/// Arena of nodes and edges.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its id.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn add_node(
        &mut self,
        tier: NodeTier,
        group: Option<usize>,
        position: Vec2,
        drift: Drift,
        size: f32,
        hue: f32,
        saturation: f32,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            tier,
            group,
            rest_anchor: position,
            position,
            outgoing: Vec::new(),
            drift,
            size,
            hue,
            saturation,
        });
        id
    }

    /// Add a one-way edge. Its weight comes from the target's tier.
    pub(crate) fn connect(&mut self, source: NodeId, target: NodeId, config: &GraphConfig) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        let weight = Edge::weight_for(self.nodes[target.index()].tier, config);
        let direction = direction_between(
            self.nodes[source.index()].position,
            self.nodes[target.index()].position,
        );
        self.edges.push(Edge {
            source,
            target,
            direction,
            weight,
        });
        self.nodes[source.index()].outgoing.push(id);
        id
    }

    /// Add an edge each way between `a` and `b`.
    pub(crate) fn link(&mut self, a: NodeId, b: NodeId, config: &GraphConfig) -> (EdgeId, EdgeId) {
        (self.connect(a, b, config), self.connect(b, a, config))
    }

    /// The hub, always the first node placed.
    pub fn hub(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether `id` refers to an edge of this graph.
    pub fn contains_edge(&self, id: EdgeId) -> bool {
        id.index() < self.edges.len()
    }

    /// Current positions of an edge's source and target.
    pub fn endpoints(&self, id: EdgeId) -> (Vec2, Vec2) {
        let edge = &self.edges[id.index()];
        (
            self.nodes[edge.source.index()].position,
            self.nodes[edge.target.index()].position,
        )
    }

    /// Recompute every edge direction from current node positions.
    pub fn refresh_directions(&mut self) {
        let nodes = &self.nodes;
        for edge in &mut self.edges {
            edge.direction = direction_between(
                nodes[edge.source.index()].position,
                nodes[edge.target.index()].position,
            );
        }
    }

    /// Closest point to `point` on the edge's segment.
    pub fn nearest_point_on_edge(&self, id: EdgeId, point: Vec2) -> Vec2 {
        let (a, b) = self.endpoints(id);
        nearest_point_on_segment(a, b, point)
    }

    /// Distance from `point` to the edge's segment.
    pub fn distance_to_edge(&self, id: EdgeId, point: Vec2) -> f32 {
        let (a, b) = self.endpoints(id);
        distance_to_segment(a, b, point)
    }

    /// How far along the edge `point` projects, in `[0, 1]`.
    pub fn edge_progress(&self, id: EdgeId, point: Vec2) -> f32 {
        let (a, b) = self.endpoints(id);
        segment_progress(a, b, point)
    }

    /// Check the arena invariants: every edge endpoint exists, and every
    /// outgoing list only holds edges whose source is its owner.
    pub fn is_consistent(&self) -> bool {
        let n = self.nodes.len();
        let endpoints_ok = self
            .edges
            .iter()
            .all(|e| e.source.index() < n && e.target.index() < n);
        let outgoing_ok = self.nodes.iter().all(|node| {
            node.outgoing
                .iter()
                .all(|id| self.contains_edge(*id) && self.edges[id.index()].source == node.id)
        });
        endpoints_ok && outgoing_ok
    }
}

/// Normalized `to - from`, or zero when the points coincide.
#[inline]
pub fn direction_between(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Projection parameter of `p` on segment `a..b`, clamped to `[0, 1]`.
/// A degenerate segment counts as already traversed.
pub fn segment_progress(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return 1.0;
    }
    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
}

/// Closest point to `p` on segment `a..b`. A degenerate segment yields `b`.
pub fn nearest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    a + (b - a) * segment_progress(a, b, p)
}

/// Distance from `p` to segment `a..b`.
pub fn distance_to_segment(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    p.distance(nearest_point_on_segment(a, b, p))
}
