//! Soft viewport boundary.
//!
//! Inside a margin along each viewport side a particle is pushed back inward
//! with a force that grows linearly with penetration depth, and its lifetime
//! drains faster the deeper it is. Positions are never clamped or teleported.

use crate::config::BoundaryConfig;
use glam::Vec2;

/// Boundary response for one position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Containment {
    /// Inward force to add to the particle's acceleration.
    pub force: Vec2,
    /// Extra lifetime to subtract this tick.
    pub penalty: f32,
}

/// Per-axis penetration into the margin, signed toward the inside.
///
/// Positive components push right/down, negative push left/up. Zero when the
/// position is clear of the margin on that axis.
fn inward_depth(position: Vec2, viewport: Vec2, margin: f32) -> Vec2 {
    let axis = |p: f32, extent: f32| {
        let low = margin - p;
        let high = margin - (extent - p);
        if low > 0.0 {
            low
        } else if high > 0.0 {
            -high
        } else {
            0.0
        }
    };
    Vec2::new(axis(position.x, viewport.x), axis(position.y, viewport.y))
}

/// Force and lifetime penalty for a particle at `position`.
pub fn contain(position: Vec2, viewport: Vec2, config: &BoundaryConfig) -> Containment {
    if config.margin <= 0.0 {
        return Containment::default();
    }
    let depth = inward_depth(position, viewport, config.margin);
    if depth == Vec2::ZERO {
        return Containment::default();
    }
    let deepest = depth.abs().max_element();
    Containment {
        force: depth * (config.force / config.margin),
        penalty: config.fade_rate * deepest / config.margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn interior_is_untouched() {
        let config = BoundaryConfig::default();
        assert_eq!(contain(Vec2::new(400.0, 300.0), VIEWPORT, &config), Containment::default());
    }

    #[test]
    fn pushes_inward_on_each_side() {
        let config = BoundaryConfig::default();
        assert!(contain(Vec2::new(10.0, 300.0), VIEWPORT, &config).force.x > 0.0);
        assert!(contain(Vec2::new(790.0, 300.0), VIEWPORT, &config).force.x < 0.0);
        assert!(contain(Vec2::new(400.0, 10.0), VIEWPORT, &config).force.y > 0.0);
        assert!(contain(Vec2::new(400.0, 590.0), VIEWPORT, &config).force.y < 0.0);
    }

    #[test]
    fn force_and_fade_scale_with_depth() {
        let config = BoundaryConfig::default();
        let shallow = contain(Vec2::new(40.0, 300.0), VIEWPORT, &config);
        let deep = contain(Vec2::new(10.0, 300.0), VIEWPORT, &config);
        assert!(deep.force.x > shallow.force.x);
        assert!(deep.penalty > shallow.penalty);

        let at_edge = contain(Vec2::new(0.0, 300.0), VIEWPORT, &config);
        assert!((at_edge.force.x - config.force).abs() < 1e-6);
        assert!((at_edge.penalty - config.fade_rate).abs() < 1e-6);
    }

    #[test]
    fn corner_uses_deepest_axis() {
        let config = BoundaryConfig::default();
        let c = contain(Vec2::new(10.0, 40.0), VIEWPORT, &config);
        assert!(c.force.x > 0.0 && c.force.y > 0.0);
        assert!((c.penalty - config.fade_rate * 40.0 / config.margin).abs() < 1e-5);
    }

    #[test]
    fn zero_margin_disables() {
        let config = BoundaryConfig {
            margin: 0.0,
            ..BoundaryConfig::default()
        };
        assert_eq!(contain(Vec2::new(-5.0, -5.0), VIEWPORT, &config), Containment::default());
    }
}
