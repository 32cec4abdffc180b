//! Interaction input for nodeflow simulations.
//!
//! The host feeds pointer events (mouse, touch, pen) as [`InteractionEvent`]s
//! in device coordinates. The `Input` struct queues them until the
//! perturbation phase drains the queue, and tracks both instantaneous state
//! (pointer went down this frame) and continuous state (pointer held).
//!
//! The scene is drawn rotated by the global rotation angle about the viewport
//! center, so a device point is rotated back by that angle before it is used
//! as a scene position. See [`map_interaction_point`].
//!
//! # Usage
//!
//! ```ignore
//! sim.push_event(InteractionEvent::start(Vec2::new(320.0, 240.0), 0));
//! sim.step(TickInput::new(viewport));
//! if sim.input().pointer_held(0) {
//!     // a perturbation point is growing in pressure
//! }
//! ```

use glam::Vec2;
use std::collections::HashSet;

/// What a pointer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionPhase {
    /// Pointer went down.
    Start,
    /// Pointer moved while down.
    Move,
    /// Pointer went up.
    End,
}

/// A pointer event in device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionEvent {
    pub device: Vec2,
    pub phase: InteractionPhase,
    /// Pointer identity; the mouse and each touch get their own.
    pub id: u64,
}

impl InteractionEvent {
    pub fn start(device: Vec2, id: u64) -> Self {
        Self {
            device,
            phase: InteractionPhase::Start,
            id,
        }
    }

    pub fn moved(device: Vec2, id: u64) -> Self {
        Self {
            device,
            phase: InteractionPhase::Move,
            id,
        }
    }

    pub fn end(device: Vec2, id: u64) -> Self {
        Self {
            device,
            phase: InteractionPhase::End,
            id,
        }
    }
}

/// Rotate a device point by `-rotation` about the viewport center, giving the
/// scene position under the pointer.
pub fn map_interaction_point(device: Vec2, rotation: f32, viewport: Vec2) -> Vec2 {
    let center = viewport * 0.5;
    center + Vec2::from_angle(-rotation).rotate(device - center)
}

/// Inverse of [`map_interaction_point`]: where a scene position appears on screen.
pub fn scene_to_device(scene: Vec2, rotation: f32, viewport: Vec2) -> Vec2 {
    let center = viewport * 0.5;
    center + Vec2::from_angle(rotation).rotate(scene - center)
}

/// Pointer state plus the queue of events not yet applied.
#[derive(Debug, Default)]
pub struct Input {
    // Pointer state
    held: HashSet<u64>,
    pressed: HashSet<u64>,
    released: HashSet<u64>,

    /// Last device position seen for any pointer.
    last_position: Option<Vec2>,

    queue: Vec<InteractionEvent>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Pointer Queries ==========

    /// Pointer went down this frame.
    pub fn pointer_pressed(&self, id: u64) -> bool {
        self.pressed.contains(&id)
    }

    /// Pointer is currently down.
    pub fn pointer_held(&self, id: u64) -> bool {
        self.held.contains(&id)
    }

    /// Pointer went up this frame.
    pub fn pointer_released(&self, id: u64) -> bool {
        self.released.contains(&id)
    }

    /// Number of pointers currently down.
    pub fn active_pointers(&self) -> usize {
        self.held.len()
    }

    pub fn last_position(&self) -> Option<Vec2> {
        self.last_position
    }

    /// Events waiting for the next perturbation phase.
    pub fn pending(&self) -> &[InteractionEvent] {
        &self.queue
    }

    // ========== Event Handling ==========

    /// Record an event and queue it.
    pub fn handle_event(&mut self, event: InteractionEvent) {
        match event.phase {
            InteractionPhase::Start => {
                if self.held.insert(event.id) {
                    self.pressed.insert(event.id);
                }
            }
            InteractionPhase::Move => {
                self.held.insert(event.id);
            }
            InteractionPhase::End => {
                if self.held.remove(&event.id) {
                    self.released.insert(event.id);
                }
            }
        }
        self.last_position = Some(event.device);
        self.queue.push(event);
    }

    /// Take every queued event, oldest first.
    pub(crate) fn drain(&mut self) -> std::vec::Drain<'_, InteractionEvent> {
        self.queue.drain(..)
    }

    /// Clear per-frame state. Called at the start of each step, before that
    /// step's events are recorded, so pressed/released stay visible until the
    /// next step.
    pub(crate) fn begin_frame(&mut self) {
        self.pressed.clear();
        self.released.clear();
    }

    /// Forget every pointer and queued event.
    pub(crate) fn clear(&mut self) {
        self.held.clear();
        self.pressed.clear();
        self.released.clear();
        self.last_position = None;
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_map_identity_at_zero() {
        let p = Vec2::new(123.0, 456.0);
        assert_eq!(map_interaction_point(p, 0.0, VIEWPORT), p);
    }

    #[test]
    fn test_map_half_turn() {
        let mapped = map_interaction_point(Vec2::new(500.0, 300.0), PI, VIEWPORT);
        assert!((mapped - Vec2::new(300.0, 300.0)).length() < 1e-3);
        let center = VIEWPORT * 0.5;
        assert!((map_interaction_point(center, PI, VIEWPORT) - center).length() < 1e-4);
    }

    #[test]
    fn test_map_undoes_scene_rotation() {
        let scene = Vec2::new(520.0, 180.0);
        let device = scene_to_device(scene, FRAC_PI_2, VIEWPORT);
        assert!((map_interaction_point(device, FRAC_PI_2, VIEWPORT) - scene).length() < 1e-3);
    }

    #[test]
    fn test_pointer_state() {
        let mut input = Input::new();
        assert!(!input.pointer_held(1));

        input.handle_event(InteractionEvent::start(Vec2::ZERO, 1));
        assert!(input.pointer_held(1));
        assert!(input.pointer_pressed(1));

        // After begin_frame, pressed is cleared but held remains
        input.begin_frame();
        assert!(input.pointer_held(1));
        assert!(!input.pointer_pressed(1));

        input.handle_event(InteractionEvent::end(Vec2::ONE, 1));
        assert!(!input.pointer_held(1));
        assert!(input.pointer_released(1));
        assert_eq!(input.last_position(), Some(Vec2::ONE));
    }

    #[test]
    fn test_queue_keeps_order() {
        let mut input = Input::new();
        input.handle_event(InteractionEvent::start(Vec2::ZERO, 2));
        input.handle_event(InteractionEvent::moved(Vec2::X, 2));
        input.handle_event(InteractionEvent::end(Vec2::Y, 2));
        let phases: Vec<InteractionPhase> = input.drain().map(|e| e.phase).collect();
        assert_eq!(
            phases,
            vec![InteractionPhase::Start, InteractionPhase::Move, InteractionPhase::End]
        );
        assert!(input.pending().is_empty());
        assert_eq!(input.active_pointers(), 0);
    }
}
