//! Tick clock for frame-stepped simulations.
//!
//! One tick is one host frame. Stages that run at a sub-rate (node motion,
//! edge refresh, steering, hard-cap enforcement) ask the clock whether they
//! are due this tick instead of keeping their own counters.
//!
//! # Example
//!
//! ```ignore
//! use nodeflow::time::TickClock;
//!
//! let mut clock = TickClock::new();
//! clock.advance();
//! if clock.every(2) {
//!     // runs on even ticks
//! }
//! ```

/// Discrete tick counter with pause support.
#[derive(Debug, Clone, Default)]
pub struct TickClock {
    /// Ticks advanced since creation or the last reset.
    tick: u64,
    /// Whether advancing is suspended.
    paused: bool,
}

impl TickClock {
    /// Create a clock at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next tick. Returns `false` (and stays put) while paused.
    pub fn advance(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.tick += 1;
        true
    }

    /// Current tick index.
    #[inline]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// `true` on ticks that are a multiple of `interval`. An interval of 0
    /// is treated as 1.
    #[inline]
    pub fn every(&self, interval: u64) -> bool {
        self.tick % interval.max(1) == 0
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Back to tick 0, running.
    pub fn reset(&mut self) {
        self.tick = 0;
        self.paused = false;
    }
}
