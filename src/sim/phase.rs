//! Narrative phase clock

use crate::consts::PHASE_RATE;

/// The single scalar that drives sky colour, monolith gating and the ending
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhaseClock {
    phase: f32,
}

impl PhaseClock {
    pub fn new(start: f32) -> Self {
        Self {
            phase: start.max(0.0),
        }
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Advance by `dt / 20`. Callers must not advance while a monolith is moving.
    pub fn advance(&mut self, dt: f32) {
        self.phase += dt.max(0.0) / PHASE_RATE;
    }
}
