//! Session state and core simulation types
//!
//! Everything the simulation mutates lives in `SessionState`; nothing is
//! global. The host reads it after each tick to drive audio and rendering.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::avatar::Avatar;
use super::monolith::MonolithSet;
use super::phase::PhaseClock;
use super::spikes::{SpawnCadence, SpikeField};
use crate::consts::{MONOLITH_RISE_PHASES, PHASE_FAILURE};

/// How a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Walked away before the sky turned
    Success,
    /// Stayed too long
    Failure,
}

impl Outcome {
    /// Page the host navigates to
    pub fn page(&self) -> &'static str {
        match self {
            Outcome::Success => "good.html",
            Outcome::Failure => "dead.html",
        }
    }
}

/// One-shot cues raised during a tick, drained by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// A monolith started rising
    MonolithRise(usize),
    /// A monolith started falling
    MonolithFall(usize),
    /// The final monolith's embedded animation should start
    MarkerAnimation,
    /// The session reached an ending
    SessionEnded(Outcome),
}

/// Start parameters for a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Seed for spike placement
    pub seed: u64,
    /// Phase at session start
    pub start_phase: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            start_phase: 0.0,
        }
    }
}

/// Complete simulation state for one play-through
#[derive(Debug, Clone)]
pub struct SessionState {
    pub seed: u64,
    pub clock: PhaseClock,
    pub avatar: Avatar,
    pub monoliths: MonolithSet,
    pub spikes: SpikeField,
    pub cadence: SpawnCadence,
    /// Simulated seconds while the session was active
    pub elapsed: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Ending, once reached. No further ticks run after this is set.
    pub outcome: Option<Outcome>,
    /// Cues raised since the host last drained them
    pub events: Vec<SimEvent>,
    pub(crate) rng: Pcg32,
}

impl SessionState {
    pub fn new(config: SessionConfig) -> Self {
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let spikes = SpikeField::new(&mut rng);
        Self {
            seed: config.seed,
            clock: PhaseClock::new(config.start_phase),
            avatar: Avatar::default(),
            monoliths: MonolithSet::new(),
            spikes,
            cadence: SpawnCadence::default(),
            elapsed: 0.0,
            time_ticks: 0,
            outcome: None,
            events: Vec::new(),
            rng,
        }
    }

    #[inline]
    pub fn phase(&self) -> f32 {
        self.clock.phase()
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Record the ending. Only the first call has any effect.
    pub fn finish(&mut self, outcome: Outcome) {
        if self.outcome.is_some() {
            return;
        }
        log::info!("Session ended: {:?} at phase {:.3}", outcome, self.phase());
        self.avatar.footsteps = false;
        self.outcome = Some(outcome);
        self.events.push(SimEvent::SessionEnded(outcome));
    }

    /// Narrative step taken whenever the avatar makes progress: raise the
    /// next due monolith or end the session, then advance the phase unless a
    /// monolith is moving.
    pub fn progress(&mut self, dt: f32) {
        let phase = self.phase();
        if phase >= PHASE_FAILURE {
            self.finish(Outcome::Failure);
            return;
        }

        // Only one marker may be in motion at a time
        if !self.monoliths.is_active() {
            let due = MONOLITH_RISE_PHASES
                .iter()
                .enumerate()
                .find(|&(i, &threshold)| phase > threshold && !self.monoliths.has_risen(i))
                .map(|(i, _)| i);
            if let Some(index) = due {
                self.monoliths.init_rise(index, &mut self.events);
            }
        }

        if !self.monoliths.is_active() {
            self.clock.advance(dt);
        }
    }

    /// Take all pending cues
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}
