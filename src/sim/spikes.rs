//! Spike field: decorative cones that trail the projection camera
//!
//! Spikes spawn far ahead of the trail camera, grow in lockstep with a shared
//! age counter and are culled once they fall behind the spawn radius.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use crate::consts::{
    SPIKE_CADENCE, SPIKE_FAR, SPIKE_INITIAL_COUNT, SPIKE_LATERAL_MAX, SPIKE_LATERAL_MIN,
    SPIKE_MAX_AGE,
};

/// A single spike
#[derive(Debug, Clone, PartialEq)]
pub struct Spike {
    pub id: u32,
    /// Ground position (x, z)
    pub pos: Vec2,
    /// Lean away from vertical (radians, 10-20 degrees)
    pub tilt: f32,
    /// Heading around the vertical axis (radians)
    pub rotation: f32,
    /// Uniform scale in [0, 1]
    pub scale: f32,
}

impl Spike {
    fn new(id: u32, pos: Vec2, scale: f32, rng: &mut impl Rng) -> Self {
        Self {
            id,
            pos,
            tilt: rng.random_range(10.0_f32..20.0).to_radians(),
            rotation: rng.random_range(0.0..TAU),
            scale,
        }
    }
}

/// Distance beyond which spikes are removed
pub fn removal_radius() -> f32 {
    let far = SPIKE_FAR;
    (far * far + (far * far * 0.16 + 10_000.0)).sqrt() + 10.0
}

#[derive(Debug, Clone)]
pub struct SpikeField {
    /// Live spikes in spawn order
    pub spikes: Vec<Spike>,
    /// Shared growth counter, saturating at `SPIKE_MAX_AGE`
    pub age: u32,
    next_id: u32,
}

impl SpikeField {
    /// Empty field
    pub fn empty() -> Self {
        Self {
            spikes: Vec::new(),
            age: 0,
            next_id: 1,
        }
    }

    /// Field seeded with a ring of dormant spikes around the origin
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut field = Self::empty();
        for _ in 0..SPIKE_INITIAL_COUNT {
            let bearing = rng.random_range(0.0..TAU);
            let dist = rng.random_range(500.0_f32..1100.0);
            let pos = Vec2::new(bearing.sin(), bearing.cos()) * dist;
            field.insert(pos, 0.0, rng);
        }
        field
    }

    pub fn len(&self) -> usize {
        self.spikes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spikes.is_empty()
    }

    /// Current shared scale
    pub fn scale(&self) -> f32 {
        self.age as f32 / SPIKE_MAX_AGE as f32
    }

    fn insert(&mut self, pos: Vec2, scale: f32, rng: &mut impl Rng) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.spikes.push(Spike::new(id, pos, scale, rng));
        id
    }

    /// Spawn a zero-scale spike far ahead of `origin`, offset to one side of
    /// `facing`. Returns the new spike's id.
    pub fn spawn(&mut self, origin: Vec2, facing: Vec2, rng: &mut impl Rng) -> u32 {
        let facing = facing.normalize_or_zero();
        let mut side = Vec2::new(-facing.y, facing.x);
        if rng.random_bool(0.5) {
            side = -side;
        }
        let lateral = rng.random_range(SPIKE_LATERAL_MIN..SPIKE_LATERAL_MAX);
        let pos = origin + facing * SPIKE_FAR + side * lateral;
        self.insert(pos, 0.0, rng)
    }

    /// Age the field one tick and resync every spike's scale.
    /// Dormant (no change at all) below the growth phase.
    pub fn grow(&mut self, dormant: bool) {
        if dormant {
            return;
        }
        self.age = (self.age + 1).min(SPIKE_MAX_AGE);
        let scale = self.scale();
        for spike in &mut self.spikes {
            spike.scale = scale;
        }
    }

    /// Remove spikes farther than the removal radius from `origin`.
    /// Returns how many were removed.
    pub fn removal(&mut self, origin: Vec2) -> usize {
        let radius = removal_radius();
        let before = self.spikes.len();
        self.spikes.retain(|s| origin.distance(s.pos) <= radius);
        let removed = before - self.spikes.len();
        if removed > 0 {
            log::debug!("Culled {} spikes ({} left)", removed, self.spikes.len());
        }
        removed
    }
}

/// Fires at most once per cadence window of simulated time.
///
/// Windows are identified by `floor(elapsed / period)`, so a frame that lands
/// late in a window still fires and a second frame in the same window never
/// does.
#[derive(Debug, Clone)]
pub struct SpawnCadence {
    period: f32,
    last_window: Option<u64>,
}

impl Default for SpawnCadence {
    fn default() -> Self {
        Self::new(SPIKE_CADENCE)
    }
}

impl SpawnCadence {
    pub fn new(period: f32) -> Self {
        Self {
            period,
            last_window: None,
        }
    }

    /// Returns true if `elapsed` falls in a window that has not fired yet
    pub fn poll(&mut self, elapsed: f32) -> bool {
        let window = (elapsed.max(0.0) / self.period).floor() as u64;
        if self.last_window.is_some_and(|last| window <= last) {
            return false;
        }
        self.last_window = Some(window);
        true
    }
}
