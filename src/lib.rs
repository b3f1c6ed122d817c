//! Monolith Walk - a first-person walk under a phase-driven sky
//!
//! Core modules:
//! - `sim`: Simulation core (phase, avatar, monoliths, spikes, environment)
//! - `session`: Frame driver tying the simulation to audio, navigation and rendering
//! - `renderer`: Render submission (scene/camera views, GPU uniform upload)
//! - `audio`: Sound bank with idempotent play/pause over loaded handles
//! - `assets`: Pending (not yet loaded) resource handles
//! - `input`: Held actions, pointer deltas and capture state
//! - `settings`: Persisted player preferences

pub mod assets;
pub mod audio;
pub mod error;
pub mod input;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::Error;
pub use session::{Navigator, Session};
pub use settings::Settings;
pub use sim::{Outcome, SessionConfig, SessionState};

use glam::{Vec2, Vec3};

/// Tuning constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one step per display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 6;
    /// Largest frame delta accepted from the host clock (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Phase gained per second of forward progress is dt / PHASE_RATE
    pub const PHASE_RATE: f32 = 20.0;
    /// Phase at or beyond which any progress ends the session
    pub const PHASE_FAILURE: f32 = 4.0;
    /// Leaving the arena before this phase is a success
    pub const PHASE_SUCCESS_LIMIT: f32 = 2.9;
    /// Spike growth is dormant below this phase
    pub const PHASE_SPIKE_DORMANT: f32 = 0.4;
    /// Phase thresholds that raise each monolith
    pub const MONOLITH_RISE_PHASES: [f32; 3] = [0.5, 1.8, 3.2];

    /// Arena width (side of the inner square before octagon expansion)
    pub const ARENA_WIDTH: f32 = 600.0;

    /// Avatar impulse per second while a movement key is held
    pub const AVATAR_ACCEL: f32 = 10.0;
    /// Maximum per-tick displacement
    pub const AVATAR_MAX_SPEED: f32 = 20.0;
    /// Exponential velocity decay rate
    pub const AVATAR_DAMPING: f32 = 3.0;
    /// Minimum speed at which the walking loop plays
    pub const FOOTSTEP_SPEED: f32 = 0.1;
    /// Eye-level start position
    pub const AVATAR_START: [f32; 3] = [0.0, 100.0, 700.0];
    /// Look smoothing: fraction of the target blended in per tick
    pub const LOOK_BLEND: f32 = 0.2;
    /// Default radians per pointer pixel
    pub const LOOK_SENSITIVITY: f32 = 1.0 / 500.0;

    /// Trail (projection) camera start position
    pub const TRAIL_CAMERA_START: [f32; 3] = [0.0, 200.0, 0.0];
    /// Trail camera speed along the facing direction
    pub const TRAIL_CAMERA_SPEED: f32 = 20.0;
    /// Floor texture scroll per tick along the facing direction
    pub const FLOOR_SCROLL: f32 = 0.0008;

    /// Monolith rise/fall speed (units per second)
    pub const MONOLITH_SPEED: f32 = 40.0;
    /// Height of each monolith
    pub const MONOLITH_HEIGHTS: [f32; 3] = [400.0, 220.0, 420.0];
    /// Resting y of a monolith after it has fallen
    pub const MONOLITH_BOTTOM: f32 = -400.0;
    /// Half-width of the monolith footprint used for aiming
    pub const MONOLITH_HALF_WIDTH: f32 = 40.0;

    /// Forward distance at which spikes spawn
    pub const SPIKE_FAR: f32 = 1500.0;
    /// Lateral spawn offset range
    pub const SPIKE_LATERAL_MIN: f32 = 100.0;
    pub const SPIKE_LATERAL_MAX: f32 = 340.0;
    /// Age counter saturation (scale = age / SPIKE_MAX_AGE)
    pub const SPIKE_MAX_AGE: u32 = 1000;
    /// Spikes placed at session start
    pub const SPIKE_INITIAL_COUNT: usize = 30;
    /// Spawn/removal cadence (seconds of simulated time)
    pub const SPIKE_CADENCE: f32 = 3.0;

    /// Exponential fog density of the projection scene
    pub const FOG_DENSITY: f32 = 0.0010;
}

/// Horizontal facing direction for a yaw angle (yaw = 0 looks along -Z)
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
}

/// Horizontal right-hand direction for a yaw angle
#[inline]
pub fn right_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, -yaw.sin())
}

/// Project a 3D point/direction onto the ground plane as (x, z)
#[inline]
pub fn ground(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Hermite smoothstep between two edges
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_vectors_are_orthogonal() {
        for yaw in [0.0, 0.7, -2.1, 3.0] {
            let f = forward_from_yaw(yaw);
            let r = right_from_yaw(yaw);
            assert!(f.dot(r).abs() < 1e-6);
            assert!((f.length() - 1.0).abs() < 1e-6);
            // right = forward x up
            let cross = f.cross(Vec3::Y);
            assert!((cross - r).length() < 1e-6);
        }
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.9, 1.1, 0.0), 0.0);
        assert_eq!(smoothstep(0.9, 1.1, 2.0), 1.0);
        assert!((smoothstep(0.9, 1.1, 1.0) - 0.5).abs() < 1e-5);
    }
}
