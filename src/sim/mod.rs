//! Simulation module
//!
//! All scene-state logic lives here. This module must stay free of rendering
//! and platform code:
//! - One `tick` per simulated step, explicit `SessionState`
//! - Seeded RNG only
//! - Cues for audio/animation are emitted as `SimEvent`s, never played here

pub mod arena;
pub mod avatar;
pub mod environment;
pub mod monolith;
pub mod phase;
pub mod spikes;
pub mod state;
pub mod tick;

pub use arena::is_inside_arena;
pub use avatar::{Avatar, MoveKeys, MoveResult};
pub use environment::{EnvironmentColors, color_at, needs_refresh, sun_direction};
pub use monolith::{MonolithMarker, MonolithSet, MonolithStatus};
pub use phase::PhaseClock;
pub use spikes::{SpawnCadence, Spike, SpikeField};
pub use state::{Outcome, SessionConfig, SessionState, SimEvent};
pub use tick::{TickInput, tick};
