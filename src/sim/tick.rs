//! Simulation tick
//!
//! Advances the session by one step in a fixed order: look, movement and
//! narrative progress, view easing, floor scroll, spike growth, monolith
//! animation, then the cadence-gated spike spawn and cull.

use glam::Vec2;

use super::avatar::MoveKeys;
use super::state::SessionState;
use crate::consts::{LOOK_SENSITIVITY, PHASE_SPIKE_DORMANT};

/// Input commands for a single tick
#[derive(Debug, Clone)]
pub struct TickInput {
    pub keys: MoveKeys,
    /// Pointer movement since the last tick (pixels)
    pub look_delta: Vec2,
    /// Radians per pointer pixel
    pub look_sensitivity: f32,
    /// Primary button pressed: check whether the view is on a pending monolith
    pub aim: bool,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            keys: MoveKeys::default(),
            look_delta: Vec2::ZERO,
            look_sensitivity: LOOK_SENSITIVITY,
            aim: false,
        }
    }
}

/// Advance the session by one step. Does nothing once the session has ended.
pub fn tick(state: &mut SessionState, input: &TickInput, dt: f32) {
    if state.is_over() {
        return;
    }

    if input.look_delta != Vec2::ZERO {
        state
            .avatar
            .look(input.look_delta, input.look_sensitivity);
    }

    if input.aim {
        let eye = state.avatar.position;
        let dir = state.avatar.view_direction();
        state.monoliths.try_activate(eye, dir, &mut state.events);
    }

    let moved = state.avatar.movement(dt, input.keys, state.phase());
    if let Some(outcome) = moved.exit {
        state.finish(outcome);
        return;
    }
    if moved.progress {
        state.progress(dt);
        if state.is_over() {
            return;
        }
    }

    state.avatar.rotate();
    state.avatar.scroll_floor();

    let dormant = state.phase() < PHASE_SPIKE_DORMANT;
    state.spikes.grow(dormant);

    state.monoliths.step(dt);

    if state.cadence.poll(state.elapsed) {
        let origin = state.avatar.trail_position_2d();
        let facing = state.avatar.forward_2d();
        state.spikes.spawn(origin, facing, &mut state.rng);
        state.spikes.removal(origin);
    }

    state.elapsed += dt;
    state.time_ticks += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{MONOLITH_SPEED, SIM_DT, SPIKE_INITIAL_COUNT};
    use crate::sim::monolith::MonolithStatus;
    use crate::sim::state::{Outcome, SessionConfig, SimEvent};
    use glam::Vec3;

    fn state_at(phase: f32) -> SessionState {
        SessionState::new(SessionConfig {
            seed: 42,
            start_phase: phase,
        })
    }

    fn walk() -> TickInput {
        TickInput {
            keys: MoveKeys {
                forward: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_first_tick_spawns_spike() {
        let mut state = state_at(0.0);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.spikes.len(), SPIKE_INITIAL_COUNT + 1);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.spikes.len(), SPIKE_INITIAL_COUNT + 1);
        assert_eq!(state.time_ticks, 2);
    }

    #[test]
    fn test_spikes_dormant_early() {
        let mut state = state_at(0.0);
        tick(&mut state, &walk(), SIM_DT);
        assert_eq!(state.spikes.age, 0);

        let mut state = state_at(0.5);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.spikes.age, 1);
    }

    #[test]
    fn test_monolith_rise_scenario() {
        let mut state = state_at(0.6);
        tick(&mut state, &walk(), SIM_DT);
        assert_eq!(state.monoliths.markers[0].status, MonolithStatus::Rising);
        let after_first = state.monoliths.markers[0].y;
        assert!((after_first - (-400.0 + MONOLITH_SPEED * SIM_DT)).abs() < 1e-3);

        tick(&mut state, &TickInput::default(), SIM_DT);
        let after_second = state.monoliths.markers[0].y;
        assert!((after_second - after_first - MONOLITH_SPEED * SIM_DT).abs() < 1e-3);

        for _ in 0..1000 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.monoliths.markers[0].status, MonolithStatus::Pending);
        assert_eq!(state.monoliths.markers[0].y, 0.0);
    }

    #[test]
    fn test_phase_frozen_while_monolith_moves() {
        let mut state = state_at(0.6);
        for _ in 0..120 {
            tick(&mut state, &walk(), SIM_DT);
        }
        assert_eq!(state.phase(), 0.6);
    }

    #[test]
    fn test_aim_dismisses_pending_monolith() {
        let mut state = state_at(0.6);
        state.avatar.position = Vec3::new(0.0, 100.0, 300.0);
        tick(&mut state, &walk(), SIM_DT);
        for _ in 0..1000 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        state.drain_events();

        let aim = TickInput {
            aim: true,
            ..Default::default()
        };
        tick(&mut state, &aim, SIM_DT);
        assert_eq!(state.monoliths.markers[0].status, MonolithStatus::Falling);
        assert_eq!(state.drain_events(), vec![SimEvent::MonolithFall(0)]);
    }

    #[test]
    fn test_backing_out_endings() {
        for (phase, expected) in [(2.5, Outcome::Success), (3.5, Outcome::Failure)] {
            let mut state = state_at(phase);
            state.avatar.position = Vec3::new(0.0, 100.0, 720.0);
            state.avatar.velocity = Vec3::new(0.0, 0.0, 10.0);
            let back = TickInput {
                keys: MoveKeys {
                    back: true,
                    ..Default::default()
                },
                ..Default::default()
            };
            tick(&mut state, &back, SIM_DT);
            assert_eq!(state.outcome, Some(expected));

            // Ended sessions no longer tick
            let ticks = state.time_ticks;
            tick(&mut state, &back, SIM_DT);
            assert_eq!(state.time_ticks, ticks);
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = state_at(0.45);
        let mut b = state_at(0.45);
        let inputs = [
            walk(),
            TickInput {
                look_delta: Vec2::new(40.0, -5.0),
                ..Default::default()
            },
            walk(),
            TickInput::default(),
        ];
        for _ in 0..400 {
            for input in &inputs {
                tick(&mut a, input, SIM_DT);
                tick(&mut b, input, SIM_DT);
            }
        }
        assert_eq!(a.time_ticks, b.time_ticks);
        assert_eq!(a.spikes.spikes, b.spikes.spikes);
        assert_eq!(a.avatar.position, b.avatar.position);
        assert_eq!(a.phase(), b.phase());
    }
}
