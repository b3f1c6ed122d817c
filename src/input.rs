//! Input state tracking for keyboard and pointer
//!
//! Turns raw key codes and pointer events into a per-frame TickInput snapshot

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::{MoveKeys, TickInput};

/// Logical movement actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Back,
    Left,
    Right,
}

impl Action {
    /// Map a `KeyboardEvent.code` to an action (WASD and arrow keys)
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" | "ArrowUp" => Some(Action::Forward),
            "KeyS" | "ArrowDown" => Some(Action::Back),
            "KeyA" | "ArrowLeft" => Some(Action::Left),
            "KeyD" | "ArrowRight" => Some(Action::Right),
            _ => None,
        }
    }
}

/// Key that toggles the stats overlay
pub const STATS_TOGGLE_CODE: &str = "KeyC";

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Action>,
    /// Pointer movement accumulated since the last snapshot
    pointer_delta: Vec2,
    /// Primary button pressed since the last snapshot
    aim_pending: bool,
    /// Pointer captured: the session is running
    captured: bool,
    /// Set when capture flips; cleared by `take_capture_change`
    capture_changed: bool,
    pub show_stats: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: &str) {
        if let Some(action) = Action::from_code(code) {
            self.held.insert(action);
        } else if code == STATS_TOGGLE_CODE {
            self.show_stats = !self.show_stats;
        }
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(action) = Action::from_code(code) {
            self.held.remove(&action);
        }
    }

    /// Relative pointer motion. Ignored unless the pointer is captured.
    pub fn pointer_moved(&mut self, dx: f32, dy: f32) {
        if self.captured {
            self.pointer_delta += Vec2::new(dx, dy);
        }
    }

    pub fn pointer_pressed(&mut self) {
        if self.captured {
            self.aim_pending = true;
        }
    }

    pub fn set_captured(&mut self, captured: bool) {
        if self.captured != captured {
            self.captured = captured;
            self.capture_changed = true;
        }
        if !captured {
            self.pointer_delta = Vec2::ZERO;
            self.aim_pending = false;
        }
    }

    /// Whether the session is active (pointer captured)
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Returns true once after each capture change
    pub fn take_capture_change(&mut self) -> bool {
        std::mem::take(&mut self.capture_changed)
    }

    /// Held keys as movement flags
    pub fn move_keys(&self) -> MoveKeys {
        MoveKeys {
            forward: self.is_held(Action::Forward),
            back: self.is_held(Action::Back),
            left: self.is_held(Action::Left),
            right: self.is_held(Action::Right),
        }
    }

    /// Build a tick snapshot, draining the accumulated pointer delta and click
    pub fn take_tick_input(&mut self, look_sensitivity: f32) -> TickInput {
        TickInput {
            keys: self.move_keys(),
            look_delta: std::mem::take(&mut self.pointer_delta),
            look_sensitivity,
            aim: std::mem::take(&mut self.aim_pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        let mut input = InputState::new();
        input.key_down("ArrowUp");
        input.key_down("KeyD");
        let keys = input.move_keys();
        assert!(keys.forward && keys.right);
        assert!(!keys.back && !keys.left);

        input.key_up("ArrowUp");
        assert!(!input.move_keys().forward);
    }

    #[test]
    fn test_pointer_delta_drained() {
        let mut input = InputState::new();
        input.pointer_moved(5.0, 5.0);
        assert_eq!(input.take_tick_input(0.002).look_delta, Vec2::ZERO);

        input.set_captured(true);
        input.pointer_moved(3.0, -1.0);
        input.pointer_moved(2.0, 0.5);
        input.pointer_pressed();
        let tick = input.take_tick_input(0.002);
        assert_eq!(tick.look_delta, Vec2::new(5.0, -0.5));
        assert!(tick.aim);

        let again = input.take_tick_input(0.002);
        assert_eq!(again.look_delta, Vec2::ZERO);
        assert!(!again.aim);
    }

    #[test]
    fn test_capture_change_reported_once() {
        let mut input = InputState::new();
        input.set_captured(true);
        assert!(input.take_capture_change());
        assert!(!input.take_capture_change());
        input.set_captured(true);
        assert!(!input.take_capture_change());
    }

    #[test]
    fn test_stats_toggle() {
        let mut input = InputState::new();
        input.key_down(STATS_TOGGLE_CODE);
        assert!(input.show_stats);
        input.key_down(STATS_TOGGLE_CODE);
        assert!(!input.show_stats);
    }
}
