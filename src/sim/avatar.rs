//! First-person avatar
//!
//! Velocity is a per-tick displacement: impulses scale with dt, but the
//! integrated velocity is added to the position once per tick.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};

use super::arena::is_inside_arena;
use super::state::Outcome;
use crate::consts::*;
use crate::{forward_from_yaw, ground, right_from_yaw};

/// Movement keys held this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

/// What a movement step did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveResult {
    /// Forward or sideways input was held (advances the phase)
    pub progress: bool,
    /// The avatar backed out of the arena
    pub exit: Option<Outcome>,
}

#[derive(Debug, Clone)]
pub struct Avatar {
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Smoothed look target (x = yaw, y = pitch)
    pub look_target: Vec2,
    /// Projection camera that drifts along the facing direction
    pub trail_camera: Vec3,
    /// Texture offset of the scrolling projection floor
    pub floor_offset: Vec2,
    /// Whether the walking loop should be playing
    pub footsteps: bool,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            position: Vec3::from_array(AVATAR_START),
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            look_target: Vec2::ZERO,
            trail_camera: Vec3::from_array(TRAIL_CAMERA_START),
            floor_offset: Vec2::ZERO,
            footsteps: false,
        }
    }
}

impl Avatar {
    /// Horizontal facing direction
    pub fn forward(&self) -> Vec3 {
        forward_from_yaw(self.yaw)
    }

    /// Horizontal right-hand direction
    pub fn side(&self) -> Vec3 {
        right_from_yaw(self.yaw)
    }

    /// Facing direction on the ground plane (x, z)
    pub fn forward_2d(&self) -> Vec2 {
        ground(self.forward())
    }

    /// Full view direction including pitch (used for aiming)
    pub fn view_direction(&self) -> Vec3 {
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(-self.yaw.sin() * cp, sp, -self.yaw.cos() * cp)
    }

    /// Trail camera position on the ground plane
    pub fn trail_position_2d(&self) -> Vec2 {
        ground(self.trail_camera)
    }

    /// Integrate one tick of movement against the arena boundary.
    ///
    /// `phase` only decides which ending is reached when the avatar backs out.
    pub fn movement(&mut self, dt: f32, keys: MoveKeys, phase: f32) -> MoveResult {
        let mut result = MoveResult::default();
        let forward = self.forward();
        let side = self.side();
        let impulse = AVATAR_ACCEL * dt;

        let decay = (-AVATAR_DAMPING * dt).exp() - 1.0;
        self.velocity += self.velocity * decay;

        if keys.forward {
            self.velocity += forward * impulse;
            result.progress = true;
        }
        if keys.back {
            self.velocity -= forward * impulse;
        }
        if keys.left {
            self.velocity -= side * impulse;
            result.progress = true;
        }
        if keys.right {
            self.velocity += side * impulse;
            result.progress = true;
        }
        self.velocity = self.velocity.clamp_length_max(AVATAR_MAX_SPEED);

        let backward = self.velocity.dot(forward) < 0.0;
        let next = self.position + self.velocity;

        if is_inside_arena(next.x, next.z) {
            self.footsteps = self.velocity.length() > FOOTSTEP_SPEED;
            self.position = next;
        } else if !result.progress && backward {
            self.footsteps = false;
            result.exit = Some(if phase < PHASE_SUCCESS_LIMIT {
                Outcome::Success
            } else {
                Outcome::Failure
            });
        }

        self.trail_camera += forward * (TRAIL_CAMERA_SPEED * dt);

        result
    }

    /// Accumulate a pointer delta into the look target
    pub fn look(&mut self, delta: Vec2, sensitivity: f32) {
        self.look_target -= delta * sensitivity;
        self.look_target.y = self.look_target.y.clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Ease the view toward the look target
    pub fn rotate(&mut self) {
        let keep = 1.0 - LOOK_BLEND;
        self.yaw = self.yaw * keep + self.look_target.x * LOOK_BLEND;
        self.pitch = self.pitch * keep + self.look_target.y * LOOK_BLEND;
    }

    /// Snap the look target to the current view (on capture change)
    pub fn sync_look_target(&mut self) {
        self.look_target = Vec2::new(self.yaw, self.pitch);
    }

    /// Keep the projection floor under the trail camera and scroll its texture
    pub fn scroll_floor(&mut self) {
        let dir = self.forward_2d() * FLOOR_SCROLL;
        self.floor_offset.x += dir.x;
        self.floor_offset.y -= dir.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn keys(forward: bool, back: bool, left: bool, right: bool) -> MoveKeys {
        MoveKeys {
            forward,
            back,
            left,
            right,
        }
    }

    #[test]
    fn test_forward_walk() {
        let mut avatar = Avatar::default();
        let start = avatar.position;
        let mut result = MoveResult::default();
        for _ in 0..30 {
            result = avatar.movement(DT, keys(true, false, false, false), 0.0);
        }
        assert!(result.progress);
        assert!(result.exit.is_none());
        assert!(avatar.position.z < start.z);
        assert_eq!(avatar.position.y, start.y);
        assert!(avatar.footsteps);
    }

    #[test]
    fn test_speed_clamped() {
        let mut avatar = Avatar::default();
        avatar.position = Vec3::new(0.0, 100.0, 0.0);
        avatar.velocity = Vec3::new(0.0, 0.0, -50.0);
        avatar.movement(DT, keys(true, false, false, false), 0.0);
        assert!(avatar.velocity.length() <= AVATAR_MAX_SPEED + 1e-4);
    }

    #[test]
    fn test_velocity_decays_without_input() {
        let mut avatar = Avatar::default();
        avatar.position = Vec3::new(0.0, 100.0, 0.0);
        avatar.velocity = Vec3::new(0.0, 0.0, -1.0);
        avatar.movement(DT, MoveKeys::default(), 0.0);
        let expected = (-AVATAR_DAMPING * DT).exp();
        assert!((avatar.velocity.length() - expected).abs() < 1e-5);
    }

    #[test]
    fn test_footsteps_stop_when_slow() {
        let mut avatar = Avatar::default();
        avatar.footsteps = true;
        avatar.movement(DT, MoveKeys::default(), 0.0);
        assert!(!avatar.footsteps);
    }

    #[test]
    fn test_wall_blocks_forward_without_exit() {
        let mut avatar = Avatar::default();
        avatar.position = Vec3::new(0.0, 100.0, -720.0);
        avatar.velocity = Vec3::new(0.0, 0.0, -10.0);
        let before = avatar.position;
        let result = avatar.movement(DT, keys(true, false, false, false), 3.5);
        assert_eq!(avatar.position, before);
        assert!(result.exit.is_none());
    }

    #[test]
    fn test_backing_out_ends_session() {
        for (phase, expected) in [(2.5, Outcome::Success), (3.5, Outcome::Failure)] {
            let mut avatar = Avatar::default();
            avatar.position = Vec3::new(0.0, 100.0, 720.0);
            avatar.velocity = Vec3::new(0.0, 0.0, 10.0);
            let result = avatar.movement(DT, keys(false, true, false, false), phase);
            assert_eq!(result.exit, Some(expected));
            assert!(!result.progress);
        }
    }

    #[test]
    fn test_sideways_out_is_not_an_exit() {
        let mut avatar = Avatar::default();
        avatar.position = Vec3::new(0.0, 100.0, 720.0);
        avatar.velocity = Vec3::new(0.0, 0.0, 10.0);
        let result = avatar.movement(DT, keys(false, true, true, false), 2.0);
        assert!(result.exit.is_none());
    }

    #[test]
    fn test_trail_camera_drifts_forward() {
        let mut avatar = Avatar::default();
        avatar.movement(1.0, MoveKeys::default(), 0.0);
        assert!((avatar.trail_camera.z - (-TRAIL_CAMERA_SPEED)).abs() < 1e-4);
        assert_eq!(avatar.trail_camera.y, TRAIL_CAMERA_START[1]);
    }

    #[test]
    fn test_look_eases_toward_target() {
        let mut avatar = Avatar::default();
        avatar.look(Vec2::new(-100.0, 0.0), LOOK_SENSITIVITY);
        assert!((avatar.look_target.x - 0.2).abs() < 1e-6);
        avatar.rotate();
        assert!((avatar.yaw - 0.04).abs() < 1e-6);
        for _ in 0..200 {
            avatar.rotate();
        }
        assert!((avatar.yaw - 0.2).abs() < 1e-4);
    }

    #[test]
    fn test_pitch_target_clamped() {
        let mut avatar = Avatar::default();
        avatar.look(Vec2::new(0.0, -10_000.0), LOOK_SENSITIVITY);
        assert_eq!(avatar.look_target.y, FRAC_PI_2);
    }

    #[test]
    fn test_floor_scroll() {
        let mut avatar = Avatar::default();
        avatar.scroll_floor();
        // facing -z: x unchanged, y grows by FLOOR_SCROLL
        assert!(avatar.floor_offset.x.abs() < 1e-9);
        assert!((avatar.floor_offset.y - FLOOR_SCROLL).abs() < 1e-9);
    }
}
