//! Per-frame render descriptions
//!
//! Plain data built from `SessionState`. The primary view is the hall seen
//! through the player's eyes; the projection view is the open landscape seen
//! from the trail camera, rendered first and shown on the hall walls.

use glam::{Vec2, Vec3};

use crate::consts::FOG_DENSITY;
use crate::sim::environment::{EnvironmentColors, color_at, needs_refresh, sun_direction};
use crate::sim::monolith::{FINAL_MONOLITH, MONOLITH_COUNT};
use crate::sim::{MonolithStatus, SessionState};
use crate::{forward_from_yaw, right_from_yaw};

/// Vertical field of view shared by both cameras (degrees)
pub const FOV_Y_DEGREES: f32 = 75.0;
pub const NEAR_PLANE: f32 = 0.2;
pub const FAR_PLANE: f32 = 2400.0;

/// Which scene a view draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    /// Hall, monoliths and the projected walls
    Primary,
    /// Sky, scrolling floor and spikes, rendered offscreen
    Projection,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_degrees: f32,
}

impl CameraView {
    /// Player's eye
    pub fn primary(state: &SessionState) -> Self {
        Self {
            position: state.avatar.position,
            yaw: state.avatar.yaw,
            pitch: state.avatar.pitch,
            fov_y_degrees: FOV_Y_DEGREES,
        }
    }

    /// Trail camera. It only translates; its orientation stays fixed.
    pub fn projection(state: &SessionState) -> Self {
        Self {
            position: state.avatar.trail_camera,
            yaw: 0.0,
            pitch: 0.0,
            fov_y_degrees: FOV_Y_DEGREES,
        }
    }

    /// Unit view direction (pitch applied after yaw)
    pub fn forward(&self) -> Vec3 {
        let flat = forward_from_yaw(self.yaw);
        (flat * self.pitch.cos() + Vec3::Y * self.pitch.sin()).normalize_or_zero()
    }

    pub fn right(&self) -> Vec3 {
        right_from_yaw(self.yaw)
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward())
    }
}

/// Monolith as drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerView {
    pub center: Vec2,
    pub y: f32,
    pub height: f32,
    /// Fully below the floor
    pub hidden: bool,
}

/// Spike as drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeView {
    pub pos: Vec2,
    pub tilt: f32,
    pub rotation: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneView {
    pub kind: SceneKind,
    pub phase: f32,
    pub colors: EnvironmentColors,
    pub sun: Vec3,
    pub fog_density: f32,
    /// Rebake the environment lighting this frame
    pub refresh_environment: bool,
    /// Projection floor texture offset
    pub floor_offset: Vec2,
    /// Flesh effect blend on the final monolith
    pub flesh_transition: f32,
    /// Heartbeat clock for the flesh effect (seconds of active time)
    pub flesh_time: f32,
    pub markers: [MarkerView; MONOLITH_COUNT],
    /// Empty for the primary scene. The GPU surface draws at most
    /// `gpu::MAX_SPIKES` of these.
    pub spikes: Vec<SpikeView>,
    pub show_stats: bool,
}

impl SceneView {
    fn common(kind: SceneKind, state: &SessionState, show_stats: bool) -> Self {
        let phase = state.phase();
        let markers = std::array::from_fn(|i| {
            let m = &state.monoliths.markers[i];
            MarkerView {
                center: m.center,
                y: m.y,
                height: m.height,
                hidden: m.status == MonolithStatus::Idle && m.y <= -m.height,
            }
        });
        Self {
            kind,
            phase,
            colors: color_at(phase),
            sun: sun_direction(phase),
            fog_density: FOG_DENSITY,
            refresh_environment: needs_refresh(phase),
            floor_offset: state.avatar.floor_offset,
            flesh_transition: state.monoliths.flesh_transition,
            flesh_time: state.elapsed,
            markers,
            spikes: Vec::new(),
            show_stats,
        }
    }

    pub fn primary(state: &SessionState, show_stats: bool) -> Self {
        Self::common(SceneKind::Primary, state, show_stats)
    }

    pub fn projection(state: &SessionState, show_stats: bool) -> Self {
        let mut view = Self::common(SceneKind::Projection, state, show_stats);
        view.spikes = state
            .spikes
            .spikes
            .iter()
            .map(|s| SpikeView {
                pos: s.pos,
                tilt: s.tilt,
                rotation: s.rotation,
                scale: s.scale,
            })
            .collect();
        view
    }

    /// The final monolith, which carries the flesh effect
    pub fn final_marker(&self) -> &MarkerView {
        &self.markers[FINAL_MONOLITH]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SessionConfig;

    #[test]
    fn test_views_follow_state() {
        let mut state = SessionState::new(SessionConfig {
            seed: 5,
            start_phase: 1.5,
        });
        state.elapsed = 12.0;

        let primary = SceneView::primary(&state, false);
        assert_eq!(primary.kind, SceneKind::Primary);
        assert!(primary.spikes.is_empty());
        assert_eq!(primary.colors, color_at(1.5));
        assert_eq!(primary.flesh_time, 12.0);
        assert!(primary.final_marker().hidden);

        let projection = SceneView::projection(&state, true);
        assert_eq!(projection.spikes.len(), state.spikes.len());
        assert!(projection.show_stats);
        assert_eq!(projection.fog_density, FOG_DENSITY);
    }

    #[test]
    fn test_camera_basis() {
        let state = SessionState::new(SessionConfig::default());
        let cam = CameraView::primary(&state);
        assert_eq!(cam.position, state.avatar.position);
        let f = cam.forward();
        assert!((f.length() - 1.0).abs() < 1e-5);
        assert!(f.dot(cam.right()).abs() < 1e-5);
        assert!(cam.up().y > 0.0);

        let trail = CameraView::projection(&state);
        assert_eq!(trail.position, state.avatar.trail_camera);
        assert!((trail.forward() - Vec3::NEG_Z).length() < 1e-6);
    }
}
