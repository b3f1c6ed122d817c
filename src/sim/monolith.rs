//! Monolith markers
//!
//! Three props that rise out of the floor as the phase crosses each
//! milestone, wait to be looked at and clicked, then sink away again.
//! Only one marker moves at a time; the set tracks which one.

use glam::{Vec2, Vec3};

use super::state::SimEvent;
use crate::consts::{MONOLITH_BOTTOM, MONOLITH_HALF_WIDTH, MONOLITH_HEIGHTS, MONOLITH_SPEED};

/// Number of markers in a session
pub const MONOLITH_COUNT: usize = 3;

/// Index of the marker that carries the flesh effect and never falls
pub const FINAL_MONOLITH: usize = MONOLITH_COUNT - 1;

/// Lifecycle of a single marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonolithStatus {
    /// Lowered below the floor
    #[default]
    Idle,
    /// Climbing toward y = 0
    Rising,
    /// Fully risen, waiting to be activated
    Pending,
    /// Sinking back below the floor
    Falling,
}

#[derive(Debug, Clone)]
pub struct MonolithMarker {
    pub status: MonolithStatus,
    pub height: f32,
    /// Current vertical offset (0 = fully risen)
    pub y: f32,
    /// Footprint centre on the ground plane
    pub center: Vec2,
    pub has_risen: bool,
    pub has_fallen: bool,
}

impl MonolithMarker {
    pub fn new(height: f32) -> Self {
        Self {
            status: MonolithStatus::Idle,
            height,
            y: -height,
            center: Vec2::ZERO,
            has_risen: false,
            has_fallen: false,
        }
    }

    /// Ray/box test against the marker's current collision volume (slab method)
    pub fn hit_by(&self, origin: Vec3, dir: Vec3) -> bool {
        let min = Vec3::new(
            self.center.x - MONOLITH_HALF_WIDTH,
            self.y,
            self.center.y - MONOLITH_HALF_WIDTH,
        );
        let max = Vec3::new(
            self.center.x + MONOLITH_HALF_WIDTH,
            self.y + self.height,
            self.center.y + MONOLITH_HALF_WIDTH,
        );

        let mut t_near = 0.0_f32;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            if d.abs() < f32::EPSILON {
                if o < min[axis] || o > max[axis] {
                    return false;
                }
                continue;
            }
            let t0 = (min[axis] - o) / d;
            let t1 = (max[axis] - o) / d;
            let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return false;
            }
        }
        true
    }
}

/// The three markers plus the set-level active index
#[derive(Debug, Clone)]
pub struct MonolithSet {
    pub markers: [MonolithMarker; MONOLITH_COUNT],
    /// Index of the marker most recently raised
    pub active: usize,
    /// Flesh shader blend for the final marker (0 = buried, 1 = fully risen)
    pub flesh_transition: f32,
}

impl Default for MonolithSet {
    fn default() -> Self {
        Self::new()
    }
}

impl MonolithSet {
    pub fn new() -> Self {
        Self {
            markers: MONOLITH_HEIGHTS.map(MonolithMarker::new),
            active: 0,
            flesh_transition: 0.0,
        }
    }

    /// The marker currently tracked by the set
    pub fn active_marker(&self) -> &MonolithMarker {
        &self.markers[self.active]
    }

    /// True while a marker is rising, pending or falling
    pub fn is_active(&self) -> bool {
        self.active_marker().status != MonolithStatus::Idle
    }

    pub fn has_risen(&self, index: usize) -> bool {
        self.markers.get(index).is_some_and(|m| m.has_risen)
    }

    /// Start raising a marker. Returns false (and does nothing) if the index
    /// is out of range or has already risen this session.
    pub fn init_rise(&mut self, index: usize, events: &mut Vec<SimEvent>) -> bool {
        let Some(marker) = self.markers.get_mut(index) else {
            return false;
        };
        if marker.has_risen {
            return false;
        }

        marker.status = MonolithStatus::Rising;
        marker.has_risen = true;
        marker.y = -marker.height;
        self.active = index;

        log::info!("Monolith {} rising", index);
        events.push(SimEvent::MonolithRise(index));
        if index == FINAL_MONOLITH {
            self.flesh_transition = 0.0;
            events.push(SimEvent::MarkerAnimation);
        }
        true
    }

    /// Start sinking the active marker
    pub fn init_fall(&mut self, events: &mut Vec<SimEvent>) {
        let index = self.active;
        self.markers[index].status = MonolithStatus::Falling;
        log::info!("Monolith {} falling", index);
        events.push(SimEvent::MonolithFall(index));
    }

    /// Aim check: a pending, non-final marker hit by the ray starts falling.
    /// Returns true if the fall was triggered.
    pub fn try_activate(&mut self, origin: Vec3, dir: Vec3, events: &mut Vec<SimEvent>) -> bool {
        let marker = self.active_marker();
        if marker.status != MonolithStatus::Pending || self.active >= FINAL_MONOLITH {
            return false;
        }
        if !marker.hit_by(origin, dir) {
            return false;
        }
        self.init_fall(events);
        true
    }

    /// Animate the active marker
    pub fn step(&mut self, dt: f32) {
        let index = self.active;
        let marker = &mut self.markers[index];
        match marker.status {
            MonolithStatus::Idle | MonolithStatus::Pending => {}
            MonolithStatus::Rising => {
                marker.y += dt * MONOLITH_SPEED;
                if index == FINAL_MONOLITH {
                    self.flesh_transition = 1.0 - marker.y / -marker.height;
                }
                if marker.y >= 0.0 {
                    marker.y = 0.0;
                    marker.status = MonolithStatus::Pending;
                    if index == FINAL_MONOLITH {
                        self.flesh_transition = 1.0;
                    }
                    log::info!("Monolith {} risen", index);
                }
            }
            MonolithStatus::Falling => {
                marker.y -= dt * MONOLITH_SPEED;
                if marker.y < -marker.height {
                    marker.y = MONOLITH_BOTTOM;
                    marker.status = MonolithStatus::Idle;
                    marker.has_fallen = true;
                    log::info!("Monolith {} cleared", index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rise_fully(set: &mut MonolithSet) {
        for _ in 0..10_000 {
            set.step(0.1);
            if set.active_marker().status == MonolithStatus::Pending {
                return;
            }
        }
        panic!("marker never finished rising");
    }

    #[test]
    fn test_rise_to_pending() {
        let mut set = MonolithSet::new();
        let mut events = Vec::new();
        assert!(set.init_rise(0, &mut events));
        assert_eq!(events, vec![SimEvent::MonolithRise(0)]);
        assert!(set.is_active());
        assert_eq!(set.markers[0].y, -400.0);

        set.step(0.5);
        assert!((set.markers[0].y - (-380.0)).abs() < 1e-4);
        assert_eq!(set.markers[0].status, MonolithStatus::Rising);

        rise_fully(&mut set);
        assert_eq!(set.markers[0].y, 0.0);
    }

    #[test]
    fn test_full_cycle_is_single_shot() {
        let mut set = MonolithSet::new();
        let mut events = Vec::new();
        set.init_rise(1, &mut events);
        rise_fully(&mut set);

        let eye = Vec3::new(0.0, 100.0, 500.0);
        assert!(set.try_activate(eye, Vec3::NEG_Z, &mut events));
        assert_eq!(set.markers[1].status, MonolithStatus::Falling);

        for _ in 0..1000 {
            set.step(0.1);
        }
        assert_eq!(set.markers[1].status, MonolithStatus::Idle);
        assert!(set.markers[1].has_fallen);
        assert_eq!(set.markers[1].y, MONOLITH_BOTTOM);
        assert!(!set.is_active());

        // Cannot rise again
        assert!(!set.init_rise(1, &mut events));
        assert_eq!(set.markers[1].status, MonolithStatus::Idle);
    }

    #[test]
    fn test_activation_requires_aim() {
        let mut set = MonolithSet::new();
        let mut events = Vec::new();
        set.init_rise(0, &mut events);
        rise_fully(&mut set);

        let eye = Vec3::new(0.0, 100.0, 500.0);
        assert!(!set.try_activate(eye, Vec3::Z, &mut events));
        assert!(!set.try_activate(eye, Vec3::X, &mut events));
        assert_eq!(set.active_marker().status, MonolithStatus::Pending);
    }

    #[test]
    fn test_activation_ignored_while_rising() {
        let mut set = MonolithSet::new();
        let mut events = Vec::new();
        set.init_rise(0, &mut events);
        let eye = Vec3::new(0.0, -100.0, 500.0);
        assert!(!set.try_activate(eye, Vec3::NEG_Z, &mut events));
    }

    #[test]
    fn test_final_marker_never_falls() {
        let mut set = MonolithSet::new();
        let mut events = Vec::new();
        set.init_rise(FINAL_MONOLITH, &mut events);
        assert!(events.contains(&SimEvent::MarkerAnimation));
        assert_eq!(set.flesh_transition, 0.0);

        set.step(1.0);
        assert!(set.flesh_transition > 0.0 && set.flesh_transition < 1.0);

        rise_fully(&mut set);
        assert_eq!(set.flesh_transition, 1.0);

        let eye = Vec3::new(0.0, 100.0, 500.0);
        assert!(!set.try_activate(eye, Vec3::NEG_Z, &mut events));
        assert!(set.is_active());
    }

    #[test]
    fn test_flesh_untouched_by_other_markers() {
        let mut set = MonolithSet::new();
        let mut events = Vec::new();
        set.init_rise(0, &mut events);
        set.step(1.0);
        assert_eq!(set.flesh_transition, 0.0);
    }
}
