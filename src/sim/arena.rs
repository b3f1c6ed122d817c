//! Octagonal arena boundary
//!
//! The playable floor is the intersection of an axis-aligned square and the
//! same square rotated by 45 degrees (scaled by sqrt 2), which yields a
//! regular octagon of side `ARENA_WIDTH`.

use std::f32::consts::SQRT_2;

use crate::consts::ARENA_WIDTH;

/// Half-width of the axis-aligned square
#[inline]
pub fn arena_half_width() -> f32 {
    ARENA_WIDTH * (1.0 + SQRT_2) / 2.0
}

/// Half-width of the rotated square, measured on the diagonal axes
#[inline]
pub fn arena_diagonal_half_width() -> f32 {
    arena_half_width() * SQRT_2
}

#[inline]
fn between(a: f32, min: f32, max: f32) -> bool {
    min <= a && a <= max
}

/// True if the ground point (x, z) lies inside (or on) the arena boundary
pub fn is_inside_arena(x: f32, z: f32) -> bool {
    let radius = arena_half_width();
    let radius2 = arena_diagonal_half_width();
    let square = between(x, -radius, radius) && between(z, -radius, radius);
    let diamond = between(z - x, -radius2, radius2) && between(x + z, -radius2, radius2);
    square && diamond
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_inside() {
        assert!(is_inside_arena(0.0, 0.0));
    }

    #[test]
    fn test_axis_extent() {
        let r = arena_half_width();
        assert!(is_inside_arena(r - 1.0, 0.0));
        assert!(is_inside_arena(0.0, -(r - 1.0)));
        assert!(!is_inside_arena(r + 1.0, 0.0));
        assert!(!is_inside_arena(0.0, r + 1.0));
    }

    #[test]
    fn test_corners_cut() {
        // The square's corner is outside the octagon
        let r = arena_half_width();
        assert!(!is_inside_arena(r - 1.0, r - 1.0));
        // A point on the diagonal just inside the cut edge
        let d = arena_diagonal_half_width() / 2.0 - 1.0;
        assert!(is_inside_arena(d, d));
        assert!(is_inside_arena(-d, d));
    }

    #[test]
    fn test_start_position_inside() {
        let start = crate::consts::AVATAR_START;
        assert!(is_inside_arena(start[0], start[2]));
    }
}
