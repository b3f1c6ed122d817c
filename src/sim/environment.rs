//! Phase-driven sky and fog colours
//!
//! Three smooth steps centred on phase 1, 2 and 3 sum to a band value in
//! [0, 3]; the integer part picks a pair of neighbouring colour stops and the
//! fractional part blends between them.

use glam::Vec3;

use crate::smoothstep;

/// Half-width of each boundary transition
const BAND_HALF_WIDTH: f32 = 0.1;

/// Sky zenith colour stops
const SKY_HIGH: [Vec3; 4] = [
    Vec3::new(0.95, 1.0, 1.0),
    Vec3::new(0.3, 0.3, 0.3),
    Vec3::new(0.1, 0.1, 0.12),
    Vec3::new(0.1, 0.02, 0.01),
];

/// Sky horizon colour stops
const SKY_LOW: [Vec3; 4] = [
    Vec3::new(0.7, 0.95, 1.0),
    Vec3::new(0.1, 0.1, 0.1),
    Vec3::new(0.07, 0.05, 0.05),
    Vec3::new(0.05, 0.2, 0.08),
];

/// Fog colour stops (0xRRGGBB)
const FOG: [u32; 4] = [0xaabccc, 0x171717, 0x0d0808, 0x0d3a17];

/// Colours derived from the current phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentColors {
    pub sky_low: Vec3,
    pub sky_high: Vec3,
    pub fog: Vec3,
}

/// Convert 0xRRGGBB to an RGB vector in [0, 1]
pub fn rgb_from_hex(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Accumulated transition across the three phase boundaries, in [0, 3]
pub fn band(phase: f32) -> f32 {
    [1.0, 2.0, 3.0]
        .iter()
        .map(|c| smoothstep(c - BAND_HALF_WIDTH, c + BAND_HALF_WIDTH, phase))
        .sum()
}

fn blend(stops: &[Vec3; 4], band: f32) -> Vec3 {
    if band < 1.0 {
        stops[0].lerp(stops[1], band)
    } else if band < 2.0 {
        stops[1].lerp(stops[2], band - 1.0)
    } else {
        stops[2].lerp(stops[3], band - 2.0)
    }
}

/// Sky and fog colours for a phase. Pure.
pub fn color_at(phase: f32) -> EnvironmentColors {
    let b = band(phase);
    let fog = FOG.map(rgb_from_hex);
    EnvironmentColors {
        sky_low: blend(&SKY_LOW, b),
        sky_high: blend(&SKY_HIGH, b),
        fog: blend(&fog, b),
    }
}

/// Direction to the sun. The polar angle sinks with phase (radians, azimuth 0).
pub fn sun_direction(phase: f32) -> Vec3 {
    let polar = 90.0 - (phase * 2.0 + 20.0);
    Vec3::new(0.0, polar.cos(), polar.sin())
}

/// Whether the baked environment map should be regenerated this frame.
///
/// Regeneration is expensive, so it only happens near a colour boundary and
/// only while the sky is still changing.
pub fn needs_refresh(phase: f32) -> bool {
    if !(0.5..=3.09).contains(&phase) {
        return false;
    }
    let fract = phase - phase.floor();
    fract < 0.1 || fract > 0.9
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn test_stops_at_plateaus() {
        let c = color_at(0.0);
        assert!(close(c.sky_high, SKY_HIGH[0]));
        assert!(close(c.sky_low, SKY_LOW[0]));
        assert!(close(c.fog, rgb_from_hex(0xaabccc)));

        let c = color_at(1.5);
        assert!(close(c.sky_high, SKY_HIGH[1]));

        let c = color_at(2.5);
        assert!(close(c.sky_low, SKY_LOW[2]));

        let c = color_at(5.0);
        assert!(close(c.sky_high, SKY_HIGH[3]));
        assert!(close(c.fog, rgb_from_hex(0x0d3a17)));
    }

    #[test]
    fn test_band_midpoint_blends_evenly() {
        let c = color_at(1.0);
        let expected = SKY_HIGH[0].lerp(SKY_HIGH[1], band(1.0));
        assert!(close(c.sky_high, expected));
        assert!((band(1.0) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_band_range() {
        assert_eq!(band(-1.0), 0.0);
        assert_eq!(band(10.0), 3.0);
    }

    #[test]
    fn test_refresh_window() {
        assert!(!needs_refresh(0.2));
        assert!(!needs_refresh(0.5));
        assert!(needs_refresh(0.95));
        assert!(needs_refresh(2.05));
        assert!(!needs_refresh(1.5));
        assert!(!needs_refresh(3.2));
    }

    #[test]
    fn test_sun_direction_unit() {
        for phase in [0.0, 1.3, 3.9] {
            assert!((sun_direction(phase).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_hex_conversion() {
        assert!(close(rgb_from_hex(0xff0000), Vec3::X));
        assert!(close(rgb_from_hex(0x0000ff), Vec3::Z));
    }
}
