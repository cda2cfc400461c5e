//! Constants describing the wave background.
//!
//! Both the GLSL program emitted by [`crate::compile`] and the CPU evaluator in
//! [`crate::reference`] read from this table, so the two renditions of the
//! effect stay in lockstep.

/// Fixed dark navy behind every wave.
pub const BACKGROUND: [f32; 3] = [0.06, 0.09, 0.16];

/// Left edge of the horizontal wave gradient, as 8-bit RGB.
pub const GRADIENT_LEFT_RGB8: [u8; 3] = [47, 75, 162];

/// Right edge of the horizontal wave gradient (`#e945f5`), as 8-bit RGB.
pub const GRADIENT_RIGHT_RGB8: [u8; 3] = [233, 69, 245];

/// Number of superimposed lines drawn per group.
pub const WAVES_PER_GROUP: usize = 5;

/// Horizontal spacing between neighbouring lines of a group.
pub const LINE_SPACING: f32 = 0.05;

/// Global multiplier applied to the time uniform before it drives the waves.
pub const TIME_SCALE: f32 = 0.8;
pub const AMPLITUDE: f32 = 0.3;
pub const AMPLITUDE_RATE: f32 = 0.2;
pub const DRIFT_RATE: f32 = 0.1;

/// Signed strength of the pointer bend. Every group shares the same value.
pub const BEND_STRENGTH: f32 = -0.5;
/// Exponent scale of the Gaussian falloff around the pointer.
pub const BEND_FALLOFF: f32 = 5.0;

pub const GLOW_INTENSITY: f32 = 0.015;
pub const GLOW_BIAS: f32 = 0.005;

/// One family of five lines sharing a twist, origin, and weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveGroup {
    pub name: &'static str,
    /// Rotation factor `k` in `k * log(|uv| + 1)`.
    pub twist: f32,
    /// Mirrors the rotated coordinates horizontally before sampling.
    pub mirror_x: bool,
    /// Offset added to the rotated coordinates for the first line.
    pub origin: [f32; 2],
    /// Phase of the first line.
    pub phase: f32,
    /// Phase increment between consecutive lines.
    pub phase_step: f32,
    /// Contribution of each line to the final colour.
    pub weight: f32,
}

impl WaveGroup {
    /// Offset vector and phase of line `index` within the group.
    pub fn line(&self, index: usize) -> ([f32; 2], f32) {
        let fi = index as f32;
        (
            [LINE_SPACING * fi + self.origin[0], self.origin[1]],
            self.phase + self.phase_step * fi,
        )
    }
}

pub const WAVE_GROUPS: [WaveGroup; 3] = [
    WaveGroup {
        name: "bottom",
        twist: 0.4,
        mirror_x: false,
        origin: [2.0, -0.7],
        phase: 1.5,
        phase_step: 0.2,
        weight: 0.2,
    },
    WaveGroup {
        name: "middle",
        twist: 0.2,
        mirror_x: false,
        origin: [5.0, 0.0],
        phase: 2.0,
        phase_step: 0.15,
        weight: 0.6,
    },
    WaveGroup {
        name: "top",
        twist: -0.4,
        mirror_x: true,
        origin: [10.0, 0.5],
        phase: 1.0,
        phase_step: 0.2,
        weight: 0.15,
    },
];

/// Converts an 8-bit colour to the normalised float triple used in shading.
pub fn rgb8(color: [u8; 3]) -> [f32; 3] {
    color.map(|channel| channel as f32 / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_offsets_step_along_x() {
        let group = WAVE_GROUPS[1];
        let (first, first_phase) = group.line(0);
        let (last, last_phase) = group.line(WAVES_PER_GROUP - 1);
        assert_eq!(first, [5.0, 0.0]);
        assert!((last[0] - 5.2).abs() < 1e-6);
        assert_eq!(last[1], 0.0);
        assert!((first_phase - 2.0).abs() < 1e-6);
        assert!((last_phase - 2.6).abs() < 1e-6);
    }

    #[test]
    fn only_the_top_group_is_mirrored() {
        let mirrored: Vec<_> = WAVE_GROUPS
            .iter()
            .filter(|group| group.mirror_x)
            .map(|group| group.name)
            .collect();
        assert_eq!(mirrored, vec!["top"]);
    }

    #[test]
    fn gradient_endpoints_normalise() {
        let left = rgb8(GRADIENT_LEFT_RGB8);
        assert!((left[0] - 47.0 / 255.0).abs() < 1e-6);
        assert!((left[2] - 162.0 / 255.0).abs() < 1e-6);
    }
}
