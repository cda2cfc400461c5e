//! CPU evaluation of the wave shader.
//!
//! Mirrors the GLSL emitted by [`crate::compile`] operation for operation so
//! still frames can be produced without a GPU and so the shading maths can be
//! unit tested. Coordinates use the shader convention: `frag_coord` has a
//! bottom-left origin and pixel centres sit on half-integers.

use glam::{Mat2, Vec2, Vec3};

use crate::gpu::WaveUniforms;
use crate::waves::{
    self, WaveGroup, AMPLITUDE, AMPLITUDE_RATE, BEND_FALLOFF, BEND_STRENGTH, DRIFT_RATE,
    GLOW_BIAS, GLOW_INTENSITY, TIME_SCALE, WAVES_PER_GROUP, WAVE_GROUPS,
};

/// Maps a pixel-space position to centred, aspect-corrected, y-flipped space.
pub fn normalize(coord: Vec2, resolution: Vec2) -> Vec2 {
    let uv = (2.0 * coord - resolution) / resolution.y;
    Vec2::new(uv.x, -uv.y)
}

/// `mat2(cos r, sin r, -sin r, cos r)` in GLSL column order.
fn rotation(angle: f32) -> Mat2 {
    let (sin, cos) = angle.sin_cos();
    Mat2::from_cols(Vec2::new(cos, sin), Vec2::new(-sin, cos))
}

/// GLSL `v * m`: a row vector multiplied by a matrix.
fn row_mul(v: Vec2, m: Mat2) -> Vec2 {
    Vec2::new(v.dot(m.x_axis), v.dot(m.y_axis))
}

/// Vertical displacement pulling a wave toward the pointer.
///
/// Gaussian in the squared distance between the pixel and the pointer, and
/// scaled linearly by `bend_influence`, so it vanishes when the influence is 0.
pub fn bend_displacement(screen_uv: Vec2, pointer_uv: Vec2, bend_influence: f32) -> f32 {
    let d = screen_uv - pointer_uv;
    let falloff = (-d.dot(d) * BEND_FALLOFF).exp();
    (pointer_uv.y - screen_uv.y) * falloff * BEND_STRENGTH * bend_influence
}

/// Brightness of a single line sampled at `p`.
pub fn wave(
    p: Vec2,
    offset: f32,
    time: f32,
    screen_uv: Vec2,
    pointer_uv: Vec2,
    bend_influence: f32,
) -> f32 {
    let t = time * TIME_SCALE;
    let amp = (offset + t * AMPLITUDE_RATE).sin() * AMPLITUDE;
    let mut y = (p.x + offset + t * DRIFT_RATE).sin() * amp;
    y += bend_displacement(screen_uv, pointer_uv, bend_influence);
    GLOW_INTENSITY / ((p.y - y).abs() + GLOW_BIAS)
}

/// Summed, weighted brightness of one group at `uv`.
fn group_brightness(
    group: &WaveGroup,
    uv: Vec2,
    time: f32,
    pointer_uv: Vec2,
    bend_influence: f32,
) -> f32 {
    let mut ruv = row_mul(uv, rotation(group.twist * (uv.length() + 1.0).ln()));
    if group.mirror_x {
        ruv.x = -ruv.x;
    }
    (0..WAVES_PER_GROUP)
        .map(|index| {
            let (origin, phase) = group.line(index);
            let p = ruv + Vec2::from_array(origin);
            wave(p, phase, time, uv, pointer_uv, bend_influence) * group.weight
        })
        .sum()
}

/// Colour of the pixel at `frag_coord` for the given uniforms, alpha included.
pub fn shade(frag_coord: Vec2, uniforms: &WaveUniforms) -> [f32; 4] {
    let resolution = Vec2::new(uniforms.width(), uniforms.height());
    let uv = normalize(frag_coord, resolution);
    let pointer_uv = normalize(Vec2::from_array(uniforms.pointer), resolution);

    let left = Vec3::from_array(waves::rgb8(waves::GRADIENT_LEFT_RGB8));
    let right = Vec3::from_array(waves::rgb8(waves::GRADIENT_RIGHT_RGB8));
    let wave_color = left.lerp(right, frag_coord.x / resolution.x);

    let brightness: f32 = WAVE_GROUPS
        .iter()
        .map(|group| {
            group_brightness(
                group,
                uv,
                uniforms.time,
                pointer_uv,
                uniforms.bend_influence,
            )
        })
        .sum();

    let color = Vec3::from_array(waves::BACKGROUND) + wave_color * brightness;
    [color.x, color.y, color.z, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniforms(width: u32, height: u32, time: f32) -> WaveUniforms {
        let mut uniforms = WaveUniforms::new(width, height);
        uniforms.time = time;
        uniforms
    }

    #[test]
    fn normalize_centres_and_flips() {
        let resolution = Vec2::new(800.0, 600.0);
        assert_eq!(normalize(Vec2::new(400.0, 300.0), resolution), Vec2::ZERO);

        let top_right = normalize(Vec2::new(800.0, 600.0), resolution);
        assert!((top_right.x - 800.0 / 600.0).abs() < 1e-6);
        assert!((top_right.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn displacement_vanishes_without_influence() {
        let screen = Vec2::new(0.1, -0.2);
        for pointer in [Vec2::new(0.1, -0.1), Vec2::new(3.0, 2.0), Vec2::new(-1.0, 0.5)] {
            assert_eq!(bend_displacement(screen, pointer, 0.0), 0.0);
        }
    }

    #[test]
    fn displacement_scales_with_influence_and_falls_off() {
        let screen = Vec2::new(0.0, 0.0);
        let near = Vec2::new(0.0, 0.1);
        let full = bend_displacement(screen, near, 1.0);
        let half = bend_displacement(screen, near, 0.5);
        assert!(full != 0.0);
        assert!((half - full * 0.5).abs() < 1e-7);

        let far = Vec2::new(0.0, 3.0);
        assert!(bend_displacement(screen, far, 1.0).abs() < full.abs());
    }

    #[test]
    fn rotation_matches_glsl_row_vector_product() {
        let v = Vec2::new(1.0, 0.0);
        let rotated = row_mul(v, rotation(std::f32::consts::FRAC_PI_2));
        assert!(rotated.x.abs() < 1e-6);
        assert!((rotated.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn glow_peaks_on_the_line() {
        let on_line = wave(Vec2::new(0.0, 0.0), 0.0, 0.0, Vec2::ZERO, Vec2::ZERO, 0.0);
        assert!((on_line - GLOW_INTENSITY / GLOW_BIAS).abs() < 1e-4);
        let off_line = wave(Vec2::new(0.0, 0.5), 0.0, 0.0, Vec2::ZERO, Vec2::ZERO, 0.0);
        assert!(off_line < on_line);
    }

    #[test]
    fn shade_is_opaque_and_above_background() {
        let uniforms = uniforms(64, 48, 1.25);
        for (x, y) in [(0.5, 0.5), (32.5, 24.5), (63.5, 47.5)] {
            let [r, g, b, a] = shade(Vec2::new(x, y), &uniforms);
            assert_eq!(a, 1.0);
            assert!(r >= waves::BACKGROUND[0]);
            assert!(g >= waves::BACKGROUND[1]);
            assert!(b >= waves::BACKGROUND[2]);
        }
    }

    #[test]
    fn parked_pointer_has_no_visible_effect() {
        let mut parked = uniforms(64, 48, 0.75);
        parked.bend_influence = 1.0;
        let idle = uniforms(64, 48, 0.75);
        let coord = Vec2::new(20.5, 30.5);
        let a = shade(coord, &parked);
        let b = shade(coord, &idle);
        for channel in 0..3 {
            assert!((a[channel] - b[channel]).abs() < 1e-5);
        }
    }

    #[test]
    fn pointer_bends_nearby_pixels() {
        let mut bent = uniforms(64, 48, 0.5);
        bent.pointer = [32.0, 30.0];
        bent.bend_influence = 1.0;
        let mut flat = bent;
        flat.bend_influence = 0.0;

        let differs = (0..48).any(|y| {
            let coord = Vec2::new(32.5, y as f32 + 0.5);
            let a = shade(coord, &bent);
            let b = shade(coord, &flat);
            (a[0] - b[0]).abs() > 1e-4
        });
        assert!(differs);
    }
}
