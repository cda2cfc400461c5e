//! Per-frame animation state for the wave background.
//!
//! Input events only move *targets*. Each [`AnimationDriver::tick`] pulls the
//! *current* pointer position and bend influence a fixed fraction of the way
//! toward those targets, stamps the time, and hands back the uniform block for
//! exactly one draw.

use glam::Vec2;

use crate::gpu::{WaveUniforms, POINTER_PARKED};
use crate::runtime::TimeSample;

/// Fraction of the remaining distance covered per frame.
pub const SMOOTHING_FACTOR: f32 = 0.05;

/// Owns the uniform block and the smoothed inputs feeding it.
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    uniforms: WaveUniforms,
    target_pointer: Vec2,
    current_pointer: Vec2,
    target_influence: f32,
    current_influence: f32,
    smoothing: f32,
}

impl AnimationDriver {
    pub fn new(width: u32, height: u32) -> Self {
        let parked = Vec2::from_array(POINTER_PARKED);
        Self {
            uniforms: WaveUniforms::new(width, height),
            target_pointer: parked,
            current_pointer: parked,
            target_influence: 0.0,
            current_influence: 0.0,
            smoothing: SMOOTHING_FACTOR,
        }
    }

    /// Overrides the per-frame smoothing fraction.
    ///
    /// Values above 1 are capped at 1; zero, negative or non-finite values
    /// fall back to [`SMOOTHING_FACTOR`].
    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = if smoothing.is_finite() && smoothing > 0.0 {
            smoothing.min(1.0)
        } else {
            SMOOTHING_FACTOR
        };
        self
    }

    pub fn smoothing(&self) -> f32 {
        self.smoothing
    }

    /// Records a new viewport size; the next draw sees `(width, height, 1)`.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.uniforms.set_resolution(width as f32, height as f32);
    }

    /// Handles a pointer move reported with a top-left origin.
    ///
    /// The shader expects a bottom-left origin, so the vertical coordinate is
    /// flipped against the current viewport height.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        let height = self.uniforms.height();
        self.target_pointer = Vec2::new(x as f32, height - y as f32);
        self.target_influence = 1.0;
    }

    /// Handles the pointer leaving the surface. The last position is kept so
    /// the bend fades out in place.
    pub fn pointer_left(&mut self) {
        self.target_influence = 0.0;
    }

    /// Advances the smoothed state by one frame and returns the uniforms to draw with.
    pub fn tick(&mut self, sample: TimeSample) -> &WaveUniforms {
        self.uniforms.time = sample.seconds.max(self.uniforms.time);

        self.current_pointer = self.current_pointer.lerp(self.target_pointer, self.smoothing);
        self.current_influence =
            approach(self.current_influence, self.target_influence, self.smoothing);

        self.uniforms.pointer = self.current_pointer.to_array();
        self.uniforms.bend_influence = self.current_influence;
        &self.uniforms
    }

    pub fn uniforms(&self) -> &WaveUniforms {
        &self.uniforms
    }

    pub fn target_pointer(&self) -> [f32; 2] {
        self.target_pointer.to_array()
    }

    pub fn current_pointer(&self) -> [f32; 2] {
        self.current_pointer.to_array()
    }

    pub fn target_influence(&self) -> f32 {
        self.target_influence
    }

    pub fn current_influence(&self) -> f32 {
        self.current_influence
    }
}

fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(seconds: f32, frame: u64) -> TimeSample {
        TimeSample::new(seconds, frame)
    }

    fn sup_distance(a: [f32; 2], b: [f32; 2]) -> f32 {
        (a[0] - b[0]).abs().max((a[1] - b[1]).abs())
    }

    #[test]
    fn resize_sets_resolution_uniform() {
        let mut driver = AnimationDriver::new(1, 1);
        driver.resize(800, 600);
        assert_eq!(driver.uniforms().resolution, [800.0, 600.0, 1.0]);

        driver.resize(1280, 720);
        driver.tick(sample(0.0, 0));
        assert_eq!(driver.uniforms().resolution, [1280.0, 720.0, 1.0]);
    }

    #[test]
    fn pointer_move_flips_to_bottom_up_and_enables_bend() {
        let mut driver = AnimationDriver::new(800, 600);
        driver.pointer_moved(400.0, 300.0);
        assert_eq!(driver.target_pointer(), [400.0, 300.0]);
        assert_eq!(driver.target_influence(), 1.0);

        driver.pointer_moved(10.0, 50.0);
        assert_eq!(driver.target_pointer(), [10.0, 550.0]);
    }

    #[test]
    fn pointer_converges_without_overshoot() {
        let mut driver = AnimationDriver::new(800, 600);
        let moves = [(400.0, 300.0), (20.0, 580.0), (790.0, 10.0)];
        let mut frame = 0;
        for (x, y) in moves {
            driver.pointer_moved(x, y);
            let target = driver.target_pointer();
            let mut previous = sup_distance(driver.current_pointer(), target);
            for _ in 0..60 {
                driver.tick(sample(frame as f32 / 60.0, frame));
                frame += 1;
                let current = driver.current_pointer();
                let distance = sup_distance(current, target);
                assert!(distance <= previous + 1e-3, "distance grew: {distance} > {previous}");
                previous = distance;
            }
        }

        let target = driver.target_pointer();
        let before = driver.current_pointer();
        driver.tick(sample(10.0, frame));
        let after = driver.current_pointer();
        for axis in 0..2 {
            let lo = before[axis].min(target[axis]) - 1e-3;
            let hi = before[axis].max(target[axis]) + 1e-3;
            assert!(after[axis] >= lo && after[axis] <= hi, "overshoot on axis {axis}");
        }
    }

    #[test]
    fn influence_decays_geometrically_after_leave() {
        let mut driver = AnimationDriver::new(800, 600);
        driver.pointer_moved(100.0, 100.0);
        for frame in 0..400 {
            driver.tick(sample(frame as f32 / 60.0, frame));
        }
        assert!(driver.current_influence() > 0.99);

        driver.pointer_left();
        assert_eq!(driver.target_influence(), 0.0);

        let mut previous = driver.current_influence();
        for frame in 0..200 {
            driver.tick(sample(10.0 + frame as f32 / 60.0, 400 + frame));
            let current = driver.current_influence();
            assert!(current < previous);
            let ratio = current / previous;
            assert!((ratio - (1.0 - SMOOTHING_FACTOR)).abs() < 1e-4);
            previous = current;
        }
        assert!(driver.current_influence() < 0.001);
    }

    #[test]
    fn influence_ramps_toward_one_on_move() {
        let mut driver = AnimationDriver::new(800, 600);
        driver.pointer_moved(400.0, 300.0);
        let uniforms = driver.tick(sample(0.0, 0));
        assert!((uniforms.bend_influence - SMOOTHING_FACTOR).abs() < 1e-6);
    }

    #[test]
    fn time_uniform_never_decreases() {
        let mut driver = AnimationDriver::new(800, 600);
        let mut last = 0.0;
        for (frame, seconds) in [0.0, 0.016, 0.033, 0.033, 1.5].into_iter().enumerate() {
            let time = driver.tick(sample(seconds, frame as u64)).time;
            assert!(time >= last);
            last = time;
        }
        assert_eq!(last, 1.5);

        let time = driver.tick(sample(1.0, 9)).time;
        assert_eq!(time, 1.5);
    }

    #[test]
    fn pointer_starts_parked_off_screen() {
        let mut driver = AnimationDriver::new(800, 600);
        let uniforms = driver.tick(sample(0.0, 0));
        assert_eq!(uniforms.pointer, POINTER_PARKED);
        assert_eq!(uniforms.bend_influence, 0.0);
    }

    #[test]
    fn custom_smoothing_is_capped_or_defaulted() {
        let driver = AnimationDriver::new(10, 10).with_smoothing(3.0);
        assert_eq!(driver.smoothing(), 1.0);
        for fallback in [-1.0, 0.0, f32::NAN, f32::INFINITY] {
            let driver = AnimationDriver::new(10, 10).with_smoothing(fallback);
            assert_eq!(driver.smoothing(), SMOOTHING_FACTOR);
        }

        let mut snappy = AnimationDriver::new(800, 600).with_smoothing(1.0);
        snappy.pointer_moved(400.0, 100.0);
        snappy.tick(sample(0.0, 0));
        assert_eq!(snappy.current_pointer(), [400.0, 500.0]);
    }
}
