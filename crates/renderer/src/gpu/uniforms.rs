use bytemuck::{Pod, Zeroable};

/// Off-screen pointer position used until the first pointer event arrives.
pub const POINTER_PARKED: [f32; 2] = [-1000.0, -1000.0];

/// CPU-side mirror of the wave uniform block.
///
/// The layout matches the `WaveParams` block emitted by
/// [`crate::compile::wave_fragment_source`] and therefore follows std140
/// rules: the vec3 resolution shares its 16-byte slot with `time`, and the
/// vec2 pointer sits on an 8-byte boundary right after it.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveUniforms {
    /// Surface size in physical pixels; the third component is always 1.
    pub resolution: [f32; 3],
    /// Seconds since the first frame.
    pub time: f32,
    /// Smoothed pointer position with a bottom-left origin.
    pub pointer: [f32; 2],
    /// How strongly the waves bend toward the pointer, in `[0, 1]`.
    pub bend_influence: f32,
    pub padding0: f32,
}

unsafe impl Zeroable for WaveUniforms {}
unsafe impl Pod for WaveUniforms {}

impl WaveUniforms {
    pub fn new(width: u32, height: u32) -> Self {
        let mut uniforms = Self {
            resolution: [0.0, 0.0, 1.0],
            time: 0.0,
            pointer: POINTER_PARKED,
            bend_influence: 0.0,
            padding0: 0.0,
        };
        uniforms.set_resolution(width as f32, height as f32);
        uniforms
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.resolution = [width, height, 1.0];
    }

    pub fn width(&self) -> f32 {
        self.resolution[0]
    }

    pub fn height(&self) -> f32 {
        self.resolution[1]
    }
}
