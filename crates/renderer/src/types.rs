use std::time::Duration;

use crate::driver::SMOOTHING_FACTOR;
use crate::runtime::RenderPolicy;

/// Output color handling for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Match a browser canvas: gamma-encoded output on a non-sRGB swapchain.
    #[default]
    Auto,
    /// Treat shader outputs as gamma-encoded; use non-sRGB surfaces.
    Gamma,
    /// Treat shader outputs as linear and let an sRGB swapchain encode them.
    Linear,
}

/// How the renderer should present frames.
///
/// * `Windowed` opens a regular desktop window at the configured size.
/// * `Fullscreen` covers the current monitor with a borderless window, which
///   is how the effect is meant to be used as a background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Windowed,
    Fullscreen,
}

/// Anti-aliasing policy for the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Antialiasing {
    /// Pick the highest sample count supported by the surface format.
    #[default]
    Auto,
    /// Disable MSAA and render directly into the swapchain.
    Off,
    /// Request a specific MSAA sample count (clamped to what the device supports).
    Samples(u32),
}

/// Presentation pacing preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VsyncMode {
    /// FIFO when available, otherwise whatever the surface offers first.
    #[default]
    Auto,
    /// Always wait for vertical blank.
    On,
    /// Prefer immediate or mailbox presentation.
    Off,
}

/// Summary of the adapter wgpu picked, kept for logging and throttling decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub max_texture_dimension_2d: u32,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
        }
    }

    /// True for CPU rasterizers such as llvmpipe or WARP.
    pub fn is_software(&self) -> bool {
        if matches!(self.device_type, wgpu::DeviceType::Cpu) {
            return true;
        }
        let name = self.name.to_ascii_lowercase();
        ["llvmpipe", "softpipe", "swiftshader", "lavapipe", "warp"]
            .iter()
            .any(|needle| name.contains(needle))
    }
}

/// Immutable configuration passed to the renderer at start-up.
///
/// `RendererConfig` mirrors CLI flags and the config file and tells the
/// renderer how large the surface should be, how to present it, and how the
/// animation should feel.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Window size in physical pixels (ignored for the monitor in fullscreen).
    pub surface_size: (u32, u32),
    /// Window title.
    pub title: String,
    /// Presentation mode (window vs borderless fullscreen).
    pub mode: RenderMode,
    /// Anti-aliasing mode requested by the caller.
    pub antialiasing: Antialiasing,
    /// Desired color handling for the swapchain.
    pub color_space: ColorSpaceMode,
    /// Present mode preference.
    pub vsync: VsyncMode,
    /// Frame pacing and time source.
    pub policy: RenderPolicy,
    /// Per-frame smoothing fraction for pointer and bend influence.
    pub smoothing: f32,
    /// Interval for the debug uniform log; `None` disables it.
    pub stats_interval: Option<Duration>,
}

impl Default for RendererConfig {
    /// Provides a 1080p windowed configuration with stock animation settings.
    fn default() -> Self {
        Self {
            surface_size: (1920, 1080),
            title: "wavepaper".to_string(),
            mode: RenderMode::default(),
            antialiasing: Antialiasing::default(),
            color_space: ColorSpaceMode::default(),
            vsync: VsyncMode::default(),
            policy: RenderPolicy::default(),
            smoothing: SMOOTHING_FACTOR,
            stats_interval: Some(Duration::from_secs(1)),
        }
    }
}
