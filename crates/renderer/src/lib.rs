//! Renderer crate for wavepaper, an animated wave background.
//!
//! One fixed GLSL fragment shader draws three groups of glowing sine waves
//! over a dark background. The waves bend toward the pointer; the pointer
//! position and the strength of that bend are smoothed every frame so the
//! motion never jumps. The overall flow is:
//!
//! ```text
//!   CLI / wavepaper
//!          │ RendererConfig
//!          ▼
//!   Renderer::run ──▶ WindowState ──▶ winit event loop ──▶ render_frame()
//!                          │                                     │
//!                          └─ AnimationDriver::tick() ──▶ WaveUniforms ──▶ GPU UBO
//! ```
//!
//! Input events only move targets inside [`AnimationDriver`]; each redraw
//! advances the smoothed state once and uploads the resulting uniforms.
//! [`export`] evaluates the same shader on the CPU to write still frames
//! without a window or GPU.

mod compile;
pub mod driver;
pub mod export;
mod gpu;
pub mod reference;
pub mod runtime;
mod types;
pub mod waves;
mod window;

use anyhow::Result;

pub use driver::{AnimationDriver, SMOOTHING_FACTOR};
pub use export::{export_still, render_still, StillFrame};
pub use gpu::{WaveUniforms, POINTER_PARKED};
pub use runtime::{ExportFormat, RenderPolicy, TimeSample};
pub use types::{
    AdapterProfile, Antialiasing, ColorSpaceMode, RenderMode, RendererConfig, VsyncMode,
};

/// High-level entry point that owns the chosen configuration.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    /// Builds a renderer for the supplied configuration.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the window and runs until it is closed.
    ///
    /// Fails if no window, adapter, or surface can be created.
    pub fn run(&mut self) -> Result<()> {
        window::run(self.config.clone())
    }
}
