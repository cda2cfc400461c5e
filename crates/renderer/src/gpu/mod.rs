//! GPU side of the wave background.
//!
//! - `context` owns wgpu instance/device/surface wiring and reconfigures the
//!   swapchain when the window resizes.
//! - `pipeline` compiles the GLSL stages into the single render pipeline.
//! - `uniforms` mirrors the shader's uniform block.
//! - `state` glues everything together and exposes the `GpuState` API used by
//!   `window`.

mod context;
mod pipeline;
mod state;
mod uniforms;

#[cfg(test)]
pub(crate) use context::accepted_surface_size;
pub(crate) use state::GpuState;
pub use uniforms::{WaveUniforms, POINTER_PARKED};
