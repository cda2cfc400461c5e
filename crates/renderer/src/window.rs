use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, Window, WindowBuilder};

use tracing::{error, info, warn};

use crate::driver::AnimationDriver;
use crate::gpu::GpuState;
use crate::runtime::{
    time_source_for_policy, BoxedTimeSource, FrameScheduler, RenderPolicy, TimeSample,
};
use crate::types::{AdapterProfile, RenderMode, RendererConfig};

const SOFTWARE_FPS_CAP: f32 = 15.0;

/// Window, GPU state, and animation driver for one running session.
pub(crate) struct WindowState {
    // Declared before `window` so the surface is dropped first.
    gpu: GpuState,
    window: Arc<Window>,
    driver: AnimationDriver,
}

impl WindowState {
    pub(crate) fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let gpu = GpuState::new(
            window.as_ref(),
            size,
            config.antialiasing,
            config.color_space,
            config.vsync,
            config.stats_interval,
        )?;
        let drawable = gpu.size();
        let driver = AnimationDriver::new(drawable.width, drawable.height)
            .with_smoothing(config.smoothing);

        Ok(Self {
            gpu,
            window,
            driver,
        })
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        self.gpu.adapter_profile()
    }

    pub(crate) fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    /// Applies a new drawable size to both the surface and the uniforms.
    ///
    /// Returns whether anything changed.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) -> bool {
        let applied = self.gpu.resize(new_size);
        sync_resolution(&mut self.driver, applied)
    }

    pub(crate) fn handle_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.driver.pointer_moved(position.x, position.y);
    }

    pub(crate) fn handle_cursor_left(&mut self) {
        self.driver.pointer_left();
    }

    pub(crate) fn render_frame(&mut self, sample: TimeSample) -> Result<(), wgpu::SurfaceError> {
        tracing::trace!(frame = sample.frame_index, time = sample.seconds, "rendering frame");
        let uniforms = self.driver.tick(sample);
        self.gpu.render(uniforms)
    }

    pub(crate) fn recover_surface(&mut self) {
        self.gpu.reconfigure();
    }
}

/// Couples the frame scheduler with the time source chosen for the policy.
pub(crate) struct RenderPolicyDriver {
    scheduler: FrameScheduler,
    time_source: BoxedTimeSource,
}

impl RenderPolicyDriver {
    pub(crate) fn new(policy: RenderPolicy) -> Self {
        let time_source = time_source_for_policy(&policy);
        Self {
            scheduler: FrameScheduler::new(policy),
            time_source,
        }
    }

    pub(crate) fn sample(&mut self) -> TimeSample {
        self.time_source.sample()
    }

    pub(crate) fn mark_rendered(&mut self) {
        self.scheduler.mark_rendered();
    }

    pub(crate) fn ready_for_frame(&self, now: Instant) -> bool {
        self.scheduler.ready_for_frame(now)
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Schedules a fresh frame after the surface changed.
    pub(crate) fn invalidate(&mut self) {
        self.scheduler.invalidate();
    }
}

/// Copies the size the swapchain accepted into the resolution uniform.
///
/// The uniform only follows sizes the surface was actually configured with,
/// so the shader never sees a resolution the swapchain does not have.
fn sync_resolution(driver: &mut AnimationDriver, applied: Option<PhysicalSize<u32>>) -> bool {
    match applied {
        Some(size) => {
            driver.resize(size.width, size.height);
            true
        }
        None => false,
    }
}

/// Returns the policy to run with, capping uncapped animation on software adapters.
fn effective_policy(
    policy: &RenderPolicy,
    profile: &AdapterProfile,
) -> (RenderPolicy, Option<f32>) {
    match policy {
        RenderPolicy::Animate { target_fps: None } if profile.is_software() => (
            RenderPolicy::Animate {
                target_fps: Some(SOFTWARE_FPS_CAP),
            },
            Some(SOFTWARE_FPS_CAP),
        ),
        other => (other.clone(), None),
    }
}

fn is_escape(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed
        && !event.repeat
        && matches!(event.logical_key, Key::Named(NamedKey::Escape))
}

/// Opens the window and drives the render loop until it is closed.
pub(crate) fn run(config: RendererConfig) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let window_size = PhysicalSize::new(config.surface_size.0, config.surface_size.1);
    let mut builder = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(window_size);
    if config.mode == RenderMode::Fullscreen {
        builder = builder
            .with_decorations(false)
            .with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window = builder
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut state = WindowState::new(window, &config)
        .map_err(|err| anyhow!("failed to initialise window renderer: {err:#}"))?;

    let profile = state.adapter_profile().clone();
    let (policy, software_cap) = effective_policy(&config.policy, &profile);
    if let Some(cap) = software_cap {
        warn!(
            adapter = %profile.name,
            backend = ?profile.backend,
            cap,
            "software rasterizer detected; capping to {} FPS (override with --fps)",
            cap
        );
    }
    let mut policy_driver = RenderPolicyDriver::new(policy);

    let size = state.size();
    info!(
        width = size.width,
        height = size.height,
        mode = ?config.mode,
        "wave background running"
    );

    if policy_driver.ready_for_frame(Instant::now()) {
        state.window().request_redraw();
    }

    let fullscreen = config.mode == RenderMode::Fullscreen;
    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if fullscreen && is_escape(&event) {
                        info!("escape pressed; exiting");
                        elwt.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    state.handle_cursor_moved(position);
                }
                WindowEvent::CursorLeft { .. } => {
                    state.handle_cursor_left();
                }
                WindowEvent::Resized(new_size) => {
                    if state.resize(new_size) {
                        policy_driver.invalidate();
                    }
                }
                WindowEvent::ScaleFactorChanged {
                    mut inner_size_writer,
                    ..
                } => {
                    let _ = inner_size_writer.request_inner_size(state.size());
                }
                WindowEvent::RedrawRequested => {
                    match state.render_frame(policy_driver.sample()) {
                        Ok(()) => policy_driver.mark_rendered(),
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            state.recover_surface();
                            policy_driver.invalidate();
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("surface out of memory; exiting");
                            elwt.exit();
                        }
                        Err(wgpu::SurfaceError::Timeout) => {
                            warn!("surface timeout; retrying next frame");
                        }
                        Err(other) => {
                            warn!("surface error: {other:?}; retrying next frame");
                        }
                    }
                }
                _ => {}
            }
        }
        Event::AboutToWait => {
            let now = Instant::now();
            if policy_driver.ready_for_frame(now) {
                tracing::trace!("scheduler: issuing redraw now");
                state.window().request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = policy_driver.next_deadline() {
                let ms = deadline.saturating_duration_since(now).as_millis();
                tracing::trace!(deadline_ms = ms, "scheduler: waiting until next frame");
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                tracing::trace!("scheduler: idle (no redraw requested)");
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::accepted_surface_size;

    fn profile(device_type: wgpu::DeviceType, name: &str) -> AdapterProfile {
        AdapterProfile {
            name: name.to_string(),
            backend: wgpu::Backend::Vulkan,
            device_type,
            max_texture_dimension_2d: 8192,
        }
    }

    #[test]
    fn software_adapter_caps_uncapped_animation() {
        let software = profile(wgpu::DeviceType::Cpu, "llvmpipe");
        let (policy, cap) = effective_policy(&RenderPolicy::default(), &software);
        assert_eq!(cap, Some(SOFTWARE_FPS_CAP));
        assert_eq!(
            policy,
            RenderPolicy::Animate {
                target_fps: Some(SOFTWARE_FPS_CAP)
            }
        );
    }

    #[test]
    fn explicit_fps_is_respected_on_software() {
        let software = profile(wgpu::DeviceType::Cpu, "llvmpipe");
        let requested = RenderPolicy::Animate {
            target_fps: Some(30.0),
        };
        let (policy, cap) = effective_policy(&requested, &software);
        assert_eq!(cap, None);
        assert_eq!(policy, requested);
    }

    #[test]
    fn hardware_adapter_keeps_policy() {
        let gpu = profile(wgpu::DeviceType::DiscreteGpu, "Radeon");
        let (policy, cap) = effective_policy(&RenderPolicy::default(), &gpu);
        assert_eq!(cap, None);
        assert_eq!(policy, RenderPolicy::default());
    }

    #[test]
    fn accepted_resize_updates_resolution_uniform() {
        let mut driver = AnimationDriver::new(800, 600);
        let applied = accepted_surface_size(
            PhysicalSize::new(800, 600),
            PhysicalSize::new(1280, 720),
            8192,
        );
        assert!(sync_resolution(&mut driver, applied));
        assert_eq!(driver.uniforms().resolution, [1280.0, 720.0, 1.0]);
    }

    #[test]
    fn rejected_resize_keeps_resolution_uniform() {
        let mut driver = AnimationDriver::new(800, 600);
        let current = PhysicalSize::new(800, 600);
        for requested in [
            PhysicalSize::new(0, 0),
            PhysicalSize::new(1280, 0),
            PhysicalSize::new(16384, 720),
            current,
        ] {
            let applied = accepted_surface_size(current, requested, 8192);
            assert!(!sync_resolution(&mut driver, applied));
            assert_eq!(driver.uniforms().resolution, [800.0, 600.0, 1.0]);
        }
    }

    #[test]
    fn still_policy_redraws_after_invalidate() {
        let mut driver = RenderPolicyDriver::new(RenderPolicy::Still { time: None });
        driver.mark_rendered();
        assert!(!driver.ready_for_frame(Instant::now()));
        driver.invalidate();
        assert!(driver.ready_for_frame(Instant::now()));
        assert_eq!(driver.sample().seconds, 0.0);
    }

    #[test]
    fn still_policy_driver_samples_fixed_time() {
        let mut driver = RenderPolicyDriver::new(RenderPolicy::Still { time: Some(3.0) });
        assert!(driver.ready_for_frame(Instant::now()));
        assert_eq!(driver.sample().seconds, 3.0);
        driver.mark_rendered();
        assert!(!driver.ready_for_frame(Instant::now()));
        assert_eq!(driver.next_deadline(), None);
    }
}
