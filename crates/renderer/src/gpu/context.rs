use anyhow::{anyhow, Context as AnyhowContext, Result};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::TextureFormatFeatureFlags;
use winit::dpi::PhysicalSize;

use crate::types::{AdapterProfile, Antialiasing, ColorSpaceMode, VsyncMode};

/// Owns the wgpu device, queue, and configured surface for one window.
pub(crate) struct GpuContext {
    pub _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    pub sample_count: u32,
    pub surface_format: wgpu::TextureFormat,
    pub adapter_profile: AdapterProfile,
}

impl GpuContext {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        color_space: ColorSpaceMode,
        vsync_mode: VsyncMode,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let window_handle = target
            .window_handle()
            .map_err(|err| anyhow!("failed to acquire window handle: {err}"))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| anyhow!("failed to acquire display handle: {err}"))?;

        // The caller keeps the window alive for as long as the surface exists.
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .context("failed to create rendering surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::LowPower,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        let adapter_info = adapter.get_info();
        let limits = adapter.limits();
        let adapter_profile = AdapterProfile::from_wgpu(&adapter_info, &limits);
        let is_software = adapter_profile.is_software();
        tracing::info!(
            name = %adapter_profile.name,
            backend = ?adapter_profile.backend,
            device_type = ?adapter_profile.device_type,
            is_software,
            "selected GPU adapter"
        );

        let requested_width = initial_size.width.max(1);
        let requested_height = initial_size.height.max(1);
        check_dimensions(requested_width, requested_height, limits.max_texture_dimension_2d)?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = choose_surface_format(&surface_caps.formats, color_space)
            .context("surface reports no supported formats")?;

        let format_features = adapter.get_texture_format_features(surface_format);
        let mut sample_count = choose_sample_count(
            antialiasing,
            format_features.flags.supported_sample_counts(),
        );

        if sample_count > 1
            && !format_features
                .flags
                .contains(TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE)
        {
            tracing::warn!(
                ?surface_format,
                "surface format does not support MSAA resolve; disabling MSAA"
            );
            sample_count = 1;
        }

        if is_software && sample_count > 1 {
            tracing::warn!(
                sample_count,
                "software rasterizer detected; disabling MSAA for performance"
            );
            sample_count = 1;
        }

        let mut required_features = wgpu::Features::empty();
        if sample_count > 4 {
            required_features |= wgpu::Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES;
        }

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("wavepaper device"),
            required_features,
            required_limits: limits.clone(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .context("failed to create GPU device")?;

        let present_mode = choose_present_mode(&surface_caps.present_modes, vsync_mode)
            .context("surface reports no supported present modes")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        tracing::debug!(
            ?present_mode,
            ?vsync_mode,
            ?surface_format,
            sample_count,
            "configuring surface"
        );

        let size = PhysicalSize::new(requested_width, requested_height);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            size,
            sample_count,
            surface_format,
            adapter_profile,
        })
    }

    /// Reconfigures the swapchain for a new drawable size.
    ///
    /// Returns the size now in effect, or `None` when the request was ignored
    /// (see [`accepted_surface_size`]).
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) -> Option<PhysicalSize<u32>> {
        let size = accepted_surface_size(
            self.size,
            new_size,
            self.adapter_profile.max_texture_dimension_2d,
        )?;
        self.size = size;
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        Some(size)
    }

    /// Re-applies the current configuration, used after a lost or outdated surface.
    pub(crate) fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

fn check_dimensions(width: u32, height: u32, max_dimension: u32) -> Result<()> {
    if width > max_dimension || height > max_dimension {
        anyhow::bail!(
            "GPU max texture dimension is {max_dimension}, requested surface is {width}x{height}"
        );
    }
    Ok(())
}

/// Decides whether a resize request should reach the swapchain.
///
/// Unchanged sizes, zero-sized requests (minimised windows) and sizes the
/// device cannot allocate yield `None`.
pub(crate) fn accepted_surface_size(
    current: PhysicalSize<u32>,
    requested: PhysicalSize<u32>,
    max_dimension: u32,
) -> Option<PhysicalSize<u32>> {
    if requested == current || requested.width == 0 || requested.height == 0 {
        return None;
    }
    if let Err(err) = check_dimensions(requested.width, requested.height, max_dimension) {
        tracing::warn!("ignoring resize: {err:#}");
        return None;
    }
    Some(requested)
}

/// Picks a swapchain format matching the requested colour handling.
///
/// The wave colours are authored as gamma-encoded values, so `Auto` behaves
/// like `Gamma` and prefers a non-sRGB format.
fn choose_surface_format(
    formats: &[wgpu::TextureFormat],
    color_space: ColorSpaceMode,
) -> Option<wgpu::TextureFormat> {
    let want_srgb = matches!(color_space, ColorSpaceMode::Linear);
    let fallback = *formats.first()?;
    let chosen = formats
        .iter()
        .copied()
        .find(|format| format.is_srgb() == want_srgb)
        .unwrap_or_else(|| {
            tracing::warn!(
                ?fallback,
                want_srgb,
                "no matching surface format available; falling back"
            );
            fallback
        });
    Some(chosen)
}

fn choose_sample_count(antialiasing: Antialiasing, mut supported: Vec<u32>) -> u32 {
    if !supported.contains(&1) {
        supported.push(1);
    }
    supported.sort_unstable();
    supported.dedup();

    match antialiasing {
        Antialiasing::Auto => supported.last().copied().unwrap_or(1),
        Antialiasing::Off => 1,
        Antialiasing::Samples(requested) if supported.contains(&requested) => requested,
        Antialiasing::Samples(requested) => {
            let fallback = supported
                .iter()
                .copied()
                .filter(|&count| count <= requested)
                .max()
                .unwrap_or(1);
            tracing::warn!(
                requested,
                fallback,
                ?supported,
                "requested MSAA sample count not supported; falling back"
            );
            fallback
        }
    }
}

fn choose_present_mode(
    modes: &[wgpu::PresentMode],
    vsync_mode: VsyncMode,
) -> Option<wgpu::PresentMode> {
    let find = |wanted: wgpu::PresentMode| modes.iter().copied().find(|mode| *mode == wanted);
    let default = find(wgpu::PresentMode::Fifo).or_else(|| modes.first().copied())?;

    Some(match vsync_mode {
        VsyncMode::Auto | VsyncMode::On => default,
        VsyncMode::Off => find(wgpu::PresentMode::Immediate)
            .or_else(|| find(wgpu::PresentMode::Mailbox))
            .unwrap_or(default),
    })
}
