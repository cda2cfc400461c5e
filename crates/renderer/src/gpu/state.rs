use std::time::{Duration, Instant};

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use tracing::debug;
use winit::dpi::PhysicalSize;

use crate::types::{AdapterProfile, Antialiasing, ColorSpaceMode, VsyncMode};

use super::context::GpuContext;
use super::pipeline::WavePipeline;
use super::uniforms::WaveUniforms;

struct MultisampleTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl MultisampleTarget {
    fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        size: PhysicalSize<u32>,
        sample_count: u32,
    ) -> Self {
        let extent = wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("msaa color target"),
            size: extent,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Rolling frame counter behind the periodic `render stats` debug line.
struct FrameStats {
    interval: Option<Duration>,
    last_report: Instant,
    frames: u32,
}

impl FrameStats {
    fn new(interval: Option<Duration>) -> Self {
        Self {
            interval,
            last_report: Instant::now(),
            frames: 0,
        }
    }

    fn record(&mut self, now: Instant, uniforms: &WaveUniforms) {
        let Some(interval) = self.interval else {
            return;
        };
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.last_report);
        if elapsed < interval {
            return;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        debug!(
            fps = fps.round(),
            time = uniforms.time,
            pointer_x = uniforms.pointer[0],
            pointer_y = uniforms.pointer[1],
            bend = uniforms.bend_influence,
            "render stats"
        );
        self.frames = 0;
        self.last_report = now;
    }
}

/// GPU resources for drawing the wave background into a window surface.
pub(crate) struct GpuState {
    context: GpuContext,
    pipeline: WavePipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    multisample_target: Option<MultisampleTarget>,
    stats: FrameStats,
}

impl GpuState {
    pub(crate) fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        antialiasing: Antialiasing,
        color_space: ColorSpaceMode,
        vsync_mode: VsyncMode,
        stats_interval: Option<Duration>,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let context = GpuContext::new(target, initial_size, antialiasing, color_space, vsync_mode)?;
        let pipeline = WavePipeline::new(
            &context.device,
            context.surface_format,
            context.sample_count,
        )?;

        let uniform_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("wave uniform buffer"),
            size: std::mem::size_of::<WaveUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniform_bind_group = context
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("wave uniform bind group"),
                layout: &pipeline.uniform_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                }],
            });

        let initial = WaveUniforms::new(context.size.width, context.size.height);
        context
            .queue
            .write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&initial));

        let multisample_target = Self::multisample_target_for(&context);

        Ok(Self {
            context,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            multisample_target,
            stats: FrameStats::new(stats_interval),
        })
    }

    fn multisample_target_for(context: &GpuContext) -> Option<MultisampleTarget> {
        (context.sample_count > 1).then(|| {
            MultisampleTarget::new(
                &context.device,
                context.surface_format,
                context.size,
                context.sample_count,
            )
        })
    }

    pub(crate) fn size(&self) -> PhysicalSize<u32> {
        self.context.size
    }

    pub(crate) fn adapter_profile(&self) -> &AdapterProfile {
        &self.context.adapter_profile
    }

    /// Resizes the swapchain and any multisample target. Returns the new
    /// drawable size, or `None` when nothing changed.
    pub(crate) fn resize(&mut self, new_size: PhysicalSize<u32>) -> Option<PhysicalSize<u32>> {
        let size = self.context.resize(new_size)?;
        self.multisample_target = Self::multisample_target_for(&self.context);
        debug!(width = size.width, height = size.height, "resized surface");
        Some(size)
    }

    /// Restores the surface after `Lost` or `Outdated`.
    pub(crate) fn reconfigure(&mut self) {
        self.context.reconfigure();
    }

    /// Uploads `uniforms` and draws one full-screen frame.
    pub(crate) fn render(&mut self, uniforms: &WaveUniforms) -> Result<(), wgpu::SurfaceError> {
        let frame = self.context.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.context
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("wave encoder"),
                });

        let (attachment_view, resolve_target) = match self.multisample_target.as_ref() {
            Some(msaa) => (&msaa.view, Some(&view)),
            None => (&view, None),
        };
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("wave pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: attachment_view,
                    depth_slice: None,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.pipeline.pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        self.stats.record(Instant::now(), uniforms);
        Ok(())
    }
}
