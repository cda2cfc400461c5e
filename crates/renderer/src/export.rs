use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use glam::Vec2;
use image::imageops::flip_vertical_in_place;
use image::{Rgba, RgbaImage};

use crate::gpu::WaveUniforms;
use crate::reference;
use crate::runtime::ExportFormat;

/// Parameters for one headless still frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StillFrame {
    pub size: (u32, u32),
    /// Seconds fed to the time uniform.
    pub time: f32,
    /// Pointer in physical pixels with a top-left origin, as a window would report it.
    pub pointer: Option<[f32; 2]>,
    pub bend_influence: f32,
}

impl StillFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            time: 0.0,
            pointer: None,
            bend_influence: 0.0,
        }
    }

    /// Uniforms the frame is evaluated with.
    pub fn uniforms(&self) -> WaveUniforms {
        let (width, height) = self.size;
        let mut uniforms = WaveUniforms::new(width, height);
        uniforms.time = self.time.max(0.0);
        if let Some([x, y]) = self.pointer {
            uniforms.pointer = [x, height as f32 - y];
        }
        uniforms.bend_influence = self.bend_influence.clamp(0.0, 1.0);
        uniforms
    }
}

/// Resolves the output format from the file extension.
pub fn format_for_path(path: &Path) -> Result<ExportFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => Ok(ExportFormat::Png),
        Some(other) => bail!("unsupported export format '.{other}' (expected .png)"),
        None => bail!("export path {} has no file extension", path.display()),
    }
}

/// Evaluates the wave shader on the CPU into an RGBA image.
///
/// Rows are shaded bottom-up like the GPU does and flipped afterwards so the
/// first image row is the top of the screen.
pub fn render_still(frame: &StillFrame) -> Result<RgbaImage> {
    let (width, height) = frame.size;
    if width == 0 || height == 0 {
        bail!("still frame size must be non-zero, got {width}x{height}");
    }

    let uniforms = frame.uniforms();
    let mut image = RgbaImage::from_fn(width, height, |x, y| {
        let coord = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
        to_rgba8(reference::shade(coord, &uniforms))
    });
    flip_vertical_in_place(&mut image);
    Ok(image)
}

/// Renders `frame` and writes it to `path`. Returns the written path.
pub fn export_still(path: &Path, frame: &StillFrame) -> Result<PathBuf> {
    let format = format_for_path(path)?;
    let image = render_still(frame)?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    match format {
        ExportFormat::Png => image
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write still frame to {}", path.display()))?,
    }
    tracing::info!(
        path = %path.display(),
        width = frame.size.0,
        height = frame.size.1,
        time = frame.time,
        "still frame exported"
    );
    Ok(path.to_path_buf())
}

fn to_rgba8(color: [f32; 4]) -> Rgba<u8> {
    Rgba(color.map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8))
}
