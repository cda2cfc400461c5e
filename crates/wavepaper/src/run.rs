use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use renderer::{
    Antialiasing, ColorSpaceMode, RenderMode, RenderPolicy, Renderer, RendererConfig, StillFrame,
    VsyncMode,
};
use tracing_subscriber::EnvFilter;
use waveconfig::{AntialiasSetting, ColorSpaceSetting, VsyncSetting, WaveConfig};

use crate::cli::{ExportArgs, RunArgs};
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Runs the animated background until the window closes.
pub fn run(args: RunArgs, config_path: Option<&Path>) -> Result<()> {
    let config = effective_config(&args, config_path)?;
    let renderer_config = renderer_config(&config, render_policy(&config, &args));
    tracing::info!(
        width = renderer_config.surface_size.0,
        height = renderer_config.surface_size.1,
        mode = ?renderer_config.mode,
        policy = ?renderer_config.policy,
        smoothing = renderer_config.smoothing,
        "starting wavepaper"
    );

    let mut renderer = Renderer::new(renderer_config);
    renderer.run()
}

/// Writes a single still frame without opening a window.
pub fn export(args: ExportArgs, config_path: Option<&Path>) -> Result<()> {
    let (config, _) = load_config(config_path)?;
    let size = args
        .size
        .unwrap_or((config.window.width, config.window.height));

    let mut frame = StillFrame::new(size.0, size.1);
    frame.time = args.time;
    frame.pointer = args.pointer.map(|(x, y)| [x, y]);
    frame.bend_influence = args
        .bend
        .unwrap_or(if frame.pointer.is_some() { 1.0 } else { 0.0 });

    let written = renderer::export_still(&args.path, &frame)?;
    println!("{}", written.display());
    Ok(())
}

/// Loads the configuration file, returning defaults when none exists.
///
/// An explicitly requested file must exist; the default location is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<(WaveConfig, PathBuf)> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (AppPaths::discover()?.config_file(), false),
    };

    if !required && !path.exists() {
        tracing::debug!(path = %path.display(), "no configuration file; using defaults");
        return Ok((WaveConfig::default(), path));
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration {}", path.display()))?;
    let config = WaveConfig::from_toml_str(&raw)
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok((config, path))
}

/// Configuration file merged with command-line overrides, validated.
pub fn effective_config(args: &RunArgs, config_path: Option<&Path>) -> Result<WaveConfig> {
    let (mut config, _) = load_config(config_path)?;
    apply_overrides(&mut config, args);
    config
        .validate()
        .context("invalid command-line overrides")?;
    Ok(config)
}

pub fn apply_overrides(config: &mut WaveConfig, args: &RunArgs) {
    if args.fullscreen {
        config.window.fullscreen = true;
    } else if args.window {
        config.window.fullscreen = false;
    }
    if let Some((width, height)) = args.size {
        config.window.width = width;
        config.window.height = height;
    }
    if let Some(fps) = args.fps {
        config.render.fps = Some(fps);
    }
    if let Some(antialias) = args.antialias {
        config.render.antialias = antialias;
    }
    if let Some(vsync) = args.vsync {
        config.render.vsync = vsync;
    }
    if let Some(color_space) = args.color_space {
        config.render.color_space = color_space;
    }
    if let Some(smoothing) = args.smoothing {
        config.animation.smoothing = smoothing;
    }
}

/// Chooses between continuous animation and a single still frame.
pub fn render_policy(config: &WaveConfig, args: &RunArgs) -> RenderPolicy {
    if args.still {
        RenderPolicy::Still {
            time: args.still_time,
        }
    } else {
        RenderPolicy::Animate {
            target_fps: config.target_fps().map(|fps| fps as f32),
        }
    }
}

pub fn renderer_config(config: &WaveConfig, policy: RenderPolicy) -> RendererConfig {
    let stats_interval =
        Some(config.animation.stats_interval).filter(|interval| !interval.is_zero());
    RendererConfig {
        surface_size: (config.window.width, config.window.height),
        title: config.window.title.clone(),
        mode: if config.window.fullscreen {
            RenderMode::Fullscreen
        } else {
            RenderMode::Windowed
        },
        antialiasing: map_antialias(config.render.antialias),
        color_space: map_color_space(config.render.color_space),
        vsync: map_vsync(config.render.vsync),
        policy,
        smoothing: config.animation.smoothing as f32,
        stats_interval,
    }
}

fn map_antialias(setting: AntialiasSetting) -> Antialiasing {
    match setting.samples() {
        None => Antialiasing::Auto,
        Some(1) => Antialiasing::Off,
        Some(samples) => Antialiasing::Samples(samples),
    }
}

fn map_color_space(setting: ColorSpaceSetting) -> ColorSpaceMode {
    match setting {
        ColorSpaceSetting::Auto => ColorSpaceMode::Auto,
        ColorSpaceSetting::Gamma => ColorSpaceMode::Gamma,
        ColorSpaceSetting::Linear => ColorSpaceMode::Linear,
    }
}

fn map_vsync(setting: VsyncSetting) -> VsyncMode {
    match setting {
        VsyncSetting::Auto => VsyncMode::Auto,
        VsyncSetting::On => VsyncMode::On,
        VsyncSetting::Off => VsyncMode::Off,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn cli_overrides_config_values() {
        let mut config = WaveConfig::from_toml_str(
            r#"
[window]
width = 800
height = 600
fullscreen = true

[render]
fps = 30
"#,
        )
        .unwrap();
        let args = RunArgs {
            window: true,
            size: Some((1280, 720)),
            fps: Some(0.0),
            antialias: Some(AntialiasSetting::Off),
            smoothing: Some(0.2),
            ..RunArgs::default()
        };
        apply_overrides(&mut config, &args);

        assert!(!config.window.fullscreen);
        assert_eq!((config.window.width, config.window.height), (1280, 720));
        assert_eq!(config.target_fps(), None);
        assert_eq!(config.render.antialias, AntialiasSetting::Off);
        assert!((config.animation.smoothing - 0.2).abs() < 1e-6);
    }

    #[test]
    fn absent_overrides_keep_config() {
        let mut config = WaveConfig::default();
        config.window.fullscreen = true;
        apply_overrides(&mut config, &RunArgs::default());
        assert!(config.window.fullscreen);
        assert_eq!(config, {
            let mut expected = WaveConfig::default();
            expected.window.fullscreen = true;
            expected
        });
    }

    #[test]
    fn maps_config_into_renderer_config() {
        let mut config = WaveConfig::default();
        config.window.fullscreen = true;
        config.render.fps = Some(48.0);
        config.render.antialias = AntialiasSetting::Samples8;
        config.render.vsync = VsyncSetting::Off;
        config.render.color_space = ColorSpaceSetting::Linear;
        config.animation.stats_interval = Duration::ZERO;

        let policy = render_policy(&config, &RunArgs::default());
        let renderer = renderer_config(&config, policy);
        assert_eq!(renderer.mode, RenderMode::Fullscreen);
        assert_eq!(renderer.antialiasing, Antialiasing::Samples(8));
        assert_eq!(renderer.vsync, VsyncMode::Off);
        assert_eq!(renderer.color_space, ColorSpaceMode::Linear);
        assert_eq!(
            renderer.policy,
            RenderPolicy::Animate {
                target_fps: Some(48.0)
            }
        );
        assert_eq!(renderer.stats_interval, None);
        assert_eq!(renderer.smoothing, renderer::SMOOTHING_FACTOR);
    }

    #[test]
    fn still_flag_selects_still_policy() {
        let mut config = WaveConfig::default();
        config.render.fps = Some(30.0);
        let args = RunArgs {
            still: true,
            still_time: Some(12.5),
            ..RunArgs::default()
        };

        let renderer = renderer_config(&config, render_policy(&config, &args));
        assert_eq!(renderer.policy, RenderPolicy::Still { time: Some(12.5) });

        let args = RunArgs {
            still: true,
            ..RunArgs::default()
        };
        assert_eq!(
            render_policy(&config, &args),
            RenderPolicy::Still { time: None }
        );
    }

    #[test]
    fn antialias_settings_map_to_renderer_modes() {
        assert_eq!(map_antialias(AntialiasSetting::Auto), Antialiasing::Auto);
        assert_eq!(map_antialias(AntialiasSetting::Off), Antialiasing::Off);
        assert_eq!(
            map_antialias(AntialiasSetting::Samples2),
            Antialiasing::Samples(2)
        );
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("missing.toml");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn explicit_config_file_is_parsed() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("custom.toml");
        fs::write(&path, "[animation]\nsmoothing = 0.5\n").unwrap();

        let (config, resolved) = load_config(Some(&path)).unwrap();
        assert_eq!(resolved, path);
        assert_eq!(config.animation.smoothing, 0.5);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("config.toml");
        fs::write(&path, "").unwrap();
        let args = RunArgs {
            smoothing: Some(1.5),
            ..RunArgs::default()
        };
        assert!(effective_config(&args, Some(&path)).is_err());
    }
}
