use std::path::PathBuf;

use clap::{Parser, Subcommand};
use waveconfig::{AntialiasSetting, ColorSpaceSetting, VsyncSetting};

#[derive(Parser, Debug)]
#[command(
    name = "wavepaper",
    author,
    version,
    about = "Animated wave background that bends toward the pointer",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Read configuration from FILE instead of the default `config.toml`.
    #[arg(long, value_name = "FILE", global = true, env = "WAVEPAPER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// Render in a regular desktop window.
    #[arg(long, conflicts_with = "fullscreen")]
    pub window: bool,

    /// Cover the current monitor with a borderless fullscreen window.
    #[arg(long)]
    pub fullscreen: bool,

    /// Window size in physical pixels (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Optional FPS cap (0 = uncapped).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f64>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = waveconfig::parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// Present mode preference: `auto`, `on`, or `off`.
    #[arg(long, value_name = "MODE", value_parser = parse_vsync)]
    pub vsync: Option<VsyncSetting>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(long, value_name = "MODE", value_parser = parse_color_space)]
    pub color_space: Option<ColorSpaceSetting>,

    /// Fraction of the remaining distance the pointer and bend cover per frame.
    #[arg(long, value_name = "FRACTION")]
    pub smoothing: Option<f64>,

    /// Render a single still frame instead of animating continuously.
    #[arg(long)]
    pub still: bool,

    /// Timestamp in seconds to evaluate the still frame at (default 0).
    #[arg(long, value_name = "SECONDS", requires = "still")]
    pub still_time: Option<f32>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one still frame to a PNG file without opening a window.
    Export(ExportArgs),
    /// Inspect or create the configuration file.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Output path; must end in `.png`.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Image size in pixels; defaults to the configured window size.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_surface_size)]
    pub size: Option<(u32, u32)>,

    /// Time uniform in seconds.
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub time: f32,

    /// Pointer position in pixels from the top-left corner (e.g. `640,360`).
    #[arg(long, value_name = "X,Y", value_parser = parse_pointer)]
    pub pointer: Option<(f32, f32)>,

    /// Bend influence in `[0, 1]`; defaults to 1 when `--pointer` is given.
    #[arg(long, value_name = "AMOUNT")]
    pub bend: Option<f32>,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default `config.toml` into the configuration directory.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Print the resolved configuration file path.
    Where,
    /// Print the effective configuration as TOML.
    Show,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_surface_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .trim()
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| "expected WxH format, e.g. 1920x1080".to_string())?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| "invalid width in size specification".to_string())?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| "invalid height in size specification".to_string())?;

    if width == 0 || height == 0 {
        return Err("surface dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

pub fn parse_pointer(value: &str) -> Result<(f32, f32), String> {
    let (x, y) = value
        .trim()
        .split_once(',')
        .ok_or_else(|| "expected X,Y pointer position, e.g. 640,360".to_string())?;
    let x: f32 = x
        .trim()
        .parse()
        .map_err(|_| "invalid pointer x coordinate".to_string())?;
    let y: f32 = y
        .trim()
        .parse()
        .map_err(|_| "invalid pointer y coordinate".to_string())?;
    if !x.is_finite() || !y.is_finite() {
        return Err("pointer coordinates must be finite".into());
    }
    Ok((x, y))
}

pub fn parse_vsync(value: &str) -> Result<VsyncSetting, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "auto" => Ok(VsyncSetting::Auto),
        "on" | "true" | "fifo" => Ok(VsyncSetting::On),
        "off" | "false" | "immediate" => Ok(VsyncSetting::Off),
        other => Err(format!("unknown vsync mode '{other}'; expected auto, on, or off")),
    }
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceSetting, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "auto" => Ok(ColorSpaceSetting::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceSetting::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceSetting::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_surface_sizes() {
        assert_eq!(parse_surface_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_surface_size(" 800 X 600 ").unwrap(), (800, 600));
        assert!(parse_surface_size("0x600").is_err());
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("widexhigh").is_err());
    }

    #[test]
    fn parses_pointer_positions() {
        assert_eq!(parse_pointer("640,360").unwrap(), (640.0, 360.0));
        assert_eq!(parse_pointer(" 1.5 , 2 ").unwrap(), (1.5, 2.0));
        assert!(parse_pointer("640").is_err());
        assert!(parse_pointer("a,b").is_err());
    }

    #[test]
    fn parses_modes() {
        assert_eq!(parse_vsync("OFF").unwrap(), VsyncSetting::Off);
        assert!(parse_vsync("sometimes").is_err());
        assert_eq!(parse_color_space("srgb").unwrap(), ColorSpaceSetting::Linear);
        assert!(parse_color_space("").is_err());
    }

    #[test]
    fn cli_accepts_run_flags() {
        let cli = Cli::try_parse_from([
            "wavepaper",
            "--fullscreen",
            "--size",
            "1024x768",
            "--antialias",
            "4",
            "--smoothing",
            "0.1",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert!(cli.run.fullscreen);
        assert_eq!(cli.run.size, Some((1024, 768)));
        assert_eq!(cli.run.antialias, Some(AntialiasSetting::Samples4));
        assert_eq!(cli.run.smoothing, Some(0.1));
    }

    #[test]
    fn still_time_requires_still() {
        let cli = Cli::try_parse_from(["wavepaper", "--still", "--still-time", "4.5"]).unwrap();
        assert!(cli.run.still);
        assert_eq!(cli.run.still_time, Some(4.5));
        assert!(Cli::try_parse_from(["wavepaper", "--still-time", "4.5"]).is_err());
    }

    #[test]
    fn window_and_fullscreen_conflict() {
        assert!(Cli::try_parse_from(["wavepaper", "--window", "--fullscreen"]).is_err());
    }

    #[test]
    fn cli_parses_export_subcommand() {
        let cli = Cli::try_parse_from([
            "wavepaper",
            "export",
            "out.png",
            "--size",
            "64x32",
            "--time",
            "2.5",
            "--pointer",
            "10,20",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Export(args)) => {
                assert_eq!(args.path, PathBuf::from("out.png"));
                assert_eq!(args.size, Some((64, 32)));
                assert_eq!(args.time, 2.5);
                assert_eq!(args.pointer, Some((10.0, 20.0)));
                assert_eq!(args.bend, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["wavepaper", "config", "show", "--config", "custom.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(
            cli.command,
            Some(Command::Config(ConfigCommand {
                action: ConfigAction::Show
            }))
        ));
    }
}
