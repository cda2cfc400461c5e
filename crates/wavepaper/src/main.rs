mod cli;
mod paths;
mod run;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use cli::{Command, ConfigAction, RunArgs};
use paths::AppPaths;
use waveconfig::WaveConfig;

const CONFIG_HEADER: &str = "# wavepaper configuration. Every field is optional.\n\n";

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let config_path = cli.config.as_deref();
    match cli.command {
        Some(Command::Export(args)) => run::export(args, config_path),
        Some(Command::Config(config_cmd)) => {
            handle_config_command(config_cmd.action, &cli.run, config_path)
        }
        None => run::run(cli.run, config_path),
    }
}

fn handle_config_command(
    action: ConfigAction,
    overrides: &RunArgs,
    explicit: Option<&Path>,
) -> Result<()> {
    match action {
        ConfigAction::Init { force } => run_config_init(explicit, force),
        ConfigAction::Where => {
            let path = match explicit {
                Some(path) => path.to_path_buf(),
                None => AppPaths::discover()?.config_file(),
            };
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Show => {
            let config = run::effective_config(overrides, explicit)?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn run_config_init(explicit: Option<&Path>, force: bool) -> Result<()> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => AppPaths::discover()?.config_file(),
    };
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let body = WaveConfig::default().to_toml_string()?;
    fs::write(&path, format!("{CONFIG_HEADER}{body}"))
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
