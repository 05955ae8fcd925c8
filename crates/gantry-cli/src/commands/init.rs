//! `gantry init` - write a default `gantry.toml`.

use std::path::PathBuf;

use crate::{
    cli::InitArgs,
    config::{AppConfig, PROJECT_FILE},
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

pub fn execute(args: InitArgs, output: OutputManager) -> CliResult<()> {
    let path = if args.global {
        AppConfig::global_path().ok_or_else(|| CliError::ConfigError {
            message: "no user configuration directory on this platform".into(),
            source: None,
        })?
    } else {
        PathBuf::from(PROJECT_FILE)
    };

    if path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            path.display(),
        ))?;
        return Ok(());
    }

    let toml = AppConfig::default().to_toml()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }
    std::fs::write(&path, toml)
        .with_cli_context(|| format!("Failed to write config to '{}'", path.display()))?;

    output.success(&format!("Configuration created at {}", path.display()))?;
    Ok(())
}
