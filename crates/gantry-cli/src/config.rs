//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value. The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (merged at the call-site, not here)
//! 2. `GANTRY_*` environment variables (`GANTRY_OUTPUT__NO_COLOR` for nested keys)
//! 3. The project file: `--config FILE`, else `./gantry.toml`
//! 4. The user file in the platform config directory
//! 5. Built-in defaults

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use gantry_core::prelude::SuiteKind;

use crate::error::{CliError, CliResult};

/// File name looked up in the working directory.
pub const PROJECT_FILE: &str = "gantry.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub web_project: Option<PathBuf>,
    pub data_project: Option<PathBuf>,
    /// Output directory; the web project when unset.
    pub output_dir: Option<PathBuf>,
    pub area: Option<String>,
    pub context: Option<String>,
    pub root_namespace: String,
    pub template_overrides: Option<PathBuf>,
    pub suites: Vec<SuiteKind>,
    /// Generator names skipped together with their subtrees.
    pub disabled: Vec<String>,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: OutputFormat,
}

/// How the terminal output is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human on a terminal, plain when piped.
    #[default]
    Auto,
    Human,
    Plain,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            web_project: None,
            data_project: None,
            output_dir: None,
            area: None,
            context: None,
            root_namespace: "app".into(),
            template_overrides: None,
            suites: SuiteKind::all().to_vec(),
            disabled: Vec::new(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: OutputFormat::Auto,
        }
    }
}

impl AppConfig {
    /// Load configuration, layering files and environment over defaults.
    ///
    /// An explicit `config_file` must exist; the implicit `./gantry.toml`
    /// and the user file are optional.
    pub fn load(config_file: Option<&Path>) -> CliResult<Self> {
        let mut builder = Config::builder();

        if let Some(global) = Self::global_path() {
            builder = builder.add_source(File::from(global).format(FileFormat::Toml).required(false));
        }

        builder = match config_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::ConfigError {
                        message: format!("config file '{}' does not exist", path.display()),
                        source: None,
                    });
                }
                builder.add_source(File::from(path).format(FileFormat::Toml).required(true))
            }
            None => builder.add_source(
                File::from(Path::new(PROJECT_FILE))
                    .format(FileFormat::Toml)
                    .required(false),
            ),
        };

        let config = builder
            .add_source(
                Environment::with_prefix("GANTRY")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("suites")
                    .with_list_parse_key("disabled")
                    .try_parsing(true),
            )
            .build()
            .and_then(Config::try_deserialize::<AppConfig>)
            .map_err(|e| CliError::ConfigError {
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;

        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// User-wide config file, when the platform has a config directory.
    pub fn global_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "gantry", "gantry")
            .map(|d| d.config_dir().join(PROJECT_FILE))
    }

    /// Serialized defaults written by `gantry init`.
    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })
    }
}
