//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use gantry_core::prelude::SuiteKind;

pub mod global;
pub use global::{GlobalArgs, LogFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name     = "gantry",
    bin_name = "gantry",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "CRUD scaffolding from annotated domain models",
    long_about = "Gantry reads an annotated data project and generates API controllers, \
                  DTOs, TypeScript models and view models for every entity its DB \
                  context exposes.",
    after_help = "EXAMPLES:\n\
        \x20 gantry generate --data-project ./data --web-project ./web\n\
        \x20 gantry analyze  --data-project ./data\n\
        \x20 gantry generators --data-project ./data --suite vue\n\
        \x20 gantry completions bash > ~/.local/share/bash-completion/completions/gantry",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate every artifact for the data project's entities.
    #[command(
        visible_alias = "gen",
        about = "Generate code for every exposed entity",
        after_help = "EXAMPLES:\n\
            \x20 gantry generate -d ./data -w ./web\n\
            \x20 gantry generate -d ./data -w ./web --suite server --area admin\n\
            \x20 gantry generate --validate-only\n\
            \x20 gantry generate --dry-run-clean --templates ./templates"
    )]
    Generate(GenerateArgs),

    /// Print entities, strategies and analysis issues. Never writes.
    #[command(about = "Analyze the data project without generating")]
    Analyze(AnalyzeArgs),

    /// List every template and where it resolves from.
    #[command(about = "List templates and their overrides")]
    Templates(TemplatesArgs),

    /// Flattened generator tree: name, output path, model type.
    #[command(visible_alias = "ls", about = "List generators and their output files")]
    Generators(GeneratorsArgs),

    /// Write a default `gantry.toml`.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 gantry init           # ./gantry.toml\n\
            \x20 gantry init --global  # user configuration directory"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 gantry completions bash > ~/.local/share/bash-completion/completions/gantry\n\
            \x20 gantry completions zsh  > ~/.zfunc/_gantry\n\
            \x20 gantry completions fish > ~/.config/fish/completions/gantry.fish"
    )]
    Completions(CompletionsArgs),
}

// ── shared ────────────────────────────────────────────────────────────────────

/// Where the domain model lives.
#[derive(Debug, Clone, Default, Args)]
pub struct ProjectArgs {
    #[arg(
        short = 'd',
        long = "data-project",
        value_name = "DIR",
        help = "Crate holding the annotated domain model"
    )]
    pub data_project: Option<PathBuf>,

    #[arg(long = "context", value_name = "NAME", help = "Use one DB context only")]
    pub context: Option<String>,
}

// ── generate ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(
        short = 'w',
        long = "web-project",
        value_name = "DIR",
        help = "Project the generated files belong to"
    )]
    pub web_project: Option<PathBuf>,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output directory (default: the web project)"
    )]
    pub output: Option<PathBuf>,

    #[arg(long = "area", value_name = "NAME", help = "Write under areas/<NAME>")]
    pub area: Option<String>,

    #[arg(
        short = 's',
        long = "suite",
        value_enum,
        value_name = "SUITE",
        help = "Suite to generate (repeatable; default: configured suites)"
    )]
    pub suites: Vec<SuiteArg>,

    #[arg(
        long = "templates",
        value_name = "DIR",
        help = "Directory whose templates override the embedded ones"
    )]
    pub template_overrides: Option<PathBuf>,

    #[arg(
        long = "disable",
        value_name = "GENERATOR",
        help = "Skip a generator and its subtree (repeatable)"
    )]
    pub disabled: Vec<String>,

    #[arg(short = 'f', long = "force", help = "Rewrite files even when unchanged")]
    pub force: bool,

    #[arg(
        long = "validate-only",
        conflicts_with = "dry_run_clean",
        help = "Analyze and render, write nothing"
    )]
    pub validate_only: bool,

    #[arg(long = "dry-run-clean", help = "Report stale files instead of deleting them")]
    pub dry_run_clean: bool,

    #[arg(long = "fail-fast", help = "Stop at the first failed generator")]
    pub fail_fast: bool,
}

// ── analyze / generators ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(long = "format", value_enum, default_value = "text", help = "Output format")]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Args)]
pub struct GeneratorsArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[arg(long = "area", value_name = "NAME", help = "Write under areas/<NAME>")]
    pub area: Option<String>,

    #[arg(short = 's', long = "suite", value_enum, value_name = "SUITE")]
    pub suites: Vec<SuiteArg>,

    #[arg(long = "format", value_enum, default_value = "text", help = "Output format")]
    pub format: ReportFormat,
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable lines.
    Text,
    /// Pretty-printed JSON.
    Json,
}

// ── templates ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct TemplatesArgs {
    #[arg(
        long = "templates",
        value_name = "DIR",
        help = "Directory whose templates override the embedded ones"
    )]
    pub template_overrides: Option<PathBuf>,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    /// Write to the user configuration directory instead of `./gantry.toml`.
    #[arg(long = "global", help = "Create global configuration")]
    pub global: bool,

    /// Overwrite an existing file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: clap_complete::Shell,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Generator suites selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum SuiteArg {
    Server,
    Vue,
    /// Also accepted as `ko`.
    #[value(alias = "ko")]
    Knockout,
}

impl From<SuiteArg> for SuiteKind {
    fn from(arg: SuiteArg) -> Self {
        match arg {
            SuiteArg::Server => Self::Server,
            SuiteArg::Vue => Self::Vue,
            SuiteArg::Knockout => Self::Knockout,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_generate_command() {
        let cli = Cli::parse_from([
            "gantry",
            "generate",
            "--data-project",
            "data",
            "-w",
            "web",
            "--suite",
            "server",
            "--suite",
            "ko",
            "--disable",
            "Metadata",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected Generate command");
        };
        assert_eq!(args.project.data_project, Some(PathBuf::from("data")));
        assert_eq!(args.suites, vec![SuiteArg::Server, SuiteArg::Knockout]);
        assert_eq!(args.disabled, vec!["Metadata".to_string()]);
    }

    #[test]
    fn validate_only_conflicts_with_dry_run_clean() {
        let result =
            Cli::try_parse_from(["gantry", "generate", "--validate-only", "--dry-run-clean"]);
        assert!(result.is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["gantry", "--quiet", "--verbose", "templates"]);
        assert!(result.is_err());
    }

    #[test]
    fn suite_args_map_to_core_suites() {
        assert_eq!(SuiteKind::from(SuiteArg::Knockout), SuiteKind::Knockout);
        assert_eq!(SuiteKind::from(SuiteArg::Vue), SuiteKind::Vue);
    }
}
