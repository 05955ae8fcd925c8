//! Implementation of the `gantry generate` command.
//!
//! Analyze the data project, build the generator tree for the selected
//! suites, run it against the output directory and print the report.

use std::path::PathBuf;

use tracing::{info, instrument, warn};

use gantry_adapters::{LocalFilesystem, MiniJinjaRenderer};
use gantry_core::application::ApplicationError;
use gantry_core::prelude::{
    CancellationToken, GantryError, GenerationOptions, GenerationService, build_tree,
};

use crate::{
    cli::GenerateArgs,
    config::AppConfig,
    error::{CliError, CliResult, display_path},
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(args: GenerateArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    // 1. Resolve the output directory before any analysis work.
    let output_dir = output_dir(&args, &config)?;

    // 2. Analyze; configuration errors abort here.
    let analysis = super::analyze_project(&args.project, &config)?;
    for problem in analysis.problems() {
        output.warning(&problem)?;
    }

    // 3. Build the tree and the pipeline.
    let tree = build_tree(
        &analysis,
        &super::tree_options(args.area.as_deref(), &args.suites, &config),
    )?;
    let resolver = super::resolver(args.template_overrides.as_ref(), &config);
    let service = GenerationService::new(
        Box::new(LocalFilesystem::new()),
        Box::new(resolver.clone()),
        Box::new(MiniJinjaRenderer::with_resolver(resolver)),
    );
    let options = GenerationOptions {
        force: args.force,
        validate_only: args.validate_only,
        dry_run_clean: args.dry_run_clean,
        fail_fast: args.fail_fast,
        disabled: args
            .disabled
            .iter()
            .chain(&config.disabled)
            .cloned()
            .collect(),
    };

    // 4. Ctrl-C stops the walk before the next leaf.
    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handle.cancel()) {
        warn!(error = %e, "Ctrl-C handler unavailable");
    }

    output.header(&format!(
        "Generating into {}",
        display_path(&output_dir).display()
    ))?;
    let spinner = output.spinner("Running generators...");
    let result = service.run(&tree, &output_dir, &options, &cancel);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let report = result?;

    info!(run_id = %report.run_id, summary = %report.summary(), "Generation finished");
    output.report(&report)?;

    if report.canceled {
        return Err(CliError::Cancelled);
    }
    if args.validate_only {
        output.info("Validation only: nothing was written")?;
    }
    Ok(())
}

/// `--output`, else `output_dir`, else the web project. The web project
/// must exist when given.
fn output_dir(args: &GenerateArgs, config: &AppConfig) -> CliResult<PathBuf> {
    let web = args
        .web_project
        .clone()
        .or_else(|| config.web_project.clone());
    if let Some(web) = web.as_ref().filter(|w| !w.is_dir()) {
        let missing = ApplicationError::ProjectNotFound { path: web.clone() };
        return Err(GantryError::from(missing).into());
    }

    args.output
        .clone()
        .or_else(|| config.output_dir.clone())
        .or(web)
        .ok_or(CliError::MissingSetting {
            setting: "web_project",
            flag: "--web-project",
        })
}
