//! `gantry generators` - the flattened generator tree.

use gantry_core::prelude::{build_tree, list_generators};

use crate::{
    cli::{GeneratorsArgs, ReportFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: GeneratorsArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let analysis = super::analyze_project(&args.project, &config)?;
    let options = super::tree_options(args.area.as_deref(), &args.suites, &config);
    let rows = list_generators(&build_tree(&analysis, &options)?);

    match args.format {
        ReportFormat::Json => output.json(&rows)?,
        ReportFormat::Text => {
            output.header(&format!("{} generators:", rows.len()))?;
            for row in &rows {
                output.print(&format!(
                    "  {:<28} {:<16} {}",
                    row.name,
                    row.model_type,
                    row.path.display()
                ))?;
            }
        }
    }
    Ok(())
}
