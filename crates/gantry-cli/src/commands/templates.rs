//! `gantry templates` - list every template and where it resolves from.

use gantry_core::prelude::TemplateResolver;

use crate::{cli::TemplatesArgs, config::AppConfig, error::CliResult, output::OutputManager};

pub fn execute(args: TemplatesArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let resolver = super::resolver(args.template_overrides.as_ref(), &config);
    if let Some(dir) = resolver.override_dir() {
        output.info(&format!("Overrides from {}", dir.display()))?;
    }

    output.header("Templates:")?;
    for template in resolver.available() {
        let line = format!(
            "  {:<32} {}",
            template.descriptor.logical_path(),
            template.origin
        );
        if template.is_override() {
            output.success(line.trim_start())?;
        } else {
            output.print(&line)?;
        }
    }
    Ok(())
}
