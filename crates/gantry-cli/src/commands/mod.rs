//! Command handlers. Each translates arguments into core calls and prints
//! the outcome; no business logic lives here.

use std::path::PathBuf;

use tracing::{debug, instrument};

use gantry_adapters::{OverridingTemplateResolver, SymbolTypeSource};
use gantry_core::prelude::{Analysis, AnalysisService, SuiteKind, TreeOptions};

use crate::{
    cli::{ProjectArgs, SuiteArg},
    config::AppConfig,
    error::{CliError, CliResult},
};

pub mod analyze;
pub mod completions;
pub mod generate;
pub mod generators;
pub mod init;
pub mod templates;

/// Data project from the flag, else from configuration.
fn data_project(project: &ProjectArgs, config: &AppConfig) -> CliResult<PathBuf> {
    project
        .data_project
        .clone()
        .or_else(|| config.data_project.clone())
        .ok_or(CliError::MissingSetting {
            setting: "data_project",
            flag: "--data-project",
        })
}

/// Load the data project with the symbol backend and analyze it.
#[instrument(skip_all)]
fn analyze_project(project: &ProjectArgs, config: &AppConfig) -> CliResult<Analysis> {
    let data = data_project(project, config)?;
    let context = project.context.as_deref().or(config.context.as_deref());
    debug!(data = %data.display(), context = context.unwrap_or("*"), "Loading data project");

    let source = SymbolTypeSource::load(&data)?;
    Ok(AnalysisService::new(Box::new(source)).analyze(context)?)
}

fn tree_options(area: Option<&str>, suites: &[SuiteArg], config: &AppConfig) -> TreeOptions {
    let suites: Vec<SuiteKind> = if suites.is_empty() {
        config.suites.clone()
    } else {
        suites.iter().map(|&s| s.into()).collect()
    };
    TreeOptions {
        suites,
        area: area.map(str::to_string).or_else(|| config.area.clone()),
        root_namespace: config.root_namespace.clone(),
    }
}

fn resolver(overrides: Option<&PathBuf>, config: &AppConfig) -> OverridingTemplateResolver {
    match overrides.or(config.template_overrides.as_ref()) {
        Some(dir) => OverridingTemplateResolver::with_overrides(dir),
        None => OverridingTemplateResolver::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_win_over_config() {
        let config = AppConfig {
            data_project: Some("from-config".into()),
            area: Some("admin".into()),
            suites: vec![SuiteKind::Vue],
            ..AppConfig::default()
        };
        let project = ProjectArgs {
            data_project: Some("from-flag".into()),
            context: None,
        };
        assert_eq!(data_project(&project, &config).unwrap(), PathBuf::from("from-flag"));

        let options = tree_options(Some("sales"), &[SuiteArg::Server], &config);
        assert_eq!(options.area.as_deref(), Some("sales"));
        assert_eq!(options.suites, vec![SuiteKind::Server]);
    }

    #[test]
    fn config_fills_missing_flags() {
        let config = AppConfig {
            area: Some("admin".into()),
            suites: vec![SuiteKind::Vue],
            ..AppConfig::default()
        };
        let options = tree_options(None, &[], &config);
        assert_eq!(options.area.as_deref(), Some("admin"));
        assert_eq!(options.suites, vec![SuiteKind::Vue]);
    }

    #[test]
    fn missing_data_project_is_reported() {
        let err = data_project(&ProjectArgs::default(), &AppConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::MissingSetting { setting: "data_project", .. }));
        assert_eq!(err.exit_code(), 4);
    }
}
