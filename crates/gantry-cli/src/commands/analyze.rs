//! `gantry analyze` - report what the generators would see. Never writes.

use serde_json::{Value, json};

use gantry_core::domain::{ClassSecurityInfo, SecurityPermission};
use gantry_core::prelude::Analysis;

use crate::{
    cli::{AnalyzeArgs, ReportFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: AnalyzeArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let analysis = super::analyze_project(&args.project, &config)?;

    match args.format {
        ReportFormat::Json => output.json(&to_json(&analysis)),
        ReportFormat::Text => print_text(&analysis, &output),
    }
}

fn print_text(analysis: &Analysis, output: &OutputManager) -> CliResult<()> {
    let repo = &analysis.repository;

    let contexts: Vec<&str> = analysis
        .contexts
        .iter()
        .map(|&id| repo.class(id).name())
        .collect();
    output.header(&format!("Contexts: {}", contexts.join(", ")))?;

    output.header("Entities:")?;
    for usage in &analysis.usages {
        let class = repo.class(usage.entity);
        output.print(&format!(
            "  {:<20} {:<20} {}",
            usage.property,
            class.name(),
            security_line(class.security())
        ))?;
    }

    if !analysis.strategies.data_sources.is_empty() {
        output.header("Data sources:")?;
        for ds in &analysis.strategies.data_sources {
            output.print(&format!(
                "  {:<20} serves {}{}",
                repo.class(ds.usage.strategy).name(),
                repo.class(ds.usage.served_type).name(),
                if ds.is_default { " (default)" } else { "" }
            ))?;
        }
    }

    if !analysis.strategies.behaviors.is_empty() {
        output.header("Behaviors:")?;
        for behavior in &analysis.strategies.behaviors {
            output.print(&format!(
                "  {:<20} serves {}",
                repo.class(behavior.strategy).name(),
                repo.class(behavior.served_type).name()
            ))?;
        }
    }

    let problems = analysis.problems();
    if problems.is_empty() {
        output.success("No issues found")?;
    } else {
        output.header("Issues:")?;
        for problem in &problems {
            output.warning(problem)?;
        }
    }
    Ok(())
}

fn to_json(analysis: &Analysis) -> Value {
    let repo = &analysis.repository;
    json!({
        "contexts": analysis
            .contexts
            .iter()
            .map(|&id| repo.class(id).identity().to_string())
            .collect::<Vec<_>>(),
        "entities": analysis.usages.iter().map(|u| {
            let class = repo.class(u.entity);
            json!({
                "property": u.property,
                "entity": class.identity().to_string(),
                "primary_key": class.primary_key().map(|p| p.name()),
                "security": class.security(),
            })
        }).collect::<Vec<_>>(),
        "data_sources": analysis.strategies.data_sources.iter().map(|ds| json!({
            "strategy": repo.class(ds.usage.strategy).name(),
            "serves": repo.class(ds.usage.served_type).name(),
            "is_default": ds.is_default,
            "parameters": ds.parameters,
        })).collect::<Vec<_>>(),
        "behaviors": analysis.strategies.behaviors.iter().map(|b| json!({
            "strategy": repo.class(b.strategy).name(),
            "serves": repo.class(b.served_type).name(),
        })).collect::<Vec<_>>(),
        "issues": analysis.problems(),
    })
}

fn security_line(security: &ClassSecurityInfo) -> String {
    format!(
        "read: {}, write: {}, create: {}, delete: {}",
        permission(&security.read),
        permission(&security.write),
        permission(&security.create),
        permission(&security.delete)
    )
}

fn permission(permission: &SecurityPermission) -> String {
    match permission {
        SecurityPermission::DenyAll => "deny".into(),
        SecurityPermission::AllowAnonymous => "anonymous".into(),
        SecurityPermission::AuthenticatedOnly => "authenticated".into(),
        SecurityPermission::RoleRestricted(_) => permission.role_union().join("|"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_read_naturally() {
        assert_eq!(permission(&SecurityPermission::DenyAll), "deny");
        assert_eq!(permission(&SecurityPermission::roles("Admin, Sales")), "Admin|Sales");
        let security = ClassSecurityInfo {
            read: SecurityPermission::AllowAnonymous,
            write: SecurityPermission::AuthenticatedOnly,
            create: SecurityPermission::AuthenticatedOnly,
            delete: SecurityPermission::DenyAll,
        };
        assert_eq!(
            security_line(&security),
            "read: anonymous, write: authenticated, create: authenticated, delete: deny"
        );
    }
}
