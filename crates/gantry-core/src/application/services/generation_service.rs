//! Generation Service - walks a generator tree and writes its outputs.
//!
//! The walk is sequential and observes cancellation before every leaf.
//! Leaf failures are collected, not propagated, unless `fail_fast` is set.
//! Cleanup only runs once the walk has produced an authoritative
//! known-good set.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateRenderer, TemplateResolver},
        services::cleaner_service::OutputCleaner,
    },
    domain::generation::{
        CancellationToken, CleanerSpec, GenerationFailure, GenerationReport, GeneratorNode,
        KnownGoodSet, LeafGenerator, LeafSource,
    },
    error::{GantryError, GantryResult},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Rewrite files even when their content is unchanged.
    pub force: bool,
    /// Render everything, write nothing, skip cleanup.
    pub validate_only: bool,
    /// Cleaners report would-be deletions only.
    pub dry_run_clean: bool,
    /// Stop at the first leaf failure.
    pub fail_fast: bool,
    /// Generator names to skip, together with their subtrees.
    pub disabled: BTreeSet<String>,
}

/// Main generation service.
pub struct GenerationService {
    filesystem: Box<dyn Filesystem>,
    resolver: Box<dyn TemplateResolver>,
    renderer: Box<dyn TemplateRenderer>,
}

struct Walk<'a> {
    options: &'a GenerationOptions,
    cancel: &'a CancellationToken,
    report: GenerationReport,
    known_good: KnownGoodSet,
    cleaners: Vec<(PathBuf, CleanerSpec)>,
    stopped: bool,
}

impl GenerationService {
    pub fn new(
        filesystem: Box<dyn Filesystem>,
        resolver: Box<dyn TemplateResolver>,
        renderer: Box<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            filesystem,
            resolver,
            renderer,
        }
    }

    /// Run every enabled leaf below `root`, then reconcile cleaner
    /// directories against the produced file set.
    #[instrument(
        skip_all,
        fields(
            root = root.name(),
            output = %output_root.display(),
            force = options.force,
            validate_only = options.validate_only
        )
    )]
    pub fn run(
        &self,
        root: &GeneratorNode,
        output_root: &Path,
        options: &GenerationOptions,
        cancel: &CancellationToken,
    ) -> GantryResult<GenerationReport> {
        let output_root = std::path::absolute(output_root).map_err(|e| {
            ApplicationError::FilesystemError {
                path: output_root.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let mut walk = Walk {
            options,
            cancel,
            report: GenerationReport::start(),
            known_good: KnownGoodSet::new(&output_root),
            cleaners: Vec::new(),
            stopped: false,
        };
        info!(run_id = %walk.report.run_id, "Generation started");

        self.visit(root, &output_root, &mut walk);

        let Walk {
            mut report,
            known_good,
            cleaners,
            stopped,
            ..
        } = walk;

        if report.canceled || stopped || options.validate_only {
            report.cleanup_skipped = true;
            if report.canceled {
                warn!("Generation canceled, cleanup skipped");
            } else if stopped {
                warn!("Generation stopped early, cleanup skipped");
            }
        } else {
            let cleaner = OutputCleaner::new(self.filesystem.as_ref()).dry_run(options.dry_run_clean);
            for (directory, spec) in cleaners {
                let outcome = cleaner.clean(&directory, &spec, &known_good);
                if options.dry_run_clean {
                    report.warnings.extend(
                        outcome
                            .deleted
                            .iter()
                            .map(|p| format!("would delete {}", p.display())),
                    );
                } else {
                    report.deleted.extend(outcome.deleted);
                }
                report.warnings.extend(outcome.warnings);
            }
        }

        info!(summary = %report.summary(), "Generation finished");
        Ok(report)
    }

    fn visit(&self, node: &GeneratorNode, base: &Path, walk: &mut Walk<'_>) {
        if walk.stopped || walk.report.canceled {
            return;
        }
        if walk.options.disabled.contains(node.name()) {
            debug!(generator = node.name(), "Generator disabled");
            return;
        }

        let path = base.join(node.suffix());
        match node {
            GeneratorNode::Composite(composite) => {
                for cleaner in composite.cleaners() {
                    walk.cleaners.push((path.join(&cleaner.directory), cleaner.clone()));
                }
                for child in composite.generators() {
                    self.visit(child, &path, walk);
                }
            }
            GeneratorNode::Leaf(leaf) => self.run_leaf(leaf, path, walk),
        }
    }

    fn run_leaf(&self, leaf: &LeafGenerator, path: PathBuf, walk: &mut Walk<'_>) {
        if walk.cancel.is_canceled() {
            walk.report.canceled = true;
            return;
        }

        // Targeted leaves protect their output even if they fail below.
        walk.known_good.insert(&path);

        let outcome = self
            .produce(leaf)
            .and_then(|content| self.write_if_changed(&path, &content, walk.options));

        match outcome {
            Ok(true) => {
                debug!(generator = leaf.name(), path = %path.display(), "Generated");
                walk.report.generated.push(path);
            }
            Ok(false) => {
                debug!(generator = leaf.name(), path = %path.display(), "Unchanged");
                walk.report.unchanged.push(path);
            }
            Err(e) => {
                warn!(generator = leaf.name(), model = leaf.model_type(), error = %e, "Generator failed");
                walk.report.failures.push(GenerationFailure {
                    generator: leaf.name().to_string(),
                    model_type: leaf.model_type().to_string(),
                    cause: e.to_string(),
                });
                if walk.options.fail_fast {
                    walk.stopped = true;
                }
            }
        }
    }

    fn produce(&self, leaf: &LeafGenerator) -> GantryResult<String> {
        if let Some(issue) = leaf.issues().first() {
            return Err(GantryError::Domain(issue.clone()));
        }

        match leaf.source() {
            LeafSource::Template { template, model } => {
                let resolved = self.resolver.resolve(template)?;
                let source = self.resolver.read(&resolved)?;
                self.renderer.render(template.logical_path(), &source, model)
            }
            LeafSource::Emit(emit) => emit().map_err(|reason| {
                ApplicationError::RenderingFailed {
                    template: leaf.name().to_string(),
                    reason,
                }
                .into()
            }),
        }
    }

    /// Returns whether the file was (or, when validating, would be) written.
    fn write_if_changed(
        &self,
        path: &Path,
        content: &str,
        options: &GenerationOptions,
    ) -> GantryResult<bool> {
        let unchanged = self.filesystem.exists(path)
            && self
                .filesystem
                .read_to_string(path)
                .is_ok_and(|existing| existing == content);

        if unchanged && !options.force {
            return Ok(false);
        }
        if options.validate_only {
            return Ok(true);
        }

        if let Some(parent) = path.parent() {
            self.filesystem.create_dir_all(parent)?;
        }
        self.filesystem.write_file(path, content)?;
        Ok(true)
    }
}
