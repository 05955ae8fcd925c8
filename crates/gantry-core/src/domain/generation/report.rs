use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One leaf that could not produce its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationFailure {
    pub generator: String,
    pub model_type: String,
    pub cause: String,
}

/// Aggregated outcome of one generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub generated: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub failures: Vec<GenerationFailure>,
    pub warnings: Vec<String>,
    pub canceled: bool,
    pub cleanup_skipped: bool,
}

impl GenerationReport {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            generated: Vec::new(),
            unchanged: Vec::new(),
            deleted: Vec::new(),
            failures: Vec::new(),
            warnings: Vec::new(),
            canceled: false,
            cleanup_skipped: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.canceled
    }

    /// One-line count summary for logs and terminals.
    pub fn summary(&self) -> String {
        format!(
            "{} generated, {} unchanged, {} deleted, {} failed",
            self.generated.len(),
            self.unchanged.len(),
            self.deleted.len(),
            self.failures.len()
        )
    }
}
