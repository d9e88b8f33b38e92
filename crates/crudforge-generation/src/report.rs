//! Generation reports
//!
//! Aggregates per-file results of one run into counts plus the run metadata, in a form
//! that serializes directly for `--json` output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{FileAction, GenerationPhase, GenerationResult, ShellVariant};

/// Summary of one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Run identifier, also attached to the run's tracing span
    pub run_id: Uuid,
    /// Entity name as given in the schema
    pub entity: String,
    /// Shell variant used
    pub variant: ShellVariant,
    /// Whether writes were suppressed
    pub dry_run: bool,
    /// When the run finished
    pub generated_at: DateTime<Utc>,
    /// Final phase
    pub phase: GenerationPhase,
    /// Number of planned files
    pub total: usize,
    /// Files written fresh
    pub created: usize,
    /// Files left untouched
    pub skipped: usize,
    /// Files replaced
    pub overwritten: usize,
    /// Files that could not be written
    pub failed: usize,
    /// Per-file outcomes in write order
    pub results: Vec<GenerationResult>,
    /// Why the run was rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationReport {
    /// Report for a run that reached `Completed`
    pub fn completed(
        run_id: Uuid,
        entity: impl Into<String>,
        variant: ShellVariant,
        dry_run: bool,
        results: Vec<GenerationResult>,
    ) -> Self {
        let count = |action: FileAction| results.iter().filter(|r| r.action == action).count();

        Self {
            run_id,
            entity: entity.into(),
            variant,
            dry_run,
            generated_at: Utc::now(),
            phase: GenerationPhase::Completed,
            total: results.len(),
            created: count(FileAction::Created),
            skipped: count(FileAction::SkippedExists),
            overwritten: count(FileAction::Overwritten),
            failed: count(FileAction::Failed),
            results,
            error: None,
        }
    }

    /// Report for a run whose schema was rejected
    pub fn rejected(
        run_id: Uuid,
        entity: impl Into<String>,
        variant: ShellVariant,
        error: impl Into<String>,
    ) -> Self {
        Self {
            run_id,
            entity: entity.into(),
            variant,
            dry_run: false,
            generated_at: Utc::now(),
            phase: GenerationPhase::Rejected,
            total: 0,
            created: 0,
            skipped: 0,
            overwritten: 0,
            failed: 0,
            results: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Whether every file was handled without failure
    pub fn is_success(&self) -> bool {
        self.phase == GenerationPhase::Completed && self.failed == 0
    }

    /// Files skipped because the run was cancelled
    pub fn cancelled(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.reason.as_deref() == Some("cancelled"))
            .count()
    }

    /// One-line human summary
    pub fn summary_line(&self) -> String {
        if let Some(error) = &self.error {
            return format!("{} ({}): rejected: {}", self.entity, self.variant, error);
        }

        let mut line = format!(
            "{} ({}): {} files, {} created, {} skipped, {} overwritten, {} failed",
            self.entity,
            self.variant,
            self.total,
            self.created,
            self.skipped,
            self.overwritten,
            self.failed
        );
        if self.dry_run {
            line.push_str(" [dry run]");
        }
        line
    }
}
