// Generate scaffolding from one or more entity schemas

use std::path::{Path, PathBuf};

use clap::Args;
use crudforge_generation::{
    ArtifactKind, ConflictPolicy, EntitySchema, GenerationOptions, GenerationOrchestrator,
    GenerationReport, LocalFileSystem, SchemaLoader, ShellVariant,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use super::Command;
use crate::config::{find_project_root, ConfigLoader, ProjectConfig};
use crate::error::{CliError, CliResult};
use crate::logging::VerbosityLevel;
use crate::output::{FilePreview, OutputStyle};

/// Arguments of `crudforge generate`
#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Entity schema files (.yaml, .yml or .json)
    #[arg(value_name = "SCHEMA", required = true)]
    pub schemas: Vec<PathBuf>,

    /// Shell variant (simple, enterprise, multi-app)
    #[arg(long)]
    pub variant: Option<ShellVariant>,

    /// Conflict policy (skip-existing, overwrite, fail-on-conflict)
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<ConflictPolicy>,

    /// Artifact kinds to generate, comma separated
    #[arg(long, value_delimiter = ',', value_name = "KIND")]
    pub artifacts: Vec<ArtifactKind>,

    /// Host application under apps/
    #[arg(long)]
    pub app: Option<String>,

    /// Layout theme preset
    #[arg(long)]
    pub theme: Option<String>,

    /// Human-readable app name
    #[arg(long)]
    pub display_name: Option<String>,

    /// App description
    #[arg(long)]
    pub description: Option<String>,

    /// Position in the multi-app launcher
    #[arg(long)]
    pub order: Option<u32>,

    /// Project root to write into (default: nearest ancestor containing apps/)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Report planned actions without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Dry run that also prints the start of every file it would write
    #[arg(long, conflicts_with = "json")]
    pub preview: bool,

    /// Print the reports as JSON
    #[arg(long)]
    pub json: bool,

    /// Generate the settings page
    #[arg(long)]
    pub with_settings: bool,

    /// Add a theme switcher to the shell header
    #[arg(long)]
    pub with_theme_switcher: bool,

    /// Skip the dashboard page
    #[arg(long)]
    pub no_dashboard: bool,

    /// Leave auth wiring out of the shell
    #[arg(long)]
    pub no_auth: bool,
}

impl GenerateArgs {
    /// Apply explicit flags on top of file, environment and schema options
    pub fn apply_to(&self, options: &mut GenerationOptions) {
        if let Some(variant) = self.variant {
            options.variant = variant;
        }
        if let Some(policy) = self.policy {
            options.conflict_policy = policy;
        }
        if !self.artifacts.is_empty() {
            options.artifact_kinds = self.artifacts.iter().copied().collect();
        }
        if let Some(app) = &self.app {
            options.app = app.clone();
        }
        if let Some(theme) = &self.theme {
            options.theme = theme.clone();
        }
        if let Some(display_name) = &self.display_name {
            options.display_name = Some(display_name.clone());
        }
        if let Some(description) = &self.description {
            options.description = Some(description.clone());
        }
        if let Some(order) = self.order {
            options.order = order;
        }
        if self.dry_run || self.preview {
            options.dry_run = true;
        }
        if self.with_settings {
            options.features.with_settings = true;
        }
        if self.with_theme_switcher {
            options.features.with_theme_switcher = true;
        }
        if self.no_dashboard {
            options.features.with_dashboard = false;
        }
        if self.no_auth {
            options.features.with_auth = false;
        }
    }
}

/// Report of one schema plus the previews requested with `--preview`
#[derive(Debug)]
pub struct SchemaOutcome {
    pub report: GenerationReport,
    pub previews: Vec<FilePreview>,
}

impl From<GenerationReport> for SchemaOutcome {
    fn from(report: GenerationReport) -> Self {
        Self {
            report,
            previews: Vec::new(),
        }
    }
}

/// Generate scaffolding for every schema given on the command line
pub struct GenerateCommand {
    args: GenerateArgs,
}

impl GenerateCommand {
    pub fn new(args: GenerateArgs) -> Self {
        Self { args }
    }

    /// Project root the files are written under
    pub fn output_root(&self) -> CliResult<PathBuf> {
        match &self.args.output {
            Some(dir) => Ok(dir.clone()),
            None => Ok(find_project_root(&std::env::current_dir()?)),
        }
    }

    /// Run every schema on its own blocking task and collect the reports in input order
    pub async fn run(
        &self,
        root: &Path,
        config: &ProjectConfig,
        cancel: &CancellationToken,
    ) -> CliResult<Vec<SchemaOutcome>> {
        let handles: Vec<_> = self
            .args
            .schemas
            .iter()
            .map(|schema_path| {
                let schema_path = schema_path.clone();
                let root = root.to_path_buf();
                let config = config.clone();
                let args = self.args.clone();
                let cancel = cancel.clone();
                tokio::task::spawn_blocking(move || {
                    generate_one(&schema_path, &root, &config, &args, &cancel)
                })
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            let outcome = handle
                .await
                .map_err(|e| CliError::Internal(format!("Generation task failed: {}", e)))?;
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    fn print(&self, outcomes: &[SchemaOutcome]) -> CliResult<()> {
        if self.args.json {
            let reports: Vec<&GenerationReport> = outcomes.iter().map(|o| &o.report).collect();
            let json = serde_json::to_string_pretty(&reports)
                .map_err(|e| CliError::Internal(format!("Failed to serialize report: {}", e)))?;
            println!("{}", json);
            return Ok(());
        }

        let style = OutputStyle::default();
        let show_files = VerbosityLevel::Normal.should_output();
        for SchemaOutcome { report, previews } in outcomes {
            for preview in previews {
                println!("{}\n", style.preview(preview));
            }
            if show_files {
                for result in &report.results {
                    println!("{}", style.file_result(result));
                }
            }
            println!("{}", style.report_summary(report));
            let cancelled = report.cancelled();
            if cancelled > 0 {
                println!(
                    "{}",
                    style.warning(&format!("{} file(s) not written: run was cancelled", cancelled))
                );
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Command for GenerateCommand {
    async fn execute(&self) -> CliResult<()> {
        let root = self.output_root()?;
        let config = ConfigLoader::load(&root)?;

        let cancel = CancellationToken::new();
        let interrupt = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, stopping before the next write");
                    cancel.cancel();
                }
            })
        };

        let outcomes = self.run(&root, &config, &cancel).await;
        interrupt.abort();
        let outcomes = outcomes?;

        self.print(&outcomes)?;

        let failed_runs = outcomes.iter().filter(|o| !o.report.is_success()).count();
        if failed_runs > 0 {
            return Err(CliError::RunsFailed {
                failed_runs,
                total_runs: outcomes.len(),
            });
        }
        Ok(())
    }
}

/// Load, resolve options for and generate one schema; failures become rejected reports
fn generate_one(
    schema_path: &Path,
    root: &Path,
    config: &ProjectConfig,
    args: &GenerateArgs,
    cancel: &CancellationToken,
) -> SchemaOutcome {
    let schema = match SchemaLoader::load_from_file(schema_path) {
        Ok(schema) => schema,
        Err(e) => {
            let mut options = config.to_options();
            args.apply_to(&mut options);
            warn!(path = %schema_path.display(), error = %e, "Schema could not be loaded");
            return GenerationReport::rejected(
                Uuid::new_v4(),
                schema_path.display().to_string(),
                options.variant,
                e.to_string(),
            )
            .into();
        }
    };

    let mut options = config.merge_schema_options(schema.options.as_ref());
    args.apply_to(&mut options);
    info!(
        entity = %schema.name,
        variant = %options.variant,
        root = %root.display(),
        "Generating"
    );

    let fs = LocalFileSystem::new(root);
    let orchestrator = GenerationOrchestrator::new(&fs);
    let report = match orchestrator.generate_with_cancel(&schema, &options, cancel) {
        Ok(report) => report,
        Err(e) => GenerationReport::rejected(
            Uuid::new_v4(),
            schema.name.trim(),
            options.variant,
            e.to_string(),
        ),
    };

    let previews = if args.preview && report.is_success() {
        previews(&orchestrator, &schema, &options)
    } else {
        Vec::new()
    };
    SchemaOutcome { report, previews }
}

/// Excerpts of the files a dry run of `schema` would write
fn previews(
    orchestrator: &GenerationOrchestrator<'_>,
    schema: &EntitySchema,
    options: &GenerationOptions,
) -> Vec<FilePreview> {
    match orchestrator.plan(schema, options) {
        Ok(planned) => planned.iter().filter_map(FilePreview::from_planned).collect(),
        Err(e) => {
            warn!(entity = %schema.name, error = %e, "Preview could not be built");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_options() {
        let args = GenerateArgs {
            variant: Some(ShellVariant::Simple),
            policy: Some(ConflictPolicy::Overwrite),
            artifacts: vec![ArtifactKind::Route],
            app: Some("admin".into()),
            order: Some(7),
            with_settings: true,
            no_auth: true,
            ..Default::default()
        };
        let mut options = GenerationOptions::default();
        args.apply_to(&mut options);

        assert_eq!(options.variant, ShellVariant::Simple);
        assert_eq!(options.conflict_policy, ConflictPolicy::Overwrite);
        assert_eq!(options.artifact_kinds.len(), 1);
        assert_eq!(options.app, "admin");
        assert_eq!(options.order, 7);
        assert!(options.features.with_settings);
        assert!(!options.features.with_auth);
        assert!(options.features.with_dashboard);
    }

    #[test]
    fn test_unset_flags_keep_options() {
        let mut options = GenerationOptions::for_variant(ShellVariant::MultiApp);
        options.theme = "ocean".into();
        GenerateArgs::default().apply_to(&mut options);

        assert_eq!(options.variant, ShellVariant::MultiApp);
        assert_eq!(options.theme, "ocean");
        assert_eq!(options.artifact_kinds.len(), ArtifactKind::ALL.len());
    }

    #[test]
    fn test_unreadable_schema_becomes_rejected_report() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = generate_one(
            &dir.path().join("missing.yaml"),
            dir.path(),
            &ProjectConfig::default(),
            &GenerateArgs::default(),
            &CancellationToken::new(),
        );
        assert!(outcome.report.error.is_some());
        assert!(!outcome.report.is_success());
        assert!(outcome.previews.is_empty());
    }

    #[test]
    fn test_preview_is_a_dry_run_listing_new_files() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("drug-unit.yaml");
        std::fs::write(
            &schema_path,
            "name: drug-unit\nfields:\n  - name: code\n    type: string\n    required: true\n",
        )
        .unwrap();
        let args = GenerateArgs {
            schemas: vec![schema_path.clone()],
            artifacts: vec![ArtifactKind::Service],
            preview: true,
            ..Default::default()
        };

        let outcome = generate_one(
            &schema_path,
            dir.path(),
            &ProjectConfig::default(),
            &args,
            &CancellationToken::new(),
        );

        assert!(outcome.report.is_success(), "{:?}", outcome.report.error);
        assert!(outcome.report.dry_run);
        assert!(!outcome.previews.is_empty());
        for preview in &outcome.previews {
            assert!(!dir.path().join(&preview.path).exists());
            assert!(!preview.excerpt.is_empty());
        }
    }
}
