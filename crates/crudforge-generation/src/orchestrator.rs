//! Generation orchestration
//!
//! Drives one run through its phases: the schema is validated, names are resolved,
//! templates are selected, bound, rendered and planned, and finally the planned writes
//! are issued. Nothing touches the file system before planning has succeeded for every
//! template.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::{
    binder::VariableBinder,
    error::GenerationError,
    models::{ArtifactKind, EntitySchema, GenerationOptions, GenerationPhase},
    naming::NameResolver,
    planner::{FilePlanner, FileSystem, PlannedFile},
    report::GenerationReport,
    schema::SchemaValidator,
    templates::{RenderedFile, TemplateDescriptor, TemplateEngine, TemplateRegistry},
};

/// Runs generation against a template registry and a file system
pub struct GenerationOrchestrator<'a> {
    registry: &'a TemplateRegistry,
    fs: &'a dyn FileSystem,
    engine: TemplateEngine,
    binder: VariableBinder,
    planner: FilePlanner,
}

impl<'a> GenerationOrchestrator<'a> {
    /// Orchestrator over the built-in catalog
    pub fn new(fs: &'a dyn FileSystem) -> Self {
        Self::with_registry(TemplateRegistry::global(), fs)
    }

    /// Orchestrator over a custom catalog
    pub fn with_registry(registry: &'a TemplateRegistry, fs: &'a dyn FileSystem) -> Self {
        Self {
            registry,
            fs,
            engine: TemplateEngine::new(),
            binder: VariableBinder::new(),
            planner: FilePlanner::new(),
        }
    }

    /// Generate every requested artifact for `schema`
    pub fn generate(
        &self,
        schema: &EntitySchema,
        options: &GenerationOptions,
    ) -> Result<GenerationReport, GenerationError> {
        self.generate_with_cancel(schema, options, &CancellationToken::new())
    }

    /// Generate, stopping before the next write once `cancel` fires
    pub fn generate_with_cancel(
        &self,
        schema: &EntitySchema,
        options: &GenerationOptions,
        cancel: &CancellationToken,
    ) -> Result<GenerationReport, GenerationError> {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "generate",
            entity = %schema.name,
            variant = %options.variant,
            run_id = %run_id
        );
        let _guard = span.enter();

        let planned = self.plan(schema, options)?;

        let mut phase = GenerationPhase::Planning;
        advance(&mut phase, GenerationPhase::Writing);
        let results = self.planner.write(&planned, self.fs, cancel, options.dry_run);
        advance(&mut phase, GenerationPhase::Completed);

        let report = GenerationReport::completed(
            run_id,
            schema.name.trim(),
            options.variant,
            options.dry_run,
            results,
        );
        if report.failed > 0 {
            warn!(failed = report.failed, "Generation completed with failures");
        }
        info!(
            total = report.total,
            created = report.created,
            skipped = report.skipped,
            overwritten = report.overwritten,
            failed = report.failed,
            dry_run = report.dry_run,
            "Generation completed"
        );
        Ok(report)
    }

    /// Run every phase up to planning, without writing
    pub fn plan(
        &self,
        schema: &EntitySchema,
        options: &GenerationOptions,
    ) -> Result<Vec<PlannedFile>, GenerationError> {
        let mut phase = GenerationPhase::Validating;
        let resolver = NameResolver::with_overrides(&options.plural_overrides);

        let validated = SchemaValidator::validate(schema)
            .and_then(|()| SchemaValidator::validate_options(options))
            .and_then(|()| self.binder.validate_references(schema, &resolver));
        if let Err(e) = validated {
            advance(&mut phase, GenerationPhase::Rejected);
            warn!(error = %e, "Schema rejected");
            return Err(e);
        }

        advance(&mut phase, GenerationPhase::Resolving);
        let names = resolver.resolve(&schema.name)?;

        advance(&mut phase, GenerationPhase::Planning);
        let templates = self.select(options)?;
        let base = self.binder.bind(schema, &names, options.variant, options)?;
        let rendered = self.render_all(&templates, &base)?;

        self.planner.plan(rendered, self.fs, options.conflict_policy)
    }

    /// Templates for the requested kinds and their dependencies, minus disabled features
    fn select(&self, options: &GenerationOptions) -> Result<Vec<&'a TemplateDescriptor>, GenerationError> {
        let kinds = ArtifactKind::close_dependencies(&options.artifact_kinds);
        let templates = self
            .registry
            .templates_for(&kinds, options.variant)?
            .into_iter()
            .filter(|template| {
                let enabled = template
                    .feature_gate
                    .map_or(true, |flag| options.features.is_enabled(flag));
                if !enabled {
                    debug!(template = template.id, "Template disabled by feature flag");
                }
                enabled
            })
            .collect();
        Ok(templates)
    }

    /// Render every template, reporting all missing bindings together
    fn render_all(
        &self,
        templates: &[&TemplateDescriptor],
        base: &crate::templates::GenerationContext,
    ) -> Result<Vec<RenderedFile>, GenerationError> {
        let mut rendered = Vec::with_capacity(templates.len());
        let mut missing = Vec::new();

        for template in templates {
            let ctx = self.binder.for_template(base, template);
            match self.engine.render(template, &ctx) {
                Ok(file) => {
                    debug!(template = template.id, path = %file.path.display(), "Rendered template");
                    rendered.push(file);
                }
                Err(GenerationError::MissingBinding { names }) => missing.extend(names),
                Err(e) => return Err(e),
            }
        }

        if missing.is_empty() {
            Ok(rendered)
        } else {
            missing.sort();
            missing.dedup();
            Err(GenerationError::MissingBinding { names: missing })
        }
    }
}

fn advance(phase: &mut GenerationPhase, next: GenerationPhase) {
    debug_assert!(
        phase.can_advance_to(next),
        "illegal phase transition {:?} -> {:?}",
        phase,
        next
    );
    debug!(from = ?phase, to = ?next, "Phase transition");
    *phase = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            ConflictPolicy, FieldDescriptor, FieldType, FileAction, ShellVariant,
        },
        planner::MemoryFileSystem,
    };

    fn schema() -> EntitySchema {
        EntitySchema::new("drug unit")
            .with_field(FieldDescriptor::new("code", FieldType::String).required())
            .with_field(FieldDescriptor::new("quantity", FieldType::Number))
            .with_field(
                FieldDescriptor::new("status", FieldType::Enum).with_values(["active", "retired"]),
            )
    }

    #[test]
    fn test_generate_enterprise_writes_every_file() {
        let fs = MemoryFileSystem::new();
        let report = GenerationOrchestrator::new(&fs)
            .generate(&schema(), &GenerationOptions::default())
            .unwrap();

        assert_eq!(report.phase, GenerationPhase::Completed);
        assert_eq!(report.created, report.total);
        assert_eq!(fs.write_count(), report.total);
        // settings page is off by default
        assert!(fs
            .read("apps/web/src/app/features/drug-unit/pages/settings/settings.page.ts")
            .is_none());
        let routes = fs
            .read("apps/web/src/app/features/drug-unit/drug-unit.routes.ts")
            .unwrap();
        assert!(routes.contains("export const DRUG_UNIT_ROUTES"));
        assert!(routes.contains("path: 'drug-units'"));
    }

    #[test]
    fn test_rendered_types_use_enum_union() {
        let fs = MemoryFileSystem::new();
        GenerationOrchestrator::new(&fs)
            .generate(&schema(), &GenerationOptions::default())
            .unwrap();

        let types = fs
            .read("apps/web/src/app/features/drug-unit/types/drug-unit.types.ts")
            .unwrap();
        assert!(types.contains("export type DrugUnitStatus = 'active' | 'retired';"));
        assert!(types.contains("  code: string;"));
        assert!(types.contains("  quantity?: number;"));
        assert!(types.contains("  status?: DrugUnitStatus;"));
    }

    #[test]
    fn test_dry_run_plans_without_writing() {
        let fs = MemoryFileSystem::new();
        let options = GenerationOptions {
            dry_run: true,
            ..GenerationOptions::for_variant(ShellVariant::Simple)
        };
        let report = GenerationOrchestrator::new(&fs).generate(&schema(), &options).unwrap();

        assert!(report.total > 0);
        assert_eq!(report.created, report.total);
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn test_rejected_schema_does_no_io() {
        let fs = MemoryFileSystem::new();
        let schema = schema().with_field(FieldDescriptor::new("code", FieldType::String));
        let err = GenerationOrchestrator::new(&fs)
            .generate(&schema, &GenerationOptions::default())
            .unwrap_err();

        assert!(matches!(err, GenerationError::SchemaValidation(_)));
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn test_fail_on_conflict_only_fails_existing_file() {
        let existing = "apps/web/src/app/features/drug-unit/drug-unit.route.ts";
        let fs = MemoryFileSystem::new().with_file(existing, "// hand written\n");
        let options = GenerationOptions::default().with_policy(ConflictPolicy::FailOnConflict);

        let report = GenerationOrchestrator::new(&fs).generate(&schema(), &options).unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(report.created, report.total - 1);
        let failed = report
            .results
            .iter()
            .find(|r| r.action == FileAction::Failed)
            .unwrap();
        assert_eq!(failed.path.to_str(), Some(existing));
        assert_eq!(fs.read(existing).as_deref(), Some("// hand written\n"));
    }

    #[test]
    fn test_missing_binding_across_templates_is_reported_once() {
        let registry = TemplateRegistry::from_descriptors(vec![
            TemplateDescriptor {
                id: "one",
                artifact_kind: ArtifactKind::Shell,
                variants: &[ShellVariant::Simple],
                target_path_template: "{{kebab}}/one.ts",
                feature_gate: None,
                body: "{{pluralKebab}} {{unknownKey}}",
            },
            TemplateDescriptor {
                id: "two",
                artifact_kind: ArtifactKind::Shell,
                variants: &[ShellVariant::Simple],
                target_path_template: "{{kebab}}/{{nowhere}}.ts",
                feature_gate: None,
                body: "{{unknownKey}}",
            },
        ]);
        let fs = MemoryFileSystem::new();
        let options = GenerationOptions::for_variant(ShellVariant::Simple)
            .with_artifacts([ArtifactKind::Shell]);

        let err = GenerationOrchestrator::with_registry(&registry, &fs)
            .generate(&schema(), &options)
            .unwrap_err();

        match err {
            GenerationError::MissingBinding { names } => {
                assert_eq!(names, vec!["nowhere", "unknownKey"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn test_app_escaping_output_root_is_rejected_before_io() {
        let fs = MemoryFileSystem::new();
        let options = GenerationOptions {
            app: "../../escaped".into(),
            ..GenerationOptions::default()
        };
        let err = GenerationOrchestrator::new(&fs)
            .generate(&schema(), &options)
            .unwrap_err();

        assert!(matches!(err, GenerationError::SchemaValidation(msg) if msg.contains("app")));
        assert_eq!(fs.write_count(), 0);
    }

    #[test]
    fn test_feature_gates_select_pages() {
        let fs = MemoryFileSystem::new();
        let mut options = GenerationOptions::default().with_artifacts([ArtifactKind::Page]);
        options.features.with_dashboard = false;
        options.features.with_settings = true;

        let planned = GenerationOrchestrator::new(&fs).plan(&schema(), &options).unwrap();
        let ids: Vec<_> = planned.iter().map(|p| p.template_id.as_str()).collect();
        assert_eq!(ids, vec!["settings-page"]);
    }
}
