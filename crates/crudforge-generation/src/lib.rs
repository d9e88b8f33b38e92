#![warn(missing_docs)]

//! Shell and CRUD component scaffolding for crudforge
//!
//! Turns a declarative entity schema into a deterministic set of Angular feature files:
//! names are resolved into every casing, templates are picked from a static catalog by
//! artifact kind and shell variant, rendered strictly against a bound context, and
//! written through a [`FileSystem`] collaborator under a conflict policy.

pub mod binder;
pub mod error;
pub mod models;
pub mod naming;
pub mod orchestrator;
pub mod planner;
pub mod report;
pub mod schema;
pub mod templates;

// Re-export public API
pub use binder::VariableBinder;
pub use error::GenerationError;
pub use models::{
    ArtifactKind, ConflictPolicy, EntitySchema, FeatureFlag, FeatureFlags, FeatureOverlay,
    FieldDescriptor, FieldType, FileAction, GenerationOptions, GenerationPhase, GenerationResult,
    NameVariants, OptionsOverlay, RelationDescriptor, RelationKind, ShellVariant,
};
pub use naming::NameResolver;
pub use orchestrator::GenerationOrchestrator;
pub use planner::{FilePlanner, FileSystem, LocalFileSystem, MemoryFileSystem, PlannedFile};
pub use report::GenerationReport;
pub use schema::{SchemaLoader, SchemaValidator};
pub use templates::{
    GenerationContext, ParsedTemplate, RenderedFile, TemplateDescriptor, TemplateElement,
    TemplateEngine, TemplateError, TemplateParser, TemplateRegistry,
};
