//! Core data models for scaffolding generation

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    path::PathBuf,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Layout style of a generated shell
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ShellVariant {
    /// Empty layout, for auth or landing pages
    Simple,
    /// Enterprise layout with a single navigation
    #[default]
    Enterprise,
    /// Enterprise layout with sub-app tabs
    MultiApp,
}

impl ShellVariant {
    /// Every supported variant
    pub const ALL: [ShellVariant; 3] = [
        ShellVariant::Simple,
        ShellVariant::Enterprise,
        ShellVariant::MultiApp,
    ];

    /// Tag used in schema files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ShellVariant::Simple => "simple",
            ShellVariant::Enterprise => "enterprise",
            ShellVariant::MultiApp => "multi-app",
        }
    }
}

impl fmt::Display for ShellVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShellVariant {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShellVariant::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s.trim())
            .ok_or_else(|| GenerationError::UnknownVariant {
                kind: "shell".to_string(),
                variant: s.to_string(),
            })
    }
}

/// Category of generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Shell component, its config and barrel file
    Shell,
    /// Route registration for the host app's route table
    Route,
    /// Pages loaded by the shell routes
    Page,
    /// Entity list component
    ListComponent,
    /// Entity detail component
    DetailComponent,
    /// Entity types and HTTP service
    Service,
    /// Shell routes file
    RoutesFile,
}

impl ArtifactKind {
    /// Every artifact kind
    pub const ALL: [ArtifactKind; 7] = [
        ArtifactKind::Shell,
        ArtifactKind::Route,
        ArtifactKind::Page,
        ArtifactKind::ListComponent,
        ArtifactKind::DetailComponent,
        ArtifactKind::Service,
        ArtifactKind::RoutesFile,
    ];

    /// Tag used in schema files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Shell => "shell",
            ArtifactKind::Route => "route",
            ArtifactKind::Page => "page",
            ArtifactKind::ListComponent => "list-component",
            ArtifactKind::DetailComponent => "detail-component",
            ArtifactKind::Service => "service",
            ArtifactKind::RoutesFile => "routes-file",
        }
    }

    /// Kinds whose files this kind imports
    pub fn requires(&self) -> &'static [ArtifactKind] {
        match self {
            ArtifactKind::ListComponent | ArtifactKind::DetailComponent => {
                &[ArtifactKind::Service]
            }
            ArtifactKind::RoutesFile => &[ArtifactKind::Shell, ArtifactKind::Page],
            ArtifactKind::Route => &[ArtifactKind::RoutesFile],
            ArtifactKind::Shell | ArtifactKind::Page | ArtifactKind::Service => &[],
        }
    }

    /// Add every transitively required kind to `kinds`
    pub fn close_dependencies(kinds: &BTreeSet<ArtifactKind>) -> BTreeSet<ArtifactKind> {
        let mut closed = kinds.clone();
        let mut pending: Vec<ArtifactKind> = kinds.iter().copied().collect();
        while let Some(kind) = pending.pop() {
            for required in kind.requires() {
                if closed.insert(*required) {
                    pending.push(*required);
                }
            }
        }
        closed
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtifactKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| GenerationError::UnknownVariant {
                kind: s.to_string(),
                variant: "any".to_string(),
            })
    }
}

/// What to do when a planned output path already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Leave the existing file untouched
    #[default]
    SkipExisting,
    /// Replace the existing file
    Overwrite,
    /// Record the file as failed
    FailOnConflict,
}

impl ConflictPolicy {
    /// Tag used in configuration and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::SkipExisting => "skip-existing",
            ConflictPolicy::Overwrite => "overwrite",
            ConflictPolicy::FailOnConflict => "fail-on-conflict",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "skip-existing" | "skip" => Ok(ConflictPolicy::SkipExisting),
            "overwrite" | "force" => Ok(ConflictPolicy::Overwrite),
            "fail-on-conflict" | "fail" => Ok(ConflictPolicy::FailOnConflict),
            other => Err(format!("unknown conflict policy: {}", other)),
        }
    }
}

/// Type of an entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text
    String,
    /// Numeric value
    Number,
    /// True/false
    Boolean,
    /// Calendar date or timestamp
    Date,
    /// One of a fixed set of values
    Enum,
    /// Identifier of another entity
    Reference,
}

impl FieldType {
    /// TypeScript type emitted for this field
    pub fn ts_type(&self) -> &'static str {
        match self {
            FieldType::String | FieldType::Date | FieldType::Reference => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            // enum fields get a union type built from their values
            FieldType::Enum => "string",
        }
    }

    /// Form control used for this field in detail views
    pub fn input_type(&self) -> &'static str {
        match self {
            FieldType::String | FieldType::Reference => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "checkbox",
            FieldType::Date => "date",
            FieldType::Enum => "select",
        }
    }
}

/// A single field of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Field name as written by the schema author
    pub name: String,
    /// Field type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether a value is mandatory
    #[serde(default)]
    pub required: bool,
    /// Allowed values, required when `field_type` is `Enum`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    /// Referenced entity name, required when `field_type` is `Reference`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Display label, defaults to the title-cased field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldDescriptor {
    /// Create a field of the given type
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            enum_values: Vec::new(),
            reference: None,
            label: None,
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set enum values
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Set the referenced entity
    pub fn referencing(mut self, entity: impl Into<String>) -> Self {
        self.reference = Some(entity.into());
        self
    }
}

/// Cardinality of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    /// 1:1
    OneToOne,
    /// 1:N
    OneToMany,
    /// N:1
    ManyToOne,
    /// N:M
    ManyToMany,
}

impl RelationKind {
    /// Whether the relation yields a collection on this side
    pub fn is_collection(&self) -> bool {
        matches!(self, RelationKind::OneToMany | RelationKind::ManyToMany)
    }
}

/// Relation between the entity and another entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDescriptor {
    /// Relation name
    pub name: String,
    /// Target entity name
    pub target: String,
    /// Cardinality
    pub kind: RelationKind,
}

/// Optional templates toggled by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureFlag {
    /// Dashboard page
    Dashboard,
    /// Settings page and navigation entry
    Settings,
    /// Auth service wiring in the shell
    Auth,
    /// Theme switcher in the shell header
    ThemeSwitcher,
}

impl FeatureFlag {
    /// Tag used in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFlag::Dashboard => "dashboard",
            FeatureFlag::Settings => "settings",
            FeatureFlag::Auth => "auth",
            FeatureFlag::ThemeSwitcher => "theme-switcher",
        }
    }
}

impl fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Feature toggles applied to enterprise and multi-app shells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureFlags {
    /// Generate a dashboard page
    pub with_dashboard: bool,
    /// Generate a settings page
    pub with_settings: bool,
    /// Wire the auth service into the shell
    pub with_auth: bool,
    /// Show a theme switcher in the header
    pub with_theme_switcher: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            with_dashboard: true,
            with_settings: false,
            with_auth: true,
            with_theme_switcher: false,
        }
    }
}

impl FeatureFlags {
    /// Whether the given flag is on
    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        match flag {
            FeatureFlag::Dashboard => self.with_dashboard,
            FeatureFlag::Settings => self.with_settings,
            FeatureFlag::Auth => self.with_auth,
            FeatureFlag::ThemeSwitcher => self.with_theme_switcher,
        }
    }
}

/// Options controlling a single generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Shell layout
    pub variant: ShellVariant,
    /// Behaviour for existing files
    pub conflict_policy: ConflictPolicy,
    /// Artifact kinds to emit
    pub artifact_kinds: BTreeSet<ArtifactKind>,
    /// Optional templates
    pub features: FeatureFlags,
    /// Human-readable app name, defaults to the title-cased entity name
    pub display_name: Option<String>,
    /// App description, defaults to "<display name> management system"
    pub description: Option<String>,
    /// Layout theme preset
    pub theme: String,
    /// Position of the app in the multi-app launcher
    pub order: u32,
    /// Host application under `apps/`
    pub app: String,
    /// Compute actions without writing
    pub dry_run: bool,
    /// Irregular plurals, singular -> plural
    pub plural_overrides: BTreeMap<String, String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            variant: ShellVariant::default(),
            conflict_policy: ConflictPolicy::default(),
            artifact_kinds: ArtifactKind::ALL.into_iter().collect(),
            features: FeatureFlags::default(),
            display_name: None,
            description: None,
            theme: "default".to_string(),
            order: 0,
            app: "web".to_string(),
            dry_run: false,
            plural_overrides: BTreeMap::new(),
        }
    }
}

impl GenerationOptions {
    /// Options for the given variant with everything else defaulted
    pub fn for_variant(variant: ShellVariant) -> Self {
        Self {
            variant,
            ..Default::default()
        }
    }

    /// Restrict the run to the given artifact kinds
    pub fn with_artifacts<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = ArtifactKind>,
    {
        self.artifact_kinds = kinds.into_iter().collect();
        self
    }

    /// Set the conflict policy
    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }
}

/// Partial feature toggles; unset flags keep the value underneath
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureOverlay {
    /// Generate a dashboard page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_dashboard: Option<bool>,
    /// Generate a settings page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_settings: Option<bool>,
    /// Wire the auth service into the shell
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_auth: Option<bool>,
    /// Show a theme switcher in the header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_theme_switcher: Option<bool>,
}

impl FeatureOverlay {
    /// Replace the flags this overlay sets
    pub fn apply_to(&self, flags: &mut FeatureFlags) {
        if let Some(on) = self.with_dashboard {
            flags.with_dashboard = on;
        }
        if let Some(on) = self.with_settings {
            flags.with_settings = on;
        }
        if let Some(on) = self.with_auth {
            flags.with_auth = on;
        }
        if let Some(on) = self.with_theme_switcher {
            flags.with_theme_switcher = on;
        }
    }
}

/// Options declared inside a schema file
///
/// Only the keys present in the file are applied; everything else keeps the value
/// from the configuration layers underneath.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptionsOverlay {
    /// Shell layout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<ShellVariant>,
    /// Behaviour for existing files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_policy: Option<ConflictPolicy>,
    /// Artifact kinds to emit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_kinds: Option<BTreeSet<ArtifactKind>>,
    /// Optional templates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureOverlay>,
    /// Human-readable app name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// App description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Layout theme preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    /// Position of the app in the multi-app launcher
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    /// Host application under `apps/`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    /// Irregular plurals, merged over the ones underneath
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub plural_overrides: BTreeMap<String, String>,
}

impl OptionsOverlay {
    /// Apply the keys this overlay sets on top of `options`
    pub fn apply_to(&self, options: &mut GenerationOptions) {
        if let Some(variant) = self.variant {
            options.variant = variant;
        }
        if let Some(policy) = self.conflict_policy {
            options.conflict_policy = policy;
        }
        if let Some(kinds) = &self.artifact_kinds {
            options.artifact_kinds = kinds.clone();
        }
        if let Some(features) = &self.features {
            features.apply_to(&mut options.features);
        }
        if let Some(display_name) = &self.display_name {
            options.display_name = Some(display_name.clone());
        }
        if let Some(description) = &self.description {
            options.description = Some(description.clone());
        }
        if let Some(theme) = &self.theme {
            options.theme = theme.clone();
        }
        if let Some(order) = self.order {
            options.order = order;
        }
        if let Some(app) = &self.app {
            options.app = app.clone();
        }
        options.plural_overrides.extend(
            self.plural_overrides
                .iter()
                .map(|(singular, plural)| (singular.clone(), plural.clone())),
        );
    }
}

/// Declarative description of the entity to scaffold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Singular entity name in human form
    pub name: String,
    /// Ordered fields
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Relations to other entities
    #[serde(default)]
    pub relations: Vec<RelationDescriptor>,
    /// Options declared in the schema file itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<OptionsOverlay>,
}

impl EntitySchema {
    /// Create a schema with no fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            relations: Vec::new(),
            options: None,
        }
    }

    /// Append a field
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Append a relation
    pub fn with_relation(mut self, relation: RelationDescriptor) -> Self {
        self.relations.push(relation);
        self
    }
}

/// Every casing of an entity name used by templates
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameVariants {
    /// drug-unit
    pub kebab: String,
    /// DrugUnit
    pub pascal: String,
    /// drugUnit
    pub camel: String,
    /// drug_unit
    pub snake: String,
    /// DRUG_UNIT
    pub screaming_snake: String,
    /// Drug Unit
    pub title: String,
    /// drug-units
    pub plural_kebab: String,
    /// DrugUnits
    pub plural_pascal: String,
    /// drugUnits
    pub plural_camel: String,
    /// drug_units
    pub plural_snake: String,
}

/// Action taken for a planned file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileAction {
    /// File did not exist and was written
    Created,
    /// File existed and was left untouched
    SkippedExists,
    /// File existed and was replaced
    Overwritten,
    /// File could not be written
    Failed,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileAction::Created => "created",
            FileAction::SkippedExists => "skipped-exists",
            FileAction::Overwritten => "overwritten",
            FileAction::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Outcome for one planned file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Target path relative to the output root
    pub path: PathBuf,
    /// Action taken
    pub action: FileAction,
    /// Why the file was skipped or failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GenerationResult {
    /// Result without a reason
    pub fn new(path: impl Into<PathBuf>, action: FileAction) -> Self {
        Self {
            path: path.into(),
            action,
            reason: None,
        }
    }

    /// Result with a reason
    pub fn with_reason(
        path: impl Into<PathBuf>,
        action: FileAction,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            action,
            reason: Some(reason.into()),
        }
    }
}

/// Lifecycle of one generation invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationPhase {
    /// Checking the schema
    Validating,
    /// Computing name variants
    Resolving,
    /// Selecting, binding and rendering templates
    Planning,
    /// Issuing file writes
    Writing,
    /// Run finished, possibly with per-file failures
    Completed,
    /// Schema rejected, nothing written
    Rejected,
}

impl GenerationPhase {
    /// Whether `next` is a legal successor of this phase
    pub fn can_advance_to(&self, next: GenerationPhase) -> bool {
        use GenerationPhase::*;
        matches!(
            (self, next),
            (Validating, Resolving)
                | (Validating, Rejected)
                | (Resolving, Planning)
                | (Planning, Writing)
                | (Writing, Completed)
        )
    }

    /// Whether the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationPhase::Completed | GenerationPhase::Rejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_round_trips_through_tag() {
        for variant in ShellVariant::ALL {
            assert_eq!(variant.as_str().parse::<ShellVariant>().unwrap(), variant);
        }
    }

    #[test]
    fn test_unknown_variant_is_rejected() {
        let err = "sidebar".parse::<ShellVariant>().unwrap_err();
        assert!(matches!(err, GenerationError::UnknownVariant { .. }));
    }

    #[test]
    fn test_policy_aliases() {
        assert_eq!("force".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::Overwrite);
        assert_eq!("skip".parse::<ConflictPolicy>().unwrap(), ConflictPolicy::SkipExisting);
        assert!("merge".parse::<ConflictPolicy>().is_err());
    }

    #[test]
    fn test_default_options_request_every_artifact() {
        let options = GenerationOptions::default();
        assert_eq!(options.artifact_kinds.len(), ArtifactKind::ALL.len());
        assert_eq!(options.conflict_policy, ConflictPolicy::SkipExisting);
        assert!(options.features.with_dashboard);
        assert!(!options.features.with_settings);
    }

    #[test]
    fn test_schema_deserializes_from_yaml() {
        let yaml = r#"
name: drug unit
fields:
  - name: code
    type: string
    required: true
  - name: status
    type: enum
    enumValues: [active, retired]
  - name: warehouse
    type: reference
    reference: warehouse
relations:
  - name: batches
    target: batch
    kind: one-to-many
options:
  variant: multi-app
  conflictPolicy: overwrite
  artifactKinds: [shell, routes-file]
"#;
        let schema: EntitySchema = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(schema.fields.len(), 3);
        assert_eq!(schema.fields[1].enum_values, vec!["active", "retired"]);
        assert_eq!(schema.relations[0].kind, RelationKind::OneToMany);
        let overlay = schema.options.unwrap();
        assert_eq!(overlay.theme, None);

        let mut options = GenerationOptions {
            theme: "ocean".into(),
            app: "admin".into(),
            ..Default::default()
        };
        overlay.apply_to(&mut options);
        assert_eq!(options.variant, ShellVariant::MultiApp);
        assert_eq!(options.conflict_policy, ConflictPolicy::Overwrite);
        assert_eq!(options.artifact_kinds.len(), 2);
        assert_eq!(options.theme, "ocean");
        assert_eq!(options.app, "admin");
    }

    #[test]
    fn test_feature_overlay_only_touches_set_flags() {
        let overlay: OptionsOverlay =
            serde_json::from_str(r#"{"features": {"withSettings": true}}"#).unwrap();
        let mut options = GenerationOptions::default();
        options.features.with_dashboard = false;
        overlay.apply_to(&mut options);

        assert!(options.features.with_settings);
        assert!(!options.features.with_dashboard);
        assert!(options.features.with_auth);
    }

    #[test]
    fn test_route_pulls_in_routes_file_shell_and_pages() {
        let requested: BTreeSet<_> = [ArtifactKind::Route].into_iter().collect();
        let closed = ArtifactKind::close_dependencies(&requested);
        let expected: BTreeSet<_> = [
            ArtifactKind::Route,
            ArtifactKind::RoutesFile,
            ArtifactKind::Shell,
            ArtifactKind::Page,
        ]
        .into_iter()
        .collect();
        assert_eq!(closed, expected);
    }

    #[test]
    fn test_components_pull_in_service() {
        let requested: BTreeSet<_> = [ArtifactKind::ListComponent].into_iter().collect();
        let closed = ArtifactKind::close_dependencies(&requested);
        assert!(closed.contains(&ArtifactKind::Service));
        assert_eq!(closed.len(), 2);
    }

    #[test]
    fn test_phase_transitions() {
        assert!(GenerationPhase::Validating.can_advance_to(GenerationPhase::Rejected));
        assert!(GenerationPhase::Writing.can_advance_to(GenerationPhase::Completed));
        assert!(!GenerationPhase::Writing.can_advance_to(GenerationPhase::Planning));
        assert!(!GenerationPhase::Planning.can_advance_to(GenerationPhase::Rejected));
        assert!(GenerationPhase::Rejected.is_terminal());
    }
}
