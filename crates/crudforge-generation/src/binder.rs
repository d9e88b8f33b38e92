//! Variable binding
//!
//! Turns a validated schema, its resolved names and the run options into the flat
//! [`GenerationContext`] templates render against. Loop items (fields, relations, enum
//! values) use their own key names so they never shadow the entity-level bindings.

use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase, ToSnakeCase, ToTitleCase};
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    error::GenerationError,
    models::{
        ArtifactKind, EntitySchema, FieldDescriptor, FieldType, GenerationOptions, NameVariants,
        RelationDescriptor, ShellVariant,
    },
    naming::NameResolver,
    templates::{GenerationContext, TemplateDescriptor},
};

/// Builds template contexts
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableBinder;

impl VariableBinder {
    /// Create a binder
    pub fn new() -> Self {
        Self
    }

    /// Build the entity-level context shared by every template of one run
    pub fn bind(
        &self,
        schema: &EntitySchema,
        names: &NameVariants,
        variant: ShellVariant,
        options: &GenerationOptions,
    ) -> Result<GenerationContext, GenerationError> {
        let resolver = NameResolver::with_overrides(&options.plural_overrides);
        self.validate_references(schema, &resolver)?;

        let mut ctx = GenerationContext::new();
        ctx.extend_from(names)
            .map_err(|e| GenerationError::SchemaValidation(e.to_string()))?;

        let display_name = options
            .display_name
            .clone()
            .unwrap_or_else(|| names.title.clone());
        let description = options
            .description
            .clone()
            .unwrap_or_else(|| format!("{} management system", display_name));

        ctx.insert("entityName", schema.name.trim());
        ctx.insert("displayName", display_name);
        ctx.insert("description", description);
        ctx.insert("theme", options.theme.as_str());
        ctx.insert("order", options.order);
        ctx.insert("app", options.app.as_str());

        ctx.insert("variant", variant.as_str());
        ctx.insert("isSimple", variant == ShellVariant::Simple);
        ctx.insert("isEnterprise", variant == ShellVariant::Enterprise);
        ctx.insert("isMultiApp", variant == ShellVariant::MultiApp);

        let features = &options.features;
        ctx.insert("withDashboard", features.with_dashboard);
        ctx.insert("withSettings", features.with_settings);
        ctx.insert("withAuth", features.with_auth);
        ctx.insert("withThemeSwitcher", features.with_theme_switcher);

        let kinds = ArtifactKind::close_dependencies(&options.artifact_kinds);
        let has = |kind: ArtifactKind| kinds.contains(&kind);
        ctx.insert("hasShell", has(ArtifactKind::Shell));
        ctx.insert("hasRoute", has(ArtifactKind::Route));
        ctx.insert("hasPages", has(ArtifactKind::Page));
        ctx.insert("hasListComponent", has(ArtifactKind::ListComponent));
        ctx.insert("hasDetailComponent", has(ArtifactKind::DetailComponent));
        ctx.insert("hasService", has(ArtifactKind::Service));
        ctx.insert("hasRoutesFile", has(ArtifactKind::RoutesFile));

        let fields: Vec<Value> = schema
            .fields
            .iter()
            .map(|field| field_item(field, &resolver))
            .collect::<Result<_, _>>()?;
        ctx.insert("hasFields", !fields.is_empty());
        ctx.insert("fields", fields);

        let relations: Vec<Value> = schema
            .relations
            .iter()
            .map(|relation| relation_item(relation, &resolver))
            .collect::<Result<_, _>>()?;
        ctx.insert("hasRelations", !relations.is_empty());
        ctx.insert("relations", relations);

        debug!(entity = %names.kebab, keys = ctx.keys().len(), "Bound generation context");
        Ok(ctx)
    }

    /// Copy of `base` with the per-template bindings added
    pub fn for_template(
        &self,
        base: &GenerationContext,
        template: &TemplateDescriptor,
    ) -> GenerationContext {
        let mut ctx = base.clone();
        ctx.insert("templateId", template.id);
        ctx.insert("artifactKind", template.artifact_kind.as_str());
        ctx
    }

    /// Check that every reference field and relation target names a resolvable entity
    pub fn validate_references(
        &self,
        schema: &EntitySchema,
        resolver: &NameResolver,
    ) -> Result<(), GenerationError> {
        for field in &schema.fields {
            if field.field_type != FieldType::Reference {
                continue;
            }
            let target = field.reference.as_deref().ok_or_else(|| {
                GenerationError::SchemaValidation(format!(
                    "Reference field '{}' does not name a target entity",
                    field.name
                ))
            })?;
            resolver.resolve(target).map_err(|e| {
                GenerationError::SchemaValidation(format!(
                    "Reference field '{}' points at an invalid entity name: {}",
                    field.name, e
                ))
            })?;
        }

        for relation in &schema.relations {
            resolver.resolve(&relation.target).map_err(|e| {
                GenerationError::SchemaValidation(format!(
                    "Relation '{}' points at an invalid entity name: {}",
                    relation.name, e
                ))
            })?;
        }

        Ok(())
    }
}

fn field_item(field: &FieldDescriptor, resolver: &NameResolver) -> Result<Value, GenerationError> {
    let name = field.name.trim();
    let label = field
        .label
        .clone()
        .unwrap_or_else(|| name.to_title_case());

    let enum_union = field
        .enum_values
        .iter()
        .map(|value| format!("'{}'", value))
        .collect::<Vec<_>>()
        .join(" | ");
    let enum_values: Vec<Value> = field
        .enum_values
        .iter()
        .map(|value| json!({ "value": value, "label": value.to_title_case() }))
        .collect();

    let mut item = json!({
        "name": name.to_lower_camel_case(),
        "pascalName": name.to_pascal_case(),
        "kebabName": name.to_kebab_case(),
        "snakeName": name.to_snake_case(),
        "label": label,
        "tsType": field.field_type.ts_type(),
        "inputType": field.field_type.input_type(),
        "required": field.required,
        "isString": field.field_type == FieldType::String,
        "isNumber": field.field_type == FieldType::Number,
        "isBoolean": field.field_type == FieldType::Boolean,
        "isDate": field.field_type == FieldType::Date,
        "isEnum": field.field_type == FieldType::Enum,
        "isReference": field.field_type == FieldType::Reference,
        "enumUnion": enum_union,
        "enumValues": enum_values,
    });

    if let (Some(target), Value::Object(map)) = (field.reference.as_deref(), &mut item) {
        let target = resolver.resolve(target)?;
        map.insert("referencePascal".to_string(), Value::from(target.pascal));
        map.insert("referenceKebab".to_string(), Value::from(target.kebab));
        map.insert("referenceCamel".to_string(), Value::from(target.camel));
    }

    Ok(item)
}

fn relation_item(
    relation: &RelationDescriptor,
    resolver: &NameResolver,
) -> Result<Value, GenerationError> {
    let target = resolver.resolve(&relation.target)?;
    let name = relation.name.trim();

    Ok(json!({
        "name": name.to_lower_camel_case(),
        "pascalName": name.to_pascal_case(),
        "kind": relation.kind,
        "isCollection": relation.kind.is_collection(),
        "targetPascal": target.pascal,
        "targetKebab": target.kebab,
        "targetCamel": target.camel,
        "targetPluralKebab": target.plural_kebab,
    }))
}
