//! Entity schema loading and structural validation

use std::{collections::BTreeSet, fs, path::Path};

use heck::ToLowerCamelCase;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::GenerationError,
    models::{EntitySchema, FieldType, GenerationOptions},
    naming::NameResolver,
};

/// Values used as a single path segment or identifier-like literal
static SEGMENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("segment pattern is a valid regex")
});

/// Characters that would break out of a quoted TypeScript string literal
const LITERAL_BREAKERS: [char; 5] = ['\'', '\\', '`', '\n', '\r'];

/// Reads entity schemas from YAML or JSON files
pub struct SchemaLoader;

impl SchemaLoader {
    /// Load a schema, picking the format from the file extension
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<EntitySchema, GenerationError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| GenerationError::SchemaLoad {
            path: path.to_path_buf(),
            message: format!("Failed to read schema file: {}", e),
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let parsed = match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            "json" => serde_json::from_str(&content).map_err(|e| e.to_string()),
            _ => Err("Unsupported file format. Use .yaml, .yml, or .json".to_string()),
        };

        parsed.map_err(|message| GenerationError::SchemaLoad {
            path: path.to_path_buf(),
            message,
        })
    }
}

/// Structural checks run before any name resolution or I/O
pub struct SchemaValidator;

impl SchemaValidator {
    /// Validate entity name, fields and relations
    ///
    /// Field names are compared after camel-case normalization, so `unit_code` and
    /// `unitCode` count as duplicates.
    pub fn validate(schema: &EntitySchema) -> Result<(), GenerationError> {
        NameResolver::validate(&schema.name)?;

        let mut seen = BTreeSet::new();
        for field in &schema.fields {
            NameResolver::validate(&field.name).map_err(|e| {
                GenerationError::SchemaValidation(format!("Field name rejected: {}", e))
            })?;

            if let Some(label) = &field.label {
                check_literal(&format!("Label of field '{}'", field.name), label)?;
            }

            if !seen.insert(field.name.trim().to_lower_camel_case()) {
                return Err(GenerationError::SchemaValidation(format!(
                    "Duplicate field name '{}'",
                    field.name
                )));
            }

            match field.field_type {
                FieldType::Enum => {
                    if field.enum_values.is_empty() {
                        return Err(GenerationError::SchemaValidation(format!(
                            "Enum field '{}' must list at least one value",
                            field.name
                        )));
                    }
                    for value in &field.enum_values {
                        check_literal(&format!("Enum value of field '{}'", field.name), value)?;
                    }
                    let distinct: BTreeSet<_> = field.enum_values.iter().collect();
                    if distinct.len() != field.enum_values.len() {
                        return Err(GenerationError::SchemaValidation(format!(
                            "Enum field '{}' has duplicate values",
                            field.name
                        )));
                    }
                }
                FieldType::Reference if field.reference.is_none() => {
                    return Err(GenerationError::SchemaValidation(format!(
                        "Reference field '{}' does not name a target entity",
                        field.name
                    )));
                }
                _ => {}
            }
        }

        let mut relation_names = BTreeSet::new();
        for relation in &schema.relations {
            if !relation_names.insert(relation.name.trim().to_lower_camel_case()) {
                return Err(GenerationError::SchemaValidation(format!(
                    "Duplicate relation name '{}'",
                    relation.name
                )));
            }
        }

        Ok(())
    }

    /// Validate run options that end up in target paths or quoted literals
    ///
    /// `app` and `theme` must be single segments, so no rendered path can leave the
    /// output root through them.
    pub fn validate_options(options: &GenerationOptions) -> Result<(), GenerationError> {
        for (key, value) in [("app", &options.app), ("theme", &options.theme)] {
            if !SEGMENT_PATTERN.is_match(value) {
                return Err(GenerationError::SchemaValidation(format!(
                    "Option '{}' must be a single name of letters, digits, '_' or '-', got '{}'",
                    key, value
                )));
            }
        }
        if let Some(display_name) = &options.display_name {
            check_literal("Option 'displayName'", display_name)?;
        }
        if let Some(description) = &options.description {
            check_literal("Option 'description'", description)?;
        }
        Ok(())
    }
}

fn check_literal(what: &str, value: &str) -> Result<(), GenerationError> {
    if value.contains(LITERAL_BREAKERS) {
        return Err(GenerationError::SchemaValidation(format!(
            "{} '{}' may not contain quotes, backslashes, backticks or line breaks",
            what,
            value.escape_default()
        )));
    }
    Ok(())
}
