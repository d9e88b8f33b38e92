//! Error types for code generation

use std::path::PathBuf;

use thiserror::Error;

use crate::templates::TemplateError;

/// Errors that can occur during code generation
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Entity or reference name is empty or contains unsupported characters
    #[error("Invalid name '{name}': {reason}")]
    InvalidName {
        /// The offending input
        name: String,
        /// Why the name was rejected
        reason: String,
    },

    /// No template exists for the requested artifact kind and shell variant
    #[error("No '{kind}' template for shell variant '{variant}'")]
    UnknownVariant {
        /// Requested artifact kind
        kind: String,
        /// Requested shell variant
        variant: String,
    },

    /// Entity schema failed validation
    #[error("Schema validation failed: {0}")]
    SchemaValidation(String),

    /// Template referenced bindings the context does not provide
    #[error("Missing binding(s): {}", names.join(", "))]
    MissingBinding {
        /// Unresolved placeholder names, sorted
        names: Vec<String>,
    },

    /// Malformed template in the catalog
    #[error("Template '{template}' is malformed: {source}")]
    TemplateSyntax {
        /// Template identifier
        template: String,
        /// Underlying parse error
        #[source]
        source: TemplateError,
    },

    /// Two planned files share a target path, or an existing file blocks a write
    #[error("Conflict at {}: {message}", path.display())]
    Conflict {
        /// Conflicting path
        path: PathBuf,
        /// Conflict details
        message: String,
    },

    /// A rendered target path would land outside the output root
    #[error("Target path {} escapes the output root", path.display())]
    PathOutsideRoot {
        /// Offending rendered path
        path: PathBuf,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Schema file could not be parsed
    #[error("Failed to load schema from {}: {message}", path.display())]
    SchemaLoad {
        /// Schema file path
        path: PathBuf,
        /// Parser message
        message: String,
    },
}

impl GenerationError {
    /// Structural errors come from caller input and are never retried
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            GenerationError::InvalidName { .. }
                | GenerationError::UnknownVariant { .. }
                | GenerationError::SchemaValidation(_)
                | GenerationError::MissingBinding { .. }
                | GenerationError::TemplateSyntax { .. }
                | GenerationError::PathOutsideRoot { .. }
        )
    }
}

impl From<TemplateError> for GenerationError {
    fn from(err: TemplateError) -> Self {
        match err {
            TemplateError::MissingBinding(names) => GenerationError::MissingBinding { names },
            other => GenerationError::TemplateSyntax {
                template: "<inline>".to_string(),
                source: other,
            },
        }
    }
}
