//! Template errors

use thiserror::Error;

/// Errors raised while parsing or rendering a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Malformed template syntax
    #[error("Invalid template syntax at line {line}: {message}")]
    InvalidSyntax {
        /// Line number where the problem was found
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// Placeholders that had no value in the context, sorted and deduplicated
    #[error("Missing binding(s): {}", .0.join(", "))]
    MissingBinding(Vec<String>),

    /// Placeholder resolved to a list or object
    #[error("Binding '{0}' is not a scalar value")]
    NotScalar(String),

    /// Loop variable resolved to something other than a list
    #[error("Binding '{0}' is not a list")]
    NotAList(String),
}
