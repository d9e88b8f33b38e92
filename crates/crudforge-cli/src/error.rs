// CLI error types

use crudforge_generation::GenerationError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("{failed_runs} of {total_runs} generation run(s) did not complete cleanly")]
    RunsFailed {
        failed_runs: usize,
        total_runs: usize,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Get a user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            CliError::Io(e) => format!("File operation failed: {}", e),
            CliError::Config(msg) => {
                format!(
                    "Configuration error: {}\n\nCheck crudforge.toml and CRUDFORGE_* environment variables.",
                    msg
                )
            }
            CliError::Generation(e @ GenerationError::MissingBinding { .. })
            | CliError::Generation(e @ GenerationError::TemplateSyntax { .. }) => {
                format!("Template rendering failed: {}\n\nPlease report this issue.", e)
            }
            CliError::Generation(e) => format!("Generation failed: {}", e),
            CliError::RunsFailed {
                failed_runs,
                total_runs,
            } => {
                format!(
                    "{} of {} schema(s) were rejected or had files that could not be written.\n\nSee the report above for details.",
                    failed_runs, total_runs
                )
            }
            CliError::Internal(msg) => {
                format!("Internal error: {}\n\nPlease report this issue.", msg)
            }
        }
    }

    /// Get technical details for verbose mode
    pub fn technical_details(&self) -> String {
        format!("{:?}", self)
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_failed_message() {
        let err = CliError::RunsFailed {
            failed_runs: 1,
            total_runs: 3,
        };
        assert_eq!(
            err.to_string(),
            "1 of 3 generation run(s) did not complete cleanly"
        );
        assert!(err.user_message().contains("1 of 3 schema(s)"));
    }

    #[test]
    fn test_missing_binding_is_reported_as_template_problem() {
        let err: CliError = GenerationError::MissingBinding {
            names: vec!["pluralKebab".to_string()],
        }
        .into();
        assert!(err.user_message().starts_with("Template rendering failed"));
        assert!(err.user_message().contains("pluralKebab"));
    }
}
