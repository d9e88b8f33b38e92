// Command handlers for the crudforge CLI

pub mod generate;
pub mod names;
pub mod templates;

pub use generate::{GenerateArgs, GenerateCommand};
pub use names::NamesCommand;
pub use templates::TemplatesCommand;

use crate::error::CliResult;

/// Trait for command handlers
#[async_trait::async_trait]
pub trait Command: Send + Sync {
    /// Execute the command
    async fn execute(&self) -> CliResult<()>;
}
