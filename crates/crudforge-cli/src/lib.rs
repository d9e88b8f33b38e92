// crudforge CLI library

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod router;

pub use config::{ConfigLoader, EnvOverrides, ProjectConfig};
pub use error::{CliError, CliResult};
pub use logging::{init_logging, VerbosityLevel};
pub use router::{Cli, CommandRouter, Commands};
