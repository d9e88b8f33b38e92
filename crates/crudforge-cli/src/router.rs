// Command routing and dispatch

use clap::{Parser, Subcommand};
use crudforge_generation::ShellVariant;

use crate::commands::*;
use crate::error::CliResult;

/// crudforge - scaffold Angular shells and CRUD features from entity schemas
#[derive(Parser, Debug)]
#[command(name = "crudforge")]
#[command(bin_name = "crudforge")]
#[command(about = "Scaffold Angular shells and CRUD features from entity schemas")]
#[command(
    long_about = "crudforge renders a fixed template catalog into an Nx workspace.\n\nEach entity schema produces a typed service, list and detail components, a shell in one of three layouts and the routing that wires them together. Existing files are skipped unless a different conflict policy is chosen.\n\nExamples:\n  crudforge generate schemas/drug-unit.yaml\n  crudforge generate schemas/*.yaml --variant multi-app --app admin\n  crudforge generate schema.json --dry-run --json\n  crudforge names drug-unit"
)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log detail (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Errors and summaries only
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate scaffolding from entity schemas
    #[command(visible_alias = "gen")]
    Generate(GenerateArgs),

    /// List the template catalog
    Templates {
        /// Only templates supporting this variant
        #[arg(long)]
        variant: Option<ShellVariant>,
    },

    /// Show the name variants derived from an entity name
    Names {
        /// Entity name in kebab, snake, camel or Pascal case
        #[arg(value_name = "NAME")]
        name: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Route and execute commands
pub struct CommandRouter;

impl CommandRouter {
    /// Parse CLI arguments and route to appropriate handler
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();

        crate::logging::init_logging(cli.verbose, cli.quiet);

        Self::execute(&cli).await
    }

    /// Execute a parsed command line
    pub async fn execute(cli: &Cli) -> CliResult<()> {
        match &cli.command {
            Commands::Generate(args) => GenerateCommand::new(args.clone()).execute().await,
            Commands::Templates { variant } => TemplatesCommand::new(*variant).execute().await,
            Commands::Names { name, json } => NamesCommand::new(name.clone(), *json).execute().await,
        }
    }
}
