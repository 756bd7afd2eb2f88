mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rhtmx_pathfinder::config::{RouteTableConfig, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pathfinder")]
#[command(version, about = "Pathfinder CLI - inspect route tables, match paths and build URLs", long_about = None)]
struct Cli {
    /// Route table to load
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered routes in matching order
    Routes,

    /// Match a path against the route table
    Match {
        /// Request path, e.g. /users/42
        path: String,

        /// Announce a field value (repeatable), e.g. --field role=admin
        #[arg(short, long = "field", value_parser = commands::parse_key_value)]
        fields: Vec<(String, String)>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a path from a route name and its variables
    Build {
        /// Route name
        name: String,

        /// Variables, e.g. id=42
        #[arg(value_parser = commands::parse_key_value)]
        vars: Vec<(String, String)>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let router = RouteTableConfig::load(&cli.config)?.build_router()?;
    debug!(config = ?cli.config, routes = router.len(), fields = ?router.field_names(), "route table loaded");

    let mut stdout = std::io::stdout().lock();

    // Execute command
    match cli.command {
        Commands::Routes => {
            commands::routes::execute(&router);
        }
        Commands::Match { path, fields, json } => {
            commands::dispatch::execute(&mut stdout, &router, &path, fields, json)?;
        }
        Commands::Build { name, vars } => {
            commands::build::execute(&mut stdout, &router, &name, &vars)?;
        }
    }

    Ok(())
}
