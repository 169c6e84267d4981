mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use waymark::CONFIG_FILE;
use waymark_router::RouteFolder;
use waymark_stack::HttpMethod;

#[derive(Parser)]
#[command(name = "waymark")]
#[command(version, about = "Waymark CLI - file-based routes and middleware stacks", long_about = None)]
struct Cli {
    /// Project root
    #[arg(short, long, global = true, default_value = ".")]
    root: PathBuf,

    /// Config file, relative to the project root
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List discovered routes, most specific first
    Routes {
        /// Route folder to list
        #[arg(short, long, default_value = "api")]
        folder: Folder,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the nested page tree
    Tree,

    /// Print or write the route manifest
    Manifest {
        /// Output file (prints to stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show the core middleware stack of every API route
    Stack {
        /// Only show the chain for this method
        #[arg(short, long)]
        method: Option<HttpMethod>,
    },

    /// Match a request path against the discovered routes
    Match {
        /// Request path, e.g. /users/42
        path: String,

        /// Route folder to match against
        #[arg(short, long, default_value = "api")]
        folder: Folder,
    },

    /// Watch route folders and report route changes
    Watch,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Folder {
    Api,
    Pages,
}

impl From<Folder> for RouteFolder {
    fn from(folder: Folder) -> Self {
        match folder {
            Folder::Api => RouteFolder::Api,
            Folder::Pages => RouteFolder::Pages,
        }
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let registry = commands::load_registry(&cli.root, &cli.config)?;

    // Execute command
    match cli.command {
        Commands::Routes { folder, json } => {
            commands::routes::execute(&registry, folder.into(), json)?;
        }
        Commands::Tree => {
            commands::tree::execute(&registry)?;
        }
        Commands::Manifest { out } => {
            commands::manifest::execute(&registry, out.as_deref())?;
        }
        Commands::Stack { method } => {
            commands::stack::execute(&registry, method)?;
        }
        Commands::Match { path, folder } => {
            commands::matching::execute(&registry, folder.into(), &path)?;
        }
        Commands::Watch => {
            commands::watch::execute(registry)?;
        }
    }

    Ok(())
}
