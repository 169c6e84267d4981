pub mod manifest;
pub mod matching;
pub mod routes;
pub mod stack;
pub mod tree;
pub mod watch;

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use waymark::{Config, RouteRegistry};

/// Loads the config and runs the initial scan of the project at `root`
pub fn load_registry(root: &Path, config_path: &Path) -> Result<RouteRegistry> {
    let config = Config::load(root.join(config_path))?;
    let registry = RouteRegistry::load(root, config)?;
    report_errors(&registry);
    Ok(registry)
}

/// Prints route files that failed to resolve
pub fn report_errors(registry: &RouteRegistry) {
    for error in registry.errors() {
        eprintln!("{} {}", "⚠".yellow(), error);
    }
}
