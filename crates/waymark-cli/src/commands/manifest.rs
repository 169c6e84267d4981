use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use waymark::{Manifest, RouteRegistry};

pub fn execute(registry: &RouteRegistry, out: Option<&Path>) -> Result<()> {
    let manifest = Manifest::from_registry(registry)?;

    match out {
        Some(path) => {
            manifest.write(path)?;
            println!(
                "{} Wrote {} api routes to {}",
                "✓".green(),
                manifest.api.len(),
                path.display()
            );
        }
        None => println!("{}", manifest.to_json()?),
    }

    Ok(())
}
