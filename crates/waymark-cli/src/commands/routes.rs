use anyhow::{Context, Result};
use colored::Colorize;
use waymark::RouteRegistry;
use waymark_router::{RouteEntry, RouteFolder};

pub fn execute(registry: &RouteRegistry, folder: RouteFolder, json: bool) -> Result<()> {
    let entries = registry.entries(folder);

    if json {
        let out = serde_json::to_string_pretty(&entries).context("Failed to serialize routes")?;
        println!("{}", out);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", format!("No {} routes found", folder).yellow());
        return Ok(());
    }

    println!("{}", format!("{} routes ({})", folder, entries.len()).green().bold());
    println!();

    let width = entries.iter().map(|e| e.path_pattern.len()).max().unwrap_or(0);
    for entry in &entries {
        println!(
            "  {}  {}  {}",
            format!("{:width$}", entry.path_pattern).cyan(),
            entry.name,
            describe(entry).dimmed(),
        );
    }

    Ok(())
}

fn describe(entry: &RouteEntry) -> String {
    let params: Vec<String> = entry
        .params
        .iter()
        .map(|p| match (p.is_rest, p.is_optional) {
            (true, true) => format!("...{}?", p.name),
            (true, false) => format!("...{}", p.name),
            (false, true) => format!("{}?", p.name),
            (false, false) => p.name.clone(),
        })
        .collect();

    if params.is_empty() {
        entry.file.clone()
    } else {
        format!("{} [{}]", entry.file, params.join(", "))
    }
}
