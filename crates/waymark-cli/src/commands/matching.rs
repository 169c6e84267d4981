use anyhow::Result;
use colored::Colorize;
use waymark::RouteRegistry;
use waymark_router::{RouteFolder, Router};

pub fn execute(registry: &RouteRegistry, folder: RouteFolder, path: &str) -> Result<()> {
    let router = Router::with_case_insensitive(registry.config().routing.case_insensitive)
        .with_routes(registry.entries(folder))?;

    let Some(route_match) = router.match_route(path) else {
        println!("{} No {} route matches {}", "✗".red(), folder, path);
        return Ok(());
    };

    let entry = route_match.entry;
    println!("{} {} {}", "✓".green(), entry.path_pattern.cyan(), entry.name.dimmed());
    println!("  file: {}", entry.file);
    for (name, value) in &route_match.params {
        println!("  {} = {}", name.bold(), value);
    }

    let layouts = router.layouts_for(entry);
    if !layouts.is_empty() {
        let names: Vec<&str> = layouts.iter().map(|layout| layout.name.as_str()).collect();
        println!("  layouts: {}", names.join(" → "));
    }

    Ok(())
}
