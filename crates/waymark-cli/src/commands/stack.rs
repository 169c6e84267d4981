use anyhow::Result;
use colored::Colorize;
use waymark::{core_stack, RouteRegistry};
use waymark_router::RouteFolder;
use waymark_stack::{chain_for, HttpMethod, StackEntryKind};

pub fn execute(registry: &RouteRegistry, method: Option<HttpMethod>) -> Result<()> {
    let api = registry.entries(RouteFolder::Api);
    if api.is_empty() {
        println!("{}", "No api routes found".yellow());
        return Ok(());
    }

    let stack = core_stack(registry.config(), &api)?;

    for entry in &api {
        println!("{} {}", entry.path_pattern.cyan().bold(), entry.name.dimmed());

        if let Some(method) = method {
            let chain = chain_for(&stack, &entry.name, method);
            println!("  {} {}", method.as_str().green(), chain.join(" → "));
            continue;
        }

        for item in stack.iter().filter(|item| item.name == entry.name) {
            let label = match (&item.kind, &item.slot) {
                (StackEntryKind::Handler, _) => "handler".to_string(),
                (StackEntryKind::Middleware, Some(slot)) => slot.clone(),
                (StackEntryKind::Middleware, None) => "middleware".to_string(),
            };
            let methods: Vec<&str> = item.methods.iter().map(HttpMethod::as_str).collect();
            println!(
                "  {} {} {}",
                format!("{:16}", label).magenta(),
                item.middleware.join(", "),
                format!("[{}]", methods.join(" ")).dimmed()
            );
        }
    }

    Ok(())
}
