use anyhow::Result;
use colored::Colorize;
use waymark::RouteRegistry;
use waymark_router::NestedRouteEntry;

pub fn execute(registry: &RouteRegistry) -> Result<()> {
    let tree = registry.page_tree();

    if tree.is_empty() {
        println!("{}", "No pages found".yellow());
        return Ok(());
    }

    println!("{}", "Page tree".green().bold());
    println!();
    for node in &tree {
        print_node(node, 0);
    }

    Ok(())
}

fn print_node(node: &NestedRouteEntry, depth: usize) {
    let indent = "  ".repeat(depth + 1);
    let segment = if node.segment.is_empty() {
        "/".to_string()
    } else {
        format!("{}/", node.segment)
    };

    let mut marks = Vec::new();
    if let Some(index) = &node.index {
        marks.push(index.path_pattern.cyan().to_string());
    }
    if node.layout.is_some() {
        marks.push("layout".magenta().to_string());
    }

    println!("{}{} {}", indent, segment.bold(), marks.join(" "));
    for child in &node.children {
        print_node(child, depth + 1);
    }
}
