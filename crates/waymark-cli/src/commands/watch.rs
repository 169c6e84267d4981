use anyhow::{Context, Result};
use colored::Colorize;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Component, Path, PathBuf};
use std::sync::mpsc;
use tracing::{debug, warn};
use waymark::{RegistryDiff, RouteRegistry};
use waymark_router::RouteFolder;

/// What a file system event means for the registry
#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    /// Files appeared or disappeared: the route set may change
    Structural,
    /// A file was edited in place
    Content(PathBuf),
}

pub fn execute(mut registry: RouteRegistry) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Change>();
    let root = registry.root().to_path_buf();

    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
        match res {
            Ok(event) => {
                for change in classify(&event, &root) {
                    let _ = tx.send(change);
                }
            }
            Err(e) => warn!(error = %e, "watch error"),
        }
    })?;

    let mut watching = 0;
    for folder in [RouteFolder::Api, RouteFolder::Pages] {
        let ctx = registry.config().resolve_context(registry.root(), folder);
        let path = ctx.folder_root();
        if path.exists() {
            watcher
                .watch(&path, RecursiveMode::Recursive)
                .with_context(|| format!("Failed to watch {:?}", path))?;
            println!("  {} Watching: {}", "👀".cyan(), path.display());
            watching += 1;
        }
    }

    if watching == 0 {
        println!("{}", "No route folders to watch".yellow());
        return Ok(());
    }

    println!("  {} routes loaded", registry.len());
    println!();

    for change in rx {
        let diff = match &change {
            Change::Structural => registry.rescan(),
            Change::Content(path) => registry.refresh_file(path),
        };

        match diff {
            Ok(diff) => print_diff(&diff),
            Err(e) => eprintln!("{} {:#}", "❌".red(), e),
        }
        if change == Change::Structural {
            super::report_errors(&registry);
        }
    }

    Ok(())
}

/// Maps an event to registry updates, skipping hidden paths below `root`
fn classify(event: &Event, root: &Path) -> Vec<Change> {
    let paths: Vec<&PathBuf> = event
        .paths
        .iter()
        .filter(|p| !is_hidden(p.strip_prefix(root).unwrap_or(p.as_path())))
        .collect();
    if paths.is_empty() {
        return Vec::new();
    }

    match event.kind {
        EventKind::Create(_) | EventKind::Remove(_) => vec![Change::Structural],
        EventKind::Modify(notify::event::ModifyKind::Name(_)) => vec![Change::Structural],
        EventKind::Modify(_) => paths
            .into_iter()
            .map(|path| Change::Content(path.clone()))
            .collect(),
        _ => {
            debug!(kind = ?event.kind, "ignored file event");
            Vec::new()
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => name.to_str().map_or(false, |s| s.starts_with('.')),
        _ => false,
    })
}

fn print_diff(diff: &RegistryDiff) {
    if diff.is_empty() {
        return;
    }
    for id in &diff.added {
        println!("{} {}", "+".green(), id);
    }
    for id in &diff.removed {
        println!("{} {}", "-".red(), id);
    }
    for id in &diff.changed {
        println!("{} {}", "~".yellow(), id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, ModifyKind, RenameMode};
    use pretty_assertions::assert_eq;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_create_is_structural() {
        let e = event(EventKind::Create(CreateKind::File), "/p/src/api/a/index.rs");
        assert_eq!(classify(&e, Path::new("/p")), vec![Change::Structural]);
    }

    #[test]
    fn test_rename_is_structural() {
        let e = event(
            EventKind::Modify(ModifyKind::Name(RenameMode::Any)),
            "/p/src/api/a/index.rs",
        );
        assert_eq!(classify(&e, Path::new("/p")), vec![Change::Structural]);
    }

    #[test]
    fn test_content_change_refreshes_file() {
        let e = event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            "/p/src/api/a/index.rs",
        );
        assert_eq!(
            classify(&e, Path::new("/p")),
            vec![Change::Content(PathBuf::from("/p/src/api/a/index.rs"))]
        );
    }

    #[test]
    fn test_hidden_ancestors_of_root_are_allowed() {
        let e = event(EventKind::Create(CreateKind::File), "/home/.work/p/src/api/a/index.rs");
        assert_eq!(
            classify(&e, Path::new("/home/.work/p")),
            vec![Change::Structural]
        );
    }

    #[test]
    fn test_hidden_paths_are_ignored() {
        let e = event(EventKind::Create(CreateKind::File), "/p/src/api/.swp/index.rs");
        assert!(classify(&e, Path::new("/p")).is_empty());
    }
}
