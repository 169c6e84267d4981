// Integration tests for the route registry and manifest
// Projects are laid out in temporary directories

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use waymark::waymark_router::RouteFolder;
use waymark::{Config, Manifest, RouteId, RouteRegistry};

fn touch(root: &Path, file: &str) {
    let path = root.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "").unwrap();
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "src/api/users/index.rs");
    touch(dir.path(), "src/api/users/[id]/index.rs");
    touch(dir.path(), "src/pages/index.rs");
    touch(dir.path(), "src/pages/layout.rs");
    touch(dir.path(), "src/pages/blog/[slug]/index.rs");
    dir
}

fn names(registry: &RouteRegistry, folder: RouteFolder) -> Vec<String> {
    registry
        .entries(folder)
        .into_iter()
        .map(|entry| entry.name)
        .collect()
}

#[test]
fn test_load_scans_both_folders() {
    let dir = project();
    let registry = RouteRegistry::load(dir.path(), Config::default()).unwrap();

    assert_eq!(registry.len(), 5);
    assert_eq!(names(&registry, RouteFolder::Api), vec!["users", "users/[id]"]);
    assert_eq!(
        names(&registry, RouteFolder::Pages),
        vec!["@layout", "index", "blog/[slug]"]
    );
    assert!(registry.errors().is_empty());
}

#[test]
fn test_rescan_reports_added_and_removed_routes() {
    let dir = project();
    let mut registry = RouteRegistry::load(dir.path(), Config::default()).unwrap();

    touch(dir.path(), "src/api/orders/index.rs");
    fs::remove_file(dir.path().join("src/api/users/[id]/index.rs")).unwrap();

    let diff = registry.rescan().unwrap();
    let added: Vec<String> = diff.added.iter().map(ToString::to_string).collect();
    let removed: Vec<String> = diff.removed.iter().map(ToString::to_string).collect();
    assert_eq!(added, vec!["api:orders"]);
    assert_eq!(removed, vec!["api:users/[id]"]);
    assert!(diff.changed.is_empty());
}

#[test]
fn test_rescan_without_changes_is_empty() {
    let dir = project();
    let mut registry = RouteRegistry::load(dir.path(), Config::default()).unwrap();
    assert!(registry.rescan().unwrap().is_empty());
}

#[test]
fn test_refresh_file_adds_and_removes_single_routes() {
    let dir = project();
    let mut registry = RouteRegistry::load(dir.path(), Config::default()).unwrap();

    touch(dir.path(), "src/pages/about/index.rs");
    let diff = registry
        .refresh_file(dir.path().join("src/pages/about/index.rs"))
        .unwrap();
    assert_eq!(diff.added.len(), 1);
    assert_eq!(diff.added[0].folder, RouteFolder::Pages);
    assert_eq!(diff.added[0].name, "about");

    // Refreshing an unchanged route is a no-op
    let diff = registry.refresh_file("src/pages/about/index.rs").unwrap();
    assert!(diff.is_empty());

    let diff = registry.remove_file(dir.path().join("src/pages/about/index.rs"));
    assert_eq!(diff.removed[0].name, "about");
    assert_eq!(registry.len(), 5);
}

#[test]
fn test_refresh_ignores_non_route_files() {
    let dir = project();
    let mut registry = RouteRegistry::load(dir.path(), Config::default()).unwrap();

    touch(dir.path(), "src/api/users/helpers.rs");
    let diff = registry.refresh_file("src/api/users/helpers.rs").unwrap();
    assert!(diff.is_empty());
    assert_eq!(registry.len(), 5);
}

#[test]
fn test_malformed_route_is_reported_not_fatal() {
    let dir = project();
    touch(dir.path(), "src/api/broken{/index.rs");

    let mut registry = RouteRegistry::load(dir.path(), Config::default()).unwrap();
    assert_eq!(registry.errors().len(), 1);
    assert_eq!(names(&registry, RouteFolder::Api).len(), 2);

    assert!(registry.refresh_file("src/api/broken{/index.rs").is_err());
    assert_eq!(registry.len(), 5);
    assert_eq!(registry.errors().len(), 1);
    assert_eq!(registry.errors()[0].error.path(), Some("broken{"));
}

#[test]
fn test_refresh_rejects_second_file_for_same_route() {
    let dir = project();
    let mut registry = RouteRegistry::load(dir.path(), Config::default()).unwrap();

    touch(dir.path(), "src/api/users/index.rsx");
    assert!(registry.refresh_file("src/api/users/index.rsx").is_err());

    assert_eq!(names(&registry, RouteFolder::Api), vec!["users", "users/[id]"]);
    let users = RouteId {
        folder: RouteFolder::Api,
        name: "users".to_string(),
    };
    assert!(registry.get(&users).unwrap().file.ends_with("index.rs"));
    assert_eq!(registry.errors().len(), 1);
    assert_eq!(registry.errors()[0].error.path(), Some("users"));

    // A full rescan keeps the first file in name order and reports the other
    assert!(registry.rescan().unwrap().is_empty());
    assert_eq!(registry.errors().len(), 1);
}

#[test]
fn test_manifest_contents() {
    let dir = project();
    let registry = RouteRegistry::load(dir.path(), Config::default()).unwrap();
    let manifest = Manifest::from_registry(&registry).unwrap();

    assert_eq!(manifest.project, "waymark-app");
    assert_eq!(manifest.api.len(), 2);

    // Root has an index and a layout, so the tree has a single root node
    assert_eq!(manifest.pages.len(), 1);
    assert!(manifest.pages[0].layout.is_some());
    assert_eq!(manifest.pages[0].children[0].segment, "blog");

    // Four core middleware per api route
    assert_eq!(manifest.stack.len(), 8);
    assert_eq!(manifest.stack[0].name, "users");

    let json: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
    assert_eq!(json["api"][1]["pathPattern"], "/users/:id");
    assert_eq!(json["stack"][0]["slot"], "errorHandler");
}

#[test]
fn test_manifest_write_creates_parent_dirs() {
    let dir = project();
    let registry = RouteRegistry::load(dir.path(), Config::default()).unwrap();
    let out = dir.path().join("target/waymark/routes.json");

    Manifest::from_registry(&registry).unwrap().write(&out).unwrap();
    assert!(out.exists());
}

#[test]
fn test_config_file_controls_folders() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("waymark.toml"),
        "[routing]\nsource_dir = \"app\"\napi_dir = \"endpoints\"\n",
    )
    .unwrap();
    touch(dir.path(), "app/endpoints/health/index.rs");
    touch(dir.path(), "src/api/ignored/index.rs");

    let config = Config::load(dir.path().join("waymark.toml")).unwrap();
    let registry = RouteRegistry::load(dir.path(), config).unwrap();
    assert_eq!(names(&registry, RouteFolder::Api), vec!["health"]);
}
