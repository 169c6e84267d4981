// File: src/registry.rs
// Purpose: In-memory route registry with incremental updates

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use waymark_router::{
    build_tree, create_route_entry, sort_by_specificity, NestedRouteEntry, RouteEntry, RouteFolder,
    RouterError,
};

use crate::config::Config;
use crate::scanner::{scan, ScanError};

/// Identifies a route across rescans: names are unique within a folder
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RouteId {
    pub folder: RouteFolder,
    pub name: String,
}

impl RouteId {
    pub fn of(entry: &RouteEntry) -> Self {
        Self {
            folder: entry.folder,
            name: entry.name.clone(),
        }
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.folder, self.name)
    }
}

/// Routes affected by a registry update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryDiff {
    pub added: Vec<RouteId>,
    pub removed: Vec<RouteId>,
    pub changed: Vec<RouteId>,
}

impl RegistryDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }

    /// Whether the set of routes changed (not just their content)
    pub fn is_structural(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Route entries of one project, keyed by source file
#[derive(Debug)]
pub struct RouteRegistry {
    root: PathBuf,
    config: Config,
    files: BTreeMap<PathBuf, RouteEntry>,
    errors: Vec<ScanError>,
}

impl RouteRegistry {
    /// Creates an empty registry for the project at `root`
    pub fn new(root: impl AsRef<Path>, config: Config) -> Result<Self> {
        let root = root.as_ref();
        let root = root
            .canonicalize()
            .with_context(|| format!("Failed to resolve project root: {:?}", root))?;

        Ok(Self {
            root,
            config,
            files: BTreeMap::new(),
            errors: Vec::new(),
        })
    }

    /// Creates a registry and runs the initial scan
    pub fn load(root: impl AsRef<Path>, config: Config) -> Result<Self> {
        let mut registry = Self::new(root, config)?;
        registry.rescan()?;
        Ok(registry)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces every entry with a fresh scan (structural changes)
    pub fn rescan(&mut self) -> Result<RegistryDiff> {
        let report = scan(&self.root, &self.config)?;

        let files: BTreeMap<PathBuf, RouteEntry> = report
            .api
            .into_iter()
            .chain(report.pages)
            .map(|entry| (entry.file_fullpath.clone(), entry))
            .collect();

        let diff = diff_entries(self.files.values(), files.values());
        self.files = files;
        self.errors = report.errors;

        debug!(
            added = diff.added.len(),
            removed = diff.removed.len(),
            changed = diff.changed.len(),
            "registry rescanned"
        );
        Ok(diff)
    }

    /// Re-resolves a single file (content changes, no rescan)
    ///
    /// A file that no longer resolves to a route is removed. A file that
    /// fails to resolve loses its stale entry and is recorded in `errors()`.
    pub fn refresh_file(&mut self, path: impl AsRef<Path>) -> Result<RegistryDiff> {
        let path = self.absolute(path.as_ref());
        self.errors.retain(|e| e.file != path);

        match self.resolve(&path) {
            Ok(Some(entry)) => {
                let previous = self.files.insert(path.clone(), entry);
                let current = self.files.get(&path);
                Ok(diff_entries(previous.as_ref(), current))
            }
            Ok(None) => Ok(self.remove_file(&path)),
            Err(error) => {
                warn!(file = %path.display(), %error, "route failed to resolve");
                self.files.remove(&path);
                let message = error.to_string();
                self.errors.push(ScanError {
                    file: path.clone(),
                    error,
                });
                Err(anyhow!("Failed to resolve route file {:?}: {}", path, message))
            }
        }
    }

    /// Resolves `path` in whichever route folder contains it
    fn resolve(&self, path: &Path) -> std::result::Result<Option<RouteEntry>, RouterError> {
        for folder in [RouteFolder::Api, RouteFolder::Pages] {
            let ctx = self.config.resolve_context(&self.root, folder);
            let Some(entry) = create_route_entry(path, &ctx)? else {
                continue;
            };

            let existing = self.files.iter().find(|(file, other)| {
                file.as_path() != path && other.folder == entry.folder && other.name == entry.name
            });
            if let Some((existing, _)) = existing {
                return Err(RouterError::DuplicateRoute {
                    path: entry.name,
                    file: path.to_path_buf(),
                    existing: existing.clone(),
                });
            }
            return Ok(Some(entry));
        }

        Ok(None)
    }

    /// Drops the entry of a deleted file
    pub fn remove_file(&mut self, path: impl AsRef<Path>) -> RegistryDiff {
        let path = self.absolute(path.as_ref());
        self.errors.retain(|e| e.file != path);

        match self.files.remove(&path) {
            Some(entry) => RegistryDiff {
                removed: vec![RouteId::of(&entry)],
                ..RegistryDiff::default()
            },
            None => RegistryDiff::default(),
        }
    }

    /// Entries of one folder, most specific first
    pub fn entries(&self, folder: RouteFolder) -> Vec<RouteEntry> {
        let mut entries: Vec<RouteEntry> = self
            .files
            .values()
            .filter(|entry| entry.folder == folder)
            .cloned()
            .collect();
        sort_by_specificity(&mut entries);
        entries
    }

    pub fn get(&self, id: &RouteId) -> Option<&RouteEntry> {
        self.files
            .values()
            .find(|entry| entry.folder == id.folder && entry.name == id.name)
    }

    /// Nested page tree
    pub fn page_tree(&self) -> Vec<NestedRouteEntry> {
        build_tree(&self.entries(RouteFolder::Pages))
    }

    /// Files of the last scan that failed to resolve
    pub fn errors(&self) -> &[ScanError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

fn diff_entries<'a>(
    old: impl IntoIterator<Item = &'a RouteEntry>,
    new: impl IntoIterator<Item = &'a RouteEntry>,
) -> RegistryDiff {
    let old: BTreeMap<RouteId, &RouteEntry> = old.into_iter().map(|e| (RouteId::of(e), e)).collect();
    let new: BTreeMap<RouteId, &RouteEntry> = new.into_iter().map(|e| (RouteId::of(e), e)).collect();

    let mut diff = RegistryDiff::default();
    for (id, entry) in &new {
        match old.get(id) {
            None => diff.added.push(id.clone()),
            Some(previous) if previous != entry => diff.changed.push(id.clone()),
            Some(_) => {}
        }
    }
    diff.removed = old
        .keys()
        .filter(|id| !new.contains_key(id))
        .cloned()
        .collect();
    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_entries() {
        let ctx = waymark_router::ResolveContext::new("src", RouteFolder::Api);
        let entry = |file: &str| create_route_entry(Path::new(file), &ctx).unwrap().unwrap();

        let a = entry("src/api/a/index.rs");
        let b = entry("src/api/b/index.rs");
        let b2 = entry("src/api/b/index.rsx");
        let c = entry("src/api/c/index.rs");

        let diff = diff_entries([&a, &b], [&b2, &c]);
        assert_eq!(diff.added[0].to_string(), "api:c");
        assert_eq!(diff.removed[0].to_string(), "api:a");
        assert_eq!(diff.changed[0].to_string(), "api:b");
        assert!(diff.is_structural());
    }
}
