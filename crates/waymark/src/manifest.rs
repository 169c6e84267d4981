// File: src/manifest.rs
// Purpose: Route manifest consumed by code generation and tooling

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;
use waymark_router::{NestedRouteEntry, RouteEntry, RouteFolder};
use waymark_stack::{ResolvedRouteDescriptor, RouteSource, RouterStackEntry, StackBuilder};

use crate::config::Config;
use crate::registry::RouteRegistry;

/// Snapshot of every discovered route
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub project: String,
    pub version: String,
    /// API routes, most specific first
    pub api: Vec<RouteEntry>,
    /// Nested page tree
    pub pages: Vec<NestedRouteEntry>,
    /// Core pipeline of every API route, labelled by middleware name
    pub stack: Vec<RouterStackEntry<String>>,
    /// Route files that failed to resolve
    pub errors: Vec<String>,
}

impl Manifest {
    pub fn from_registry(registry: &RouteRegistry) -> Result<Self> {
        let config = registry.config();
        let api = registry.entries(RouteFolder::Api);
        let stack = core_stack(config, &api)?;

        Ok(Self {
            project: config.project.name.clone(),
            version: config.project.version.clone(),
            api,
            pages: registry.page_tree(),
            stack,
            errors: registry.errors().iter().map(ToString::to_string).collect(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize route manifest")
    }

    /// Writes the manifest as pretty JSON
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write manifest: {:?}", path))
    }
}

/// Stack of the configured core middleware for each API route
///
/// Route files declare their own middleware in code, so only the core
/// layer is known from the file system.
pub fn core_stack(config: &Config, api: &[RouteEntry]) -> Result<Vec<RouterStackEntry<String>>> {
    let builder = StackBuilder::new(config.core_middleware()?).with_slot_order(config.slot_order());
    let routes: Vec<ResolvedRouteDescriptor<String>> = api
        .iter()
        .map(|entry| ResolvedRouteDescriptor::new(entry.clone(), RouteSource::new(Vec::new())))
        .collect();

    Ok(builder.build(&routes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use waymark_router::{create_route_entry, ResolveContext};
    use waymark_stack::StackEntryKind;

    #[test]
    fn test_core_stack_follows_slot_order() {
        let ctx = ResolveContext::new("src", RouteFolder::Api);
        let entry = create_route_entry(Path::new("src/api/users/index.rs"), &ctx)
            .unwrap()
            .unwrap();

        let stack = core_stack(&Config::default(), &[entry]).unwrap();
        let names: Vec<&str> = stack.iter().map(|e| e.middleware[0].as_str()).collect();
        assert_eq!(names, vec!["errorHandler", "params", "bodyparser", "payload"]);
        assert!(stack.iter().all(|e| e.kind == StackEntryKind::Middleware));
        assert!(stack.iter().all(|e| e.name == "users"));
    }
}
