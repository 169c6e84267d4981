// File: src/scanner.rs
// Purpose: Walk the source tree and resolve every route file

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;
use waymark_router::{create_route_entry, sort_by_specificity, RouteEntry, RouteFolder, RouterError};

use crate::config::Config;

/// A route file that failed to resolve
#[derive(Debug)]
pub struct ScanError {
    pub file: PathBuf,
    pub error: RouterError,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file.display(), self.error)
    }
}

/// Outcome of a full scan
#[derive(Debug, Default)]
pub struct ScanReport {
    /// API routes, most specific first
    pub api: Vec<RouteEntry>,
    /// Page indexes and layouts, most specific first
    pub pages: Vec<RouteEntry>,
    /// Files that look like routes but have malformed path syntax
    pub errors: Vec<ScanError>,
}

impl ScanReport {
    pub fn entries(&self, folder: RouteFolder) -> &[RouteEntry] {
        match folder {
            RouteFolder::Api => &self.api,
            RouteFolder::Pages => &self.pages,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Scans the api and pages roots of the project at `root`.
///
/// Malformed route paths are collected in the report instead of aborting
/// the scan; only I/O failures are returned as errors.
pub fn scan(root: &Path, config: &Config) -> Result<ScanReport> {
    let mut report = ScanReport::default();

    for folder in [RouteFolder::Api, RouteFolder::Pages] {
        let (entries, errors) = scan_folder(root, config, folder)?;
        match folder {
            RouteFolder::Api => report.api = entries,
            RouteFolder::Pages => report.pages = entries,
        }
        report.errors.extend(errors);
    }

    debug!(
        api = report.api.len(),
        pages = report.pages.len(),
        errors = report.errors.len(),
        "scan complete"
    );
    Ok(report)
}

/// Scans one route folder
///
/// Files are visited in file-name order; when two files resolve to the same
/// route name, the first one wins and the later one is reported.
pub fn scan_folder(
    root: &Path,
    config: &Config,
    folder: RouteFolder,
) -> Result<(Vec<RouteEntry>, Vec<ScanError>)> {
    let ctx = config.resolve_context(root, folder);
    let folder_root = ctx.folder_root();

    if !folder_root.is_dir() {
        debug!(folder = %folder, path = %folder_root.display(), "route folder missing, skipped");
        return Ok((Vec::new(), Vec::new()));
    }

    let mut entries = Vec::new();
    let mut errors = Vec::new();
    // Route name -> file that defined it first
    let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();

    let walker = WalkDir::new(&folder_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for dir_entry in walker {
        let dir_entry = dir_entry
            .with_context(|| format!("Failed to walk route folder: {:?}", folder_root))?;
        if !dir_entry.file_type().is_file() {
            continue;
        }

        let resolved = create_route_entry(dir_entry.path(), &ctx).and_then(|entry| match entry {
            Some(entry) => match seen.get(&entry.name) {
                Some(existing) => Err(RouterError::DuplicateRoute {
                    path: entry.name,
                    file: entry.file_fullpath,
                    existing: existing.clone(),
                }),
                None => {
                    seen.insert(entry.name.clone(), entry.file_fullpath.clone());
                    Ok(Some(entry))
                }
            },
            None => Ok(None),
        });

        match resolved {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {}
            Err(error) => {
                warn!(file = %dir_entry.path().display(), %error, "route failed to resolve");
                errors.push(ScanError {
                    file: dir_entry.path().to_path_buf(),
                    error,
                });
            }
        }
    }

    sort_by_specificity(&mut entries);
    Ok((entries, errors))
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map_or(false, |s| s.starts_with('.'))
}
