/// Route entry resolution
///
/// Maps a route file location to a [`RouteEntry`]. Directory names carry the
/// path syntax (`users/[id]/index.rs` → `/users/:id`); the file name only
/// classifies the entry. Resolution is a pure function of the path and the
/// [`ResolveContext`], so full scans and single-file refreshes share it.
use std::cmp::Ordering;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Result, RouterError};
use crate::matcher::RouteMatcher;
use crate::path::join_segments;
use crate::specificity::specificity_cmp;
use crate::token::{tokenize, PathParam, PathToken};

/// Which source root a route lives under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteFolder {
    Api,
    Pages,
}

impl RouteFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteFolder::Api => "api",
            RouteFolder::Pages => "pages",
        }
    }
}

impl fmt::Display for RouteFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a route file within its directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteFileKind {
    /// The directory's own route; contributes no extra path segment
    Index,
    /// Wraps every page below the directory (pages only)
    Layout,
}

/// Naming conventions for one source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
    /// Application source directory (`src`)
    pub source_dir: PathBuf,
    pub folder: RouteFolder,
    /// Directory of this root below `source_dir` (`api`, `pages`)
    pub folder_dir: String,
    /// Recognized route file extensions, without the dot
    pub extensions: Vec<String>,
    pub index_name: String,
    pub layout_name: String,
}

impl ResolveContext {
    /// Creates a context with the default conventions
    /// (`index`/`layout` stems, `.rs`/`.rsx` files)
    pub fn new(source_dir: impl Into<PathBuf>, folder: RouteFolder) -> Self {
        Self {
            source_dir: source_dir.into(),
            folder,
            folder_dir: folder.as_str().to_string(),
            extensions: vec!["rs".to_string(), "rsx".to_string()],
            index_name: "index".to_string(),
            layout_name: "layout".to_string(),
        }
    }

    pub fn with_folder_dir(mut self, folder_dir: impl Into<String>) -> Self {
        self.folder_dir = folder_dir.into();
        self
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_string())
            .collect();
        self
    }

    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    pub fn with_layout_name(mut self, name: impl Into<String>) -> Self {
        self.layout_name = name.into();
        self
    }

    /// Directory holding this root's route files
    pub fn folder_root(&self) -> PathBuf {
        self.source_dir.join(&self.folder_dir)
    }

    /// Location of `file` below the folder root.
    ///
    /// Accepts paths under `folder_root()` as well as paths relative to
    /// `source_dir` (`api/users/index.rs`).
    fn relative_to_folder<'p>(&self, file: &'p Path) -> Option<&'p Path> {
        file.strip_prefix(self.folder_root()).ok().or_else(|| {
            file.is_relative()
                .then(|| file.strip_prefix(&self.folder_dir).ok())
                .flatten()
        })
    }
}

/// A resolved route file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    /// Stable identifier derived from the directory path, unique per folder
    pub name: String,
    pub kind: RouteFileKind,
    pub folder: RouteFolder,
    /// Location relative to the source directory, `/`-separated
    pub file: String,
    pub file_fullpath: PathBuf,
    pub params: Vec<PathParam>,
    pub path_tokens: Vec<PathToken>,
    pub path_pattern: String,
    /// Identifier generated code uses for this route's module
    pub import_name: String,
    /// Extension-less module specifier relative to the source directory
    pub import_file: String,
}

impl RouteEntry {
    /// Directory path of the route relative to its folder root
    /// (`users/[id]`, empty for the root)
    pub fn dir_path(&self) -> String {
        join_segments(self.path_tokens.iter().map(|t| t.orig.as_str()))
    }

    pub fn is_index(&self) -> bool {
        self.kind == RouteFileKind::Index
    }

    pub fn is_layout(&self) -> bool {
        self.kind == RouteFileKind::Layout
    }

    /// Compiles a matcher for this route's path
    pub fn matcher(&self, case_insensitive: bool) -> Result<RouteMatcher> {
        RouteMatcher::with_case_insensitive(&self.path_tokens, case_insensitive)
    }

    /// Match-priority comparison, see [`crate::specificity_cmp`]
    pub fn specificity_cmp(&self, other: &RouteEntry) -> Ordering {
        specificity_cmp(&self.path_tokens, &other.path_tokens)
    }
}

/// Resolves a route file into an entry.
///
/// Returns `Ok(None)` for files that are not routes under the context's
/// conventions: files outside the folder root, unknown extensions, hidden
/// paths, and file stems other than the index (or, for pages, layout) name.
///
/// # Errors
///
/// Malformed path syntax in the directory names, reported with the raw path.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use waymark_router::{create_route_entry, ResolveContext, RouteFolder};
///
/// let ctx = ResolveContext::new("src", RouteFolder::Api);
///
/// let entry = create_route_entry(Path::new("src/api/users/[id]/index.rs"), &ctx)
///     .unwrap()
///     .unwrap();
/// assert_eq!(entry.name, "users/[id]");
/// assert_eq!(entry.path_pattern, "/users/:id");
///
/// let helper = create_route_entry(Path::new("src/api/users/helpers.rs"), &ctx).unwrap();
/// assert!(helper.is_none());
/// ```
pub fn create_route_entry(file_path: &Path, ctx: &ResolveContext) -> Result<Option<RouteEntry>> {
    let Some(relative) = ctx.relative_to_folder(file_path) else {
        return Ok(None);
    };

    let mut components = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(os) => match os.to_str() {
                Some(s) => components.push(s),
                None => {
                    return Err(RouterError::NonUtf8Path {
                        file: file_path.to_path_buf(),
                    })
                }
            },
            // `..` or an absolute remainder escapes the folder root
            _ => return Ok(None),
        }
    }

    if components.iter().any(|c| c.starts_with('.')) {
        return Ok(None);
    }

    let Some((file_name, dirs)) = components.split_last() else {
        return Ok(None);
    };

    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return Ok(None);
    };
    if !ctx.extensions.iter().any(|e| e == ext) {
        return Ok(None);
    }

    let kind = match ctx.folder {
        _ if stem == ctx.index_name => RouteFileKind::Index,
        RouteFolder::Pages if stem == ctx.layout_name => RouteFileKind::Layout,
        _ => return Ok(None),
    };

    let dir = join_segments(dirs);
    let tokens = tokenize(&dir)?;
    let name = route_name(&dir, kind);

    Ok(Some(RouteEntry {
        import_name: import_name(ctx.folder, kind, &name),
        import_file: join_segments([ctx.folder_dir.as_str(), dir.as_str(), stem]),
        file: join_segments([ctx.folder_dir.as_str(), dir.as_str(), file_name]),
        file_fullpath: ctx.folder_root().join(relative),
        params: tokens.params(),
        path_pattern: tokens.pattern,
        path_tokens: tokens.tokens,
        name,
        kind,
        folder: ctx.folder,
    }))
}

fn route_name(dir: &str, kind: RouteFileKind) -> String {
    match (kind, dir.is_empty()) {
        (RouteFileKind::Index, true) => "index".to_string(),
        (RouteFileKind::Index, false) => dir.to_string(),
        (RouteFileKind::Layout, true) => "@layout".to_string(),
        (RouteFileKind::Layout, false) => format!("{}/@layout", dir),
    }
}

/// `api_users_id_1f2e3d4c`: readable words from the name plus a short digest
/// of `folder:name`, so names that only differ in punctuation stay distinct.
fn import_name(folder: RouteFolder, kind: RouteFileKind, name: &str) -> String {
    let prefix = match (folder, kind) {
        (RouteFolder::Api, _) => "api",
        (RouteFolder::Pages, RouteFileKind::Index) => "page",
        (RouteFolder::Pages, RouteFileKind::Layout) => "layout",
    };

    let words = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    let digest = Sha256::digest(format!("{}:{}", folder, name).as_bytes());
    let hash: String = digest.iter().take(4).map(|b| format!("{:02x}", b)).collect();

    format!("{}_{}_{}", prefix, words, hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> ResolveContext {
        ResolveContext::new("src", RouteFolder::Api)
    }

    fn pages() -> ResolveContext {
        ResolveContext::new("src", RouteFolder::Pages)
    }

    fn resolve(file: &str, ctx: &ResolveContext) -> Option<RouteEntry> {
        create_route_entry(Path::new(file), ctx).unwrap()
    }

    #[test]
    fn test_root_index() {
        let entry = resolve("src/api/index.rs", &api()).unwrap();
        assert_eq!(entry.name, "index");
        assert_eq!(entry.path_pattern, "/");
        assert!(entry.params.is_empty());
        assert_eq!(entry.file, "api/index.rs");
        assert_eq!(entry.import_file, "api/index");
    }

    #[test]
    fn test_index_contributes_no_segment() {
        let entry = resolve("src/api/users/index.rs", &api()).unwrap();
        assert_eq!(entry.path_pattern, "/users");
        assert_eq!(entry.dir_path(), "users");
    }

    #[test]
    fn test_relative_to_source_dir() {
        let entry = resolve("api/users/[id]/index.rs", &api()).unwrap();
        assert_eq!(entry.name, "users/[id]");
        assert_eq!(entry.file_fullpath, PathBuf::from("src/api/users/[id]/index.rs"));
    }

    #[test]
    fn test_bracket_dialects_normalize() {
        let brackets = resolve("src/api/docs/[...path]/index.rs", &api()).unwrap();
        let braces = resolve("src/api/docs/{...path}/index.rs", &api()).unwrap();
        assert_eq!(brackets.path_pattern, braces.path_pattern);
        assert_eq!(brackets.params, braces.params);
        assert_ne!(brackets.name, braces.name);
        assert_ne!(brackets.import_name, braces.import_name);
    }

    #[test]
    fn test_non_routes_are_skipped() {
        assert!(resolve("src/api/users/helpers.rs", &api()).is_none());
        assert!(resolve("src/api/users/index.ts", &api()).is_none());
        assert!(resolve("src/api/.cache/index.rs", &api()).is_none());
        assert!(resolve("src/lib/index.rs", &api()).is_none());
        assert!(resolve("src/api/../index.rs", &api()).is_none());
    }

    #[test]
    fn test_layout_only_for_pages() {
        assert!(resolve("src/api/users/layout.rs", &api()).is_none());

        let layout = resolve("src/pages/users/layout.rs", &pages()).unwrap();
        assert!(layout.is_layout());
        assert_eq!(layout.name, "users/@layout");
        assert_eq!(layout.path_pattern, "/users");
        assert!(layout.import_name.starts_with("layout_users_"));

        let root = resolve("src/pages/layout.rsx", &pages()).unwrap();
        assert_eq!(root.name, "@layout");
    }

    #[test]
    fn test_custom_conventions() {
        let ctx = ResolveContext::new("app", RouteFolder::Pages)
            .with_folder_dir("routes")
            .with_extensions([".vue"])
            .with_index_name("page");
        let entry = resolve("app/routes/about/page.vue", &ctx).unwrap();
        assert_eq!(entry.path_pattern, "/about");
        assert_eq!(entry.file, "routes/about/page.vue");
    }

    #[test]
    fn test_names_are_stable() {
        let a = resolve("src/api/users/[id]/index.rs", &api()).unwrap();
        let b = resolve("src/api/users/[id]/index.rs", &api()).unwrap();
        assert_eq!(a, b);
        assert!(a.import_name.starts_with("api_users_id_"));
        assert_eq!(a.import_name.len(), "api_users_id_".len() + 8);
    }

    #[test]
    fn test_malformed_directory_is_error() {
        let err = create_route_entry(Path::new("src/api/users/{:id/index.rs"), &api()).unwrap_err();
        assert_eq!(err.path(), Some("users/{:id"));
    }
}
