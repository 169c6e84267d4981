/// Directory-cascading use-wrappers
///
/// Wrappers registered for a directory apply to every route at or below it.
/// Collected outermost first, so a wrapper registered deeper in the tree
/// overrides a shallower one for the same slot.
use std::collections::BTreeMap;

use waymark_router::{PathHierarchy, RouteEntry};

use crate::definition::{MiddlewareUse, RouteSource};

/// Use-wrappers keyed by route directory (relative to the folder root)
#[derive(Debug, Clone)]
pub struct WrapperTree<M> {
    dirs: BTreeMap<String, Vec<MiddlewareUse<M>>>,
}

impl<M> Default for WrapperTree<M> {
    fn default() -> Self {
        Self {
            dirs: BTreeMap::new(),
        }
    }
}

impl<M: Clone> WrapperTree<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends wrappers for a directory (`""` is the folder root)
    pub fn register(&mut self, dir: &str, wrappers: impl IntoIterator<Item = MiddlewareUse<M>>) {
        self.dirs
            .entry(dir.trim_matches('/').to_string())
            .or_default()
            .extend(wrappers);
    }

    /// Registers wrappers (builder style)
    pub fn with_wrappers(
        mut self,
        dir: &str,
        wrappers: impl IntoIterator<Item = MiddlewareUse<M>>,
    ) -> Self {
        self.register(dir, wrappers);
        self
    }

    /// Wrappers applying to a directory, outermost first
    ///
    /// # Examples
    ///
    /// ```
    /// use waymark_stack::{MiddlewareUse, WrapperTree};
    ///
    /// let tree = WrapperTree::new()
    ///     .with_wrappers("", [MiddlewareUse::new(["root"])])
    ///     .with_wrappers("admin", [MiddlewareUse::new(["admin"])]);
    ///
    /// let names: Vec<&str> = tree
    ///     .wrappers_for("admin/users")
    ///     .iter()
    ///     .flat_map(|w| w.middleware.iter().copied())
    ///     .collect();
    /// assert_eq!(names, vec!["root", "admin"]);
    /// ```
    pub fn wrappers_for(&self, dir: &str) -> Vec<MiddlewareUse<M>> {
        let mut ancestors: Vec<&str> = PathHierarchy::new(dir).collect();
        ancestors.reverse();

        ancestors
            .into_iter()
            .filter_map(|ancestor| self.dirs.get(ancestor))
            .flat_map(|wrappers| wrappers.iter().cloned())
            .collect()
    }

    /// Adds the cascading wrappers of `entry`'s directory in front of the
    /// source's own wrappers
    pub fn apply(&self, entry: &RouteEntry, source: RouteSource<M>) -> RouteSource<M> {
        if self.dirs.is_empty() {
            return source;
        }

        let mut wrappers = self.wrappers_for(&entry.dir_path());
        wrappers.extend(source.use_wrappers);
        RouteSource {
            definition_items: source.definition_items,
            use_wrappers: wrappers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}
