/// Nested route tree
///
/// Pages are rendered inside the layouts of every ancestor directory, so the
/// flat entry list is folded back into the directory hierarchy. The tree is
/// rebuilt from scratch on every regeneration.
///
/// Construction goes through an index-based trie (one arena slot per
/// directory, children keyed by segment) and is finished bottom-up in reverse
/// arena order, so neither building nor pruning recurses.
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::debug;

use crate::entry::{RouteEntry, RouteFileKind};
use crate::path::PathHierarchy;

/// One directory of the route tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NestedRouteEntry {
    /// Directory name as written (`[id]`); empty for the folder root
    pub segment: String,
    /// Directory path relative to the folder root
    pub path: String,
    pub index: Option<RouteEntry>,
    pub layout: Option<RouteEntry>,
    /// Sub-directories, sorted by segment
    pub children: Vec<NestedRouteEntry>,
}

impl NestedRouteEntry {
    /// Pre-order walk over this node and all of its descendants
    pub fn iter(&self) -> impl Iterator<Item = &NestedRouteEntry> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Finds the node for a directory path below this node
    pub fn find(&self, path: &str) -> Option<&NestedRouteEntry> {
        self.iter().find(|node| node.path == path)
    }

    /// Number of levels below this node (0 for a leaf)
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        deepest
    }
}

#[derive(Default)]
struct Node {
    segment: String,
    path: String,
    index: Option<RouteEntry>,
    layout: Option<RouteEntry>,
    children: BTreeMap<String, usize>,
}

/// Folds a flat entry list into the directory hierarchy.
///
/// A directory with no index entry and no descendant routes is pruned. When
/// the folder root has an index or a layout, the result is that single root
/// node; otherwise it is the root's children. A second index (or layout) for
/// the same directory is ignored.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use waymark_router::{build_tree, create_route_entry, ResolveContext, RouteFolder};
///
/// let ctx = ResolveContext::new("src", RouteFolder::Pages);
/// let entries: Vec<_> = ["src/pages/layout.rs", "src/pages/index.rs", "src/pages/about/index.rs"]
///     .iter()
///     .filter_map(|file| create_route_entry(Path::new(file), &ctx).unwrap())
///     .collect();
///
/// let tree = build_tree(&entries);
/// assert_eq!(tree.len(), 1);
/// assert!(tree[0].layout.is_some());
/// assert_eq!(tree[0].children[0].segment, "about");
/// ```
pub fn build_tree(entries: &[RouteEntry]) -> Vec<NestedRouteEntry> {
    let mut arena = vec![Node::default()];

    for entry in entries {
        let mut current = 0;

        for token in &entry.path_tokens {
            current = match arena[current].children.get(&token.orig) {
                Some(&child) => child,
                None => {
                    let path = if arena[current].path.is_empty() {
                        token.orig.clone()
                    } else {
                        format!("{}/{}", arena[current].path, token.orig)
                    };
                    let child = arena.len();
                    arena.push(Node {
                        segment: token.orig.clone(),
                        path,
                        ..Node::default()
                    });
                    arena[current].children.insert(token.orig.clone(), child);
                    child
                }
            };
        }

        let node = &mut arena[current];
        let slot = match entry.kind {
            RouteFileKind::Index => &mut node.index,
            RouteFileKind::Layout => &mut node.layout,
        };
        match slot {
            Some(existing) => debug!(
                kept = %existing.name,
                ignored = %entry.name,
                "duplicate {:?} entry for directory `{}`",
                entry.kind,
                node.path
            ),
            None => *slot = Some(entry.clone()),
        }
    }

    // Children are always pushed after their parent, so walking the arena
    // backwards finishes every child before the node that owns it.
    let mut finished: Vec<Option<NestedRouteEntry>> = Vec::with_capacity(arena.len());
    finished.resize_with(arena.len(), || None);

    for (idx, node) in arena.into_iter().enumerate().rev() {
        let children: Vec<NestedRouteEntry> = node
            .children
            .values()
            .filter_map(|&child| finished[child].take())
            .collect();

        let is_root = idx == 0;
        if !is_root && node.index.is_none() && children.is_empty() {
            continue;
        }

        finished[idx] = Some(NestedRouteEntry {
            segment: node.segment,
            path: node.path,
            index: node.index,
            layout: node.layout,
            children,
        });
    }

    match finished.into_iter().next().flatten() {
        Some(root) if root.index.is_some() || root.layout.is_some() => vec![root],
        Some(root) => root.children,
        None => Vec::new(),
    }
}

/// Layouts wrapping `page`, outermost (folder root) first.
///
/// Only layouts of the page's own folder are considered.
pub fn layout_chain<'a>(entries: &'a [RouteEntry], page: &RouteEntry) -> Vec<&'a RouteEntry> {
    let layouts: HashMap<String, &RouteEntry> = entries
        .iter()
        .filter(|entry| entry.is_layout() && entry.folder == page.folder)
        .map(|entry| (entry.dir_path(), entry))
        .collect();

    let dir = page.dir_path();
    let mut chain: Vec<&RouteEntry> = PathHierarchy::new(&dir)
        .filter_map(|ancestor| layouts.get(ancestor).copied())
        .collect();
    chain.reverse();
    chain
}
