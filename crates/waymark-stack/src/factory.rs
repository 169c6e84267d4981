/// Router stack factory
///
/// Turns resolved routes into the flat, ordered entry list a first-match
/// routing layer registers in array order. Routes are emitted most specific
/// first; within a route, slotted middleware entries come before handler
/// entries, and methods that end up with the same middleware sequence share
/// one handler entry.
use serde::Serialize;
use waymark_router::RouteEntry;

use crate::cascade::WrapperTree;
use crate::definition::{MiddlewareDefinition, MiddlewareUse, RouteSource};
use crate::method::HttpMethod;
use crate::resolver::resolve_stack_with;
use crate::slot::SlotOrder;

/// A route entry paired with its middleware declarations
#[derive(Debug, Clone)]
pub struct ResolvedRouteDescriptor<M> {
    pub entry: RouteEntry,
    pub source: RouteSource<M>,
}

impl<M> ResolvedRouteDescriptor<M> {
    pub fn new(entry: RouteEntry, source: RouteSource<M>) -> Self {
        Self { entry, source }
    }
}

/// Kind of a stack entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StackEntryKind {
    Middleware,
    Handler,
}

/// One registration unit for the routing layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterStackEntry<M> {
    /// Name of the route this entry belongs to
    pub name: String,
    /// Matcher pattern of the route
    pub path: String,
    pub kind: StackEntryKind,
    /// Methods this entry applies to, in canonical order
    pub methods: Vec<HttpMethod>,
    pub middleware: Vec<M>,
    /// Originating slot, for slotted middleware entries
    pub slot: Option<String>,
}

/// Builds router stacks with a shared slot order, core middleware and
/// directory wrappers
#[derive(Debug, Clone)]
pub struct StackBuilder<M> {
    order: SlotOrder,
    core: Vec<MiddlewareUse<M>>,
    wrappers: WrapperTree<M>,
}

impl<M: Clone> StackBuilder<M> {
    pub fn new(core: Vec<MiddlewareUse<M>>) -> Self {
        Self {
            order: SlotOrder::default(),
            core,
            wrappers: WrapperTree::new(),
        }
    }

    pub fn with_slot_order(mut self, order: SlotOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_wrappers(mut self, wrappers: WrapperTree<M>) -> Self {
        self.wrappers = wrappers;
        self
    }

    pub fn slot_order(&self) -> &SlotOrder {
        &self.order
    }

    /// Resolves one route, directory wrappers included
    pub fn resolve(&self, route: &ResolvedRouteDescriptor<M>) -> Vec<MiddlewareDefinition<M>> {
        let source = self.wrappers.apply(&route.entry, route.source.clone());
        resolve_stack_with(&source, &self.core, &self.order)
    }

    /// Builds the stack for all routes
    pub fn build(&self, routes: &[ResolvedRouteDescriptor<M>]) -> Vec<RouterStackEntry<M>> {
        let mut ordered: Vec<&ResolvedRouteDescriptor<M>> = routes.iter().collect();
        ordered.sort_by(|a, b| {
            a.entry
                .specificity_cmp(&b.entry)
                .then_with(|| a.entry.name.cmp(&b.entry.name))
        });

        ordered
            .into_iter()
            .flat_map(|route| fan_out(&route.entry, self.resolve(route)))
            .collect()
    }
}

/// Builds the stack for all routes with the default slot order
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use waymark_router::{create_route_entry, ResolveContext, RouteFolder};
/// use waymark_stack::{
///     build_stack, define_route, get, post, HttpMethod, ResolvedRouteDescriptor,
///     StackEntryKind,
/// };
///
/// let ctx = ResolveContext::new("src", RouteFolder::Api);
/// let entry = create_route_entry(Path::new("src/api/users/index.rs"), &ctx)
///     .unwrap()
///     .unwrap();
/// let source = define_route(vec![get(["list"]), post(["create"])]).unwrap();
///
/// let stack = build_stack(&[ResolvedRouteDescriptor::new(entry, source)], &[]);
/// assert_eq!(stack.len(), 2);
/// assert_eq!(stack[0].kind, StackEntryKind::Handler);
/// assert_eq!(stack[0].methods, vec![HttpMethod::Get]);
/// assert_eq!(stack[1].middleware, vec!["create"]);
/// ```
pub fn build_stack<M: Clone>(
    routes: &[ResolvedRouteDescriptor<M>],
    core: &[MiddlewareUse<M>],
) -> Vec<RouterStackEntry<M>> {
    StackBuilder::new(core.to_vec()).build(routes)
}

/// Flattens the registered stack of one route for one method, in execution
/// order
pub fn chain_for<M: Clone>(
    stack: &[RouterStackEntry<M>],
    route_name: &str,
    method: HttpMethod,
) -> Vec<M> {
    stack
        .iter()
        .filter(|entry| entry.name == route_name && entry.methods.contains(&method))
        .flat_map(|entry| entry.middleware.iter().cloned())
        .collect()
}

/// Identifies one callable of a resolved list: (definition, position)
type Key = (usize, usize);

fn fan_out<M: Clone>(
    entry: &RouteEntry,
    resolved: Vec<MiddlewareDefinition<M>>,
) -> Vec<RouterStackEntry<M>> {
    let stack_entry = |kind, methods, middleware, slot| RouterStackEntry {
        name: entry.name.clone(),
        path: entry.path_pattern.clone(),
        kind,
        methods,
        middleware,
        slot,
    };

    let mut out = Vec::new();
    let mut unslotted = Vec::new();

    for (idx, def) in resolved.iter().enumerate() {
        match def {
            MiddlewareDefinition::Middleware(def) if def.options.slot.is_some() => {
                out.push(stack_entry(
                    StackEntryKind::Middleware,
                    def.options.on.clone().unwrap_or_else(|| HttpMethod::ALL.to_vec()),
                    def.middleware.clone(),
                    def.options.slot.clone(),
                ));
            }
            _ => unslotted.push(idx),
        }
    }

    let has_handlers = resolved.iter().any(MiddlewareDefinition::is_handler);
    if !has_handlers {
        for idx in unslotted {
            if let MiddlewareDefinition::Middleware(def) = &resolved[idx] {
                out.push(stack_entry(
                    StackEntryKind::Middleware,
                    def.options.on.clone().unwrap_or_else(|| HttpMethod::ALL.to_vec()),
                    def.middleware.clone(),
                    None,
                ));
            }
        }
        return out;
    }

    // Per method: pre-handler middleware, handlers, post-handler middleware,
    // in resolved order. Methods with identical sequences share an entry.
    let mut groups: Vec<(Vec<Key>, Vec<HttpMethod>)> = Vec::new();
    for method in HttpMethod::ALL {
        let sequence: Vec<Key> = unslotted
            .iter()
            .filter(|&&idx| applies_to(&resolved[idx], method))
            .flat_map(|&idx| (0..resolved[idx].middleware().len()).map(move |pos| (idx, pos)))
            .collect();

        let has_handler = unslotted
            .iter()
            .any(|&idx| resolved[idx].is_handler() && applies_to(&resolved[idx], method));
        if !has_handler {
            continue;
        }

        match groups.iter_mut().find(|(keys, _)| *keys == sequence) {
            Some((_, methods)) => methods.push(method),
            None => groups.push((sequence, vec![method])),
        }
    }

    for (keys, methods) in groups {
        let middleware = keys
            .into_iter()
            .map(|(idx, pos)| resolved[idx].middleware()[pos].clone())
            .collect();
        out.push(stack_entry(StackEntryKind::Handler, methods, middleware, None));
    }

    out
}

fn applies_to<M>(def: &MiddlewareDefinition<M>, method: HttpMethod) -> bool {
    def.methods().map_or(true, |methods| methods.contains(&method))
}
