/// Middleware slot resolution
///
/// Merges the three middleware layers of a route into one ordered definition
/// list. Layers are folded once, lowest precedence first:
///
/// 1. core middleware
/// 2. use-wrappers of the route file
/// 3. the route's own definition items
///
/// A slotted definition replaces whatever occupied its slot before, across
/// layers and within a layer, so the last occurrence wins. Ad-hoc middleware
/// is never replaced.
///
/// Output order: slots in canonical order, ad-hoc core and wrapper middleware,
/// the route's pre-handler middleware, handlers, post-handler middleware.
use std::collections::BTreeMap;

use tracing::debug;

use crate::definition::{
    HandlerDefinition, MiddlewareDefinition, MiddlewareUse, RouteSource, UseOptions,
};
use crate::method::HttpMethod;
use crate::slot::SlotOrder;

#[derive(Debug, Clone, Copy)]
enum Layer {
    Core,
    Wrapper,
    Route,
}

struct SlotEntry<'a, M> {
    slot: &'a str,
    def: &'a MiddlewareUse<M>,
    layer: Layer,
}

/// Resolves a route's middleware layers with the default slot order
///
/// # Examples
///
/// ```
/// use waymark_stack::{
///     define_route, get, resolve_stack, use_with, MiddlewareUse, UseOptions,
/// };
///
/// let core = vec![MiddlewareUse::new(["core-auth"]).with_slot("auth")];
/// let route = define_route(vec![
///     use_with(["route-auth"], UseOptions::slot("auth")),
///     get(["list"]),
/// ])
/// .unwrap();
///
/// let resolved = resolve_stack(&route, &core);
/// assert_eq!(resolved.len(), 2);
/// assert_eq!(resolved[0].slot(), Some("auth"));
/// assert_eq!(resolved[0].middleware(), &["route-auth"]);
/// ```
pub fn resolve_stack<M: Clone>(
    source: &RouteSource<M>,
    core: &[MiddlewareUse<M>],
) -> Vec<MiddlewareDefinition<M>> {
    resolve_stack_with(source, core, &SlotOrder::default())
}

/// Resolves a route's middleware layers with a custom slot order.
///
/// Middleware whose `on` filter shares no method with the route's active
/// methods is dropped. Adjacent ad-hoc definitions applying to the same
/// methods are merged into one.
pub fn resolve_stack_with<M: Clone>(
    source: &RouteSource<M>,
    core: &[MiddlewareUse<M>],
    order: &SlotOrder,
) -> Vec<MiddlewareDefinition<M>> {
    let active = active_methods(source);

    let mut slots = BTreeMap::new();
    let mut layered = Vec::new();
    let mut pre = Vec::new();
    let mut pending = Vec::new();
    let mut handlers: Vec<&HandlerDefinition<M>> = Vec::new();

    for def in core {
        if !occupy(&mut slots, order, def, Layer::Core) {
            layered.push(def);
        }
    }
    for def in &source.use_wrappers {
        if !occupy(&mut slots, order, def, Layer::Wrapper) {
            layered.push(def);
        }
    }
    for item in &source.definition_items {
        match item {
            MiddlewareDefinition::Middleware(def) => {
                if !occupy(&mut slots, order, def, Layer::Route) {
                    pending.push(def);
                }
            }
            // Everything declared before a handler runs ahead of handlers
            MiddlewareDefinition::Handler(def) => {
                pre.append(&mut pending);
                handlers.push(def);
            }
        }
    }
    let (pre, post) = if handlers.is_empty() {
        (pending, Vec::new())
    } else {
        (pre, pending)
    };

    let mut resolved = Vec::new();

    for entry in slots.values() {
        if let Some(methods) = applicable(entry.def, &active) {
            resolved.push(MiddlewareDefinition::Middleware(MiddlewareUse {
                middleware: entry.def.middleware.clone(),
                options: UseOptions {
                    slot: Some(entry.slot.to_string()),
                    on: Some(methods),
                },
            }));
        }
    }

    push_ad_hoc(&mut resolved, layered.into_iter().chain(pre), &active);
    resolved.extend(
        handlers
            .into_iter()
            .map(|def| MiddlewareDefinition::Handler(def.clone())),
    );
    push_ad_hoc(&mut resolved, post, &active);

    resolved
}

/// Methods a route answers: its handler methods, or every method when it
/// declares no handler
pub fn active_methods<M>(source: &RouteSource<M>) -> Vec<HttpMethod> {
    let methods = source.handler_methods();
    if methods.is_empty() {
        HttpMethod::ALL.to_vec()
    } else {
        methods
    }
}

/// Places a slotted definition, returning `false` for ad-hoc middleware
fn occupy<'a, M>(
    slots: &mut BTreeMap<usize, SlotEntry<'a, M>>,
    order: &SlotOrder,
    def: &'a MiddlewareUse<M>,
    layer: Layer,
) -> bool {
    let Some(slot) = def.slot() else {
        return false;
    };
    let Some(position) = order.position(slot) else {
        debug!(slot, "unrecognized slot, treated as ad-hoc middleware");
        return false;
    };

    if let Some(previous) = slots.insert(position, SlotEntry { slot, def, layer }) {
        debug!(slot, replaced = ?previous.layer, by = ?layer, "slot overridden");
    }
    true
}

fn applicable<M>(def: &MiddlewareUse<M>, active: &[HttpMethod]) -> Option<Vec<HttpMethod>> {
    let methods: Vec<HttpMethod> = match &def.options.on {
        None => active.to_vec(),
        Some(on) => active.iter().copied().filter(|m| on.contains(m)).collect(),
    };

    if methods.is_empty() {
        debug!(
            slot = ?def.slot(),
            on = ?def.options.on,
            "middleware applies to no active method, dropped"
        );
        return None;
    }
    Some(methods)
}

fn push_ad_hoc<'a, M: Clone + 'a>(
    out: &mut Vec<MiddlewareDefinition<M>>,
    defs: impl IntoIterator<Item = &'a MiddlewareUse<M>>,
    active: &[HttpMethod],
) {
    for def in defs {
        let Some(methods) = applicable(def, active) else {
            continue;
        };

        if let Some(MiddlewareDefinition::Middleware(last)) = out.last_mut() {
            if last.options.slot.is_none() && last.options.on.as_ref() == Some(&methods) {
                last.middleware.extend(def.middleware.iter().cloned());
                continue;
            }
        }

        out.push(MiddlewareDefinition::Middleware(MiddlewareUse {
            middleware: def.middleware.clone(),
            options: UseOptions {
                slot: None,
                on: Some(methods),
            },
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{define_route, get, handler, post, use_middleware, use_with};
    use pretty_assertions::assert_eq;

    type Def = MiddlewareDefinition<&'static str>;

    fn flat(defs: &[Def]) -> Vec<&'static str> {
        defs.iter().flat_map(|d| d.middleware().iter().copied()).collect()
    }

    #[test]
    fn test_last_occurrence_in_a_layer_wins() {
        let route = define_route(vec![
            use_with(["first"], UseOptions::slot("auth")),
            use_with(["second"], UseOptions::slot("auth")),
            get(["h"]),
        ])
        .unwrap();
        let resolved = resolve_stack(&route, &[]);
        assert_eq!(flat(&resolved), vec!["second", "h"]);
    }

    #[test]
    fn test_slots_follow_canonical_order() {
        let route = define_route(vec![
            use_with(["payload"], UseOptions::slot("payload")),
            use_with(["params"], UseOptions::slot("params")),
            get(["h"]),
        ])
        .unwrap();
        let core = vec![MiddlewareUse::new(["errors"]).with_slot("errorHandler")];
        let resolved = resolve_stack(&route, &core);
        assert_eq!(flat(&resolved), vec!["errors", "params", "payload", "h"]);
    }

    #[test]
    fn test_slots_precede_pre_handler_middleware() {
        let route = define_route(vec![
            use_middleware(["pre"]),
            use_with(["validate"], UseOptions::slot("validateParams")),
            get(["h"]),
        ])
        .unwrap();
        let resolved = resolve_stack(&route, &[]);
        assert_eq!(flat(&resolved), vec!["validate", "pre", "h"]);
        assert_eq!(resolved[0].slot(), Some("validateParams"));
        assert_eq!(resolved[1].slot(), None);
    }

    #[test]
    fn test_unknown_slot_is_ad_hoc() {
        let route = define_route(vec![
            use_with(["limit"], UseOptions::slot("rateLimit")),
            use_with(["limit2"], UseOptions::slot("rateLimit")),
            get(["h"]),
        ])
        .unwrap();
        let resolved = resolve_stack(&route, &[]);
        // both kept, merged into one ad-hoc definition
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].slot(), None);
        assert_eq!(resolved[0].middleware(), &["limit", "limit2"]);
    }

    #[test]
    fn test_middleware_between_handlers_is_pre_handler() {
        let route = define_route(vec![
            use_middleware(["a"]),
            get(["g"]),
            use_middleware(["b"]),
            post(["p"]),
            use_middleware(["c"]),
        ])
        .unwrap();
        let resolved = resolve_stack(&route, &[]);
        assert_eq!(flat(&resolved), vec!["a", "b", "g", "p", "c"]);
        assert!(resolved[1].is_handler());
        assert!(resolved[2].is_handler());
    }

    #[test]
    fn test_on_filter_is_intersected_with_active_methods() {
        let route = define_route(vec![
            use_with(["only-post"], UseOptions::on([HttpMethod::Post])),
            use_with(["only-delete"], UseOptions::on([HttpMethod::Delete])),
            handler([HttpMethod::Get, HttpMethod::Post], ["h"]),
        ])
        .unwrap();
        let resolved = resolve_stack(&route, &[]);
        assert_eq!(flat(&resolved), vec!["only-post", "h"]);
        assert_eq!(resolved[0].methods(), Some(&[HttpMethod::Post][..]));
    }

    #[test]
    fn test_route_without_handlers_applies_to_all_methods() {
        let route = define_route(vec![use_middleware(["static-files"])]).unwrap();
        let resolved = resolve_stack(&route, &[]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].methods(), Some(&HttpMethod::ALL[..]));
    }

    #[test]
    fn test_core_ad_hoc_runs_before_route_middleware() {
        let route = define_route(vec![use_middleware(["route"]), get(["h"])]).unwrap();
        let core = vec![
            MiddlewareUse::new(["timing"]),
            MiddlewareUse::new(["errors"]).with_slot("errorHandler"),
        ];
        let resolved = resolve_stack(&route, &core);
        assert_eq!(flat(&resolved), vec!["errors", "timing", "route", "h"]);
    }

    #[test]
    fn test_custom_slot_order() {
        let route = define_route(vec![
            use_with(["a"], UseOptions::slot("first")),
            use_with(["b"], UseOptions::slot("second")),
            get(["h"]),
        ])
        .unwrap();
        let order = SlotOrder::new(["second", "first"]);
        let resolved = resolve_stack_with(&route, &[], &order);
        assert_eq!(flat(&resolved), vec!["b", "a", "h"]);
    }
}
