/// Middleware definitions and the route definition DSL
///
/// A route file declares an ordered list of definition items: `use_*` items
/// (slotted or ad-hoc middleware) and method handlers. The middleware type is
/// generic, so the same model serves real callables at runtime and plain
/// labels in tooling.
use serde::Serialize;

use crate::error::{Result, StackError};
use crate::method::{canonical, HttpMethod};

/// Options of a `use` item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UseOptions {
    /// Pipeline slot this middleware occupies; `None` for ad-hoc middleware
    pub slot: Option<String>,
    /// Methods this middleware is restricted to; `None` for all active methods
    pub on: Option<Vec<HttpMethod>>,
}

impl UseOptions {
    pub fn slot(slot: impl Into<String>) -> Self {
        Self::default().with_slot(slot)
    }

    pub fn on(methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        Self::default().with_on(methods)
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    pub fn with_on(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.on = Some(canonical(methods));
        self
    }
}

/// Middleware applied across methods, optionally occupying a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiddlewareUse<M> {
    pub middleware: Vec<M>,
    pub options: UseOptions,
}

impl<M> MiddlewareUse<M> {
    /// Ad-hoc middleware for all methods
    ///
    /// # Examples
    ///
    /// ```
    /// use waymark_stack::{HttpMethod, MiddlewareUse};
    ///
    /// let auth = MiddlewareUse::new(["session"])
    ///     .with_slot("auth")
    ///     .with_on([HttpMethod::Post]);
    /// assert_eq!(auth.options.slot.as_deref(), Some("auth"));
    /// ```
    pub fn new(middleware: impl IntoIterator<Item = M>) -> Self {
        Self {
            middleware: middleware.into_iter().collect(),
            options: UseOptions::default(),
        }
    }

    pub fn with_options(mut self, options: UseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.options.slot = Some(slot.into());
        self
    }

    pub fn with_on(mut self, methods: impl IntoIterator<Item = HttpMethod>) -> Self {
        self.options.on = Some(canonical(methods));
        self
    }

    pub fn slot(&self) -> Option<&str> {
        self.options.slot.as_deref()
    }
}

/// Terminal route action for one or more methods
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerDefinition<M> {
    pub methods: Vec<HttpMethod>,
    pub middleware: Vec<M>,
}

/// One definition item of a route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MiddlewareDefinition<M> {
    Middleware(MiddlewareUse<M>),
    Handler(HandlerDefinition<M>),
}

impl<M> MiddlewareDefinition<M> {
    pub fn middleware(&self) -> &[M] {
        match self {
            MiddlewareDefinition::Middleware(def) => &def.middleware,
            MiddlewareDefinition::Handler(def) => &def.middleware,
        }
    }

    /// Slot of a middleware item; handlers never occupy a slot
    pub fn slot(&self) -> Option<&str> {
        match self {
            MiddlewareDefinition::Middleware(def) => def.slot(),
            MiddlewareDefinition::Handler(_) => None,
        }
    }

    /// Explicit method list: handler methods or a middleware `on` filter
    pub fn methods(&self) -> Option<&[HttpMethod]> {
        match self {
            MiddlewareDefinition::Middleware(def) => def.options.on.as_deref(),
            MiddlewareDefinition::Handler(def) => Some(&def.methods),
        }
    }

    pub fn is_handler(&self) -> bool {
        matches!(self, MiddlewareDefinition::Handler(_))
    }
}

/// Everything a route file declares about its middleware
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSource<M> {
    /// The route's own items, in declaration order
    pub definition_items: Vec<MiddlewareDefinition<M>>,
    /// Overrides applying to the whole route file
    pub use_wrappers: Vec<MiddlewareUse<M>>,
}

impl<M> RouteSource<M> {
    /// Source with the given items and no wrappers; not validated
    pub fn new(definition_items: Vec<MiddlewareDefinition<M>>) -> Self {
        Self {
            definition_items,
            use_wrappers: Vec::new(),
        }
    }

    pub fn with_wrappers(mut self, wrappers: impl IntoIterator<Item = MiddlewareUse<M>>) -> Self {
        self.use_wrappers.extend(wrappers);
        self
    }

    /// Union of handler methods in canonical order; empty without handlers
    pub fn handler_methods(&self) -> Vec<HttpMethod> {
        canonical(self.definition_items.iter().flat_map(|item| match item {
            MiddlewareDefinition::Handler(def) => def.methods.clone(),
            MiddlewareDefinition::Middleware(_) => Vec::new(),
        }))
    }
}

// ============================================================================
// DSL
// ============================================================================

/// Validates definition items into a route source.
///
/// # Errors
///
/// An item without middleware, a handler without methods, or an `on` filter
/// naming no method.
///
/// # Examples
///
/// ```
/// use waymark_stack::{define_route, get, use_middleware, StackError};
///
/// let route = define_route(vec![use_middleware(["log"]), get(["list"])]).unwrap();
/// assert_eq!(route.definition_items.len(), 2);
///
/// let err = define_route(vec![get(Vec::<&str>::new())]).unwrap_err();
/// assert_eq!(err, StackError::EmptyMiddleware { index: 0 });
/// ```
pub fn define_route<M>(items: Vec<MiddlewareDefinition<M>>) -> Result<RouteSource<M>> {
    for (index, item) in items.iter().enumerate() {
        if item.middleware().is_empty() {
            return Err(StackError::EmptyMiddleware { index });
        }
        match item {
            MiddlewareDefinition::Handler(def) if def.methods.is_empty() => {
                return Err(StackError::NoMethods { index });
            }
            MiddlewareDefinition::Middleware(def)
                if def.options.on.as_ref().is_some_and(|on| on.is_empty()) =>
            {
                return Err(StackError::EmptyMethodFilter { index });
            }
            _ => {}
        }
    }

    Ok(RouteSource::new(items))
}

/// Ad-hoc middleware for every active method
pub fn use_middleware<M>(middleware: impl IntoIterator<Item = M>) -> MiddlewareDefinition<M> {
    MiddlewareDefinition::Middleware(MiddlewareUse::new(middleware))
}

/// Middleware with a slot and/or method filter
pub fn use_with<M>(
    middleware: impl IntoIterator<Item = M>,
    options: UseOptions,
) -> MiddlewareDefinition<M> {
    MiddlewareDefinition::Middleware(MiddlewareUse::new(middleware).with_options(options))
}

/// Handler for the given methods
pub fn handler<M>(
    methods: impl IntoIterator<Item = HttpMethod>,
    middleware: impl IntoIterator<Item = M>,
) -> MiddlewareDefinition<M> {
    MiddlewareDefinition::Handler(HandlerDefinition {
        methods: canonical(methods),
        middleware: middleware.into_iter().collect(),
    })
}

pub fn get<M>(middleware: impl IntoIterator<Item = M>) -> MiddlewareDefinition<M> {
    handler([HttpMethod::Get], middleware)
}

pub fn post<M>(middleware: impl IntoIterator<Item = M>) -> MiddlewareDefinition<M> {
    handler([HttpMethod::Post], middleware)
}

pub fn put<M>(middleware: impl IntoIterator<Item = M>) -> MiddlewareDefinition<M> {
    handler([HttpMethod::Put], middleware)
}

pub fn patch<M>(middleware: impl IntoIterator<Item = M>) -> MiddlewareDefinition<M> {
    handler([HttpMethod::Patch], middleware)
}

pub fn delete<M>(middleware: impl IntoIterator<Item = M>) -> MiddlewareDefinition<M> {
    handler([HttpMethod::Delete], middleware)
}

pub fn head<M>(middleware: impl IntoIterator<Item = M>) -> MiddlewareDefinition<M> {
    handler([HttpMethod::Head], middleware)
}

pub fn options<M>(middleware: impl IntoIterator<Item = M>) -> MiddlewareDefinition<M> {
    handler([HttpMethod::Options], middleware)
}
