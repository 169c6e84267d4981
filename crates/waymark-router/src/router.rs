/// Runtime lookup over resolved route entries
///
/// Holds the index entries of one route folder sorted by match priority, each
/// with a compiled [`RouteMatcher`]. Layout entries are kept apart: they never
/// match a request themselves and are only looked up for a matched page.
use std::collections::BTreeMap;

use crate::entry::RouteEntry;
use crate::error::Result;
use crate::matcher::{RawParams, RouteMatcher};
use crate::params::{coerce_params, TypedParams};
use crate::path::normalize_path;
use crate::specificity::specificity_cmp;
use crate::token::{Part, PathToken};
use crate::tree::layout_chain;

#[derive(Debug, Clone)]
struct CompiledRoute {
    entry: RouteEntry,
    matcher: RouteMatcher,
}

/// Result of matching a request path
#[derive(Debug, Clone)]
pub struct RouteMatch<'r> {
    /// The matched route
    pub entry: &'r RouteEntry,
    /// Extracted parameters, percent-decoded, always strings
    pub params: RawParams,
}

impl RouteMatch<'_> {
    /// Typed view of the params, see [`coerce_params`]
    pub fn typed_params<S: AsRef<str>>(&self, numeric: &[S]) -> Result<TypedParams> {
        coerce_params(&self.params, &self.entry.params, numeric)
    }
}

/// First-match router over the entries of one route folder
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<CompiledRoute>,
    layouts: Vec<RouteEntry>,
    case_insensitive: bool,
}

impl Router {
    /// Creates a new router with default settings (case-sensitive)
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a router with case-insensitive matching of literal segments
    ///
    /// # Examples
    ///
    /// ```
    /// use waymark_router::Router;
    ///
    /// let router = Router::with_case_insensitive(true);
    /// assert!(router.is_case_insensitive());
    /// ```
    pub fn with_case_insensitive(case_insensitive: bool) -> Self {
        Self {
            case_insensitive,
            ..Self::default()
        }
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Adds an entry, replacing any route with the same name.
    ///
    /// Index entries are inserted at their specificity position so that
    /// [`Router::match_route`] can stop at the first hit.
    pub fn add_route(&mut self, entry: RouteEntry) -> Result<()> {
        self.remove_route(&entry.name);

        if entry.is_layout() {
            self.layouts.push(entry);
            return Ok(());
        }

        let matcher = entry.matcher(self.case_insensitive)?;
        let position = self.routes.partition_point(|route| {
            specificity_cmp(&route.entry.path_tokens, &entry.path_tokens)
                .then_with(|| route.entry.name.cmp(&entry.name))
                .is_lt()
        });
        self.routes.insert(position, CompiledRoute { entry, matcher });
        Ok(())
    }

    /// Adds an entry (builder style)
    pub fn with_route(mut self, entry: RouteEntry) -> Result<Self> {
        self.add_route(entry)?;
        Ok(self)
    }

    /// Adds several entries (builder style)
    pub fn with_routes<I>(mut self, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = RouteEntry>,
    {
        for entry in entries {
            self.add_route(entry)?;
        }
        Ok(self)
    }

    /// Removes a route or layout by name, returning it
    pub fn remove_route(&mut self, name: &str) -> Option<RouteEntry> {
        if let Some(idx) = self.routes.iter().position(|r| r.entry.name == name) {
            return Some(self.routes.remove(idx).entry);
        }
        self.layouts
            .iter()
            .position(|l| l.name == name)
            .map(|idx| self.layouts.remove(idx))
    }

    /// Matches a request path against the routes, most specific first.
    ///
    /// The path is normalized first (trailing and repeated slashes,
    /// backslashes, query strings).
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use waymark_router::{create_route_entry, ResolveContext, RouteFolder, Router};
    ///
    /// let ctx = ResolveContext::new("src", RouteFolder::Api);
    /// let entry = |file: &str| create_route_entry(Path::new(file), &ctx).unwrap().unwrap();
    ///
    /// let router = Router::new()
    ///     .with_route(entry("src/api/users/[id]/index.rs")).unwrap()
    ///     .with_route(entry("src/api/users/me/index.rs")).unwrap();
    ///
    /// assert_eq!(router.match_route("/users/me/").unwrap().entry.name, "users/me");
    ///
    /// let by_id = router.match_route("/users/123").unwrap();
    /// assert_eq!(by_id.params["id"], "123");
    /// ```
    pub fn match_route(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = normalize_path(path);
        self.routes.iter().find_map(|route| {
            route.matcher.captures(&path).map(|params| RouteMatch {
                entry: &route.entry,
                params,
            })
        })
    }

    /// Index entries in match order
    pub fn routes(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter().map(|route| &route.entry)
    }

    pub fn layouts(&self) -> &[RouteEntry] {
        &self.layouts
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Gets a route or layout by its name
    pub fn get_route_by_name(&self, name: &str) -> Option<&RouteEntry> {
        self.routes()
            .find(|entry| entry.name == name)
            .or_else(|| self.layouts.iter().find(|layout| layout.name == name))
    }

    /// Layouts wrapping a matched page, root first
    pub fn layouts_for(&self, page: &RouteEntry) -> Vec<&RouteEntry> {
        layout_chain(&self.layouts, page)
    }

    /// Generates a URL for a named route.
    ///
    /// Returns `None` if the route does not exist or a required param is
    /// missing. Optional groups whose params are missing are left out; values
    /// are percent-encoded (splats per segment).
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use std::path::Path;
    /// use waymark_router::{create_route_entry, ResolveContext, RouteFolder, Router};
    ///
    /// let ctx = ResolveContext::new("src", RouteFolder::Api);
    /// let entry = create_route_entry(Path::new("src/api/posts/[year]/[[slug]]/index.rs"), &ctx)
    ///     .unwrap()
    ///     .unwrap();
    /// let router = Router::new().with_route(entry).unwrap();
    ///
    /// let mut params = BTreeMap::new();
    /// params.insert("year".to_string(), "2024".to_string());
    /// assert_eq!(router.url_for("posts/[year]/[[slug]]", &params).unwrap(), "/posts/2024");
    ///
    /// params.insert("slug".to_string(), "hello world".to_string());
    /// assert_eq!(
    ///     router.url_for("posts/[year]/[[slug]]", &params).unwrap(),
    ///     "/posts/2024/hello%20world"
    /// );
    /// ```
    pub fn url_for(&self, name: &str, params: &BTreeMap<String, String>) -> Option<String> {
        self.get_route_by_name(name)
            .and_then(|entry| render_url(&entry.path_tokens, params))
    }

    /// Convenience variant of [`Router::url_for`] taking parameter tuples
    pub fn url_for_params(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        let param_map: BTreeMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        self.url_for(name, &param_map)
    }
}

/// Renders a concrete URL from route tokens
pub fn render_url(tokens: &[PathToken], params: &BTreeMap<String, String>) -> Option<String> {
    let mut url = String::new();

    for token in tokens {
        match render_url_parts(&token.parts, params) {
            Some(segment) => {
                url.push('/');
                url.push_str(&segment);
            }
            None if token.optional => {}
            None => return None,
        }
    }

    if url.is_empty() {
        url.push('/');
    }
    Some(url)
}

fn render_url_parts(parts: &[Part], params: &BTreeMap<String, String>) -> Option<String> {
    let mut out = String::new();

    for part in parts {
        match part {
            Part::Text(text) => out.push_str(text),
            Part::Param(name) => {
                let value = params.get(name).filter(|v| !v.is_empty())?;
                out.push_str(&urlencoding::encode(value));
            }
            Part::Rest(name) => {
                let value = params.get(name)?;
                let encoded = value
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(|segment| urlencoding::encode(segment).into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                if encoded.is_empty() {
                    return None;
                }
                out.push_str(&encoded);
            }
            Part::Group(inner) => {
                if let Some(rendered) = render_url_parts(inner, params) {
                    out.push_str(&rendered);
                }
            }
        }
    }

    Some(out)
}
