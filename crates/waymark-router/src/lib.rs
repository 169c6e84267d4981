//! # Waymark Router
//!
//! Route model for convention-based route sources:
//! - Path tokenizer folding every supported path dialect into one token stream
//!   (`:id`, `{:id}`, `{...rest}`, `*rest`, `[id]`, `[[id]]`, `[...rest]`)
//! - Route entry resolver mapping route files to [`RouteEntry`] values
//! - Nested route tree for layout composition
//! - Specificity ordering so static routes win over parametric ones
//! - Runtime matcher, typed param coercion and URL generation
//!
//! ## Example
//!
//! ```
//! use std::path::Path;
//! use waymark_router::{create_route_entry, ResolveContext, RouteFolder, Router};
//!
//! let ctx = ResolveContext::new("src", RouteFolder::Api);
//! let entry = create_route_entry(Path::new("src/api/users/[id]/index.rs"), &ctx)
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(entry.path_pattern, "/users/:id");
//!
//! let router = Router::new().with_route(entry).unwrap();
//! let route_match = router.match_route("/users/123").unwrap();
//! assert_eq!(route_match.params["id"], "123");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod entry;
mod error;
mod matcher;
mod params;
pub mod path;
mod router;
mod specificity;
pub mod token;
mod tree;

// ============================================================================
// Re-exports
// ============================================================================

pub use entry::{create_route_entry, ResolveContext, RouteEntry, RouteFileKind, RouteFolder};
pub use error::{Result, RouterError};
pub use matcher::{RawParams, RouteMatcher};
pub use params::{coerce_params, TypedParams};
pub use path::{is_valid_path, normalize_path, PathHierarchy};
pub use router::{render_url, RouteMatch, Router};
pub use specificity::{sort_by_specificity, specificity_cmp};
pub use token::{render_pattern, tokenize, Part, PathParam, PathToken, PathTokens, SegmentKind};
pub use tree::{build_tree, layout_chain, NestedRouteEntry};
