//! # Waymark Stack
//!
//! Composes the middleware stack of every route from three layers:
//! - core middleware supplied by the framework
//! - use-wrappers of a route file (and of its ancestor directories)
//! - the route's own definition items
//!
//! Slotted middleware occupies fixed pipeline stages and the last definition
//! of a slot wins; ad-hoc middleware is additive and keeps its declaration
//! position around the handlers.
//!
//! ## Example
//!
//! ```
//! use std::path::Path;
//! use waymark_router::{create_route_entry, ResolveContext, RouteFolder};
//! use waymark_stack::{
//!     build_stack, chain_for, define_route, get, post, use_middleware, HttpMethod,
//!     MiddlewareUse, ResolvedRouteDescriptor,
//! };
//!
//! let ctx = ResolveContext::new("src", RouteFolder::Api);
//! let entry = create_route_entry(Path::new("src/api/posts/index.rs"), &ctx)
//!     .unwrap()
//!     .unwrap();
//! let source = define_route(vec![
//!     use_middleware(["pre"]),
//!     get(["list"]),
//!     post(["create"]),
//!     use_middleware(["post"]),
//! ])
//! .unwrap();
//!
//! let core = vec![MiddlewareUse::new(["errors"]).with_slot("errorHandler")];
//! let stack = build_stack(&[ResolvedRouteDescriptor::new(entry, source)], &core);
//!
//! assert_eq!(
//!     chain_for(&stack, "posts", HttpMethod::Get),
//!     vec!["errors", "pre", "list", "post"]
//! );
//! ```

mod cascade;
mod definition;
mod error;
mod factory;
mod method;
mod resolver;
mod slot;

pub use cascade::WrapperTree;
pub use definition::{
    define_route, delete, get, handler, head, options, patch, post, put, use_middleware,
    use_with, HandlerDefinition, MiddlewareDefinition, MiddlewareUse, RouteSource, UseOptions,
};
pub use error::{Result, StackError};
pub use factory::{
    build_stack, chain_for, ResolvedRouteDescriptor, RouterStackEntry, StackBuilder,
    StackEntryKind,
};
pub use method::HttpMethod;
pub use resolver::{active_methods, resolve_stack, resolve_stack_with};
pub use slot::{SlotOrder, DEFAULT_SLOTS};
