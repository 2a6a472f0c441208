//! # Router Module
//!
//! Path matching and per-route pipeline assembly.
//!
//! ## Overview
//!
//! A route table is declared as a tree of [`RouteNode`]s. Each node names a
//! path segment, may attach interceptors that every route beneath it
//! inherits, and may register one handler per HTTP method.
//!
//! [`Router::new`] compiles the table once at startup:
//!
//! 1. **Flattening**: every `(path, method)` pair gets its own [`Chain`](crate::pipeline::Chain),
//!    made of the interceptors attached from the root down to its node,
//!    in declaration order, followed by the handler.
//! 2. **Indexing**: the routes are inserted into a segment tree that is
//!    searched literal-first, then by parameter capture, then by wildcard.
//!
//! ## Example
//!
//! ```rust
//! use brrtpets::pipeline::{Context, Response};
//! use brrtpets::router::{RouteNode, RouteSpec, Router};
//! use http::Method;
//!
//! let table = RouteNode::root().child("pet", |pet| {
//!     pet.child(":id", |id| {
//!         id.route(RouteSpec::new("get_pet", Method::GET), |ctx: &mut Context| {
//!             ctx.respond(Response::ok_text())
//!         })
//!     })
//! });
//!
//! let router = Router::new(table);
//! let matched = router.route(Method::GET, "/pet/42").unwrap();
//! assert_eq!(matched.route.handler_name, "get_pet");
//! assert_eq!(matched.path_param("id"), Some("42"));
//! assert!(router.route(Method::DELETE, "/pet/42").is_none());
//! ```
//!
//! ## Performance
//!
//! Matching walks one tree level per path segment, so cost grows with path
//! depth rather than with the number of registered routes. Captured
//! parameters are stored inline in a [`ParamVec`] for the common case.

mod core;
mod tree;

pub use core::{ParamVec, ResponseMeta, RouteMatch, RouteMeta, RouteSchemas, Router, MAX_INLINE_PARAMS};
pub use tree::{RouteNode, RouteSpec, Segment};
