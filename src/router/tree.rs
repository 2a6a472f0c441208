//! Route table declaration.
//!
//! A route table is a tree of path segments. Every node may carry an
//! interceptor list, inherited by all routes beneath it, and a handler per
//! HTTP method. Segments are literals (`pet`), single-segment captures
//! (`:id`) or a trailing wildcard capturing the rest of the path (`*path`).
//!
//! ```rust,ignore
//! let table = RouteNode::root()
//!     .interceptor(Arc::new(BodyParams))
//!     .child("pet", |pet| {
//!         pet.route(RouteSpec::new("list_pets", Method::GET), list_pets)
//!             .child(":id", |id| id.route(RouteSpec::new("get_pet", Method::GET), get_pet))
//!     });
//! ```

use crate::pipeline::{Handler, Interceptor};
use crate::router::core::{ResponseMeta, RouteMeta, RouteSchemas};
use crate::schema::Schema;
use http::Method;
use std::sync::Arc;

/// One path segment of the route tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Root,
    Literal(String),
    Param(String),
    Wildcard(String),
}

impl Segment {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix(':') {
            Segment::Param(name.to_string())
        } else if let Some(name) = raw.strip_prefix('*') {
            Segment::Wildcard(name.to_string())
        } else {
            Segment::Literal(raw.to_string())
        }
    }

    /// Pattern text as written in the table (`pet`, `:id`, `*path`).
    #[must_use]
    pub fn pattern(&self) -> String {
        match self {
            Segment::Root => String::new(),
            Segment::Literal(s) => s.clone(),
            Segment::Param(name) => format!(":{name}"),
            Segment::Wildcard(name) => format!("*{name}"),
        }
    }
}

/// Declarative description of one method on one path.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub handler_name: String,
    pub method: Method,
    pub summary: &'static str,
    pub schemas: RouteSchemas,
    pub responses: Vec<ResponseMeta>,
}

impl RouteSpec {
    #[must_use]
    pub fn new(handler_name: &str, method: Method) -> Self {
        Self {
            handler_name: handler_name.to_string(),
            method,
            summary: "",
            schemas: RouteSchemas::default(),
            responses: Vec::new(),
        }
    }

    #[must_use]
    pub fn summary(mut self, summary: &'static str) -> Self {
        self.summary = summary;
        self
    }

    #[must_use]
    pub fn body(mut self, schema: &'static Schema) -> Self {
        self.schemas.body = Some(schema);
        self
    }

    #[must_use]
    pub fn path(mut self, schema: &'static Schema) -> Self {
        self.schemas.path = Some(schema);
        self
    }

    #[must_use]
    pub fn form(mut self, schema: &'static Schema) -> Self {
        self.schemas.form = Some(schema);
        self
    }

    #[must_use]
    pub fn query(mut self, schema: &'static Schema) -> Self {
        self.schemas.query = Some(schema);
        self
    }

    #[must_use]
    pub fn responds(
        mut self,
        status: u16,
        description: &'static str,
        schema: Option<&'static Schema>,
    ) -> Self {
        self.responses.push(ResponseMeta {
            status,
            description,
            schema,
        });
        self
    }

    pub(crate) fn into_meta(self, path_pattern: String) -> RouteMeta {
        RouteMeta {
            method: self.method,
            path_pattern,
            handler_name: self.handler_name,
            summary: self.summary,
            schemas: self.schemas,
            responses: self.responses,
        }
    }
}

/// Builder node of the route table.
pub struct RouteNode {
    pub(crate) segment: Segment,
    pub(crate) interceptors: Vec<Arc<dyn Interceptor>>,
    pub(crate) routes: Vec<(RouteSpec, Vec<Arc<dyn Interceptor>>, Arc<dyn Handler>)>,
    pub(crate) children: Vec<RouteNode>,
}

impl RouteNode {
    #[must_use]
    pub fn root() -> Self {
        Self::new(Segment::Root)
    }

    fn new(segment: Segment) -> Self {
        Self {
            segment,
            interceptors: Vec::new(),
            routes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Attach an interceptor inherited by every route at or below this node.
    #[must_use]
    pub fn interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Attach several interceptors, in order.
    #[must_use]
    pub fn interceptors(mut self, interceptors: impl IntoIterator<Item = Arc<dyn Interceptor>>) -> Self {
        self.interceptors.extend(interceptors);
        self
    }

    /// Register the handler for `spec.method` at this node.
    #[must_use]
    pub fn route<H>(self, spec: RouteSpec, handler: H) -> Self
    where
        H: Handler + 'static,
    {
        self.route_with(spec, Vec::new(), handler)
    }

    /// Register a handler preceded by interceptors that apply to this
    /// method only (precondition loaders and the like).
    #[must_use]
    pub fn route_with<H>(
        mut self,
        spec: RouteSpec,
        interceptors: Vec<Arc<dyn Interceptor>>,
        handler: H,
    ) -> Self
    where
        H: Handler + 'static,
    {
        self.routes.push((spec, interceptors, Arc::new(handler)));
        self
    }

    /// Add a child segment and build it with `build`.
    #[must_use]
    pub fn child(mut self, segment: &str, build: impl FnOnce(RouteNode) -> RouteNode) -> Self {
        let node = build(RouteNode::new(Segment::parse(segment)));
        self.children.push(node);
        self
    }
}
