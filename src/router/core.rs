use super::tree::{RouteNode, Segment};
use crate::pipeline::{Chain, Interceptor, ParamSource};
use crate::schema::Schema;
use http::Method;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum inline path parameters before heap allocation
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage; names are `Arc<str>` for O(1) clones.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Schemas a route declares per parameter source.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteSchemas {
    pub path: Option<&'static Schema>,
    pub query: Option<&'static Schema>,
    pub form: Option<&'static Schema>,
    pub body: Option<&'static Schema>,
}

impl RouteSchemas {
    #[must_use]
    pub fn get(&self, source: ParamSource) -> Option<&'static Schema> {
        match source {
            ParamSource::Path => self.path,
            ParamSource::Query => self.query,
            ParamSource::Form => self.form,
            ParamSource::Body => self.body,
        }
    }
}

/// Documented response of a route.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: u16,
    pub description: &'static str,
    pub schema: Option<&'static Schema>,
}

/// Static description of a compiled route.
#[derive(Debug, Clone)]
pub struct RouteMeta {
    pub method: Method,
    /// Table pattern, e.g. `/pet/:id`
    pub path_pattern: String,
    pub handler_name: String,
    pub summary: &'static str,
    pub schemas: RouteSchemas,
    pub responses: Vec<ResponseMeta>,
}

/// Result of a successful match: the route, its pipeline and the captures.
#[derive(Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteMeta>,
    pub chain: Arc<Chain>,
    pub path_params: ParamVec,
}

impl RouteMatch {
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
struct CompiledRoute {
    meta: Arc<RouteMeta>,
    chain: Arc<Chain>,
}

/// Node of the matching tree.
///
/// Static children are tried first, then parameter children (several are
/// allowed when sibling routes name the capture differently), then the
/// wildcard. Failed branches backtrack.
#[derive(Clone, Default)]
struct RadixNode {
    segment: String,
    routes: HashMap<Method, CompiledRoute>,
    param_name: Option<String>,
    children: Vec<RadixNode>,
    param_children: Vec<RadixNode>,
    wildcard: Option<(String, HashMap<Method, CompiledRoute>)>,
}

impl RadixNode {
    fn literal(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            ..Default::default()
        }
    }

    fn param(name: &str) -> Self {
        Self {
            param_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn insert(&mut self, segments: &[Segment], route: CompiledRoute) {
        let Some((segment, remaining)) = segments.split_first() else {
            let method = route.meta.method.clone();
            if self.routes.insert(method, route).is_some() {
                warn!("duplicate route replaced an earlier registration");
            }
            return;
        };

        match segment {
            Segment::Root => self.insert(remaining, route),
            Segment::Literal(lit) => {
                if let Some(child) = self.children.iter_mut().find(|c| &c.segment == lit) {
                    child.insert(remaining, route);
                    return;
                }
                let mut child = RadixNode::literal(lit);
                child.insert(remaining, route);
                self.children.push(child);
            }
            Segment::Param(name) => {
                if let Some(child) = self
                    .param_children
                    .iter_mut()
                    .find(|c| c.param_name.as_deref() == Some(name.as_str()))
                {
                    child.insert(remaining, route);
                    return;
                }
                let mut child = RadixNode::param(name);
                child.insert(remaining, route);
                self.param_children.push(child);
            }
            Segment::Wildcard(name) => {
                if !remaining.is_empty() {
                    warn!(
                        pattern = %route.meta.path_pattern,
                        "segments after a wildcard are unreachable; route ignored"
                    );
                    return;
                }
                let (_, routes) = self
                    .wildcard
                    .get_or_insert_with(|| (name.clone(), HashMap::new()));
                routes.insert(route.meta.method.clone(), route);
            }
        }
    }

    fn search(&self, segments: &[&str], method: &Method, params: &mut ParamVec) -> Option<CompiledRoute> {
        if let Some((segment, remaining)) = segments.split_first() {
            for child in &self.children {
                if child.segment == *segment {
                    if let Some(route) = child.search(remaining, method, params) {
                        return Some(route);
                    }
                }
            }

            for child in &self.param_children {
                if let Some(name) = &child.param_name {
                    params.push((Arc::from(name.as_str()), (*segment).to_string()));
                    if let Some(route) = child.search(remaining, method, params) {
                        return Some(route);
                    }
                    params.pop();
                }
            }
        } else if let Some(route) = self.routes.get(method) {
            return Some(route.clone());
        }

        let (name, routes) = self.wildcard.as_ref()?;
        let route = routes.get(method)?;
        params.push((Arc::from(name.as_str()), segments.join("/")));
        Some(route.clone())
    }
}

/// Matches `(method, path)` against the compiled route table.
///
/// Built once from a [`RouteNode`] tree; read-only afterwards. Each route's
/// pipeline is the concatenation of the interceptors attached from the root
/// down to its node, then the route's own interceptors, then its handler.
#[derive(Clone)]
pub struct Router {
    root: RadixNode,
    routes: Vec<Arc<RouteMeta>>,
}

impl Router {
    #[must_use]
    pub fn new(table: RouteNode) -> Self {
        let mut compiled = Vec::new();
        flatten(table, Vec::new(), Vec::new(), &mut compiled);

        let mut root = RadixNode::default();
        let mut routes = Vec::with_capacity(compiled.len());
        for (segments, route) in compiled {
            debug!(
                method = %route.meta.method,
                pattern = %route.meta.path_pattern,
                stages = ?route.chain.names(),
                "route compiled"
            );
            routes.push(Arc::clone(&route.meta));
            root.insert(&segments, route);
        }
        routes.sort_by(|a, b| {
            (a.path_pattern.as_str(), a.method.as_str())
                .cmp(&(b.path_pattern.as_str(), b.method.as_str()))
        });

        Self { root, routes }
    }

    /// Match a request. `None` when no route exists for the path and method.
    ///
    /// Segments are percent-decoded before matching, so literals compare
    /// against decoded text and captures bind decoded values.
    #[must_use]
    pub fn route(&self, method: Method, path: &str) -> Option<RouteMatch> {
        let decoded: Vec<Cow<'_, str>> = path
            .split('?')
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(decode_segment)
            .collect();
        let segments: Vec<&str> = decoded.iter().map(|s| &**s).collect();

        let mut path_params = ParamVec::new();
        let route = self.root.search(&segments, &method, &mut path_params)?;
        Some(RouteMatch {
            route: route.meta,
            chain: route.chain,
            path_params,
        })
    }

    /// Every route, ordered by pattern then method.
    #[must_use]
    pub fn routes(&self) -> &[Arc<RouteMeta>] {
        &self.routes
    }
}

/// Percent-decode one raw segment; invalid UTF-8 keeps the raw text.
fn decode_segment(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or_else(|err| {
        debug!(segment = %raw, error = %err, "segment is not valid percent-encoded UTF-8");
        Cow::Borrowed(raw)
    })
}

fn flatten(
    node: RouteNode,
    mut segments: Vec<Segment>,
    mut inherited: Vec<Arc<dyn Interceptor>>,
    out: &mut Vec<(Vec<Segment>, CompiledRoute)>,
) {
    if node.segment != Segment::Root {
        segments.push(node.segment);
    }
    inherited.extend(node.interceptors);

    for (spec, own, handler) in node.routes {
        let pattern = format!(
            "/{}",
            segments
                .iter()
                .map(Segment::pattern)
                .collect::<Vec<_>>()
                .join("/")
        );
        let mut stages = inherited.clone();
        stages.extend(own);
        let chain = Chain::new(stages).with_handler(&spec.handler_name, handler);
        out.push((
            segments.clone(),
            CompiledRoute {
                meta: Arc::new(spec.into_meta(pattern)),
                chain: Arc::new(chain),
            },
        ));
    }

    for child in node.children {
        flatten(child, segments.clone(), inherited.clone(), out);
    }
}
