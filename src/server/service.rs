use super::request::parse_request;
use super::response::write_response;
use crate::app::App;
use crate::pipeline::{Context, Metrics, Response};
use crate::router::Router;
use crate::store::Store;
use may_minihttp::{HttpService, Request};
use serde_json::json;
use std::io;
use std::sync::Arc;
use tracing::{debug, info_span};

/// `may_minihttp` service: observability endpoints, then routing and the
/// interceptor pipeline.
#[derive(Clone)]
pub struct AppService {
    pub router: Arc<Router>,
    pub store: Arc<Store>,
    pub metrics: Arc<Metrics>,
}

impl AppService {
    #[must_use]
    pub fn new(app: &App) -> Self {
        Self {
            router: Arc::clone(&app.router),
            store: Arc::clone(&app.store),
            metrics: Arc::clone(&app.metrics),
        }
    }

    /// Route and run one request, independent of the transport.
    ///
    /// An unmatched request gets a 404 without starting a pipeline.
    #[must_use]
    pub fn handle(&self, request: crate::pipeline::Request) -> Response {
        let method = request.method.clone();
        let path = request.path.clone();
        let Some(matched) = self.router.route(method.clone(), &path) else {
            debug!(method = %method, path = %path, "no route");
            return Response::new(
                404,
                json!({ "error": "Not Found", "method": method.as_str(), "path": path }),
            );
        };

        let span = info_span!(
            "request",
            method = %method,
            path = %path,
            handler = %matched.route.handler_name
        );
        let _entered = span.enter();

        let mut ctx = Context::new(request);
        ctx.route = Some(Arc::clone(&matched.route));
        ctx.path_params = matched.path_params;
        let ctx = matched.chain.execute(ctx);
        ctx.response.unwrap_or_else(Response::not_found)
    }
}

/// Basic health check endpoint returning `{ "status": "ok" }`.
pub fn health_endpoint(res: &mut may_minihttp::Response) -> io::Result<()> {
    write_response(res, &Response::ok(json!({ "status": "ok" })));
    Ok(())
}

/// Metrics endpoint returning Prometheus text format statistics.
pub fn metrics_endpoint(
    res: &mut may_minihttp::Response,
    metrics: &Metrics,
    store: &Store,
) -> io::Result<()> {
    let mut response = Response::ok(serde_json::Value::String(metrics.render(store.conflicts())));
    response.set_header("content-type", "text/plain; version=0.0.4".to_string());
    write_response(res, &response);
    Ok(())
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut may_minihttp::Response) -> io::Result<()> {
        let request = parse_request(req);

        if request.method == http::Method::GET && request.path == "/health" {
            self.metrics.inc_top_level_request();
            return health_endpoint(res);
        }
        if request.method == http::Method::GET && request.path == "/metrics" {
            self.metrics.inc_top_level_request();
            return metrics_endpoint(res, &self.metrics, &self.store);
        }

        write_response(res, &self.handle(request));
        Ok(())
    }
}
