//! Stock interceptors shared by every route.

use super::context::{Context, ParamSource};
use super::core::Interceptor;
use super::response::Response;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Decodes the raw body according to its content type.
///
/// JSON lands in `json_params`, YAML in `yaml_params` and url-encoded forms in
/// `form_params`. A body that does not parse terminates with 400. Unknown
/// content types are left alone.
pub struct BodyParams;

impl Interceptor for BodyParams {
    fn name(&self) -> &str {
        "body-params"
    }

    fn enter(&self, ctx: &mut Context) {
        if ctx.request.body.is_empty() {
            return;
        }
        let Some(media_type) = ctx.request.media_type() else {
            debug!("body without content-type left unparsed");
            return;
        };
        let body = &ctx.request.body;
        let parsed = match media_type.as_str() {
            "application/json" => serde_json::from_slice::<Value>(body)
                .map(|v| ctx.json_params = Some(v))
                .map_err(|e| e.to_string()),
            "application/yaml" | "application/x-yaml" | "text/yaml" => {
                serde_yaml::from_slice::<Value>(body)
                    .map(|v| ctx.yaml_params = Some(v))
                    .map_err(|e| e.to_string())
            }
            "application/x-www-form-urlencoded" => {
                let form: Map<String, Value> = url::form_urlencoded::parse(body)
                    .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                    .collect();
                ctx.form_params = Some(form);
                Ok(())
            }
            other => {
                debug!(content_type = %other, "unsupported body content type left unparsed");
                Ok(())
            }
        };
        if let Err(error) = parsed {
            warn!(content_type = %media_type, error = %error, "malformed request body");
            ctx.terminate(Response::error(400, "Malformed request body"));
        }
    }
}

/// Unifies the alternate structured body encodings into `body_params`.
pub struct BodyMerge;

impl Interceptor for BodyMerge {
    fn name(&self) -> &str {
        "body-merge"
    }

    fn enter(&self, ctx: &mut Context) {
        if ctx.body_params.is_none() {
            ctx.body_params = ctx.json_params.clone().or_else(|| ctx.yaml_params.clone());
        }
    }
}

/// Canonical key form: lowercase, `_` and spaces replaced by `-`.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.trim()
        .chars()
        .map(|c| match c {
            '_' | ' ' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Normalizes the keys of form parameters and request headers.
pub struct NormalizeKeys;

impl Interceptor for NormalizeKeys {
    fn name(&self) -> &str {
        "normalize-keys"
    }

    fn enter(&self, ctx: &mut Context) {
        if let Some(form) = ctx.form_params.take() {
            ctx.form_params = Some(
                form.into_iter()
                    .map(|(k, v)| (normalize_key(&k), v))
                    .collect(),
            );
        }
        for (name, _) in ctx.request.headers.iter_mut() {
            if name.bytes().any(|b| b == b'_' || b.is_ascii_uppercase()) {
                *name = normalize_key(name).into();
            }
        }
    }
}

/// Validates the parameter sources the matched route declares schemas for.
///
/// Typed values go to `ctx.params`, failures to `ctx.errors`. Handlers decide
/// how to answer; this stage never terminates.
pub struct Coerce;

impl Interceptor for Coerce {
    fn name(&self) -> &str {
        "coerce"
    }

    fn enter(&self, ctx: &mut Context) {
        let Some(route) = ctx.route.clone() else {
            return;
        };
        for source in ParamSource::ALL {
            let Some(schema) = route.schemas.get(source) else {
                continue;
            };
            let raw = raw_params(ctx, source);
            match crate::schema::validate(schema, &raw) {
                Ok(typed) => ctx.params.set(source, typed),
                Err(error) => {
                    warn!(
                        handler = %route.handler_name,
                        source = source.as_str(),
                        schema = schema.name,
                        errors = %error,
                        "parameter validation failed"
                    );
                    ctx.errors.insert(source, error);
                }
            }
        }
    }
}

fn raw_params(ctx: &Context, source: ParamSource) -> Value {
    fn from_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a String)>) -> Value {
        Value::Object(
            pairs
                .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
                .collect(),
        )
    }
    match source {
        ParamSource::Path => from_pairs(ctx.path_params.iter().map(|(k, v)| (k.as_ref(), v))),
        ParamSource::Query => from_pairs(
            ctx.request
                .query_params
                .iter()
                .map(|(k, v)| (k.as_ref(), v)),
        ),
        ParamSource::Form => Value::Object(ctx.form_params.clone().unwrap_or_default()),
        ParamSource::Body => ctx.body_params.clone().unwrap_or(Value::Null),
    }
}

/// Logs request arrival and completion with status and latency.
pub struct RequestLog;

impl Interceptor for RequestLog {
    fn name(&self) -> &str {
        "request-log"
    }

    fn enter(&self, ctx: &mut Context) {
        debug!(
            method = %ctx.request.method,
            path = %ctx.request.path,
            handler = ctx.handler_name(),
            "request received"
        );
    }

    fn leave(&self, ctx: &mut Context) {
        let status = ctx.response.as_ref().map_or(0, |r| r.status);
        let latency_ms = ctx.started.elapsed().as_millis() as u64;
        info!(
            request_id = %ctx.request_id,
            method = %ctx.request.method,
            path = %ctx.request.path,
            handler = ctx.handler_name(),
            status,
            latency_ms,
            terminated = ctx.terminated,
            "request completed"
        );
    }
}

/// Prometheus-style request counters.
///
/// All counters are atomics updated with `Ordering::Relaxed`; the numbers are
/// eventually consistent and cheap to collect.
#[derive(Default)]
pub struct Metrics {
    request_count: AtomicUsize,
    total_latency_ns: AtomicU64,
    terminated: AtomicUsize,
    status_2xx: AtomicUsize,
    status_4xx: AtomicUsize,
    status_5xx: AtomicUsize,
    top_level_requests: AtomicUsize,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn terminated_count(&self) -> usize {
        self.terminated.load(Ordering::Relaxed)
    }

    /// Mean latency across completed pipeline runs.
    #[must_use]
    pub fn average_latency(&self) -> Duration {
        let count = self.request_count.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    /// Count of responses per status class: (2xx, 4xx, 5xx).
    #[must_use]
    pub fn status_classes(&self) -> (usize, usize, usize) {
        (
            self.status_2xx.load(Ordering::Relaxed),
            self.status_4xx.load(Ordering::Relaxed),
            self.status_5xx.load(Ordering::Relaxed),
        )
    }

    /// Count a request served outside the pipeline (`/health`, `/metrics`).
    pub fn inc_top_level_request(&self) {
        self.top_level_requests.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn top_level_request_count(&self) -> usize {
        self.top_level_requests.load(Ordering::Relaxed)
    }

    /// Prometheus text exposition.
    #[must_use]
    pub fn render(&self, store_conflicts: u64) -> String {
        let (ok, client, server) = self.status_classes();
        format!(
            "# HELP brrtpets_requests_total Total number of pipeline requests\n\
             # TYPE brrtpets_requests_total counter\n\
             brrtpets_requests_total {}\n\
             # HELP brrtpets_responses_total Responses by status class\n\
             # TYPE brrtpets_responses_total counter\n\
             brrtpets_responses_total{{class=\"2xx\"}} {}\n\
             brrtpets_responses_total{{class=\"4xx\"}} {}\n\
             brrtpets_responses_total{{class=\"5xx\"}} {}\n\
             # HELP brrtpets_terminated_total Pipelines ended by termination\n\
             # TYPE brrtpets_terminated_total counter\n\
             brrtpets_terminated_total {}\n\
             # HELP brrtpets_request_latency_seconds Average request latency in seconds\n\
             # TYPE brrtpets_request_latency_seconds gauge\n\
             brrtpets_request_latency_seconds {}\n\
             # HELP brrtpets_top_level_requests_total Requests served outside the pipeline\n\
             # TYPE brrtpets_top_level_requests_total counter\n\
             brrtpets_top_level_requests_total {}\n\
             # HELP brrtpets_store_conflicts_total Optimistic store update retries\n\
             # TYPE brrtpets_store_conflicts_total counter\n\
             brrtpets_store_conflicts_total {}\n",
            self.request_count(),
            ok,
            client,
            server,
            self.terminated_count(),
            self.average_latency().as_secs_f64(),
            self.top_level_request_count(),
            store_conflicts,
        )
    }
}

impl Interceptor for Metrics {
    fn name(&self) -> &str {
        "metrics"
    }

    fn enter(&self, _ctx: &mut Context) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    fn leave(&self, ctx: &mut Context) {
        self.total_latency_ns
            .fetch_add(ctx.started.elapsed().as_nanos() as u64, Ordering::Relaxed);
        if ctx.terminated {
            self.terminated.fetch_add(1, Ordering::Relaxed);
        }
        let counter = match ctx.response.as_ref().map_or(404, |r| r.status) {
            200..=399 => &self.status_2xx,
            400..=499 => &self.status_4xx,
            _ => &self.status_5xx,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Fills in a 404 when nothing responded and stamps `x-request-id`.
///
/// The id stays on the pipeline response for later stages and logs; the
/// transport does not write it.
pub struct ResponseDefaults;

impl Interceptor for ResponseDefaults {
    fn name(&self) -> &str {
        "response-defaults"
    }

    fn leave(&self, ctx: &mut Context) {
        let request_id = ctx.request_id.to_string();
        let response = ctx.response.get_or_insert_with(Response::not_found);
        response.set_header("x-request-id", request_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Request;
    use http::Method;
    use serde_json::json;

    fn ctx_with_body(content_type: &str, body: &str) -> Context {
        Context::new(Request::new(Method::POST, "/pet").with_body(content_type, body.as_bytes()))
    }

    #[test]
    fn test_body_params_json() {
        let mut ctx = ctx_with_body("application/json", r#"{"id": 1, "name": "Rex"}"#);
        BodyParams.enter(&mut ctx);
        assert_eq!(ctx.json_params, Some(json!({"id": 1, "name": "Rex"})));
        assert!(!ctx.terminated);
    }

    #[test]
    fn test_body_params_yaml_merges_into_body() {
        let mut ctx = ctx_with_body("application/yaml", "id: 2\nname: Tom\n");
        BodyParams.enter(&mut ctx);
        BodyMerge.enter(&mut ctx);
        assert_eq!(ctx.body_params, Some(json!({"id": 2, "name": "Tom"})));
    }

    #[test]
    fn test_body_params_form() {
        let mut ctx = ctx_with_body("application/x-www-form-urlencoded", "status=sold&Pet_Name=Rex+II");
        BodyParams.enter(&mut ctx);
        NormalizeKeys.enter(&mut ctx);
        let form = ctx.form_params.unwrap();
        assert_eq!(form.get("status"), Some(&json!("sold")));
        assert_eq!(form.get("pet-name"), Some(&json!("Rex II")));
    }

    #[test]
    fn test_malformed_json_terminates() {
        let mut ctx = ctx_with_body("application/json", "{not json");
        BodyParams.enter(&mut ctx);
        assert!(ctx.terminated);
        assert_eq!(ctx.response.unwrap().status, 400);
    }

    #[test]
    fn test_body_merge_keeps_existing() {
        let mut ctx = ctx_with_body("application/json", "{}");
        ctx.body_params = Some(json!({"already": true}));
        ctx.json_params = Some(json!({"id": 1}));
        BodyMerge.enter(&mut ctx);
        assert_eq!(ctx.body_params, Some(json!({"already": true})));
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("First_Name"), "first-name");
        assert_eq!(normalize_key("x-request-id"), "x-request-id");
    }

    #[test]
    fn test_response_defaults() {
        let mut ctx = Context::new(Request::new(Method::GET, "/nothing"));
        ResponseDefaults.leave(&mut ctx);
        let res = ctx.response.unwrap();
        assert_eq!(res.status, 404);
        assert_eq!(res.get_header("x-request-id"), Some(ctx.request_id.to_string().as_str()));
    }

    #[test]
    fn test_metrics_counts() {
        let metrics = Metrics::new();
        let mut ctx = Context::new(Request::new(Method::GET, "/pet"));
        metrics.enter(&mut ctx);
        ctx.respond(Response::ok(json!([])));
        metrics.leave(&mut ctx);
        assert_eq!(metrics.request_count(), 1);
        assert_eq!(metrics.status_classes(), (1, 0, 0));
        assert!(metrics.render(0).contains("brrtpets_requests_total 1"));
    }
}
