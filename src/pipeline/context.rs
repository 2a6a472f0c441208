use super::response::{HeaderVec, Response};
use crate::ids::RequestId;
use crate::router::{ParamVec, RouteMeta};
use crate::schema::SchemaError;
use http::Method;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

/// Request data as handed over by the transport.
///
/// Header names are lowercase. The body is kept raw; turning it into a
/// structured value is the job of the body-parsing interceptor.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: HeaderVec,
    pub query_params: ParamVec,
    pub body: Vec<u8>,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderVec::new(),
            query_params: ParamVec::new(),
            body: Vec::new(),
        }
    }

    /// Builder: add a header (name lowercased).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .push((Arc::from(name.to_ascii_lowercase()), value.into()));
        self
    }

    /// Builder: add a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query_params.push((Arc::from(name), value.into()));
        self
    }

    /// Builder: set the raw body and its content type.
    #[must_use]
    pub fn with_body(self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        let mut req = self.with_header("content-type", content_type);
        req.body = body.into();
        req
    }

    /// Header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Media type of the body without parameters, lowercased.
    #[must_use]
    pub fn media_type(&self) -> Option<String> {
        self.header("content-type").map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }
}

/// Parameter source a schema applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParamSource {
    Path,
    Query,
    Form,
    Body,
}

impl ParamSource {
    pub const ALL: [ParamSource; 4] = [
        ParamSource::Path,
        ParamSource::Query,
        ParamSource::Form,
        ParamSource::Body,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamSource::Path => "path-params",
            ParamSource::Query => "query-params",
            ParamSource::Form => "form-params",
            ParamSource::Body => "body-params",
        }
    }
}

/// Coerced parameter values, one slot per source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedParams {
    pub path: Option<Value>,
    pub query: Option<Value>,
    pub form: Option<Value>,
    pub body: Option<Value>,
}

impl TypedParams {
    #[must_use]
    pub fn get(&self, source: ParamSource) -> Option<&Value> {
        match source {
            ParamSource::Path => self.path.as_ref(),
            ParamSource::Query => self.query.as_ref(),
            ParamSource::Form => self.form.as_ref(),
            ParamSource::Body => self.body.as_ref(),
        }
    }

    pub fn set(&mut self, source: ParamSource, value: Value) {
        let slot = match source {
            ParamSource::Path => &mut self.path,
            ParamSource::Query => &mut self.query,
            ParamSource::Form => &mut self.form,
            ParamSource::Body => &mut self.body,
        };
        *slot = Some(value);
    }
}

/// Validation failures keyed by parameter source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(BTreeMap<ParamSource, SchemaError>);

impl ValidationErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, source: ParamSource, error: SchemaError) {
        self.0.insert(source, error);
    }

    #[must_use]
    pub fn get(&self, source: ParamSource) -> Option<&SchemaError> {
        self.0.get(&source)
    }

    /// `{"body-params": {...}, "path-params": {...}}`
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(source, err)| (source.as_str().to_string(), err.to_value()))
            .collect();
        Value::Object(map)
    }
}

/// Per-request state threaded through every pipeline stage.
///
/// Created when the request arrives, owned by exactly one pipeline run and
/// dropped once the response has been written.
#[derive(Debug)]
pub struct Context {
    pub request_id: RequestId,
    pub request: Request,
    /// Matched route, set by the router before the pipeline starts
    pub route: Option<Arc<RouteMeta>>,
    pub path_params: ParamVec,
    /// Body decoded from `application/json`
    pub json_params: Option<Value>,
    /// Body decoded from `application/yaml`
    pub yaml_params: Option<Value>,
    /// Body decoded from `application/x-www-form-urlencoded`
    pub form_params: Option<Map<String, Value>>,
    /// Canonical structured body, whatever its wire encoding
    pub body_params: Option<Value>,
    pub params: TypedParams,
    pub errors: ValidationErrors,
    pub response: Option<Response>,
    pub terminated: bool,
    pub attachments: HashMap<String, Value>,
    pub started: Instant,
}

impl Context {
    #[must_use]
    pub fn new(request: Request) -> Self {
        let request_id = RequestId::from_header_or_new(request.header("x-request-id"));
        Self {
            request_id,
            request,
            route: None,
            path_params: ParamVec::new(),
            json_params: None,
            yaml_params: None,
            form_params: None,
            body_params: None,
            params: TypedParams::default(),
            errors: ValidationErrors::default(),
            response: None,
            terminated: false,
            attachments: HashMap::new(),
            started: Instant::now(),
        }
    }

    /// Set the final response and stop the enter phase.
    pub fn terminate(&mut self, response: Response) {
        self.response = Some(response);
        self.terminated = true;
    }

    pub fn respond(&mut self, response: Response) {
        self.response = Some(response);
    }

    /// Raw path parameter (last occurrence wins).
    #[inline]
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Coerced field from the given source.
    #[must_use]
    pub fn param(&self, source: ParamSource, field: &str) -> Option<&Value> {
        self.params.get(source)?.get(field)
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn attach(&mut self, key: &str, value: Value) {
        self.attachments.insert(key.to_string(), value);
    }

    #[must_use]
    pub fn attachment(&self, key: &str) -> Option<&Value> {
        self.attachments.get(key)
    }

    /// Handler name of the matched route, or `-`.
    #[must_use]
    pub fn handler_name(&self) -> &str {
        self.route.as_deref().map_or("-", |r| r.handler_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_type_strips_parameters() {
        let req = Request::new(Method::POST, "/pet")
            .with_body("Application/JSON; charset=utf-8", b"{}".to_vec());
        assert_eq!(req.media_type().as_deref(), Some("application/json"));
    }

    #[test]
    fn test_terminate_sets_flag_and_response() {
        let mut ctx = Context::new(Request::new(Method::GET, "/pet/1"));
        assert!(!ctx.terminated);
        ctx.terminate(Response::not_found());
        assert!(ctx.terminated);
        assert_eq!(ctx.response.as_ref().map(|r| r.status), Some(404));
    }

    #[test]
    fn test_request_id_taken_from_header() {
        let id = RequestId::new();
        let ctx = Context::new(
            Request::new(Method::GET, "/").with_header("X-Request-Id", id.to_string()),
        );
        assert_eq!(ctx.request_id, id);
    }

    #[test]
    fn test_params_and_errors() {
        let mut ctx = Context::new(Request::new(Method::GET, "/"));
        ctx.params.set(ParamSource::Path, json!({"id": 3}));
        assert_eq!(ctx.param(ParamSource::Path, "id"), Some(&json!(3)));
        assert!(!ctx.has_errors());
        ctx.errors
            .insert(ParamSource::Body, SchemaError::MissingRequiredKey);
        assert_eq!(
            ctx.errors.to_value(),
            json!({"body-params": "missing-required-key"})
        );
    }
}
