use serde::Serialize;
use serde_json::{json, Value};
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path.
///
/// Header names are `Arc<str>`: they repeat across requests and clone in O(1).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Response accumulated on the [`Context`](super::Context).
///
/// A `Value::String` body is written as `text/plain`, anything else as JSON,
/// unless a `content-type` header says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
    /// Pre-encoded body (static assets); takes precedence over `body`
    #[serde(skip_serializing)]
    pub raw: Option<Vec<u8>>,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body,
            raw: None,
        }
    }

    /// 200 with pre-encoded bytes of the given content type.
    #[must_use]
    pub fn bytes(content_type: &str, bytes: Vec<u8>) -> Self {
        let mut res = Self::new(200, Value::Null);
        res.set_header("content-type", content_type.to_string());
        res.raw = Some(bytes);
        res
    }

    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// 200 with the plain-text body `OK`.
    #[must_use]
    pub fn ok_text() -> Self {
        Self::new(200, Value::String("OK".to_string()))
    }

    /// 201 with a `Location` header and an empty body.
    #[must_use]
    pub fn created(location: String) -> Self {
        let mut res = Self::new(201, Value::String(String::new()));
        res.set_header("location", location);
        res
    }

    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::new(status, json!({ "error": message }))
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::error(404, "Not Found")
    }

    /// 400 carrying the validation error tree.
    #[must_use]
    pub fn validation_failed(details: Value) -> Self {
        Self::new(
            400,
            json!({ "error": "Request validation failed", "details": details }),
        )
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive name match).
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Content type implied by the body when no header sets one.
    #[must_use]
    pub fn content_type(&self) -> &str {
        match self.get_header("content-type") {
            Some(ct) => ct,
            None if self.body.is_string() => "text/plain",
            None => "application/json",
        }
    }

    /// Encoded body bytes.
    #[must_use]
    pub fn body_bytes(&self) -> Vec<u8> {
        if let Some(raw) = &self.raw {
            return raw.clone();
        }
        match &self.body {
            Value::String(s) => s.clone().into_bytes(),
            other => serde_json::to_vec(other).unwrap_or_default(),
        }
    }
}
