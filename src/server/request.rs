use crate::pipeline::{HeaderVec, Request};
use crate::router::ParamVec;
use http::Method;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, warn};

/// Parse query string parameters from a URL path.
///
/// Everything after the first `?` is url-decoded; repeated names keep every
/// occurrence in order.
#[must_use]
pub fn parse_query_params(path: &str) -> ParamVec {
    match path.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
            .collect(),
        None => ParamVec::new(),
    }
}

/// Path without its query string.
#[must_use]
pub fn strip_query(raw_path: &str) -> &str {
    raw_path.split('?').next().unwrap_or("/")
}

/// Method from its wire form; unknown extension methods are kept verbatim.
#[must_use]
pub fn parse_method(raw: &str) -> Method {
    Method::from_bytes(raw.as_bytes()).unwrap_or_else(|_| {
        warn!(method = %raw, "unparseable request method");
        Method::GET
    })
}

/// Convert a `may_minihttp` request into a pipeline [`Request`].
///
/// Headers are copied before the body is taken, since reading the body
/// consumes the transport request.
pub fn parse_request(req: may_minihttp::Request) -> Request {
    let method = parse_method(req.method());
    let raw_path = req.path().to_string();
    let path = strip_query(&raw_path).to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase()),
                String::from_utf8_lossy(h.value).into_owned(),
            )
        })
        .collect();
    debug!(
        header_count = headers.len(),
        size_bytes = headers.iter().map(|(k, v)| k.len() + v.len()).sum::<usize>(),
        "Headers extracted"
    );

    let query_params = parse_query_params(&raw_path);
    debug!(param_count = query_params.len(), "Query params parsed");

    let mut body = Vec::new();
    if let Err(err) = req.body().read_to_end(&mut body) {
        warn!(error = %err, "failed to read request body");
        body.clear();
    }
    if !body.is_empty() {
        debug!(body_size_bytes = body.len(), "Request body read");
    }

    Request {
        method,
        path,
        headers,
        query_params,
        body,
    }
}
