use crate::pipeline::Response;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Headers kept on the pipeline response but not written to the wire. The
/// transport only takes `'static` header lines, and these values are unique
/// per request.
const PIPELINE_ONLY_HEADERS: &[&str] = &["x-request-id"];

/// Upper bound on header lines leaked for the transport.
pub const MAX_INTERNED_HEADER_LINES: usize = 4096;

static HEADER_LINES: Lazy<HeaderLines> = Lazy::new(|| HeaderLines::new(MAX_INTERNED_HEADER_LINES));

/// Interner for `'static` header lines.
///
/// A line is leaked once and reused afterwards. Every leak first reserves a
/// slot, so no more than `capacity` lines are ever allocated; once the slots
/// are gone, unseen lines are refused.
struct HeaderLines {
    lines: DashMap<String, &'static str>,
    slots: AtomicUsize,
    capacity: usize,
}

impl HeaderLines {
    fn new(capacity: usize) -> Self {
        Self {
            lines: DashMap::new(),
            slots: AtomicUsize::new(0),
            capacity,
        }
    }

    fn get_or_intern(&self, name: &str, value: &str) -> Option<&'static str> {
        let line = format!("{name}: {value}");
        if let Some(cached) = self.lines.get(&line) {
            return Some(*cached);
        }
        self.slots
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                (used < self.capacity).then_some(used + 1)
            })
            .ok()?;
        let leaked = *self
            .lines
            .entry(line.clone())
            .or_insert_with(|| Box::leak(line.into_boxed_str()));
        Some(leaked)
    }

    fn len(&self) -> usize {
        self.lines.len()
    }
}

/// `Content-Type` line for the media types this service produces.
fn content_type_line(content_type: &str) -> Option<&'static str> {
    let line = match content_type {
        "application/json" => "Content-Type: application/json",
        "text/plain" => "Content-Type: text/plain",
        "text/plain; version=0.0.4" => "Content-Type: text/plain; version=0.0.4",
        "text/html" => "Content-Type: text/html",
        "text/css" => "Content-Type: text/css",
        "application/javascript" => "Content-Type: application/javascript",
        "application/yaml" => "Content-Type: application/yaml",
        "image/svg+xml" => "Content-Type: image/svg+xml",
        "image/png" => "Content-Type: image/png",
        "image/x-icon" => "Content-Type: image/x-icon",
        "application/octet-stream" => "Content-Type: application/octet-stream",
        other => return HEADER_LINES.get_or_intern("Content-Type", other),
    };
    Some(line)
}

pub(crate) fn status_reason(status: u16) -> &'static str {
    http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("OK")
}

/// Write a pipeline response.
///
/// Header lines that cannot be interned any more are dropped with a warning.
pub fn write_response(res: &mut may_minihttp::Response, response: &Response) {
    res.status_code(response.status as usize, status_reason(response.status));
    match content_type_line(response.content_type()) {
        Some(line) => {
            res.header(line);
        }
        None => warn!(content_type = %response.content_type(), "header cache full, content type dropped"),
    }
    for (name, value) in &response.headers {
        if name.eq_ignore_ascii_case("content-type")
            || PIPELINE_ONLY_HEADERS
                .iter()
                .any(|h| name.eq_ignore_ascii_case(h))
        {
            continue;
        }
        match HEADER_LINES.get_or_intern(name, value) {
            Some(line) => {
                res.header(line);
            }
            None => warn!(header = %name, "header cache full, header dropped"),
        }
    }
    res.body_vec(response.body_bytes());
}
