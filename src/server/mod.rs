//! # Server Module
//!
//! HTTP transport on top of `may_minihttp`: request conversion, response
//! writing, the [`AppService`] that routes into the interceptor pipeline,
//! and a [`HttpServer`] wrapper with a controllable [`ServerHandle`].

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_query_params, parse_request};
pub use response::write_response;
pub use service::{health_endpoint, metrics_endpoint, AppService};
