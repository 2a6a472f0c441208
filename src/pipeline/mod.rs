//! # Pipeline Module
//!
//! The interceptor pipeline every routed request runs through.
//!
//! A [`Chain`] is an ordered list of [`Interceptor`]s ending in a
//! [`Terminal`] that wraps the route's [`Handler`]. Execution threads one
//! mutable [`Context`] through the chain:
//!
//! - enter stages run front to back until one calls [`Context::terminate`]
//!   or the handler has run;
//! - leave stages then run back to front for every stage that was entered.
//!
//! A panic inside any stage is caught and becomes a 500 response, so a
//! faulty handler never takes down the worker coroutine.
//!
//! The stock interceptors in this module decode bodies ([`BodyParams`],
//! [`BodyMerge`]), canonicalize keys ([`NormalizeKeys`]), coerce parameters
//! against route schemas ([`Coerce`]), log ([`RequestLog`]), count
//! ([`Metrics`]) and fill response defaults ([`ResponseDefaults`]).

mod context;
mod core;
mod interceptors;
mod response;

pub use context::{Context, ParamSource, Request, TypedParams, ValidationErrors};
pub use core::{Chain, Handler, Interceptor, Terminal};
pub use interceptors::{
    normalize_key, BodyMerge, BodyParams, Coerce, Metrics, NormalizeKeys, RequestLog,
    ResponseDefaults,
};
pub use response::{HeaderVec, Response, MAX_INLINE_HEADERS};
