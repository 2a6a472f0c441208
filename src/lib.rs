//! # brrtpets
//!
//! **brrtpets** is a coroutine-powered HTTP resource server for two resource
//! kinds, pets and users, held in an in-memory store. Every routed request
//! runs through an ordered interceptor pipeline that parses bodies, coerces
//! and validates parameters against declarative schemas, loads
//! preconditions and finally calls a terminal handler.
//!
//! ## Architecture
//!
//! The library is organized into these modules, leaves first:
//!
//! - **[`schema`]** - Entity schemas and the coercing validator
//! - **[`store`]** - Lock-free in-memory state with optimistic atomic updates
//! - **[`pipeline`]** - Request context, interceptors, handlers and chain execution
//! - **[`router`]** - Route table declaration and segment-tree matching
//! - **[`handlers`]** - Pets, users, API description and docs UI handlers
//! - **[`app`]** - Wiring of store, metrics and route table
//! - **[`server`]** - HTTP transport built on `may_minihttp`
//! - **[`config`]**, **[`runtime_config`]**, **[`logging`]**, **[`cli`]** - Process bootstrap
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as AppService<br/>(may_minihttp)
//!     participant Router
//!     participant Chain as Interceptor Chain
//!     participant Handler
//!     participant Store
//!
//!     Client->>Server: PATCH /pet/7 (form body)
//!     alt /health or /metrics
//!         Server-->>Client: 200
//!     end
//!     Server->>Router: route(PATCH, /pet/7)
//!     alt No route
//!         Router-->>Server: None
//!         Server-->>Client: 404 {"error": "Not Found"}
//!     end
//!     Router-->>Server: RouteMatch { chain, path_params }
//!     Server->>Chain: execute(Context)
//!     Chain->>Chain: enter: log, metrics, body parse,<br/>merge, normalize, coerce
//!     Chain->>Chain: enter: LoadPet
//!     alt Pet absent
//!         Chain->>Chain: terminate(404)
//!     end
//!     Chain->>Handler: handle(ctx)
//!     Handler->>Store: merge(["pets", "7"], fields)
//!     Store-->>Handler: new snapshot
//!     Chain->>Chain: leave (reverse order)
//!     Chain-->>Server: Context with Response
//!     Server-->>Client: 200 OK
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtpets::app::{App, AppOptions};
//! use brrtpets::pipeline::Request;
//! use brrtpets::server::AppService;
//! use http::Method;
//!
//! let app = App::build(&AppOptions { seed: true, ..Default::default() }).unwrap();
//! let service = AppService::new(&app);
//!
//! let response = service.handle(Request::new(Method::GET, "/pet/1"));
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body["name"], "Rex");
//! ```
//!
//! ## Running
//!
//! ```bash
//! brrtpets serve --addr 127.0.0.1:8080 --seed
//! curl localhost:8080/pet
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod handlers;
pub mod ids;
pub mod logging;
pub mod pipeline;
pub mod router;
pub mod runtime_config;
pub mod schema;
pub mod server;
pub mod static_files;
pub mod store;

pub use app::{App, AppOptions};
pub use pipeline::{Context, Handler, Interceptor, Response};
pub use router::{RouteNode, RouteSpec, Router};
pub use store::Store;
