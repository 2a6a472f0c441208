//! # Handlers Module
//!
//! Terminal handlers for the pets and users resources, the API description
//! and the documentation viewer, plus the route table that wires them to
//! their paths, schemas and precondition loaders.
//!
//! Handlers are closures over an `Arc<Store>`; they read coerced values from
//! [`Context::params`](crate::pipeline::Context) and answer 400 with the
//! collected validation errors before touching the store.

pub mod docs;
pub mod pets;
pub mod routes;
pub mod users;

pub use pets::LoadPet;
pub use routes::{global_interceptors, route_table, RouteDeps};
