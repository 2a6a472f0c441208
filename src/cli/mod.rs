//! # CLI Module
//!
//! Command-line entry points of the `brrtpets` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Start the HTTP service:
//!
//! ```bash
//! brrtpets serve --addr 0.0.0.0:8080 --ui-dir ./ui --seed
//! ```
//!
//! Options:
//! - `--addr <HOST:PORT>` - Listen address (also `PETS_ADDR`, default `127.0.0.1:8080`)
//! - `--config <FILE>` - YAML service config; flags override its values
//! - `--ui-dir <DIR>` - Directory served under `/ui`
//! - `--seed` - Preload sample pets
//!
//! ### `routes`
//!
//! Print the compiled route table, one `METHOD PATTERN HANDLER` line per route.
//!
//! ### `docs`
//!
//! Print the generated OpenAPI document as JSON.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{route_listing, run_cli, Cli, Commands};
