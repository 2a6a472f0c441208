//! # Schema Module
//!
//! Typed shapes for the domain entities and the engine that validates and
//! coerces raw request values against them.
//!
//! A [`Schema`] is plain data: a name plus a static slice of [`Field`]s, each
//! either required or optional and carrying a [`FieldType`]. [`validate`]
//! interprets that description:
//!
//! - required fields that are absent (or `null`) report `missing-required-key`
//! - integers accept JSON numbers and numeric strings (path, query and form
//!   values always arrive as strings)
//! - enum fields check membership in a fixed literal set
//! - entity and sequence-of-entity fields recurse
//! - undeclared fields are ignored and never reach the typed value
//!
//! ```rust
//! use brrtpets::schema::{entities::PET, validate};
//! use serde_json::json;
//!
//! let typed = validate(&PET, &json!({"id": "7", "name": "Rex", "owner": "x"})).unwrap();
//! assert_eq!(typed, json!({"id": 7, "name": "Rex"}));
//! ```

pub mod entities;
mod types;
mod validate;

pub use types::{Field, FieldType, Schema, SchemaError};
pub use validate::validate;
