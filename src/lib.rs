//! schemaform: schema-driven form engine
//!
//! Decodes a schema document into a typed tree, flattens a prefill document
//! into path-addressed field values, and validates those values field by
//! field against the schema's constraints.

pub mod cli;
pub mod core;
pub mod document;
pub mod logging;
pub mod schema;
