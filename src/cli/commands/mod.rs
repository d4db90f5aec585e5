//! CLI command implementations

pub mod completions;
pub mod config;
pub mod fill;
pub mod flatten;
pub mod schema;
pub mod validate;
