//! Rideshare DB Gateway Library
//!
//! Schema lifecycle management (provision, populate, teardown) and a gated
//! read-only table query path for the rideshare PostgreSQL database.

pub mod api;
pub mod config;
pub mod error;
pub mod pool;
pub mod query;
pub mod schema;
