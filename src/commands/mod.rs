//! Command implementations for the CLI
//!
//! - serve: Load the dataset and start the HTTP API
//! - normalize: Build the canonical dataset from raw table descriptors
//! - cost: One-shot CPU/memory/region lookup
//! - config: Configuration display and validation

pub mod config;
pub mod cost;
pub mod normalize;
pub mod serve;
