//! Cascading Config Library
//!
//! Loads per-environment configuration overlays and merges them recursively
//! over the default configuration.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
