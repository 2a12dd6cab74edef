//! Configuration for peercache nodes
//!
//! Values are layered in order of precedence: built-in defaults, a JSON
//! file, `PEERCACHE_*` environment variables, then explicit settings from
//! the command line.

pub mod config;
pub mod errors;
pub mod loader;

pub use config::*;
pub use errors::{ConfigError, Result};

#[cfg(test)]
mod config_tests;
