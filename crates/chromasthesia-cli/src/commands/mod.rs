//! Command handlers.
//!
//! Every handler returns a process exit code: 0 on success, 1 on any
//! failure.

pub mod classify;
pub mod fetch;
pub mod plan;

use std::path::Path;

use chromasthesia_core::config::ChromaConfig;
use chromasthesia_core::error::CoreResult;

/// Load configuration from an explicit file or the layered defaults.
pub fn load_config(path: Option<&Path>) -> CoreResult<ChromaConfig> {
    match path {
        Some(path) => ChromaConfig::from_file(path),
        None => ChromaConfig::load(),
    }
}
