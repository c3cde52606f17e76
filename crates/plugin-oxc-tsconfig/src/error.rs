//! Error types for configuration loading.
//!
//! None of these reach the bundler: the resolver recovers from every variant
//! by skipping the offending file or parent and reporting a warning.

use std::path::PathBuf;

use plugin_oxc_runtime::RuntimeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TsconfigError>;

#[derive(Debug, Error)]
pub enum TsconfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("cannot find base config '{specifier}' extended by {from}")]
    ExtendsNotFound { specifier: String, from: PathBuf },

    #[error("circular extends chain through {0}")]
    ExtendsCycle(PathBuf),
}
