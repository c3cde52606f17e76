use plugin_oxc_runtime::RuntimeError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PluginError>;

/// Errors surfaced to the bundler by the plugin hooks.
///
/// Configuration discovery never produces these; it degrades to warnings.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("invalid plugin option: {0}")]
    InvalidOption(String),

    #[error("failed to parse {id}:\n{message}")]
    Parse { id: String, message: String },

    #[error("failed to transform {id}:\n{message}")]
    Transform { id: String, message: String },

    #[error("failed to minify chunk: {0}")]
    Minify(String),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl PluginError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOption(message.into())
    }
}
