//! Warnings reported back to the caller's diagnostic channel.

use parking_lot::Mutex;

/// Codes attached to configuration warnings
pub mod codes {
    pub const TSCONFIG_NOT_FOUND: &str = "TSCONFIG_NOT_FOUND";
    pub const TSCONFIG_INVALID: &str = "TSCONFIG_INVALID";
    pub const TSCONFIG_EXTENDS_NOT_FOUND: &str = "TSCONFIG_EXTENDS_NOT_FOUND";
}

/// A non-fatal problem found while discovering configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub code: &'static str,
    pub message: String,
}

impl ConfigWarning {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Receives warnings produced during a lookup.
pub trait DiagnosticSink: Send + Sync {
    fn warn(&self, warning: ConfigWarning);
}

impl<F> DiagnosticSink for F
where
    F: Fn(ConfigWarning) + Send + Sync,
{
    fn warn(&self, warning: ConfigWarning) {
        self(warning)
    }
}

/// Sink that buffers warnings so they can be forwarded once the lookup is
/// finished.
#[derive(Debug, Default)]
pub struct WarningCollector {
    warnings: Mutex<Vec<ConfigWarning>>,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<ConfigWarning> {
        std::mem::take(&mut *self.warnings.lock())
    }

    pub fn len(&self) -> usize {
        self.warnings.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for WarningCollector {
    fn warn(&self, warning: ConfigWarning) {
        self.warnings.lock().push(warning);
    }
}
