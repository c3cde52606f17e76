//! Platform runtime abstraction for plugin-oxc
//!
//! Configuration discovery and module resolution never touch `std::fs`
//! directly. They go through the `Runtime` trait so that the same code runs
//! against the real filesystem during a build and against an in-memory tree
//! in tests.

mod error;
mod native;

#[cfg(any(test, feature = "test-utils"))]
mod memory;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use error::{RuntimeError, RuntimeResult};
pub use native::NativeRuntime;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryRuntime;

/// File metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,
    /// Whether this is a directory
    pub is_dir: bool,
    /// Whether this is a file
    pub is_file: bool,
}

/// Platform runtime trait
///
/// Only the read side of the filesystem is needed: the plugin inspects
/// configuration files and probes candidate module paths, it never writes.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file from the filesystem
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Get file metadata
    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;

    /// Get the current working directory
    fn get_cwd(&self) -> RuntimeResult<PathBuf>;

    /// Read a file and decode it as UTF-8
    async fn read_to_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.read_file(path).await?;
        String::from_utf8(bytes)
            .map_err(|e| RuntimeError::Io(format!("{} is not valid UTF-8: {}", path.display(), e)))
    }

    /// Whether `path` exists and is a regular file
    async fn is_file(&self, path: &Path) -> bool {
        self.metadata(path).await.map(|m| m.is_file).unwrap_or(false)
    }

    /// Whether `path` exists and is a directory
    async fn is_dir(&self, path: &Path) -> bool {
        self.metadata(path).await.map(|m| m.is_dir).unwrap_or(false)
    }
}
