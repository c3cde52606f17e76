//! In-memory runtime for tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// Runtime serving files from memory
///
/// Directories exist implicitly as ancestors of stored files. Every
/// `read_file` and `metadata` call is counted so tests can assert how much
/// I/O a lookup performed.
#[derive(Debug)]
pub struct MemoryRuntime {
    files: RwLock<FxHashMap<PathBuf, Vec<u8>>>,
    cwd: PathBuf,
    reads: AtomicUsize,
    stats: AtomicUsize,
}

impl MemoryRuntime {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            files: RwLock::new(FxHashMap::default()),
            cwd: cwd.into(),
            reads: AtomicUsize::new(0),
            stats: AtomicUsize::new(0),
        }
    }

    /// Add (or replace) a file. Relative paths are joined onto the cwd.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = self.normalize(path.as_ref());
        self.files.write().insert(path, content.into());
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let path = self.normalize(path.as_ref());
        self.files.write().remove(&path);
    }

    /// Number of `read_file` calls served so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `metadata` calls served so far
    pub fn stat_count(&self) -> usize {
        self.stats.load(Ordering::SeqCst)
    }

    /// Total filesystem operations served so far
    pub fn io_count(&self) -> usize {
        self.read_count() + self.stat_count()
    }

    fn normalize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf().clean()
        } else {
            self.cwd.join(path).clean()
        }
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let path = self.normalize(path);
        self.files
            .read()
            .get(&path)
            .cloned()
            .ok_or(RuntimeError::FileNotFound(path))
    }

    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        let path = self.normalize(path);
        let files = self.files.read();

        if let Some(content) = files.get(&path) {
            return Ok(FileMetadata {
                size: content.len() as u64,
                is_dir: false,
                is_file: true,
            });
        }

        if files.keys().any(|file| file.starts_with(&path)) {
            return Ok(FileMetadata {
                size: 0,
                is_dir: true,
                is_file: false,
            });
        }

        Err(RuntimeError::FileNotFound(path))
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn directories_are_implied_by_files() {
        let runtime = MemoryRuntime::new("/project");
        runtime.add_file("src/index.ts", "export {}");

        assert!(runtime.is_file(Path::new("/project/src/index.ts")).await);
        assert!(runtime.is_dir(Path::new("/project/src")).await);
        assert!(!runtime.is_file(Path::new("/project/src")).await);
        assert!(!runtime.is_dir(Path::new("/elsewhere")).await);
    }

    #[tokio::test]
    async fn counts_io() {
        let runtime = MemoryRuntime::new("/");
        runtime.add_file("/a.json", "{}");

        runtime.read_file(Path::new("/a.json")).await.unwrap();
        assert!(runtime.read_file(Path::new("/b.json")).await.is_err());
        runtime.metadata(Path::new("/a.json")).await.unwrap();

        assert_eq!(runtime.read_count(), 2);
        assert_eq!(runtime.stat_count(), 1);
        assert_eq!(runtime.io_count(), 3);
    }
}
