//! Where source images are read from and results are written to.
//!
//! Channel methods exchange file paths, never pixel data. The engine only
//! sees this trait, so the same pipeline runs on a real filesystem and on
//! hosts without one (WASM, tests).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No such file: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Storage for source and result images, addressed by path.
pub trait FileStore: Send + Sync {
    /// Read the whole file at `path`.
    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError>;

    /// Write `bytes` to a new, uniquely named file and return its path.
    fn write_new(&self, prefix: &str, extension: &str, bytes: &[u8]) -> Result<String, StoreError>;
}

/// Filesystem store writing results into a single output directory.
#[cfg(feature = "fs")]
#[derive(Debug, Clone)]
pub struct FsStore {
    output_dir: std::path::PathBuf,
}

#[cfg(feature = "fs")]
impl FsStore {
    pub fn new(output_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }
}

#[cfg(feature = "fs")]
impl FileStore for FsStore {
    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(path.to_string()),
            _ => StoreError::Io(format!("{}: {}", path, e)),
        })
    }

    fn write_new(&self, prefix: &str, extension: &str, bytes: &[u8]) -> Result<String, StoreError> {
        use std::io::Write;

        std::fs::create_dir_all(&self.output_dir).map_err(|e| StoreError::Io(e.to_string()))?;

        let suffix = format!(".{}", extension);
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(&suffix)
            .tempfile_in(&self.output_dir)
            .map_err(|e| StoreError::Io(e.to_string()))?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| StoreError::Io(e.to_string()))?;

        let (_, path) = file.keep().map_err(|e| StoreError::Io(e.to_string()))?;
        let path = path.to_string_lossy().into_owned();

        tracing::debug!(path = %path, bytes = bytes.len(), "wrote image file");
        Ok(path)
    }
}

/// In-memory store. Files are named `{prefix}{n}.{extension}`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<String, Vec<u8>>>,
    counter: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<String>, bytes: Vec<u8>) {
        self.lock().insert(path.into(), bytes);
    }

    /// Copy of a file's contents.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().get(path).cloned()
    }

    /// Remove a file and return its contents.
    pub fn take(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().remove(path)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned map is still consistent: every operation is a single insert/remove
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FileStore for MemoryStore {
    fn read(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        self.get(path)
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    fn write_new(&self, prefix: &str, extension: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let path = format!("{}{}.{}", prefix, n, extension);
        self.insert(path.clone(), bytes.to_vec());
        Ok(path)
    }
}
