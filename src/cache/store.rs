//! Cache store backends

use super::content::CacheContent;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Cache store failures
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache entry {path:?} is not valid: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// ============================================================================
// Trait Definitions
// ============================================================================

/// Key to content mapping used by the proxies and the listing assembler
///
/// Presence of an entry is the only existence signal; there is no index.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Check whether an entry (or listing directory) exists
    fn exists(&self, path: &Path) -> bool;

    /// Read and decode a cached response
    async fn read(&self, path: &Path) -> Result<CacheContent, CacheError>;

    /// Store a response; readers never observe a partially written entry
    async fn write(&self, path: &Path, content: &CacheContent) -> Result<(), CacheError>;

    /// Create the parent directories of an entry
    async fn ensure_dirs(&self, path: &Path) -> Result<(), CacheError>;

    /// Names of the entries directly below a listing directory
    async fn list_entries(&self, dir: &Path) -> Result<Vec<String>, CacheError>;
}

// ============================================================================
// Production Implementation
// ============================================================================

/// Cache store on the local filesystem using tokio::fs
#[derive(Debug, Default, Clone)]
pub struct FileSystemCacheStore;

impl FileSystemCacheStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheStore for FileSystemCacheStore {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    async fn read(&self, path: &Path) -> Result<CacheContent, CacheError> {
        let raw = fs::read(path).await.map_err(|e| CacheError::io(path, e))?;
        CacheContent::from_json(&raw).map_err(|source| CacheError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    async fn write(&self, path: &Path, content: &CacheContent) -> Result<(), CacheError> {
        let encoded = content.to_json().map_err(|source| CacheError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        // Atomic write: unique temp sibling, then rename over the target
        let temp_file = temp_sibling(path);

        let result = async {
            let mut file = fs::File::create(&temp_file).await?;
            file.write_all(&encoded).await?;
            file.sync_all().await?;
            fs::rename(&temp_file, path).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_file).await;
            return Err(CacheError::io(path, e));
        }

        Ok(())
    }

    async fn ensure_dirs(&self, path: &Path) -> Result<(), CacheError> {
        match path.parent() {
            Some(parent) => fs::create_dir_all(parent)
                .await
                .map_err(|e| CacheError::io(parent, e)),
            None => Ok(()),
        }
    }

    async fn list_entries(&self, dir: &Path) -> Result<Vec<String>, CacheError> {
        let mut entries = fs::read_dir(dir).await.map_err(|e| CacheError::io(dir, e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CacheError::io(dir, e))?
        {
            names.push(entry.file_name().to_string_lossy().to_string());
        }

        Ok(names)
    }
}

/// Temp file next to `path`, unique per writer so concurrent writers never share one
fn temp_sibling(path: &Path) -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.{}.tmp", std::process::id(), seq));
    path.with_file_name(name)
}
