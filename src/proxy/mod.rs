//! Metadata cache-and-proxy engine
//!
//! `MirrorService` ties the cache store, origin client and commit resolver
//! together and implements:
//! - `resolve_and_serve`: revision metadata with two-tier caching
//! - `get_refs`: refs listings, single-tier and streamed
//! - `list_files`: directory listings rebuilt from cached path-info entries
//! - `forward`: uncached passthrough to the origin for everything else

pub mod emit;
pub mod forward;
pub mod listing;
pub mod meta;
pub mod refs;

pub use emit::{StreamedContent, emit_content, emit_stream};
pub use listing::{FileDescribe, PathInfoEntry, sort_entries};

use crate::cache::{
    CacheContent, CacheLayout, CacheStore, FileSystemCacheStore, InvalidPath, KeyedLocks,
    check_relative,
};
use crate::config::MirrorConfig;
use crate::error::{MirrorError, MirrorResult};
use crate::origin::{CommitResolver, HttpOriginClient, HubCommitResolver, OriginClient};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// The mirror's request-independent collaborators
///
/// Holds no per-request state; every call is independent.
pub struct MirrorService {
    config: Arc<MirrorConfig>,
    layout: CacheLayout,
    store: Arc<dyn CacheStore>,
    origin: Arc<dyn OriginClient>,
    resolver: Arc<dyn CommitResolver>,
    inflight: KeyedLocks,
}

impl MirrorService {
    /// Create a service with explicit collaborators
    pub fn new(
        config: Arc<MirrorConfig>,
        store: Arc<dyn CacheStore>,
        origin: Arc<dyn OriginClient>,
        resolver: Arc<dyn CommitResolver>,
    ) -> Self {
        Self {
            layout: CacheLayout::new(config.repos_root.clone()),
            config,
            store,
            origin,
            resolver,
            inflight: KeyedLocks::new(),
        }
    }

    /// Production wiring: filesystem cache, HTTP origin, hub resolver
    pub fn from_config(config: Arc<MirrorConfig>) -> Result<Self> {
        let store: Arc<dyn CacheStore> = Arc::new(FileSystemCacheStore::new());
        let origin: Arc<dyn OriginClient> = Arc::new(HttpOriginClient::new(
            &config.origin_endpoint,
            config.request_timeout(),
        )?);
        let resolver = Arc::new(HubCommitResolver::new(
            origin.clone(),
            store.clone(),
            CacheLayout::new(config.repos_root.clone()),
            config.online,
        ));

        Ok(Self::new(config, store, origin, resolver))
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Create parent directories and write one cache entry
    async fn store_entry(&self, path: &Path, content: &CacheContent) -> MirrorResult<()> {
        self.store.ensure_dirs(path).await.map_err(|e| {
            tracing::error!(path = ?path, error = %e, "Failed to create cache directory");
            MirrorError::proxy(e.to_string())
        })?;

        self.store.write(path, content).await.map_err(|e| {
            tracing::error!(path = ?path, error = %e, "Failed to write cache entry");
            MirrorError::proxy(e.to_string())
        })
    }
}

/// Reject cache key inputs that would resolve outside the cache root
fn checked_inputs(inputs: &[&str]) -> MirrorResult<()> {
    inputs
        .iter()
        .try_for_each(|input| check_relative(input))
        .map_err(reject_input)
}

fn reject_input(err: InvalidPath) -> MirrorError {
    tracing::warn!(error = %err, "Rejected request path input");
    MirrorError::PageNotFound
}
