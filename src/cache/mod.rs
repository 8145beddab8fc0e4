//! Two-tier on-disk metadata cache
//!
//! Provides:
//! - The cache path layout shared with the rest of the mirror
//! - The stored response format
//! - The `CacheStore` abstraction and its filesystem backend
//! - Per-key single-flight locks for cache population

pub mod content;
pub mod inflight;
pub mod paths;
pub mod store;

pub use content::CacheContent;
pub use inflight::{KeyGuard, KeyedLocks};
pub use paths::{
    CacheLayout, InvalidPath, check_relative, check_sub_path, download_link, relative_path,
};
pub use store::{CacheError, CacheStore, FileSystemCacheStore};
