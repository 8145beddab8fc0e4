//! Hub Mirror - metadata cache-and-proxy for a model-hub mirror
//!
//! Serves revision metadata, refs and directory listings for hub repositories
//! from a two-tier on-disk cache, falling back to the origin hub on a miss.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod origin;
pub mod proxy;
pub mod repo;

pub use cache::{CacheContent, CacheLayout, CacheStore, FileSystemCacheStore};
pub use config::MirrorConfig;
pub use error::{MirrorError, MirrorResult};
pub use origin::{CommitResolver, HttpOriginClient, HubCommitResolver, OriginClient};
pub use proxy::{FileDescribe, MirrorService};
pub use repo::{RepoType, RequestMethod};
