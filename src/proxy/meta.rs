//! Revision metadata proxy (HEAD/GET)
//!
//! Lookup order for `(repo_type, org_repo, revision, method)`:
//! 1. Resolve `revision` to a commit.
//! 2. Online: serve the commit-keyed entry if present and readable, else fetch
//!    from the origin and write both the revision-keyed and commit-keyed entries.
//!    A GET answer already fetched while resolving is stored instead of
//!    fetched a second time.
//! 3. Offline: serve the commit-keyed entry or fail; the origin is never contacted.

use super::{MirrorService, checked_inputs};
use crate::cache::CacheContent;
use crate::error::{MirrorError, MirrorResult};
use crate::metrics;
use crate::origin::{OriginResponse, ResolveError, Resolution};
use crate::repo::{RepoType, RequestMethod};
use std::path::Path;

impl MirrorService {
    /// Serve revision metadata from cache or origin
    #[tracing::instrument(skip_all, fields(%repo_type, %org_repo, %revision, %method))]
    pub async fn resolve_and_serve(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        revision: &str,
        method: RequestMethod,
        auth_token: Option<&str>,
    ) -> MirrorResult<CacheContent> {
        checked_inputs(&[org_repo, revision])?;

        let Resolution {
            commit,
            revision_meta,
        } = self
            .resolver
            .resolve_with_meta(repo_type, org_repo, revision, auth_token)
            .await
            .map_err(|e| match e {
                ResolveError::Upstream { status, message } => {
                    tracing::warn!(status, error = %message, "Revision resolution rejected");
                    MirrorError::EntryUnknown { status, message }
                }
                ResolveError::Other(message) => {
                    tracing::error!(error = %message, "Revision resolution failed");
                    MirrorError::Proxy(message)
                }
            })?;
        checked_inputs(&[&commit])?;

        let commit_path = self.layout.meta_path(repo_type, org_repo, &commit, method);

        if !self.config.online {
            return match self.store.read(&commit_path).await {
                Ok(content) => {
                    metrics::record_cache_hit("meta");
                    Ok(content)
                }
                Err(e) => {
                    tracing::error!(path = ?commit_path, error = %e, "Offline metadata unavailable");
                    Err(MirrorError::proxy(e.to_string()))
                }
            };
        }

        if let Some(content) = self.read_cached(&commit_path).await {
            metrics::record_cache_hit("meta");
            return Ok(content);
        }

        let _guard = self
            .inflight
            .acquire(&commit_path.to_string_lossy())
            .await;

        // Another request may have populated the entry while we waited
        if let Some(content) = self.read_cached(&commit_path).await {
            metrics::record_cache_hit("meta");
            return Ok(content);
        }

        metrics::record_cache_miss("meta");
        let response = match (method, revision_meta) {
            (RequestMethod::Get, Some(response)) => {
                tracing::debug!("Reusing metadata fetched during resolution");
                response
            }
            _ => {
                self.fetch_meta(repo_type, org_repo, revision, method, auth_token)
                    .await?
            }
        };
        self.store_meta(repo_type, org_repo, revision, &commit, method, response)
            .await
    }

    /// Read an entry if it exists; unreadable entries count as absent
    async fn read_cached(&self, path: &Path) -> Option<CacheContent> {
        if !self.store.exists(path) {
            return None;
        }

        match self.store.read(path).await {
            Ok(content) => {
                tracing::debug!(path = ?path, "Metadata cache hit");
                Some(content)
            }
            Err(e) => {
                tracing::error!(path = ?path, error = %e, "Cached metadata unreadable, refetching");
                None
            }
        }
    }

    async fn fetch_meta(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        revision: &str,
        method: RequestMethod,
        auth_token: Option<&str>,
    ) -> MirrorResult<OriginResponse> {
        self.origin
            .fetch_meta(method, repo_type, org_repo, revision, auth_token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Origin metadata request failed");
                MirrorError::EntryNotFound
            })
    }

    async fn store_meta(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        revision: &str,
        commit: &str,
        method: RequestMethod,
        response: OriginResponse,
    ) -> MirrorResult<CacheContent> {
        metrics::record_origin_fetch("meta", response.status);

        if !response.is_cacheable_meta() {
            return Err(MirrorError::EntryUnknown {
                status: response.status,
                message: "request err".to_string(),
            });
        }

        let content = CacheContent::new(response.status, response.headers, response.body);

        // Revision-keyed entry first, then commit-keyed; a failed second write
        // leaves the first in place
        let revision_path = self.layout.meta_path(repo_type, org_repo, revision, method);
        self.store_entry(&revision_path, &content).await?;

        if commit != revision {
            let commit_path = self.layout.meta_path(repo_type, org_repo, commit, method);
            self.store_entry(&commit_path, &content).await?;
        }

        tracing::debug!(commit = %commit, "Metadata cached");
        Ok(content)
    }
}
