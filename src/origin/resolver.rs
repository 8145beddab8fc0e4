//! Symbolic revision to commit resolution

use super::client::{OriginClient, OriginResponse};
use crate::cache::{CacheLayout, CacheStore, check_relative};
use crate::repo::{RepoType, RequestMethod, is_commit_sha};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Resolution failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The hub answered with a non-success status; surfaced to the caller verbatim
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("revision resolution failed: {0}")]
    Other(String),
}

/// A resolved revision
#[derive(Debug, Clone)]
pub struct Resolution {
    pub commit: String,
    /// The origin's GET metadata answer, when resolving had to fetch it
    pub revision_meta: Option<OriginResponse>,
}

impl Resolution {
    pub fn commit(commit: impl Into<String>) -> Self {
        Self {
            commit: commit.into(),
            revision_meta: None,
        }
    }
}

/// Maps a revision (branch, tag or commit) to an immutable commit
#[async_trait]
pub trait CommitResolver: Send + Sync {
    async fn resolve(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        revision: &str,
        auth_token: Option<&str>,
    ) -> Result<String, ResolveError>;

    /// Resolve, handing back any metadata response fetched on the way
    async fn resolve_with_meta(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        revision: &str,
        auth_token: Option<&str>,
    ) -> Result<Resolution, ResolveError> {
        let commit = self
            .resolve(repo_type, org_repo, revision, auth_token)
            .await?;
        Ok(Resolution::commit(commit))
    }
}

#[derive(Debug, Deserialize)]
struct RevisionInfo {
    sha: String,
}

/// Resolver backed by the origin hub when online and by cached metadata when offline
pub struct HubCommitResolver {
    origin: Arc<dyn OriginClient>,
    store: Arc<dyn CacheStore>,
    layout: CacheLayout,
    online: bool,
}

impl HubCommitResolver {
    pub fn new(
        origin: Arc<dyn OriginClient>,
        store: Arc<dyn CacheStore>,
        layout: CacheLayout,
        online: bool,
    ) -> Self {
        Self {
            origin,
            store,
            layout,
            online,
        }
    }

    async fn resolve_online(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        revision: &str,
        auth_token: Option<&str>,
    ) -> Result<Resolution, ResolveError> {
        let response = self
            .origin
            .fetch_meta(RequestMethod::Get, repo_type, org_repo, revision, auth_token)
            .await
            .map_err(|e| ResolveError::Other(e.to_string()))?;

        if response.status != 200 {
            return Err(ResolveError::Upstream {
                status: response.status,
                message: format!("revision {} not resolvable", revision),
            });
        }

        let info: RevisionInfo = serde_json::from_slice(&response.body)
            .map_err(|e| ResolveError::Other(format!("invalid revision info: {}", e)))?;
        Ok(Resolution {
            commit: info.sha,
            revision_meta: Some(response),
        })
    }

    /// Look up the commit in the revision-keyed metadata written by earlier fetches
    async fn resolve_offline(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        revision: &str,
    ) -> Result<String, ResolveError> {
        if check_relative(org_repo).is_err() || check_relative(revision).is_err() {
            return Err(ResolveError::Upstream {
                status: 404,
                message: format!("revision {} is not cached", revision),
            });
        }

        let get_path = self
            .layout
            .meta_path(repo_type, org_repo, revision, RequestMethod::Get);
        if self.store.exists(&get_path) {
            let content = self
                .store
                .read(&get_path)
                .await
                .map_err(|e| ResolveError::Other(e.to_string()))?;
            let info: RevisionInfo = serde_json::from_slice(content.body())
                .map_err(|e| ResolveError::Other(format!("invalid revision info: {}", e)))?;
            return Ok(info.sha);
        }

        let head_path = self
            .layout
            .meta_path(repo_type, org_repo, revision, RequestMethod::Head);
        if self.store.exists(&head_path) {
            let content = self
                .store
                .read(&head_path)
                .await
                .map_err(|e| ResolveError::Other(e.to_string()))?;
            if let Some(commit) = content.headers.get("x-repo-commit") {
                return Ok(commit.clone());
            }
        }

        Err(ResolveError::Upstream {
            status: 404,
            message: format!("revision {} is not cached", revision),
        })
    }
}

#[async_trait]
impl CommitResolver for HubCommitResolver {
    async fn resolve(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        revision: &str,
        auth_token: Option<&str>,
    ) -> Result<String, ResolveError> {
        self.resolve_with_meta(repo_type, org_repo, revision, auth_token)
            .await
            .map(|resolution| resolution.commit)
    }

    async fn resolve_with_meta(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        revision: &str,
        auth_token: Option<&str>,
    ) -> Result<Resolution, ResolveError> {
        if is_commit_sha(revision) {
            return Ok(Resolution::commit(revision));
        }

        if self.online {
            self.resolve_online(repo_type, org_repo, revision, auth_token)
                .await
        } else {
            self.resolve_offline(repo_type, org_repo, revision)
                .await
                .map(Resolution::commit)
        }
    }
}
