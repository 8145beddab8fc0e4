//! Refs listing proxy
//!
//! Single-tier: one entry per repository. Online requests always refetch since
//! refs move without any commit or path changing; offline requests replay the
//! cached entry.

use super::emit::StreamedContent;
use super::{MirrorService, checked_inputs};
use crate::cache::CacheContent;
use crate::error::{MirrorError, MirrorResult};
use crate::metrics;
use crate::repo::{RepoType, org_repo};

impl MirrorService {
    /// Serve the refs of `org/repo`, streaming the body through a bounded channel
    #[tracing::instrument(skip_all, fields(%repo_type, %org, %repo))]
    pub async fn get_refs(
        &self,
        repo_type: &str,
        org: &str,
        repo: &str,
        auth_token: Option<&str>,
    ) -> MirrorResult<StreamedContent> {
        let repo_type: RepoType = repo_type.parse().map_err(|e| {
            tracing::error!(error = %e, "Refs requested for unknown repository type");
            MirrorError::PageNotFound
        })?;

        if org.is_empty() && repo.is_empty() {
            tracing::error!("Refs requested without org and repo");
            return Err(MirrorError::RepoNotFound);
        }

        let org_repo = org_repo(org, repo);
        checked_inputs(&[&org_repo])?;
        let refs_path = self.layout.refs_path(repo_type, &org_repo);
        self.store.ensure_dirs(&refs_path).await.map_err(|e| {
            tracing::error!(path = ?refs_path, error = %e, "Failed to create refs directory");
            MirrorError::proxy(e.to_string())
        })?;

        let content = if self.config.online {
            self.fetch_and_store_refs(repo_type, &org_repo, auth_token)
                .await?
        } else {
            if !self.store.exists(&refs_path) {
                tracing::error!(path = ?refs_path, "Refs not cached and mirror is offline");
                return Err(MirrorError::proxy(format!(
                    "refs for {} not cached",
                    org_repo
                )));
            }
            let content = self.store.read(&refs_path).await.map_err(|e| {
                tracing::error!(path = ?refs_path, error = %e, "Failed to read cached refs");
                MirrorError::proxy(e.to_string())
            })?;
            metrics::record_cache_hit("refs");
            content
        };

        Ok(self.stream_content(content))
    }

    async fn fetch_and_store_refs(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        auth_token: Option<&str>,
    ) -> MirrorResult<CacheContent> {
        let response = self
            .origin
            .fetch_refs(repo_type, org_repo, auth_token)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Origin refs request failed");
                MirrorError::proxy(e.to_string())
            })?;

        metrics::record_origin_fetch("refs", response.status);

        let content = CacheContent::new(response.status, response.headers, response.body);
        let refs_path = self.layout.refs_path(repo_type, org_repo);
        self.store.write(&refs_path, &content).await.map_err(|e| {
            tracing::error!(path = ?refs_path, error = %e, "Failed to write refs cache");
            MirrorError::proxy(e.to_string())
        })?;

        Ok(content)
    }

    /// Hand content to the emitter as a single chunk followed by channel close
    fn stream_content(&self, content: CacheContent) -> StreamedContent {
        let (status, headers, body) = content.into_parts();
        let (tx, streamed) =
            StreamedContent::channel(status, headers, self.config.stream_channel_capacity);

        tokio::spawn(async move {
            if tx.send(body).await.is_err() {
                tracing::debug!("Refs consumer went away before the body was sent");
            }
        });

        streamed
    }
}
