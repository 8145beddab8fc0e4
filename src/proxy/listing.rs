//! Directory listings rebuilt from cached path-info entries
//!
//! Listings never reach the origin. An entry below the listing directory is a
//! file when it holds a path-info cache file, otherwise a directory.

use super::{MirrorService, checked_inputs, reject_input};
use crate::cache::{CacheError, CacheLayout, check_sub_path, download_link, relative_path};
use crate::error::{MirrorError, MirrorResult};
use crate::metrics;
use crate::repo::RepoType;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One file as last reported by the origin's paths-info endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathInfoEntry {
    pub path: String,
    #[serde(default)]
    pub size: u64,
}

/// A listing row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescribe {
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
    /// Download link; empty for directories
    pub link: String,
}

impl FileDescribe {
    fn directory(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: 0,
            is_dir: true,
            link: String::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum EntryError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("invalid path-info content: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Directories first, then byte-wise by name
pub fn sort_entries(entries: &mut [FileDescribe]) {
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
}

impl MirrorService {
    /// List the cached entries of `sub_path` at `commit`
    #[tracing::instrument(skip_all, fields(%repo_type, %org_repo, %commit, %sub_path))]
    pub async fn list_files(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        commit: &str,
        sub_path: &str,
    ) -> MirrorResult<Vec<FileDescribe>> {
        checked_inputs(&[org_repo, commit])?;
        check_sub_path(sub_path).map_err(reject_input)?;

        let dir = self
            .layout
            .paths_info_dir(repo_type, org_repo, commit, sub_path);

        if !self.store.exists(&dir) {
            tracing::warn!(path = ?dir, "Listing directory not cached");
            return Err(MirrorError::NotFound("file not exists".to_string()));
        }

        let names = self.store.list_entries(&dir).await.map_err(|e| {
            tracing::warn!(path = ?dir, error = %e, "Failed to enumerate listing directory");
            MirrorError::proxy(e.to_string())
        })?;

        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            match self
                .describe_entry(&dir, repo_type, org_repo, commit, sub_path, &name)
                .await
            {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::error!(entry = %name, error = %e, "Skipping unreadable listing entry");
                    metrics::record_listing_entry_skipped();
                }
            }
        }

        sort_entries(&mut entries);
        Ok(entries)
    }

    async fn describe_entry(
        &self,
        dir: &Path,
        repo_type: RepoType,
        org_repo: &str,
        commit: &str,
        sub_path: &str,
        name: &str,
    ) -> Result<FileDescribe, EntryError> {
        let info_path = CacheLayout::paths_info_entry(dir, name);
        if !self.store.exists(&info_path) {
            return Ok(FileDescribe::directory(name));
        }

        let content = self.store.read(&info_path).await?;
        let infos: Vec<PathInfoEntry> = serde_json::from_slice(content.body())?;

        let full_path = relative_path(sub_path, name);
        // Unmatched entries keep size 0
        let size = infos
            .iter()
            .find(|info| info.path == full_path)
            .map(|info| info.size)
            .unwrap_or(0);

        Ok(FileDescribe {
            name: name.to_string(),
            size,
            is_dir: false,
            link: download_link(
                &self.config.public_domain,
                repo_type,
                org_repo,
                commit,
                &full_path,
            ),
        })
    }
}
