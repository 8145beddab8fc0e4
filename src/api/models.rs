//! API request and response models

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub online: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Split `org` and optional `repo` path segments into `(org, repo)`
///
/// Routes without an organization capture the repository name in the `org` slot.
fn split_names(org: &str, repo: Option<&str>) -> (String, String) {
    match repo {
        Some(repo) => (org.to_string(), repo.to_string()),
        None => (String::new(), org.to_string()),
    }
}

/// `/api/{repo_type}/{org}[/{repo}]/revision/{revision}`
#[derive(Debug, Deserialize)]
pub struct RevisionParams {
    pub repo_type: String,
    pub org: String,
    #[serde(default)]
    pub repo: Option<String>,
    pub revision: String,
}

impl RevisionParams {
    pub fn names(&self) -> (String, String) {
        split_names(&self.org, self.repo.as_deref())
    }
}

/// `/api/{repo_type}/{org}[/{repo}]/refs`
#[derive(Debug, Deserialize)]
pub struct RefsParams {
    pub repo_type: String,
    pub org: String,
    #[serde(default)]
    pub repo: Option<String>,
}

impl RefsParams {
    pub fn names(&self) -> (String, String) {
        split_names(&self.org, self.repo.as_deref())
    }
}

/// `/api/{repo_type}/{org}[/{repo}]/files/{commit}`
#[derive(Debug, Deserialize)]
pub struct FilesParams {
    pub repo_type: String,
    pub org: String,
    #[serde(default)]
    pub repo: Option<String>,
    pub commit: String,
}

impl FilesParams {
    pub fn names(&self) -> (String, String) {
        split_names(&self.org, self.repo.as_deref())
    }
}

/// Query parameters for directory listings
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Repo-relative directory; empty for the repository root
    #[serde(default)]
    pub path: String,
}
