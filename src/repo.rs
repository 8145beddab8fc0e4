//! Repository identity: repo types, request methods and `org/repo` naming

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recognized repository types, rendered as their plural URL segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    Models,
    Datasets,
    Spaces,
}

impl RepoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepoType::Models => "models",
            RepoType::Datasets => "datasets",
            RepoType::Spaces => "spaces",
        }
    }
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a URL segment is not a known repository type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown repository type: {0}")]
pub struct UnknownRepoType(pub String);

impl FromStr for RepoType {
    type Err = UnknownRepoType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "models" => Ok(RepoType::Models),
            "datasets" => Ok(RepoType::Datasets),
            "spaces" => Ok(RepoType::Spaces),
            other => Err(UnknownRepoType(other.to_string())),
        }
    }
}

/// Metadata request method; part of the cache file name (`meta_head.json`, `meta_get.json`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    Head,
    Get,
}

impl RequestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Head => "head",
            RequestMethod::Get => "get",
        }
    }

    pub fn is_head(&self) -> bool {
        matches!(self, RequestMethod::Head)
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join an organization and repository name the way the hub does
///
/// Repositories without an organization (e.g. `gpt2`) are addressed by name alone.
pub fn org_repo(org: &str, repo: &str) -> String {
    if org.is_empty() {
        repo.to_string()
    } else {
        format!("{}/{}", org, repo)
    }
}

/// True when `revision` already is a full commit identifier (40 hex chars)
pub fn is_commit_sha(revision: &str) -> bool {
    revision.len() == 40 && revision.bytes().all(|b| b.is_ascii_hexdigit())
}
