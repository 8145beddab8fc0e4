//! On-disk cache layout
//!
//! Every cached response lives under `{repos_root}/api/{repo_type}/{org_repo}`:
//! ```text
//! {repos_root}/api/models/BAAI/bge-small-en-v1.5/
//! ├── revision/
//! │   ├── main/meta_get.json
//! │   └── {commit}/meta_head.json
//! ├── refs/refs_get.json
//! └── paths-info/{commit}/
//!     ├── config.json/paths-info_post.json
//!     └── onnx/
//!         └── model.onnx/paths-info_post.json
//! ```
//! Directories under `paths-info` carry no marker of their own: an entry is a
//! file exactly when it holds a `paths-info_post.json`.
//!
//! Path inputs come from request URLs and origin responses. Callers run them
//! through [`check_relative`] before deriving a path, so every derived path
//! stays below `repos_root`.

use crate::repo::{RepoType, RequestMethod};
use std::path::{Path, PathBuf};

const PATHS_INFO_FILE: &str = "paths-info_post.json";
const REFS_FILE: &str = "refs_get.json";

/// Derives cache paths from repository identity
#[derive(Debug, Clone)]
pub struct CacheLayout {
    repos_root: PathBuf,
}

impl CacheLayout {
    pub fn new(repos_root: impl Into<PathBuf>) -> Self {
        Self {
            repos_root: repos_root.into(),
        }
    }

    pub fn repos_root(&self) -> &Path {
        &self.repos_root
    }

    fn repo_dir(&self, repo_type: RepoType, org_repo: &str) -> PathBuf {
        self.repos_root
            .join("api")
            .join(repo_type.as_str())
            .join(org_repo)
    }

    /// `{root}/api/{type}/{org_repo}/revision/{revision}/meta_{method}.json`
    ///
    /// `revision` is either the caller-supplied symbolic revision or the resolved commit.
    pub fn meta_path(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        revision: &str,
        method: RequestMethod,
    ) -> PathBuf {
        self.repo_dir(repo_type, org_repo)
            .join("revision")
            .join(revision)
            .join(format!("meta_{}.json", method))
    }

    /// `{root}/api/{type}/{org_repo}/refs/refs_get.json`
    pub fn refs_path(&self, repo_type: RepoType, org_repo: &str) -> PathBuf {
        self.repo_dir(repo_type, org_repo)
            .join("refs")
            .join(REFS_FILE)
    }

    /// `{root}/api/{type}/{org_repo}/paths-info/{commit}[/{sub_path}]`
    pub fn paths_info_dir(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        commit: &str,
        sub_path: &str,
    ) -> PathBuf {
        let dir = self
            .repo_dir(repo_type, org_repo)
            .join("paths-info")
            .join(commit);
        let sub_path = normalize_sub_path(sub_path);
        if sub_path.is_empty() {
            dir
        } else {
            dir.join(sub_path)
        }
    }

    /// Per-entry path-info file inside a listing directory
    pub fn paths_info_entry(dir: &Path, entry_name: &str) -> PathBuf {
        dir.join(entry_name).join(PATHS_INFO_FILE)
    }
}

/// Cache key input that would leave the cache root
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cache path input: {0:?}")]
pub struct InvalidPath(pub String);

/// Accept `input` only as a relative path of plain components
///
/// Rejects empty input, absolute paths, empty components (`a//b`), `.`, `..`,
/// backslashes and NUL bytes.
pub fn check_relative(input: &str) -> Result<(), InvalidPath> {
    let invalid = input.is_empty()
        || input.starts_with('/')
        || input.contains(['\\', '\0'])
        || input
            .split('/')
            .any(|component| component.is_empty() || component == "." || component == "..");

    if invalid {
        Err(InvalidPath(input.to_string()))
    } else {
        Ok(())
    }
}

/// Like [`check_relative`] for a listing directory, where empty means the root
pub fn check_sub_path(sub_path: &str) -> Result<(), InvalidPath> {
    let normalized = normalize_sub_path(sub_path);
    if normalized.is_empty() {
        return Ok(());
    }
    check_relative(normalized).map_err(|_| InvalidPath(sub_path.to_string()))
}

/// Strip leading and trailing slashes from a repo-relative directory
pub fn normalize_sub_path(sub_path: &str) -> &str {
    sub_path.trim_matches('/')
}

/// Repo-relative path of `entry_name` inside `sub_path`
pub fn relative_path(sub_path: &str, entry_name: &str) -> String {
    let sub_path = normalize_sub_path(sub_path);
    if sub_path.is_empty() {
        entry_name.to_string()
    } else {
        format!("{}/{}", sub_path, entry_name)
    }
}

/// `{public_domain}/{type}/{org_repo}/resolve/{commit}/{relative_path}`
pub fn download_link(
    public_domain: &str,
    repo_type: RepoType,
    org_repo: &str,
    commit: &str,
    relative_path: &str,
) -> String {
    format!(
        "{}/{}/{}/resolve/{}/{}",
        public_domain.trim_end_matches('/'),
        repo_type,
        org_repo,
        commit,
        relative_path
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMIT: &str = "5c38ec7c405ec4b44b94cc5a9bb96e735b38267a";

    #[test]
    fn test_meta_path_layout() {
        let layout = CacheLayout::new("/data/repos");
        assert_eq!(
            layout.meta_path(RepoType::Models, "BAAI/bge-small", "main", RequestMethod::Get),
            PathBuf::from("/data/repos/api/models/BAAI/bge-small/revision/main/meta_get.json")
        );
        assert_eq!(
            layout.meta_path(RepoType::Datasets, "gpt2", COMMIT, RequestMethod::Head),
            PathBuf::from(format!(
                "/data/repos/api/datasets/gpt2/revision/{}/meta_head.json",
                COMMIT
            ))
        );
    }

    #[test]
    fn test_refs_path_layout() {
        let layout = CacheLayout::new("/data/repos");
        assert_eq!(
            layout.refs_path(RepoType::Spaces, "org/space"),
            PathBuf::from("/data/repos/api/spaces/org/space/refs/refs_get.json")
        );
    }

    #[test]
    fn test_paths_info_layout() {
        let layout = CacheLayout::new("/data/repos");
        let root = layout.paths_info_dir(RepoType::Models, "org/repo", COMMIT, "");
        assert_eq!(
            root,
            PathBuf::from(format!("/data/repos/api/models/org/repo/paths-info/{}", COMMIT))
        );

        let sub = layout.paths_info_dir(RepoType::Models, "org/repo", COMMIT, "/onnx/");
        assert_eq!(sub, root.join("onnx"));
        assert_eq!(
            CacheLayout::paths_info_entry(&sub, "model.onnx"),
            root.join("onnx/model.onnx/paths-info_post.json")
        );
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("", "a.txt"), "a.txt");
        assert_eq!(relative_path("sub", "a.txt"), "sub/a.txt");
        assert_eq!(relative_path("sub/deeper/", "a.txt"), "sub/deeper/a.txt");
    }

    #[test]
    fn test_check_relative() {
        assert!(check_relative("main").is_ok());
        assert!(check_relative("refs/pr/1").is_ok());
        assert!(check_relative("BAAI/bge-small-en-v1.5").is_ok());
        assert!(check_relative("v1..2").is_ok());

        for bad in ["", "..", ".", "../x", "a/../b", "a/./b", "a//b", "/etc", "a/", "a\\b", "a\0b"] {
            assert_eq!(check_relative(bad), Err(InvalidPath(bad.to_string())), "{:?}", bad);
        }
    }

    #[test]
    fn test_check_sub_path() {
        assert!(check_sub_path("").is_ok());
        assert!(check_sub_path("/").is_ok());
        assert!(check_sub_path("/onnx/").is_ok());
        assert!(check_sub_path("onnx/fp16").is_ok());
        assert!(check_sub_path("../../..").is_err());
        assert!(check_sub_path("onnx/../..").is_err());
        assert!(check_sub_path("onnx//fp16").is_err());
    }

    #[test]
    fn test_download_link() {
        assert_eq!(
            download_link(
                "https://mirror.example.com/",
                RepoType::Models,
                "org/repo",
                COMMIT,
                "sub/a.txt"
            ),
            format!(
                "https://mirror.example.com/models/org/repo/resolve/{}/sub/a.txt",
                COMMIT
            )
        );
    }
}
