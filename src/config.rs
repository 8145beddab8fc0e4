//! Configuration structures and loading logic

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main mirror configuration
///
/// Built once at startup, validated, then shared read-only with every component.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MirrorConfig {
    pub api_port: u16,
    /// Root of the on-disk cache (`{repos_root}/api/...`)
    pub repos_root: PathBuf,
    /// Base URL clients use to reach this mirror; prefix of download links
    pub public_domain: String,
    /// When false, cache misses never reach the origin
    pub online: bool,
    /// Origin hub base URL
    pub origin_endpoint: String,
    pub request_timeout_secs: u64,
    /// Slots in the bounded channel used to stream refs bodies
    pub stream_channel_capacity: usize,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            repos_root: default_repos_root(),
            public_domain: default_public_domain(),
            online: true,
            origin_endpoint: default_origin_endpoint(),
            request_timeout_secs: default_request_timeout(),
            stream_channel_capacity: default_stream_channel_capacity(),
        }
    }
}

impl MirrorConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content).context("Failed to parse TOML config")?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(port) = std::env::var("HUB_MIRROR_API_PORT") {
            config.api_port = port.parse().context("Invalid HUB_MIRROR_API_PORT value")?;
        }
        if let Ok(root) = std::env::var("HUB_MIRROR_REPOS_ROOT") {
            config.repos_root = PathBuf::from(root);
        }
        if let Ok(domain) = std::env::var("HUB_MIRROR_PUBLIC_DOMAIN") {
            config.public_domain = domain;
        }
        if let Ok(online) = std::env::var("HUB_MIRROR_ONLINE") {
            config.online = online
                .parse()
                .context("Invalid HUB_MIRROR_ONLINE value (expected true or false)")?;
        }
        if let Ok(origin) = std::env::var("HUB_MIRROR_ORIGIN") {
            config.origin_endpoint = origin;
        }

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_port < 1024 {
            anyhow::bail!("API port must be >= 1024 (got {})", self.api_port);
        }

        if self.public_domain.trim().is_empty() {
            anyhow::bail!("public_domain cannot be empty");
        }

        if !self.origin_endpoint.starts_with("http://")
            && !self.origin_endpoint.starts_with("https://")
        {
            anyhow::bail!(
                "origin_endpoint must be an http(s) URL (got '{}')",
                self.origin_endpoint
            );
        }

        if self.stream_channel_capacity == 0 {
            anyhow::bail!("stream_channel_capacity must be at least 1");
        }

        if !self.repos_root.exists() {
            std::fs::create_dir_all(&self.repos_root).with_context(|| {
                format!("Cannot create repos root directory: {:?}", self.repos_root)
            })?;
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

// Default functions
fn default_api_port() -> u16 {
    8090
}
fn default_repos_root() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("hub-mirror/repos"))
        .unwrap_or_else(|| PathBuf::from("/tmp/hub-mirror/repos"))
}
fn default_public_domain() -> String {
    "http://localhost:8090".to_string()
}
fn default_origin_endpoint() -> String {
    "https://huggingface.co".to_string()
}
fn default_request_timeout() -> u64 {
    30
}
fn default_stream_channel_capacity() -> usize {
    16
}
