//! Remote hub client

use crate::repo::{RepoType, RequestMethod};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use std::collections::HashMap;
use std::time::Duration;

/// Headers that describe a single connection and are never replayed from cache
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Failure to obtain any response from the origin
#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("origin request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for OriginError {
    fn from(err: reqwest::Error) -> Self {
        OriginError::Transport(err.to_string())
    }
}

/// A complete origin response
#[derive(Debug, Clone)]
pub struct OriginResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl OriginResponse {
    /// 200 and 307 are the only metadata answers worth caching
    pub fn is_cacheable_meta(&self) -> bool {
        self.status == 200 || self.status == 307
    }
}

/// Keep the first value of every end-to-end header
pub fn extract_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut extracted = HashMap::new();
    for (name, value) in headers {
        let name = name.as_str();
        if HOP_BY_HOP_HEADERS.contains(&name) || extracted.contains_key(name) {
            continue;
        }
        match value.to_str() {
            Ok(value) => {
                extracted.insert(name.to_string(), value.to_string());
            }
            Err(_) => {
                tracing::debug!(header = %name, "Skipping non-text header value");
            }
        }
    }
    extracted
}

/// Request headers never forwarded: the origin gets its own host and length
const REQUEST_ONLY_HEADERS: &[&str] = &["host", "content-length"];

/// Request headers worth replaying against the origin
pub fn forwardable_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut extracted = extract_headers(headers);
    extracted.retain(|name, _| !REQUEST_ONLY_HEADERS.contains(&name.as_str()));
    extracted
}

/// A client request replayed verbatim against the origin
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Path plus query string, e.g. `/api/whoami-v2` or `/api/models?search=bge`
    pub path_and_query: String,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

/// Remote metadata source
#[async_trait]
pub trait OriginClient: Send + Sync {
    /// HEAD/GET revision metadata
    async fn fetch_meta(
        &self,
        method: RequestMethod,
        repo_type: RepoType,
        org_repo: &str,
        revision: &str,
        auth_token: Option<&str>,
    ) -> Result<OriginResponse, OriginError>;

    /// GET the refs listing of a repository
    async fn fetch_refs(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        auth_token: Option<&str>,
    ) -> Result<OriginResponse, OriginError>;

    /// Replay any other request against the origin
    async fn forward(&self, request: ForwardRequest) -> Result<OriginResponse, OriginError>;
}

/// Origin client talking to a hub over HTTP
pub struct HttpOriginClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOriginClient {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        // 307 is a valid metadata answer, so redirects are handed back verbatim
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn meta_url(&self, repo_type: RepoType, org_repo: &str, revision: &str) -> String {
        format!(
            "{}/api/{}/{}/revision/{}",
            self.endpoint,
            repo_type,
            org_repo,
            urlencoding::encode(revision)
        )
    }

    fn refs_url(&self, repo_type: RepoType, org_repo: &str) -> String {
        format!("{}/api/{}/{}/refs", self.endpoint, repo_type, org_repo)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        auth_token: Option<&str>,
    ) -> Result<OriginResponse, OriginError> {
        let request = match auth_token {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = extract_headers(response.headers());
        let body = response.bytes().await?;

        Ok(OriginResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl OriginClient for HttpOriginClient {
    async fn fetch_meta(
        &self,
        method: RequestMethod,
        repo_type: RepoType,
        org_repo: &str,
        revision: &str,
        auth_token: Option<&str>,
    ) -> Result<OriginResponse, OriginError> {
        let url = self.meta_url(repo_type, org_repo, revision);
        tracing::debug!(url = %url, method = %method, "Fetching metadata from origin");

        let request = match method {
            RequestMethod::Head => self.client.head(&url),
            RequestMethod::Get => self.client.get(&url),
        };
        self.send(request, auth_token).await
    }

    async fn fetch_refs(
        &self,
        repo_type: RepoType,
        org_repo: &str,
        auth_token: Option<&str>,
    ) -> Result<OriginResponse, OriginError> {
        let url = self.refs_url(repo_type, org_repo);
        tracing::debug!(url = %url, "Fetching refs from origin");

        self.send(self.client.get(&url), auth_token).await
    }

    async fn forward(&self, request: ForwardRequest) -> Result<OriginResponse, OriginError> {
        let url = format!("{}{}", self.endpoint, request.path_and_query);
        tracing::debug!(url = %url, method = %request.method, "Forwarding request to origin");

        let mut builder = self.client.request(request.method, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        // Authorization, if any, travels with the forwarded headers
        self.send(builder, None).await
    }
}
