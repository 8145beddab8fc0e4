//! API request handlers

use super::models::{FilesParams, HealthResponse, ListQuery, RefsParams, RevisionParams};
use super::routes::AppState;
use crate::error::MirrorError;
use crate::origin::{ForwardRequest, forwardable_headers};
use crate::proxy::{FileDescribe, emit_content, emit_stream};
use crate::repo::{RepoType, RequestMethod, org_repo};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::Response,
};

/// GET /health - Mirror health check
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            online: state.service.config().online,
            timestamp: chrono::Utc::now(),
        }),
    )
}

/// GET /metrics - Prometheus metrics
pub async fn metrics(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}

/// HEAD /api/{repo_type}/{org}/{repo}/revision/{revision}
pub async fn meta_head(
    State(state): State<AppState>,
    Path(params): Path<RevisionParams>,
    headers: HeaderMap,
) -> Result<Response, MirrorError> {
    serve_meta(state, params, headers, RequestMethod::Head).await
}

/// GET /api/{repo_type}/{org}/{repo}/revision/{revision}
pub async fn meta_get(
    State(state): State<AppState>,
    Path(params): Path<RevisionParams>,
    headers: HeaderMap,
) -> Result<Response, MirrorError> {
    serve_meta(state, params, headers, RequestMethod::Get).await
}

async fn serve_meta(
    state: AppState,
    params: RevisionParams,
    headers: HeaderMap,
    method: RequestMethod,
) -> Result<Response, MirrorError> {
    let repo_type = parse_repo_type(&params.repo_type)?;
    let (org, repo) = params.names();

    let content = state
        .service
        .resolve_and_serve(
            repo_type,
            &org_repo(&org, &repo),
            &params.revision,
            method,
            auth_token(&headers),
        )
        .await?;

    Ok(emit_content(method, content))
}

/// GET /api/{repo_type}/{org}/{repo}/refs
pub async fn repo_refs(
    State(state): State<AppState>,
    Path(params): Path<RefsParams>,
    headers: HeaderMap,
) -> Result<Response, MirrorError> {
    let (org, repo) = params.names();

    let streamed = state
        .service
        .get_refs(&params.repo_type, &org, &repo, auth_token(&headers))
        .await?;

    Ok(emit_stream(streamed))
}

/// GET /api/{repo_type}/{org}/{repo}/files/{commit}?path=sub/dir
pub async fn list_files(
    State(state): State<AppState>,
    Path(params): Path<FilesParams>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<FileDescribe>>, MirrorError> {
    let repo_type = parse_repo_type(&params.repo_type)?;
    let (org, repo) = params.names();

    let files = state
        .service
        .list_files(repo_type, &org_repo(&org, &repo), &params.commit, &query.path)
        .await?;

    Ok(Json(files))
}

/// Any route without a dedicated handler, plus `/api/whoami-v2` and `/api/repos/*`
///
/// Replayed against the origin and returned as-is.
pub async fn forward_to_origin(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, MirrorError> {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let emit_as = if method == Method::HEAD {
        RequestMethod::Head
    } else {
        RequestMethod::Get
    };

    let content = state
        .service
        .forward(ForwardRequest {
            method,
            path_and_query,
            headers: forwardable_headers(&headers),
            body,
        })
        .await?;

    Ok(emit_content(emit_as, content))
}

fn parse_repo_type(segment: &str) -> Result<RepoType, MirrorError> {
    segment.parse().map_err(|e| {
        tracing::warn!(error = %e, "Unknown repository type");
        MirrorError::PageNotFound
    })
}

fn auth_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}
