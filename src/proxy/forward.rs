//! Passthrough for requests the mirror does not serve itself
//!
//! Account lookups (`whoami-v2`), repository management and every route
//! without a dedicated handler are replayed against the origin. Nothing is
//! cached; status, headers and body come back as the origin sent them.

use super::MirrorService;
use crate::cache::CacheContent;
use crate::error::{MirrorError, MirrorResult};
use crate::metrics;
use crate::origin::ForwardRequest;

impl MirrorService {
    /// Replay `request` against the origin
    ///
    /// Offline mirrors never reach the origin, so forwarding fails with a proxy error.
    #[tracing::instrument(skip_all, fields(method = %request.method, path = %request.path_and_query))]
    pub async fn forward(&self, request: ForwardRequest) -> MirrorResult<CacheContent> {
        if !self.config.online {
            tracing::warn!("Cannot forward while offline");
            return Err(MirrorError::proxy(format!(
                "offline: {} not forwarded",
                request.path_and_query
            )));
        }

        tracing::info!("Forwarding request to origin");
        let response = self.origin.forward(request).await.map_err(|e| {
            tracing::error!(error = %e, "Forwarded request failed");
            MirrorError::proxy(e.to_string())
        })?;

        metrics::record_origin_fetch("forward", response.status);
        Ok(CacheContent::new(
            response.status,
            response.headers,
            response.body,
        ))
    }
}
