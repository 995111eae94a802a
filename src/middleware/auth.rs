use std::sync::Arc;

use tracing::warn;

use super::MetricsMiddleware;
use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse, Next};

/// Static bearer-token check
///
/// Compares the `authorization` header to a fixed token. On mismatch it
/// replies `401` and does not call the rest of the chain.
pub struct AuthMiddleware {
    token: String,
    metrics: Option<Arc<MetricsMiddleware>>,
}

impl AuthMiddleware {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self {
            token,
            metrics: None,
        }
    }

    /// Count rejected requests in `metrics`
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsMiddleware>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl Handler for AuthMiddleware {
    fn call(&self, req: &mut HandlerRequest, res: &mut HandlerResponse, next: Next<'_>) {
        match req.get_header("authorization") {
            Some(h) if h == self.token => next.run(req, res),
            presented => {
                warn!(
                    request_id = %req.request_id,
                    path = %req.path,
                    header_present = presented.is_some(),
                    "Authentication failed"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.inc_auth_failure();
                }
                *res = HandlerResponse::error(401, "Unauthorized");
            }
        }
    }
}
