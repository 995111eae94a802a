use std::time::Instant;

use tracing::{field, info, info_span};

use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse, Next};

/// Runs the rest of the chain inside a `request` span and records the
/// response status and latency on it.
pub struct TracingMiddleware;

impl Handler for TracingMiddleware {
    fn call(&self, req: &mut HandlerRequest, res: &mut HandlerResponse, next: Next<'_>) {
        let span = info_span!(
            "request",
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            status = field::Empty,
            latency_us = field::Empty,
        );
        let start = Instant::now();

        span.in_scope(|| next.run(req, res));

        let latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        span.record("status", res.status);
        span.record("latency_us", latency_us);
        span.in_scope(|| {
            info!(status = res.status, latency_us, "Request completed");
        });
    }
}
