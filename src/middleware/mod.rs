//! Built-in middleware
//!
//! Each type implements [`Handler`](crate::dispatcher::Handler) and is added
//! to a router with `use_middleware` / `use_middleware_for`.

mod auth;
mod metrics;
mod tracing;

pub use auth::AuthMiddleware;
pub use metrics::MetricsMiddleware;
pub use tracing::TracingMiddleware;
