//! # Router Module
//!
//! The router module provides path matching and route resolution for treeroute.
//! Routes are stored in one radix tree per HTTP method; a lookup walks the tree
//! once, extracting parameters and collecting middleware on the way down.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Validating route patterns (`/users/:id`, `/assets/*filepath`)
//! - Building per-method radix trees, rejecting ambiguous registrations
//! - Matching incoming requests case-insensitively, forgiving a trailing `/`
//! - Mounting sub-routers under a literal prefix
//! - Producing the execution stack: middleware outer to inner, then the handler
//!
//! ## Route grammar
//!
//! ```text
//! path    := "/" segment*
//! segment := literal | ":" name | "*" name
//! ```
//!
//! `:name` matches one path segment; `*name` matches the rest of the path,
//! leading `/` included, and must be the final segment.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use treeroute::dispatcher::{handler_fn, HandlerResponse};
//! use treeroute::router::Router;
//! use serde_json::json;
//!
//! let mut api = Router::new();
//! api.get("/users/:id", handler_fn(|req, res| {
//!     *res = HandlerResponse::json(200, json!({ "id": req.get_path_param("id") }));
//! }))
//! .unwrap();
//!
//! let mut router = Router::new();
//! router.group("/api", api).unwrap();
//!
//! let m = router.lookup(&Method::GET, "/api/users/42/");
//! assert_eq!(m.get_path_param("id"), Some("42"));
//! ```
//!
//! ## Performance
//!
//! Matching time is proportional to the length of the request path, not the
//! number of routes. Siblings are kept ordered by how many routes pass through
//! them, so the busiest branches are tried first.

mod core;
mod error;
mod node;
mod path;
mod radix;
#[cfg(test)]
mod tests;

pub use core::{
    ParamVec, RouteMatch, Router, RouterConfig, DEFAULT_SLOW_LOOKUP, MAX_INLINE_PARAMS,
    SUPPORTED_METHODS,
};
pub use error::RouteError;
