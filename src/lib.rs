//! # treeroute
//!
//! **treeroute** is an embeddable HTTP request router built on a radix tree.
//! Given a method and a URL path it finds the registered handler and the
//! ordered middleware chain that runs before it, in time proportional to the
//! length of the path rather than the number of routes.
//!
//! ## Overview
//!
//! - Route patterns with named parameters (`/users/:id`) and catch-alls
//!   (`/assets/*filepath`)
//! - Ambiguous registrations are rejected up front; a failed registration
//!   leaves the router unchanged
//! - Case-insensitive matching; the request path is lower-cased, captured
//!   values included
//! - A trailing `/` on the request or the route never causes a miss
//! - Sub-routers mounted under a prefix, each with its own middleware
//! - Middleware and handlers share one [`dispatcher::Handler`] trait and run
//!   as a sequential stack with an explicit continuation
//!
//! ## Architecture
//!
//! - **[`router`]** - Route grammar, per-method radix trees, composition and lookup
//! - **[`dispatcher`]** - Request/response types, the `Handler` trait and the stack runner
//! - **[`middleware`]** - Tracing, metrics and static-token authentication middleware
//! - **[`server`]** - Request-target normalisation and the not-found responder
//! - **[`static_files`]** - File responder for `/*filepath` routes
//! - **[`manifest`]** - TOML / YAML route manifests
//! - **[`runtime_config`]** / **[`logging`]** - Environment configuration and `tracing` setup
//! - **[`cli`]** - The `treeroute` command-line tool
//!
//! There is no network listener here: the embedding server builds a
//! [`dispatcher::HandlerRequest`] and calls [`router::Router::serve`].
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use serde_json::json;
//! use treeroute::dispatcher::{handler_fn, HandlerRequest, HandlerResponse};
//! use treeroute::middleware::TracingMiddleware;
//! use treeroute::router::Router;
//! use std::sync::Arc;
//!
//! let mut router = Router::new();
//! router.use_middleware(Arc::new(TracingMiddleware));
//! router
//!     .get("/users/:id", handler_fn(|req, res| {
//!         *res = HandlerResponse::json(200, json!({ "id": req.get_path_param("id") }));
//!     }))
//!     .unwrap();
//!
//! let res = router.serve(HandlerRequest::new(Method::GET, "/users/42/"));
//! assert_eq!(res.status, 200);
//!
//! let res = router.serve(HandlerRequest::new(Method::GET, "/nope"));
//! assert_eq!(res.status, 404);
//! ```
//!
//! ## Concurrency
//!
//! Registration takes `&mut self` and finishes before serving. Lookups take
//! `&self`; a built `Router` is `Send + Sync` and can be shared through an
//! `Arc`.

pub mod cli;
pub mod dispatcher;
pub mod echo;
pub mod ids;
pub mod logging;
pub mod manifest;
pub mod middleware;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod static_files;

pub use dispatcher::{handler_fn, middleware_fn, Handler, HandlerRequest, HandlerResponse, Next};
pub use router::{RouteError, RouteMatch, Router, RouterConfig};
