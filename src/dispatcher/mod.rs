//! # Dispatcher Module
//!
//! The dispatcher module runs the execution stacks the router produces.
//!
//! ## Overview
//!
//! A matched route yields an ordered list of callables: the middleware added
//! with `use_middleware` on the outer router, then that of any mounted
//! sub-routers, then the route's handler. They all implement [`Handler`]:
//!
//! ```rust
//! use treeroute::dispatcher::{handler_fn, middleware_fn, HandlerResponse};
//!
//! let log_it = middleware_fn(|req, res, next| {
//!     tracing::info!(path = %req.path, "before");
//!     next.run(req, res);
//!     tracing::info!(status = res.status, "after");
//! });
//!
//! let hello = handler_fn(|_req, res| {
//!     *res = HandlerResponse::text(200, "hello");
//! });
//! # let _ = (log_it, hello);
//! ```
//!
//! ## Request Flow
//!
//! 1. Router matches the request → `{ params, handler, stack }`
//! 2. Params are attached to the [`HandlerRequest`]
//! 3. [`run_stack`] calls the first callable with a [`Next`] over the rest
//! 4. Each callable decides whether to continue by calling `next.run`
//! 5. The [`HandlerResponse`] written along the way is returned to the caller
//!
//! Execution is strictly sequential and synchronous; there is exactly one
//! continuation per callable and it is consumed when run.

mod core;

pub use core::{
    handler_fn, middleware_fn, run_stack, BoxedHandler, Handler, HandlerFn,
    HandlerRequest, HandlerResponse, HeaderVec, MiddlewareFn, Next, ResponseBody,
    MAX_INLINE_HEADERS,
};
