//! Dispatcher core module - hot path for running execution stacks.
//!
//! Every callable on a route, middleware and final handler alike, implements
//! [`Handler`]. A lookup produces an ordered stack of them and [`run_stack`]
//! calls the first one with a [`Next`] continuation over the rest. Calling
//! `next.run(..)` proceeds down the stack; returning without calling it ends
//! the chain there.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::router::ParamVec;
use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Maximum inline headers before heap allocation
/// Most requests have ≤16 headers
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path
///
/// Header names use `Arc<str>`: they repeat across requests and cloning is
/// an atomic increment.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Request data passed down an execution stack
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path; before [`Router::serve`](crate::router::Router::serve)
    /// normalises it this is the raw request target, query string included
    pub path: String,
    /// Path parameters extracted by the router (stack-allocated for ≤8 params)
    pub path_params: ParamVec,
    /// Query string parameters (stack-allocated for ≤8 params)
    pub query_params: ParamVec,
    /// HTTP headers (stack-allocated for ≤16 headers)
    pub headers: HeaderVec,
    /// Request body parsed as JSON (if present)
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// A request for `method` and `target` with no headers or body
    #[must_use]
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: target.into(),
            path_params: ParamVec::new(),
            query_params: ParamVec::new(),
            headers: HeaderVec::new(),
            body: None,
        }
    }

    /// Add a header; an `x-request-id` holding a valid ULID becomes the request ID
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name.eq_ignore_ascii_case(REQUEST_ID_HEADER) {
            self.request_id = RequestId::from_header_or_new(Some(&value));
        }
        self.headers.push((Arc::from(name), value));
        self
    }

    /// Attach a JSON body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics: a sub-router may capture a name its
    /// parent already captured; the innermost value is returned.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: if duplicate query parameter names exist
    /// (e.g., `?limit=10&limit=20`), returns the last occurrence.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to HashMap for compatibility
    /// Note: This allocates - use get_path_param() in hot paths
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Convert query_params to HashMap for compatibility
    /// Note: This allocates - use get_query_param() in hot paths
    #[must_use]
    pub fn query_params_map(&self) -> HashMap<String, String> {
        self.query_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Response payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
}

impl ResponseBody {
    /// The body as UTF-8 text, if it is representable as such
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            ResponseBody::Empty => Some(String::new()),
            ResponseBody::Json(value) => Some(value.to_string()),
            ResponseBody::Text(text) => Some(text.clone()),
            ResponseBody::Bytes(bytes) => String::from_utf8(bytes.clone()).ok(),
        }
    }

    /// The body as JSON, if it is JSON
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Response built up as a request travels down its execution stack
///
/// Starts out as `200` with an empty body; handlers overwrite it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers)
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body
    pub body: ResponseBody,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: ResponseBody::Empty,
        }
    }
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: ResponseBody) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut res = Self::new(status, HeaderVec::new(), ResponseBody::Json(body));
        res.set_header("content-type", "application/json".to_string());
        res
    }

    /// Create a plain-text response
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut res = Self::new(status, HeaderVec::new(), ResponseBody::Text(body.into()));
        res.set_header("content-type", "text/plain".to_string());
        res
    }

    /// Create a raw response with an explicit content type
    #[must_use]
    pub fn bytes(status: u16, body: Vec<u8>, content_type: &str) -> Self {
        let mut res = Self::new(status, HeaderVec::new(), ResponseBody::Bytes(body));
        res.set_header("content-type", content_type.to_string());
        res
    }

    /// Create an error response
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// A callable on an execution stack
///
/// Middleware does its work and calls `next.run(req, res)` to continue; a
/// final handler writes `res` and ignores `next`. Not calling `next` ends the
/// chain, which is how middleware short-circuits a request.
pub trait Handler: Send + Sync {
    fn call(&self, req: &mut HandlerRequest, res: &mut HandlerResponse, next: Next<'_>);
}

/// Handlers as stored in the router
pub type BoxedHandler = Arc<dyn Handler>;

/// Continuation over the remainder of an execution stack
///
/// Consumed by [`Next::run`], so each callable can continue the chain at most
/// once.
pub struct Next<'a> {
    rest: &'a [&'a BoxedHandler],
}

impl<'a> Next<'a> {
    /// A continuation with nothing left to run
    #[must_use]
    pub fn empty() -> Self {
        Self { rest: &[] }
    }

    /// Number of callables still to run
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    /// Run the next callable on the stack, if any
    pub fn run(self, req: &mut HandlerRequest, res: &mut HandlerResponse) {
        if let Some((first, rest)) = self.rest.split_first() {
            first.call(req, res, Next { rest });
        }
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.rest.len())
            .finish()
    }
}

/// Run `stack` in order, starting with its first callable
pub fn run_stack(stack: &[&BoxedHandler], req: &mut HandlerRequest, res: &mut HandlerResponse) {
    Next { rest: stack }.run(req, res);
}

/// Adapter that turns a closure into a final [`Handler`]
pub struct HandlerFn<F>(F);

impl<F> Handler for HandlerFn<F>
where
    F: Fn(&mut HandlerRequest, &mut HandlerResponse) + Send + Sync,
{
    fn call(&self, req: &mut HandlerRequest, res: &mut HandlerResponse, _next: Next<'_>) {
        (self.0)(req, res);
    }
}

/// Box a closure as a final handler
pub fn handler_fn<F>(f: F) -> BoxedHandler
where
    F: Fn(&mut HandlerRequest, &mut HandlerResponse) + Send + Sync + 'static,
{
    Arc::new(HandlerFn(f))
}

/// Adapter that turns a closure into middleware
pub struct MiddlewareFn<F>(F);

impl<F> Handler for MiddlewareFn<F>
where
    F: for<'a> Fn(&mut HandlerRequest, &mut HandlerResponse, Next<'a>) + Send + Sync,
{
    fn call(&self, req: &mut HandlerRequest, res: &mut HandlerResponse, next: Next<'_>) {
        (self.0)(req, res, next);
    }
}

/// Box a closure as middleware; it receives the continuation to call
pub fn middleware_fn<F>(f: F) -> BoxedHandler
where
    F: for<'a> Fn(&mut HandlerRequest, &mut HandlerResponse, Next<'a>) + Send + Sync + 'static,
{
    Arc::new(MiddlewareFn(f))
}
