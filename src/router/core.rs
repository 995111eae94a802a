//! Router core module - registration surface and hot path for request routing.
//!
//! A [`Router`] owns one radix tree per HTTP method. Registration (`handle`,
//! the per-method helpers, `group*`, `use_middleware*`) takes `&mut self` and
//! completes before serving; [`Router::lookup`] and [`Router::serve`] take
//! `&self`, so a built router can be shared across threads behind an `Arc`.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]

use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::dispatcher::{run_stack, BoxedHandler, HandlerRequest, HandlerResponse, Next};
use crate::server::{normalize_target, NotFound};
use crate::static_files::StaticFiles;

use super::error::RouteError;
use super::node::{Node, Payload};
use super::path::parse_group_prefix;

/// Maximum number of path/query parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g., /users/:id/posts/:post).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names are `Arc<str>` shared with the route tree, so capturing a
/// parameter clones a pointer rather than the name. Values are per-request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Methods that get a tree when middleware is added with [`Router::use_middleware`]
pub const SUPPORTED_METHODS: [Method; 8] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::OPTIONS,
    Method::HEAD,
    Method::TRACE,
];

/// Path the static file responder must be bound to
const FILEPATH_SUFFIX: &str = "/*filepath";

/// Default threshold above which a lookup is logged as slow
pub const DEFAULT_SLOW_LOOKUP: Duration = Duration::from_micros(1000);

/// Result of resolving a method and path against the router
///
/// `handler == None` means no route matched; `stack` then holds only the
/// middleware collected before the walk failed and must not be run.
pub struct RouteMatch<'r> {
    /// Path parameters in route order (e.g. `:id` → `("id", "123")`)
    pub params: ParamVec,
    /// The matched route's handler
    pub handler: Option<&'r BoxedHandler>,
    /// Middleware outer to inner, then the handler
    pub stack: Vec<&'r BoxedHandler>,
}

impl<'r> RouteMatch<'r> {
    fn miss() -> Self {
        Self {
            params: ParamVec::new(),
            handler: None,
            stack: Vec::new(),
        }
    }

    /// Whether a route was found
    #[inline]
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.handler.is_some()
    }

    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics: if the same name is captured at
    /// different depths (e.g., `/org/:id/user/:id` is rejected at registration,
    /// but sub-routers may reuse names), the innermost occurrence is returned.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert params to a HashMap
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

impl fmt::Debug for RouteMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("params", &self.params)
            .field("matched", &self.is_match())
            .field("stack_len", &self.stack.len())
            .finish()
    }
}

/// Tuning knobs for a [`Router`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Lookups slower than this are logged at `warn`
    pub slow_lookup_threshold: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            slow_lookup_threshold: DEFAULT_SLOW_LOOKUP,
        }
    }
}

/// Router that matches HTTP requests to handlers using one radix tree per method
///
/// # Performance
///
/// - Route matching: O(k) where k is the path length, independent of the
///   number of registered routes
/// - Shared prefixes are stored only once
/// - Parameter names are shared with the tree, values are the only per-request
///   allocation besides the stack vector
pub struct Router {
    trees: HashMap<Method, Node<BoxedHandler>>,
    not_found: BoxedHandler,
    config: RouterConfig,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("methods", &self.methods())
            .field("routes", &self.routes().len())
            .field("config", &self.config)
            .finish()
    }
}

impl Router {
    /// Create an empty router with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create an empty router
    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            trees: HashMap::new(),
            not_found: Arc::new(NotFound),
            config,
        }
    }

    /// The configuration this router was built with
    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Register `handler` for `method` and `path`
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the path is malformed or conflicts with a
    /// route already registered for `method`; the router is left unchanged.
    pub fn handle(&mut self, method: Method, path: &str, handler: BoxedHandler) -> Result<(), RouteError> {
        let existed = self.trees.contains_key(&method);
        let tree = self.trees.entry(method.clone()).or_insert_with(Node::root);

        if let Err(err) = tree.insert(path, Payload::Handler(handler)) {
            if !existed {
                self.trees.remove(&method);
            }
            warn!(
                method = %method,
                path = %path,
                error = %err,
                "Route registration rejected"
            );
            return Err(err);
        }

        info!(method = %method, path = %path, "Route registered");
        Ok(())
    }

    /// Register a `GET` route
    ///
    /// # Errors
    ///
    /// See [`Router::handle`].
    pub fn get(&mut self, path: &str, handler: BoxedHandler) -> Result<(), RouteError> {
        self.handle(Method::GET, path, handler)
    }

    /// Register a `POST` route
    ///
    /// # Errors
    ///
    /// See [`Router::handle`].
    pub fn post(&mut self, path: &str, handler: BoxedHandler) -> Result<(), RouteError> {
        self.handle(Method::POST, path, handler)
    }

    /// Register a `PUT` route
    ///
    /// # Errors
    ///
    /// See [`Router::handle`].
    pub fn put(&mut self, path: &str, handler: BoxedHandler) -> Result<(), RouteError> {
        self.handle(Method::PUT, path, handler)
    }

    /// Register a `PATCH` route
    ///
    /// # Errors
    ///
    /// See [`Router::handle`].
    pub fn patch(&mut self, path: &str, handler: BoxedHandler) -> Result<(), RouteError> {
        self.handle(Method::PATCH, path, handler)
    }

    /// Register a `DELETE` route
    ///
    /// # Errors
    ///
    /// See [`Router::handle`].
    pub fn delete(&mut self, path: &str, handler: BoxedHandler) -> Result<(), RouteError> {
        self.handle(Method::DELETE, path, handler)
    }

    /// Register a `HEAD` route
    ///
    /// # Errors
    ///
    /// See [`Router::handle`].
    pub fn head(&mut self, path: &str, handler: BoxedHandler) -> Result<(), RouteError> {
        self.handle(Method::HEAD, path, handler)
    }

    /// Register an `OPTIONS` route
    ///
    /// # Errors
    ///
    /// See [`Router::handle`].
    pub fn options(&mut self, path: &str, handler: BoxedHandler) -> Result<(), RouteError> {
        self.handle(Method::OPTIONS, path, handler)
    }

    /// Mount every method tree of `sub` at `prefix`
    ///
    /// Requests below `prefix` are handed to `sub` with the prefix stripped;
    /// `prefix` itself (with or without a trailing `/`) reaches `sub`'s `/`.
    /// `sub`'s middleware runs after this router's.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidGroupPrefix`] for a variable or `/` prefix, or a
    /// conflict in any of the affected method trees. Nothing is mounted unless
    /// every method can be.
    pub fn group(&mut self, prefix: &str, sub: Router) -> Result<(), RouteError> {
        let trees = sub.trees.into_iter().collect();
        self.attach_groups(prefix, trees)
    }

    /// Mount only `sub`'s tree for `method` at `prefix`
    ///
    /// # Errors
    ///
    /// See [`Router::group`].
    pub fn group_for(&mut self, method: Method, prefix: &str, mut sub: Router) -> Result<(), RouteError> {
        let trees = sub
            .trees
            .remove(&method)
            .map(|tree| (method, tree))
            .into_iter()
            .collect();
        self.attach_groups(prefix, trees)
    }

    /// Mount a different router per method at `prefix`
    ///
    /// Each router contributes only its tree for the method it is paired with.
    ///
    /// # Errors
    ///
    /// See [`Router::group`]; a method listed twice is a
    /// [`RouteError::Duplicate`].
    pub fn group_map<I>(&mut self, prefix: &str, routers: I) -> Result<(), RouteError>
    where
        I: IntoIterator<Item = (Method, Router)>,
    {
        let trees = routers
            .into_iter()
            .filter_map(|(method, mut sub)| sub.trees.remove(&method).map(|tree| (method, tree)))
            .collect();
        self.attach_groups(prefix, trees)
    }

    fn attach_groups(&mut self, prefix: &str, trees: Vec<(Method, Node<BoxedHandler>)>) -> Result<(), RouteError> {
        let prefix = parse_group_prefix(prefix)?;

        for (i, (method, _)) in trees.iter().enumerate() {
            if trees[..i].iter().any(|(seen, _)| seen == method) {
                return Err(RouteError::Duplicate { path: prefix });
            }
            if let Some(tree) = self.trees.get(method) {
                tree.check_group(&prefix)?;
            }
        }

        for (method, sub) in trees {
            let routes = sub.node_count();
            self.trees
                .entry(method.clone())
                .or_insert_with(Node::root)
                .insert(&prefix, Payload::Group(Box::new(sub)))?;
            info!(
                method = %method,
                prefix = %prefix,
                sub_nodes = routes,
                "Group mounted"
            );
        }
        Ok(())
    }

    /// Append `middleware` to every supported method's root
    pub fn use_middleware(&mut self, middleware: BoxedHandler) {
        for method in SUPPORTED_METHODS {
            self.use_middleware_for(method, Arc::clone(&middleware));
        }
    }

    /// Append `middleware` to the root of `method`'s tree only
    pub fn use_middleware_for(&mut self, method: Method, middleware: BoxedHandler) {
        let tree = self.trees.entry(method.clone()).or_insert_with(Node::root);
        tree.middleware.push(middleware);
        debug!(
            method = %method,
            middleware_count = tree.middleware.len(),
            "Middleware added"
        );
    }

    /// Replace the responder used when no route matches
    pub fn not_found(&mut self, handler: BoxedHandler) {
        self.not_found = handler;
    }

    /// Serve files below `dir` from a `GET` route ending in `/*filepath`
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidFileRoute`] when `path` does not end in
    /// `/*filepath`, or any error from [`Router::handle`].
    pub fn serve_files(&mut self, path: &str, dir: impl Into<PathBuf>) -> Result<(), RouteError> {
        if !path.ends_with(FILEPATH_SUFFIX) {
            return Err(RouteError::InvalidFileRoute {
                path: path.to_string(),
            });
        }
        self.get(path, Arc::new(StaticFiles::new(dir)))
    }

    /// Match a request path to a route and build its execution stack
    ///
    /// # Example
    ///
    /// ```rust
    /// use http::Method;
    /// use treeroute::dispatcher::handler_fn;
    /// use treeroute::router::Router;
    ///
    /// let mut router = Router::new();
    /// router.get("/users/:id", handler_fn(|_req, _res| {})).unwrap();
    ///
    /// let m = router.lookup(&Method::GET, "/users/42");
    /// assert!(m.is_match());
    /// assert_eq!(m.get_path_param("id"), Some("42"));
    /// ```
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        debug!(method = %method, path = %path, "Route match attempt");

        let Some(tree) = self.trees.get(method) else {
            debug!(method = %method, path = %path, "No routes registered for method");
            return RouteMatch::miss();
        };

        let match_start = Instant::now();
        let found = tree.lookup(path);
        let match_duration = match_start.elapsed();

        if found.handler.is_none() {
            debug!(
                method = %method,
                path = %path,
                duration_us = match_duration.as_micros(),
                "No route matched"
            );
            return RouteMatch::miss();
        }

        if match_duration > self.config.slow_lookup_threshold {
            warn!(
                method = %method,
                path = %path,
                path_params = ?found.params,
                stack_len = found.stack.len(),
                duration_us = match_duration.as_micros(),
                "Slow route matching detected"
            );
        } else {
            debug!(
                method = %method,
                path = %path,
                path_params = ?found.params,
                stack_len = found.stack.len(),
                duration_us = match_duration.as_micros(),
                "Route matched"
            );
        }

        RouteMatch {
            params: found.params,
            handler: found.handler,
            stack: found.stack,
        }
    }

    /// Route and run a request
    ///
    /// `req.path` is taken as the request target: the query string is split
    /// off into `query_params` and the path is percent-decoded before lookup.
    /// On a match the execution stack runs in order; otherwise the not-found
    /// responder runs.
    #[must_use]
    pub fn serve(&self, mut req: HandlerRequest) -> HandlerResponse {
        let (path, query) = normalize_target(&req.path);
        req.path = path;
        req.query_params.extend(query);

        let RouteMatch { params, handler, stack } = self.lookup(&req.method, &req.path);
        req.path_params = params;

        let mut res = HandlerResponse::default();
        if handler.is_some() {
            run_stack(&stack, &mut req, &mut res);
        } else {
            self.not_found.call(&mut req, &mut res, Next::empty());
        }

        debug!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            status = res.status,
            "Request served"
        );
        res
    }

    /// Methods that have a tree, in [`SUPPORTED_METHODS`] order first
    #[must_use]
    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.trees.keys().cloned().collect();
        methods.sort_by_key(|m| {
            SUPPORTED_METHODS
                .iter()
                .position(|s| s == m)
                .unwrap_or(SUPPORTED_METHODS.len())
        });
        methods
    }

    /// Every registered route as `(method, path, kind)`, sorted by method then path
    ///
    /// Paths are listed in their case-folded form; mounted groups appear once
    /// with kind `"group"` followed by the routes below them.
    #[must_use]
    pub fn routes(&self) -> Vec<(Method, String, &'static str)> {
        let mut out = Vec::new();
        for method in self.methods() {
            let Some(tree) = self.trees.get(&method) else {
                continue;
            };
            let mut routes = Vec::new();
            tree.collect_routes("", &mut routes);
            routes.sort();
            out.extend(routes.into_iter().map(|(path, kind)| (method.clone(), path, kind)));
        }
        out
    }

    /// Total number of tree nodes across all methods
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.trees.values().map(Node::node_count).sum()
    }
}
