use super::{RouteError, Router, RouterConfig, DEFAULT_SLOW_LOOKUP, SUPPORTED_METHODS};
use crate::dispatcher::{handler_fn, middleware_fn, BoxedHandler, HandlerRequest, HandlerResponse};
use http::Method;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn named(name: &'static str) -> BoxedHandler {
    handler_fn(move |_req, res| {
        *res = HandlerResponse::text(200, name);
    })
}

fn recording(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> BoxedHandler {
    let log = Arc::clone(log);
    middleware_fn(move |req, res, next| {
        log.lock().unwrap().push(name.to_string());
        next.run(req, res);
    })
}

fn body(res: &HandlerResponse) -> String {
    res.body.as_text().unwrap_or_default()
}

#[test]
fn test_handle_and_lookup() {
    let mut router = Router::new();
    router.get("/users/:id", named("get_user")).unwrap();
    router.post("/users", named("create_user")).unwrap();
    router.put("/users/:id", named("update_user")).unwrap();
    router.patch("/users/:id", named("patch_user")).unwrap();
    router.delete("/users/:id", named("delete_user")).unwrap();
    router.head("/health", named("head")).unwrap();
    router.options("/health", named("options")).unwrap();

    let m = router.lookup(&Method::GET, "/users/42");
    assert!(m.is_match());
    assert_eq!(m.get_path_param("id"), Some("42"));
    assert_eq!(m.stack.len(), 1);

    assert!(router.lookup(&Method::POST, "/users").is_match());
    assert!(!router.lookup(&Method::POST, "/users/42").is_match());
    assert!(!router.lookup(&Method::TRACE, "/health").is_match());
    assert_eq!(
        router.methods(),
        vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
            Method::HEAD
        ]
    );
}

#[test]
fn test_with_config() {
    let config = RouterConfig {
        slow_lookup_threshold: Duration::from_micros(5),
    };
    let router = Router::with_config(config);
    assert_eq!(router.config(), &config);
    assert_eq!(Router::new().config().slow_lookup_threshold, DEFAULT_SLOW_LOOKUP);
}

#[test]
fn test_custom_method() {
    let mut router = Router::new();
    let purge = Method::from_bytes(b"PURGE").unwrap();
    router.handle(purge.clone(), "/cache/*key", named("purge")).unwrap();
    let m = router.lookup(&purge, "/cache/a/b");
    assert_eq!(m.get_path_param("key"), Some("/a/b"));
    assert_eq!(router.methods().last(), Some(&purge));
}

#[test]
fn test_failed_handle_removes_new_tree() {
    let mut router = Router::new();
    assert!(matches!(
        router.get("users", named("x")),
        Err(RouteError::MissingLeadingSlash { .. })
    ));
    assert!(router.methods().is_empty());

    router.get("/users/:id", named("x")).unwrap();
    assert!(router.get("/users/:name", named("y")).is_err());
    assert_eq!(router.methods(), vec![Method::GET]);
    assert_eq!(router.routes().len(), 1);
}

#[test]
fn test_serve_runs_handler() {
    let mut router = Router::new();
    router
        .get(
            "/users/:id",
            handler_fn(|req, res| {
                let id = req.get_path_param("id").unwrap_or_default().to_string();
                let limit = req.get_query_param("limit").unwrap_or("none").to_string();
                *res = HandlerResponse::text(200, format!("{id}:{limit}"));
            }),
        )
        .unwrap();

    let res = router.serve(HandlerRequest::new(Method::GET, "/USERS/AbC?limit=5"));
    assert_eq!(res.status, 200);
    assert_eq!(body(&res), "abc:5");

    let res = router.serve(HandlerRequest::new(Method::GET, "/users/a%20b/"));
    assert_eq!(body(&res), "a b:none");
}

#[test]
fn test_serve_folds_non_ascii_case() {
    let mut router = Router::new();
    router
        .get(
            "/Über/:Name",
            handler_fn(|req, res| {
                *res = HandlerResponse::text(200, req.get_path_param("name").unwrap_or_default());
            }),
        )
        .unwrap();

    let res = router.serve(HandlerRequest::new(Method::GET, "/%C3%BCber/J%C3%9CRGEN"));
    assert_eq!(res.status, 200);
    assert_eq!(body(&res), "jürgen");
    assert_eq!(router.serve(HandlerRequest::new(Method::GET, "/ÜBER/x/")).status, 200);
}

#[test]
fn test_serve_miss_uses_not_found() {
    let mut router = Router::new();
    router.get("/", named("root")).unwrap();

    let res = router.serve(HandlerRequest::new(Method::GET, "/missing"));
    assert_eq!(res.status, 404);
    assert_eq!(res.body.as_json().unwrap()["error"], "Not Found");

    router.not_found(handler_fn(|_req, res| {
        *res = HandlerResponse::text(404, "nothing here");
    }));
    let res = router.serve(HandlerRequest::new(Method::DELETE, "/"));
    assert_eq!(res.status, 404);
    assert_eq!(body(&res), "nothing here");
}

#[test]
fn test_not_found_skips_middleware() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut router = Router::new();
    router.use_middleware(recording(&log, "outer"));
    router.get("/", named("root")).unwrap();

    let res = router.serve(HandlerRequest::new(Method::GET, "/nope"));
    assert_eq!(res.status, 404);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn test_middleware_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut router = Router::new();
    router.use_middleware(recording(&log, "first"));
    router.use_middleware(recording(&log, "second"));
    router
        .get(
            "/",
            handler_fn({
                let log = Arc::clone(&log);
                move |_req, _res| log.lock().unwrap().push("handler".to_string())
            }),
        )
        .unwrap();

    let m = router.lookup(&Method::GET, "/");
    assert_eq!(m.stack.len(), 3);
    let res = router.serve(HandlerRequest::new(Method::GET, "/"));
    assert_eq!(res.status, 200);
    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "handler"]);
}

#[test]
fn test_use_middleware_creates_every_supported_tree() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut router = Router::new();
    router.use_middleware(recording(&log, "mw"));
    assert_eq!(router.methods(), SUPPORTED_METHODS.to_vec());
    assert!(router.routes().is_empty());
}

#[test]
fn test_use_middleware_for_single_method() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut router = Router::new();
    router.use_middleware_for(Method::POST, recording(&log, "post-only"));
    router.get("/items", named("list")).unwrap();
    router.post("/items", named("create")).unwrap();

    assert_eq!(router.lookup(&Method::GET, "/items").stack.len(), 1);
    assert_eq!(router.lookup(&Method::POST, "/items").stack.len(), 2);
}

#[test]
fn test_short_circuit_middleware() {
    let mut router = Router::new();
    router.use_middleware(middleware_fn(|_req, res, _next| {
        *res = HandlerResponse::text(403, "blocked");
    }));
    router.get("/secret", named("secret")).unwrap();

    let res = router.serve(HandlerRequest::new(Method::GET, "/secret"));
    assert_eq!(res.status, 403);
    assert_eq!(body(&res), "blocked");
}

#[test]
fn test_group_mounts_all_methods_with_middleware() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut api = Router::new();
    api.use_middleware(recording(&log, "inner"));
    api.get("/", named("api_root")).unwrap();
    api.get("/users/:id", named("get_user")).unwrap();
    api.post("/users", named("create_user")).unwrap();

    let mut router = Router::new();
    router.use_middleware(recording(&log, "outer"));
    router.get("/health", named("health")).unwrap();
    router.group("/api/", api).unwrap();

    let res = router.serve(HandlerRequest::new(Method::GET, "/api/users/7"));
    assert_eq!(body(&res), "get_user");
    assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);

    assert_eq!(body(&router.serve(HandlerRequest::new(Method::GET, "/api"))), "api_root");
    assert_eq!(body(&router.serve(HandlerRequest::new(Method::GET, "/api/"))), "api_root");
    assert_eq!(body(&router.serve(HandlerRequest::new(Method::POST, "/api/users"))), "create_user");

    log.lock().unwrap().clear();
    assert_eq!(router.serve(HandlerRequest::new(Method::GET, "/health")).status, 200);
    assert_eq!(*log.lock().unwrap(), vec!["outer"]);
}

#[test]
fn test_nested_groups() {
    let mut v1 = Router::new();
    v1.get("/items/:item", named("item")).unwrap();
    let mut api = Router::new();
    api.group("/v1", v1).unwrap();
    let mut router = Router::new();
    router.group("/api", api).unwrap();

    let m = router.lookup(&Method::GET, "/api/v1/items/9");
    assert!(m.is_match());
    assert_eq!(m.get_path_param("item"), Some("9"));
    assert!(
        router
            .routes()
            .iter()
            .any(|(method, path, kind)| *method == Method::GET && path == "/api/v1/items/:item" && *kind == "param")
    );
}

#[test]
fn test_group_for_mounts_one_method() {
    let mut sub = Router::new();
    sub.get("/list", named("list")).unwrap();
    sub.post("/list", named("create")).unwrap();

    let mut router = Router::new();
    router.group_for(Method::POST, "/things", sub).unwrap();
    assert!(router.lookup(&Method::POST, "/things/list").is_match());
    assert!(!router.lookup(&Method::GET, "/things/list").is_match());
    assert_eq!(router.methods(), vec![Method::POST]);
}

#[test]
fn test_group_for_without_method_tree_is_noop() {
    let mut sub = Router::new();
    sub.get("/list", named("list")).unwrap();
    let mut router = Router::new();
    router.group_for(Method::DELETE, "/things", sub).unwrap();
    assert!(router.methods().is_empty());
}

#[test]
fn test_group_map_per_method() {
    let mut reads = Router::new();
    reads.get("/", named("index")).unwrap();
    reads.get("/:id", named("read")).unwrap();
    let mut writes = Router::new();
    writes.post("/", named("write")).unwrap();

    let mut router = Router::new();
    router
        .group_map("/docs", vec![(Method::GET, reads), (Method::POST, writes)])
        .unwrap();
    assert_eq!(body(&router.serve(HandlerRequest::new(Method::GET, "/docs/7"))), "read");
    assert_eq!(body(&router.serve(HandlerRequest::new(Method::POST, "/docs"))), "write");
}

#[test]
fn test_group_map_duplicate_method() {
    let mut a = Router::new();
    a.get("/a", named("a")).unwrap();
    let mut b = Router::new();
    b.get("/b", named("b")).unwrap();

    let mut router = Router::new();
    assert!(matches!(
        router.group_map("/x", vec![(Method::GET, a), (Method::GET, b)]),
        Err(RouteError::Duplicate { .. })
    ));
    assert!(router.methods().is_empty());
}

#[test]
fn test_group_is_all_or_nothing() {
    let mut sub = Router::new();
    sub.get("/list", named("list")).unwrap();
    sub.post("/list", named("create")).unwrap();

    let mut router = Router::new();
    router.get("/api/v1", named("conflicting")).unwrap();

    assert!(matches!(
        router.group("/api", sub),
        Err(RouteError::GroupConflict { .. })
    ));
    assert!(!router.lookup(&Method::POST, "/api/list").is_match());
    assert_eq!(router.methods(), vec![Method::GET]);
}

#[test]
fn test_group_prefix_rules() {
    let mut router = Router::new();
    assert!(matches!(
        router.group("/", Router::new()),
        Err(RouteError::InvalidGroupPrefix { .. })
    ));
    assert!(matches!(
        router.group("/users/:id", Router::new()),
        Err(RouteError::InvalidGroupPrefix { .. })
    ));

    let mut sub = Router::new();
    sub.get("/x", named("x")).unwrap();
    router.group("/api", sub).unwrap();
    assert!(matches!(
        router.get("/api/y", named("y")),
        Err(RouteError::ExtendsGroup { .. })
    ));
}

#[test]
fn test_serve_files_requires_filepath_suffix() {
    let mut router = Router::new();
    assert!(matches!(
        router.serve_files("/static/*path", "tests/staticdata"),
        Err(RouteError::InvalidFileRoute { .. })
    ));
    assert!(router.methods().is_empty());
    router.serve_files("/static/*filepath", "tests/staticdata").unwrap();
    assert!(router.lookup(&Method::GET, "/static/hello.txt").is_match());
}

#[test]
fn test_routes_listing() {
    let mut router = Router::new();
    router.get("/", named("root")).unwrap();
    router.get("/Users/:id", named("user")).unwrap();
    router.get("/files/*filepath", named("files")).unwrap();
    router.post("/users", named("create")).unwrap();

    let routes: Vec<(String, String, &str)> = router
        .routes()
        .into_iter()
        .map(|(m, p, k)| (m.to_string(), p, k))
        .collect();
    assert_eq!(
        routes,
        vec![
            ("GET".into(), "/".into(), "static"),
            ("GET".into(), "/files/*filepath".into(), "wildcard"),
            ("GET".into(), "/users/:id".into(), "param"),
            ("POST".into(), "/users".into(), "static"),
        ]
    );
}
