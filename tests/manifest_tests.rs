use http::Method;
use std::fs;
use treeroute::dispatcher::HandlerRequest;
use treeroute::manifest::Manifest;
use treeroute::router::RouterConfig;

const YAML: &str = r#"
routes:
  - method: GET
    path: "/users/:id"
    handler: get_user
  - method: post
    path: "/users"
    handler: create_user
groups:
  - prefix: "/admin"
    routes:
      - method: GET
        path: "/"
        handler: admin_home
      - method: DELETE
        path: "/users/:id"
        handler: ban_user
files:
  - path: "/static/*filepath"
    dir: public
"#;

fn write_manifest(name: &str, content: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(name), content).unwrap();
    dir
}

#[test]
fn test_load_yaml_resolves_files_dir_relative_to_manifest() {
    let dir = write_manifest("routes.yaml", YAML);
    fs::create_dir(dir.path().join("public")).unwrap();
    fs::write(dir.path().join("public/app.js"), "console.log(1);\n").unwrap();

    let manifest = Manifest::load(dir.path().join("routes.yaml")).unwrap();
    assert_eq!(manifest.base_dir.as_deref(), Some(dir.path()));

    let router = manifest.build_router(RouterConfig::default()).unwrap();
    let res = router.serve(HandlerRequest::new(Method::GET, "/static/app.js"));
    assert_eq!(res.status, 200);
    assert_eq!(res.get_header("content-type"), Some("application/javascript"));
}

#[test]
fn test_echo_handlers_report_match() {
    let dir = write_manifest("routes.yml", YAML);
    fs::create_dir(dir.path().join("public")).unwrap();
    let router = Manifest::load(dir.path().join("routes.yml"))
        .unwrap()
        .build_router(RouterConfig::default())
        .unwrap();

    let res = router.serve(HandlerRequest::new(Method::GET, "/users/Ada?full=1"));
    let body = res.body.as_json().unwrap();
    assert_eq!(body["handler"], "get_user");
    assert_eq!(body["params"]["id"], "ada");
    assert_eq!(body["query"]["full"], "1");

    let res = router.serve(HandlerRequest::new(Method::DELETE, "/admin/users/7"));
    assert_eq!(res.body.as_json().unwrap()["handler"], "ban_user");

    let res = router.serve(HandlerRequest::new(Method::GET, "/admin/"));
    assert_eq!(res.body.as_json().unwrap()["handler"], "admin_home");

    let res = router.serve(HandlerRequest::new(Method::POST, "/users"));
    assert_eq!(res.body.as_json().unwrap()["handler"], "create_user");
}

#[test]
fn test_load_toml() {
    let dir = write_manifest(
        "routes.TOML",
        r#"
[[routes]]
method = "GET"
path = "/health"
handler = "health"
"#,
    );
    let router = Manifest::load(dir.path().join("routes.TOML"))
        .unwrap()
        .build_router(RouterConfig::default())
        .unwrap();
    assert!(router.lookup(&Method::GET, "/health").is_match());
    assert_eq!(router.routes().len(), 1);
}

#[test]
fn test_unknown_extension_rejected() {
    let dir = write_manifest("routes.json", "{}");
    let err = Manifest::load(dir.path().join("routes.json")).unwrap_err();
    assert!(format!("{err:#}").contains("Unsupported manifest format"));
}

#[test]
fn test_missing_file_reports_path() {
    let err = Manifest::load("/definitely/not/here.toml").unwrap_err();
    assert!(format!("{err:#}").contains("/definitely/not/here.toml"));
}

#[test]
fn test_group_conflict_reports_prefix() {
    let manifest = Manifest::from_toml_str(
        r#"
[[routes]]
method = "GET"
path = "/api/v1"
handler = "old"

[[groups]]
prefix = "/api"

[[groups.routes]]
method = "GET"
path = "/x"
handler = "x"
"#,
    )
    .unwrap();
    let err = manifest.build_router(RouterConfig::default()).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to mount group at /api"));
}
