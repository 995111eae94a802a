//! Route manifests
//!
//! A manifest declares routes, mounted groups and static file directories in
//! TOML or YAML. Building it yields a [`Router`] whose routes answer with
//! [`EchoHandler`](crate::echo::EchoHandler)s named after the manifest's
//! `handler` fields, which is what the `treeroute` CLI inspects.
//!
//! ```toml
//! [[routes]]
//! method = "GET"
//! path = "/users/:id"
//! handler = "get_user"
//!
//! [[groups]]
//! prefix = "/api"
//!
//! [[groups.routes]]
//! method = "GET"
//! path = "/health"
//! handler = "health"
//!
//! [[files]]
//! path = "/assets/*filepath"
//! dir = "public"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::echo::echo_handler;
use crate::router::{Router, RouterConfig};

/// One route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    pub method: String,
    pub path: String,
    pub handler: String,
}

/// A sub-router mounted at `prefix`
///
/// Without `method` every method tree of the sub-router is mounted; with it,
/// only that method's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub prefix: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

/// A directory served below a `/*filepath` route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSpec {
    pub path: String,
    pub dir: PathBuf,
}

/// Parsed manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
    #[serde(default)]
    pub files: Vec<FileSpec>,
    /// Directory relative `files` entries are resolved against
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Manifest {
    /// Load a manifest, choosing the format from the file extension
    /// (`.toml`, `.yaml` or `.yml`)
    ///
    /// # Errors
    ///
    /// Unreadable file, unknown extension or malformed content.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let mut manifest = match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&source),
            Some("yaml" | "yml") => Self::from_yaml_str(&source),
            _ => bail!(
                "Unsupported manifest format for {} (expected .toml, .yaml or .yml)",
                path.display()
            ),
        }
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;

        manifest.base_dir = path.parent().map(Path::to_path_buf);
        Ok(manifest)
    }

    /// Parse TOML manifest content
    ///
    /// # Errors
    ///
    /// Malformed TOML or missing fields.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).context("Invalid TOML manifest")
    }

    /// Parse YAML manifest content
    ///
    /// # Errors
    ///
    /// Malformed YAML or missing fields.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).context("Invalid YAML manifest")
    }

    /// Build a router serving every declared route with an echo handler
    ///
    /// # Errors
    ///
    /// Unknown methods and any route registration error, with the offending
    /// entry in the context.
    pub fn build_router(&self, config: RouterConfig) -> Result<Router> {
        let mut router = Router::with_config(config);
        add_routes(&mut router, &self.routes)?;
        for group in &self.groups {
            mount_group(&mut router, group, config)?;
        }
        for files in &self.files {
            let dir = match &self.base_dir {
                Some(base) if files.dir.is_relative() => base.join(&files.dir),
                _ => files.dir.clone(),
            };
            router
                .serve_files(&files.path, &dir)
                .with_context(|| format!("Failed to serve {} at {}", dir.display(), files.path))?;
        }

        info!(
            routes = self.routes.len(),
            groups = self.groups.len(),
            file_routes = self.files.len(),
            nodes = router.node_count(),
            "Router built from manifest"
        );
        Ok(router)
    }
}

/// Parse a method name case-insensitively
///
/// # Errors
///
/// Names that are not valid HTTP method tokens.
pub fn parse_method(name: &str) -> Result<Method> {
    Method::from_bytes(name.trim().to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{name}'"))
}

fn add_routes(router: &mut Router, routes: &[RouteSpec]) -> Result<()> {
    for route in routes {
        let method = parse_method(&route.method)?;
        router
            .handle(method, &route.path, echo_handler(route.handler.as_str()))
            .with_context(|| {
                format!(
                    "Failed to register {} {} ({})",
                    route.method, route.path, route.handler
                )
            })?;
    }
    Ok(())
}

fn mount_group(router: &mut Router, group: &GroupSpec, config: RouterConfig) -> Result<()> {
    let mut sub = Router::with_config(config);
    add_routes(&mut sub, &group.routes)?;
    for nested in &group.groups {
        mount_group(&mut sub, nested, config)?;
    }

    let mounted = match &group.method {
        Some(method) => router.group_for(parse_method(method)?, &group.prefix, sub),
        None => router.group(&group.prefix, sub),
    };
    mounted.with_context(|| format!("Failed to mount group at {}", group.prefix))
}
