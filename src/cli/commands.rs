use crate::{
    dispatcher::{HandlerRequest, HandlerResponse, ResponseBody},
    manifest::{parse_method, Manifest},
    runtime_config::RuntimeConfig,
    server::status_reason,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::io::Write;
use std::path::PathBuf;

/// Command-line interface for treeroute
///
/// Loads a route manifest into a router and inspects it.
#[derive(Parser, Debug)]
#[command(name = "treeroute")]
#[command(about = "Inspect and exercise radix-tree route manifests", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every registered route
    Routes {
        /// Path to the route manifest (TOML or YAML)
        #[arg(short, long, env = "TREEROUTE_MANIFEST")]
        manifest: PathBuf,
    },
    /// Route a synthetic request and print the response as JSON
    Match {
        /// Path to the route manifest (TOML or YAML)
        #[arg(short, long, env = "TREEROUTE_MANIFEST")]
        manifest: PathBuf,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Request target, query string allowed (e.g. /users/42?verbose=1)
        #[arg(short, long)]
        path: String,

        /// Request header as `name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

/// Execute a parsed command, writing its output to stdout
///
/// # Errors
///
/// Manifest loading, route registration or argument errors.
pub fn run_cli(cli: Cli) -> Result<()> {
    let stdout = std::io::stdout();
    run_cli_to(cli, &mut stdout.lock())
}

/// Execute a parsed command, writing its output to `out`
///
/// # Errors
///
/// See [`run_cli`].
pub fn run_cli_to(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = RuntimeConfig::from_env();
    match cli.command {
        Commands::Routes { manifest } => {
            let router = Manifest::load(&manifest)?.build_router(config.router_config())?;
            for (method, path, kind) in router.routes() {
                writeln!(out, "{:<7} {path} ({kind})", method.as_str())?;
            }
        }
        Commands::Match {
            manifest,
            method,
            path,
            headers,
            body,
        } => {
            let router = Manifest::load(&manifest)?.build_router(config.router_config())?;

            let mut req = HandlerRequest::new(parse_method(&method)?, path);
            for header in &headers {
                let (name, value) = header
                    .split_once(':')
                    .with_context(|| format!("Invalid header '{header}', expected 'name: value'"))?;
                req = req.with_header(name.trim(), value.trim());
            }
            if let Some(body) = body {
                let body: Value = serde_json::from_str(&body).context("Request body is not valid JSON")?;
                req = req.with_body(body);
            }

            let res = router.serve(req);
            writeln!(out, "{}", serde_json::to_string_pretty(&response_json(&res))?)?;
        }
    }
    Ok(())
}

fn response_json(res: &HandlerResponse) -> Value {
    let headers: Map<String, Value> = res
        .headers
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
        .collect();
    let body = match &res.body {
        ResponseBody::Json(value) => value.clone(),
        other => other.as_text().map_or_else(
            || Value::String(format!("<{} bytes>", body_len(other))),
            Value::String,
        ),
    };
    json!({
        "status": res.status,
        "reason": status_reason(res.status),
        "headers": headers,
        "body": body,
    })
}

fn body_len(body: &ResponseBody) -> usize {
    match body {
        ResponseBody::Empty => 0,
        ResponseBody::Json(value) => value.to_string().len(),
        ResponseBody::Text(text) => text.len(),
        ResponseBody::Bytes(bytes) => bytes.len(),
    }
}
