//! # CLI Module
//!
//! Command-line access to route manifests.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! List every route a manifest registers, per method:
//!
//! ```bash
//! treeroute routes --manifest routes.toml
//! ```
//!
//! ### `match`
//!
//! Build the router, serve one synthetic request through it and print the
//! response (status, headers and body) as JSON:
//!
//! ```bash
//! treeroute match --manifest routes.toml -X GET --path /users/42?verbose=1
//! treeroute match --manifest routes.yaml -X POST --path /api/items \
//!     -H 'authorization: secret' --body '{"name":"x"}'
//! ```
//!
//! Logging goes to stderr and is configured with `TREEROUTE_LOG_LEVEL` /
//! `TREEROUTE_LOG_FORMAT` (see [`runtime_config`](crate::runtime_config)).

mod commands;


pub use commands::{run_cli, run_cli_to, Cli, Commands};
