//! Thin request/response plumbing around the router: request-target
//! normalisation and the not-found responder.

pub mod request;
pub mod response;

pub use request::{normalize_target, parse_query_params};
pub use response::{not_found_response, status_reason, NotFound};
