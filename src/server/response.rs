use serde_json::json;

use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse, Next};

/// Reason phrase for the status codes this crate produces
#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// The default not-found reply: `404` with `{"error": "Not Found"}`
#[must_use]
pub fn not_found_response() -> HandlerResponse {
    HandlerResponse::json(404, json!({ "error": "Not Found" }))
}

/// Default not-found responder installed on every router
#[derive(Debug, Default, Clone, Copy)]
pub struct NotFound;

impl Handler for NotFound {
    fn call(&self, _req: &mut HandlerRequest, res: &mut HandlerResponse, _next: Next<'_>) {
        *res = not_found_response();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
    }

    #[test]
    fn test_not_found_handler() {
        let mut req = HandlerRequest::new(Method::GET, "/missing");
        let mut res = HandlerResponse::default();
        NotFound.call(&mut req, &mut res, Next::empty());
        assert_eq!(res, not_found_response());
        assert_eq!(res.status, 404);
    }
}
