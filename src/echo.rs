use std::sync::Arc;

use serde_json::json;

use crate::dispatcher::{BoxedHandler, Handler, HandlerRequest, HandlerResponse, Next};

/// Handler that echoes back what the router resolved for the request
///
/// Used for routes declared in a manifest, where there is no application
/// code to bind them to.
pub struct EchoHandler {
    name: String,
}

impl EchoHandler {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Handler for EchoHandler {
    fn call(&self, req: &mut HandlerRequest, res: &mut HandlerResponse, _next: Next<'_>) {
        *res = HandlerResponse::json(
            200,
            json!({
                "handler": self.name,
                "request_id": req.request_id,
                "method": req.method.as_str(),
                "path": req.path,
                "params": req.path_params_map(),
                "query": req.query_params_map(),
                "body": req.body,
            }),
        );
    }
}

/// Box a named [`EchoHandler`]
#[must_use]
pub fn echo_handler(name: impl Into<String>) -> BoxedHandler {
    Arc::new(EchoHandler::new(name))
}
