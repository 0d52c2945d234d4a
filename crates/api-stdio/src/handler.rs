//! Request Handler
//!
//! Turns one request line into one response. Never fails: every problem
//! with the line or the method becomes a `Response::Failure`.

use crate::error::BridgeError;
use crate::types::{Request, Response};
use eclips_core::domain::MethodError;
use eclips_core::port::MethodProvider;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Handler with the injected method provider
pub struct StdioHandler {
    provider: Arc<dyn MethodProvider>,
}

impl StdioHandler {
    pub fn new(provider: Arc<dyn MethodProvider>) -> Self {
        Self { provider }
    }

    pub fn handle_line(&self, line: &[u8]) -> Response {
        let request = match Request::parse(line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Rejected request line");
                return Response::failure(Value::Null, &e);
            }
        };

        self.handle_request(request)
    }

    pub fn handle_request(&self, request: Request) -> Response {
        let Request { id, method, params } = request;

        let outcome = match method.as_str() {
            Some(name) => {
                debug!(method = %name, id = %id, "Dispatching request");
                self.provider.invoke(name, params)
            }
            None => Err(MethodError::NotFound(method.to_string())),
        };

        match outcome {
            Ok(result) => Response::success(id, result),
            Err(e) => {
                warn!(method = %method, id = %id, error = %e, "Request failed");
                Response::failure(id, &BridgeError::Method(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eclips_core::port::method_provider::mocks::StaticMethodProvider;
    use serde_json::json;

    fn handler() -> (StdioHandler, Arc<StaticMethodProvider>) {
        let provider = Arc::new(
            StaticMethodProvider::new()
                .with_result("ping", json!("pong"))
                .with_error("fail", "disk is full"),
        );
        (StdioHandler::new(provider.clone()), provider)
    }

    #[test]
    fn test_success_echoes_id() {
        let (handler, provider) = handler();
        let response = handler.handle_line(br#"{"id":1,"method":"ping","params":{}}"#);

        assert_eq!(response, Response::success(json!(1), json!("pong")));
        assert_eq!(provider.calls(), vec![("ping".to_string(), json!({}))]);
    }

    #[test]
    fn test_unknown_method() {
        let (handler, _) = handler();
        let response = handler.handle_line(br#"{"id":2,"method":"missing"}"#);

        match response {
            Response::Failure { id, error, .. } => {
                assert_eq!(id, json!(2));
                assert_eq!(error, "Method 'missing' not found");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_method_field() {
        let (handler, provider) = handler();
        let response = handler.handle_line(br#"{"id":"x"}"#);

        match response {
            Response::Failure { id, error, .. } => {
                assert_eq!(id, json!("x"));
                assert_eq!(error, "Method 'null' not found");
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(provider.calls().is_empty());
    }

    #[test]
    fn test_malformed_json_has_null_id() {
        let (handler, _) = handler();
        let response = handler.handle_line(b"{\"id\": 5, ");

        assert_eq!(response.id(), &Value::Null);
        assert!(!response.is_success());
    }

    #[test]
    fn test_handler_error_is_reported() {
        let (handler, _) = handler();
        let response = handler.handle_line(br#"{"id":7,"method":"fail"}"#);

        match response {
            Response::Failure { id, error, trace } => {
                assert_eq!(id, json!(7));
                assert_eq!(error, "disk is full");
                assert!(trace.starts_with("disk is full"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_array_params_are_invalid() {
        use eclips_core::application::MethodRegistryBuilder;

        #[derive(serde::Deserialize)]
        struct EchoParams {
            message: String,
        }

        let mut builder = MethodRegistryBuilder::new();
        builder.register("echo", |p: EchoParams| Ok(p.message));
        let handler = StdioHandler::new(Arc::new(builder.build().unwrap()));

        let response = handler.handle_line(br#"{"id":9,"method":"echo","params":["hi"]}"#);
        match response {
            Response::Failure { id, error, .. } => {
                assert_eq!(id, json!(9));
                assert!(error.starts_with("Invalid params for 'echo'"));
            }
            other => panic!("expected failure, got {:?}", other),
        }

        let response = handler.handle_line(br#"{"id":10,"method":"echo","params":{"message":"hi"}}"#);
        assert_eq!(response, Response::success(json!(10), json!("hi")));
    }
}
