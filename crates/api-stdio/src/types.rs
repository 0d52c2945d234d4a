//! Wire Types
//!
//! Request: `{"id": <any>, "method": "<name>", "params": <value>}`
//! Response: `{"id": <echoed>, "result": <value>}` or
//! `{"id": <echoed>, "error": "<message>", "trace": "<report>"}`

use crate::error::{format_trace, BridgeError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parsed request line
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Correlation token, echoed as-is (`null` when absent)
    pub id: Value,
    /// Raw `method` value; only a string can name a method
    pub method: Value,
    /// Params, `{}` when absent or null
    pub params: Value,
}

impl Request {
    /// Parse one request line (surrounding whitespace is allowed)
    ///
    /// # Errors
    /// - BridgeError::InvalidUtf8 / InvalidJson for unreadable lines
    /// - BridgeError::NotAnObject if the JSON value is not an object
    pub fn parse(line: &[u8]) -> Result<Self, BridgeError> {
        let text = std::str::from_utf8(line)?;
        let value: Value = serde_json::from_str(text)?;

        let mut object = match value {
            Value::Object(object) => object,
            other => return Err(BridgeError::NotAnObject(json_kind(&other))),
        };

        let id = object.remove("id").unwrap_or(Value::Null);
        let method = object.remove("method").unwrap_or(Value::Null);
        let params = match object.remove("params") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(params) => params,
        };

        Ok(Self { id, method, params })
    }

    pub fn method_name(&self) -> Option<&str> {
        self.method.as_str()
    }
}

/// One response line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Failure {
        id: Value,
        error: String,
        trace: String,
    },
    Success {
        id: Value,
        result: Value,
    },
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Response::Success { id, result }
    }

    pub fn failure(id: Value, err: &BridgeError) -> Self {
        Response::Failure {
            id,
            error: err.to_string(),
            trace: format_trace(err),
        }
    }

    pub fn id(&self) -> &Value {
        match self {
            Response::Success { id, .. } | Response::Failure { id, .. } => id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success { .. })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_request() {
        let req = Request::parse(br#"{"id":1,"method":"ping","params":{"a":2}}"#).unwrap();
        assert_eq!(req.id, json!(1));
        assert_eq!(req.method_name(), Some("ping"));
        assert_eq!(req.params, json!({"a": 2}));
    }

    #[test]
    fn test_parse_defaults() {
        let req = Request::parse(br#"{"method":"ping"}"#).unwrap();
        assert_eq!(req.id, Value::Null);
        assert_eq!(req.params, json!({}));

        let req = Request::parse(br#"{"id":"a","method":"ping","params":null}"#).unwrap();
        assert_eq!(req.id, json!("a"));
        assert_eq!(req.params, json!({}));
    }

    #[test]
    fn test_non_string_method_has_no_name() {
        let req = Request::parse(br#"{"id":3,"method":42}"#).unwrap();
        assert_eq!(req.method_name(), None);
        assert_eq!(req.method, json!(42));
    }

    #[test]
    fn test_parse_rejects_non_objects() {
        assert!(matches!(
            Request::parse(b"[1,2]"),
            Err(BridgeError::NotAnObject("array"))
        ));
        assert!(matches!(
            Request::parse(b"{not json"),
            Err(BridgeError::InvalidJson(_))
        ));
        assert!(matches!(
            Request::parse(b"{\"id\":\xff}"),
            Err(BridgeError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_response_wire_shape() {
        let ok = Response::success(json!(1), json!("pong"));
        assert_eq!(
            serde_json::to_string(&ok).unwrap(),
            r#"{"id":1,"result":"pong"}"#
        );

        let err = Response::failure(json!(2), &BridgeError::NotAnObject("number"));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["id"], json!(2));
        assert!(value.get("result").is_none());
        assert!(value["error"].as_str().unwrap().contains("JSON object"));
        assert!(value["trace"].is_string());
    }
}
