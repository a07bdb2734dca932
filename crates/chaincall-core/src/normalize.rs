//! Failure normalization: every pipeline error collapses into one
//! human-readable [`BatchFailure`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{CallError, ErrorKind, TransportError};
use crate::request::JsonRpcError;

/// The uniform failure value that replaces a whole invocation's output.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct BatchFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<CallError> for BatchFailure {
    fn from(err: CallError) -> Self {
        let kind = err.kind();
        let message = match &err {
            // Batch-wide RPC rejections carry a structured payload; dig out its message.
            CallError::Transport(TransportError::Rpc(rpc)) => rpc_error_message(rpc),
            other => other.to_string(),
        };
        Self { kind, message }
    }
}

/// Extract a human-readable message from an arbitrary error payload.
///
/// Plain strings pass through verbatim, objects with a `message` field are
/// unwrapped recursively, anything else is rendered as compact JSON.
pub fn normalize_message(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("message") {
            Some(inner) => normalize_message(inner),
            None => payload.to_string(),
        },
        Value::Null => "unknown error".to_string(),
        other => other.to_string(),
    }
}

/// Message for a JSON-RPC error object, falling back to its `data` payload
/// when the node left `message` empty.
pub fn rpc_error_message(err: &JsonRpcError) -> String {
    if !err.message.is_empty() {
        return err.message.clone();
    }
    match &err.data {
        Some(data) => normalize_message(data),
        None => format!("RPC error {}", err.code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(normalize_message(&json!("execution reverted")), "execution reverted");
    }

    #[test]
    fn nested_message_is_extracted() {
        let payload = json!({"message": {"message": "header not found", "code": -32000}});
        assert_eq!(normalize_message(&payload), "header not found");
    }

    #[test]
    fn unstructured_payload_is_rendered() {
        assert_eq!(normalize_message(&json!({"code": 3})), r#"{"code":3}"#);
        assert_eq!(normalize_message(&json!(42)), "42");
        assert_eq!(normalize_message(&Value::Null), "unknown error");
    }

    #[test]
    fn rpc_error_prefers_message_then_data() {
        let err = JsonRpcError {
            code: -32000,
            message: String::new(),
            data: Some(json!({"message": "out of gas"})),
        };
        assert_eq!(rpc_error_message(&err), "out of gas");

        let err = JsonRpcError {
            code: -32005,
            message: "limit exceeded".into(),
            data: None,
        };
        assert_eq!(rpc_error_message(&err), "limit exceeded");
    }

    #[test]
    fn batch_failure_from_call_error() {
        let failure = BatchFailure::from(CallError::UnknownFunction {
            name: "mint".into(),
        });
        assert_eq!(failure.kind, ErrorKind::UnknownFunction);
        assert_eq!(failure.message, "function 'mint' not found in ABI");

        let failure = BatchFailure::from(CallError::Transport(TransportError::Rpc(JsonRpcError {
            code: -32600,
            message: String::new(),
            data: Some(json!({"message": "batch too large"})),
        })));
        assert_eq!(failure.kind, ErrorKind::Transport);
        assert_eq!(failure.message, "batch too large");
        assert_eq!(failure.to_string(), "batch too large");
    }
}
