//! Error types for the transport and the call pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur during an RPC transport operation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, non-2xx status, etc.).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned for the whole request.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    /// Request timed out after the configured duration.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// Response could not be deserialized.
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// An unexpected error.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if this error is retryable (transient).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }
}

/// Classification of a [`CallError`], used in batch-level failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidAbi,
    DuplicateFunction,
    UnknownFunction,
    Encoding,
    Transport,
    MissingCorrelation,
    Rpc,
    Decoding,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidAbi => "invalid_abi",
            Self::DuplicateFunction => "duplicate_function",
            Self::UnknownFunction => "unknown_function",
            Self::Encoding => "encoding",
            Self::Transport => "transport",
            Self::MissingCorrelation => "missing_correlation",
            Self::Rpc => "rpc",
            Self::Decoding => "decoding",
        };
        f.write_str(s)
    }
}

/// Errors raised by any stage of the batched `eth_call` pipeline.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("invalid ABI: {reason}")]
    InvalidAbi { reason: String },

    #[error("function '{name}' is declared {count} times in the ABI; address it by full signature")]
    DuplicateFunction { name: String, count: usize },

    #[error("function '{name}' not found in ABI")]
    UnknownFunction { name: String },

    #[error("cannot encode call to '{function}': {reason}")]
    Encoding { function: String, reason: String },

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("no correlation for id {id}: {reason}")]
    MissingCorrelation { id: String, reason: String },

    #[error("call to '{function}' failed with RPC error {code}: {message}")]
    Rpc {
        function: String,
        code: i64,
        message: String,
    },

    #[error("cannot decode result of '{function}': {reason}")]
    Decoding { function: String, reason: String },
}

impl CallError {
    /// The taxonomy bucket this error falls into.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAbi { .. } => ErrorKind::InvalidAbi,
            Self::DuplicateFunction { .. } => ErrorKind::DuplicateFunction,
            Self::UnknownFunction { .. } => ErrorKind::UnknownFunction,
            Self::Encoding { .. } => ErrorKind::Encoding,
            Self::Transport(_) => ErrorKind::Transport,
            Self::MissingCorrelation { .. } => ErrorKind::MissingCorrelation,
            Self::Rpc { .. } => ErrorKind::Rpc,
            Self::Decoding { .. } => ErrorKind::Decoding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_transport_errors() {
        assert!(TransportError::Http("connection reset".into()).is_retryable());
        assert!(TransportError::Timeout { ms: 500 }.is_retryable());
        assert!(!TransportError::Other("bad".into()).is_retryable());
        assert!(!TransportError::Rpc(JsonRpcError {
            code: -32600,
            message: "invalid request".into(),
            data: None,
        })
        .is_retryable());
    }

    #[test]
    fn call_error_kind_and_message() {
        let err = CallError::UnknownFunction {
            name: "mint".into(),
        };
        assert_eq!(err.kind(), ErrorKind::UnknownFunction);
        assert_eq!(err.to_string(), "function 'mint' not found in ABI");

        let err: CallError = TransportError::Timeout { ms: 30_000 }.into();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.kind().to_string(), "transport");
    }
}
