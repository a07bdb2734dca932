//! chaincall-core: foundation types for ChainCall.
//!
//! # Overview
//!
//! ChainCall batches read-only contract calls (`eth_call`) into a single
//! JSON-RPC batch and maps every response back to the call that produced it.
//! The core crate defines:
//!
//! - [`RpcTransport`]: the async transport boundary
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`]: wire types
//! - [`CallSpec`] / [`CallResult`]: what callers send and receive
//! - [`ResponseIndex`]: correlation of responses by [`CorrelationId`]
//! - [`CallError`] / [`BatchFailure`]: per-stage errors and their normalized form

pub mod call;
pub mod correlate;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod normalize;
pub mod request;
pub mod transport;
pub mod types;

pub use call::{BlockTag, CallResult, CallSpec, CorrelationId, DecodedReturn};
pub use correlate::ResponseIndex;
pub use error::{CallError, ErrorKind, TransportError};
pub use normalize::{normalize_message, rpc_error_message, BatchFailure};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId, RpcParam};
pub use transport::{HealthStatus, RpcTransport};
pub use types::NormalizedValue;
