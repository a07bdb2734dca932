//! # chaincall-http
//!
//! HTTP implementation of [`RpcTransport`](chaincall_core::RpcTransport):
//! one POST per batch, retry with exponential backoff for transient failures.

pub mod client;
pub mod retry;

pub use client::{parse_batch_body, HttpClientConfig, HttpRpcClient};
pub use retry::{RetryConfig, RetryPolicy};
