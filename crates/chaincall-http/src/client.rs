//! HTTP JSON-RPC client backed by `reqwest`.
//!
//! Features:
//! - True HTTP batching: a batch is one POST carrying a JSON array
//! - Automatic retry with exponential backoff for transient errors
//! - Health reporting from consecutive failures

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use chaincall_core::error::TransportError;
use chaincall_core::request::{JsonRpcRequest, JsonRpcResponse};
use chaincall_core::transport::{HealthStatus, RpcTransport};

use crate::retry::{RetryConfig, RetryPolicy};

/// Configuration for `HttpRpcClient`.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub retry: RetryConfig,
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP JSON-RPC client.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
    request_timeout: Duration,
    consecutive_failures: AtomicU32,
    contacted: AtomicBool,
}

impl HttpRpcClient {
    /// Create a new client for the given JSON-RPC endpoint URL.
    pub fn new(url: impl Into<String>, config: HttpClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            retry: RetryPolicy::new(config.retry),
            request_timeout: config.request_timeout,
            consecutive_failures: AtomicU32::new(0),
            contacted: AtomicBool::new(false),
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(url, HttpClientConfig::default())
    }

    async fn post<B, T>(&self, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .post(&self.url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        resp.json::<T>().await.map_err(|e| self.map_reqwest(e))
    }

    fn map_reqwest(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else if e.is_decode() {
            TransportError::Other(format!("malformed JSON-RPC body: {e}"))
        } else {
            TransportError::Http(e.to_string())
        }
    }

    /// Run `op`, retrying transient failures per the retry policy.
    async fn with_retry<T, F, Fut>(&self, op: F) -> Result<T, TransportError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        self.contacted.store(true, Ordering::Relaxed);
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => {
                    self.consecutive_failures.store(0, Ordering::Relaxed);
                    return Ok(value);
                }
                Err(e) if e.is_retryable() => {
                    self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
                    match self.retry.next_delay(attempt) {
                        Some(delay) => {
                            tracing::warn!(
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                error = %e,
                                url = %self.url,
                                "retrying request"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            tracing::error!(
                                attempt,
                                error = %e,
                                url = %self.url,
                                "max retries exceeded"
                            );
                            return Err(e);
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Interpret a batch response body.
///
/// Servers answer a batch with an array, except when they reject the batch
/// as a whole, in which case a single error object with a null id comes back.
pub fn parse_batch_body(body: Value) -> Result<Vec<JsonRpcResponse>, TransportError> {
    match body {
        Value::Array(_) => Ok(serde_json::from_value(body)?),
        Value::Object(_) => {
            let resp: JsonRpcResponse = serde_json::from_value(body)?;
            match resp.error {
                Some(err) if resp.id.as_u64().is_none() => Err(TransportError::Rpc(err)),
                _ => Ok(vec![resp]),
            }
        }
        other => Err(TransportError::Other(format!(
            "unexpected batch response body: {other}"
        ))),
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let req = &req;
        self.with_retry(move || self.post::<_, JsonRpcResponse>(req)).await
    }

    /// True HTTP batch: send all requests as a JSON array in one HTTP call.
    async fn send_batch(
        &self,
        reqs: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, TransportError> {
        if reqs.is_empty() {
            return Ok(vec![]);
        }
        tracing::debug!(url = %self.url, requests = reqs.len(), "sending JSON-RPC batch");
        let reqs = &reqs;
        let body: Value = self.with_retry(move || self.post::<_, Value>(reqs)).await?;
        parse_batch_body(body)
    }

    fn health(&self) -> HealthStatus {
        if !self.contacted.load(Ordering::Relaxed) {
            return HealthStatus::Unknown;
        }
        match self.consecutive_failures.load(Ordering::Relaxed) {
            0 => HealthStatus::Healthy,
            n if n <= self.retry.config.max_retries => HealthStatus::Degraded,
            _ => HealthStatus::Unhealthy,
        }
    }

    fn url(&self) -> &str {
        &self.url
    }
}
