//! In-process transport that answers requests with a closure.
//!
//! Used by tests and demos to stand in for a node without opening sockets.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::transport::{HealthStatus, RpcTransport};

/// Produces the response for one request; `None` drops it from the batch.
pub type Responder = dyn Fn(&JsonRpcRequest) -> Option<JsonRpcResponse> + Send + Sync;

/// Order in which batch responses are handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseOrder {
    #[default]
    AsSent,
    Reversed,
    /// Rotate left by `n` positions.
    Rotated(usize),
}

/// Closure-backed [`RpcTransport`] that records every batch it receives.
pub struct MockTransport {
    responder: Box<Responder>,
    order: ResponseOrder,
    failure: Option<String>,
    batches: Mutex<Vec<Vec<JsonRpcRequest>>>,
}

impl MockTransport {
    pub fn new(
        responder: impl Fn(&JsonRpcRequest) -> Option<JsonRpcResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            order: ResponseOrder::AsSent,
            failure: None,
            batches: Mutex::new(Vec::new()),
        }
    }

    /// A transport whose every send fails with an HTTP error.
    pub fn failing(message: impl Into<String>) -> Self {
        let mut mock = Self::new(|_| None);
        mock.failure = Some(message.into());
        mock
    }

    pub fn with_order(mut self, order: ResponseOrder) -> Self {
        self.order = order;
        self
    }

    /// Batches sent so far, in send order.
    pub fn sent_batches(&self) -> Vec<Vec<JsonRpcRequest>> {
        self.batches
            .lock()
            .map(|b| b.clone())
            .unwrap_or_default()
    }

    fn record(&self, reqs: &[JsonRpcRequest]) {
        if let Ok(mut batches) = self.batches.lock() {
            batches.push(reqs.to_vec());
        }
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        self.send_batch(vec![req])
            .await?
            .pop()
            .ok_or_else(|| TransportError::Other("mock produced no response".into()))
    }

    async fn send_batch(
        &self,
        reqs: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, TransportError> {
        self.record(&reqs);
        if let Some(msg) = &self.failure {
            return Err(TransportError::Http(msg.clone()));
        }

        let mut responses: Vec<JsonRpcResponse> =
            reqs.iter().filter_map(|r| (self.responder)(r)).collect();
        match self.order {
            ResponseOrder::AsSent => {}
            ResponseOrder::Reversed => responses.reverse(),
            ResponseOrder::Rotated(n) if !responses.is_empty() => {
                let n = n % responses.len();
                responses.rotate_left(n);
            }
            ResponseOrder::Rotated(_) => {}
        }
        Ok(responses)
    }

    fn health(&self) -> HealthStatus {
        if self.failure.is_some() {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Healthy
        }
    }

    fn url(&self) -> &str {
        "mock://"
    }
}
