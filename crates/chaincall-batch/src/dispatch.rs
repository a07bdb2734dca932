//! Batch dispatcher: hands the encoded requests to the transport as one batch.

use std::time::Instant;

use chaincall_core::{
    error::CallError,
    request::{JsonRpcRequest, JsonRpcResponse},
    transport::RpcTransport,
};

/// Send `requests` as a single batch and wait for the full response set.
///
/// The transport is all-or-nothing for the batch: any transport error is
/// returned for the whole batch.
pub async fn dispatch(
    transport: &dyn RpcTransport,
    requests: Vec<JsonRpcRequest>,
) -> Result<Vec<JsonRpcResponse>, CallError> {
    let size = requests.len();
    let start = Instant::now();

    match transport.send_batch(requests).await {
        Ok(responses) => {
            tracing::debug!(
                url = %transport.url(),
                requests = size,
                responses = responses.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "eth_call batch completed"
            );
            Ok(responses)
        }
        Err(e) => {
            tracing::warn!(
                url = %transport.url(),
                requests = size,
                error = %e,
                "eth_call batch failed"
            );
            Err(CallError::Transport(e))
        }
    }
}
