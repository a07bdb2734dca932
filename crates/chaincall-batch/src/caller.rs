//! The batch caller: encode → dispatch → correlate → decode.

use std::sync::Arc;

use alloy_json_abi::JsonAbi;
use chaincall_core::{
    call::{CallResult, CallSpec, CorrelationId},
    correlate::ResponseIndex,
    error::CallError,
    normalize::BatchFailure,
    transport::RpcTransport,
};
use chaincall_evm::{decode_response, FunctionSignature, FunctionTable};

use crate::config::{BatchConfig, FailureMode};
use crate::dispatch::dispatch;
use crate::encode::encode_request;

/// Per-call state between encoding and decoding.
enum Slot<'t> {
    Sent {
        id: CorrelationId,
        signature: &'t FunctionSignature,
    },
    Failed(CallError),
}

/// Executes batches of read-only contract calls against one ABI.
///
/// # Usage
/// ```ignore
/// let caller = BatchCaller::new(transport, &abi, BatchConfig::default())?;
/// let results = caller.execute(&calls).await?;
/// ```
pub struct BatchCaller {
    transport: Arc<dyn RpcTransport>,
    table: FunctionTable,
    config: BatchConfig,
}

impl BatchCaller {
    /// Build the function table for `abi` and bind it to `transport`.
    pub fn new(
        transport: Arc<dyn RpcTransport>,
        abi: &JsonAbi,
        config: BatchConfig,
    ) -> Result<Self, BatchFailure> {
        let table = FunctionTable::from_abi(abi, config.overload_policy)?;
        Ok(Self::with_table(transport, table, config))
    }

    /// Use an already built function table.
    pub fn with_table(
        transport: Arc<dyn RpcTransport>,
        table: FunctionTable,
        config: BatchConfig,
    ) -> Self {
        Self {
            transport,
            table,
            config,
        }
    }

    pub fn table(&self) -> &FunctionTable {
        &self.table
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Execute `calls` as one JSON-RPC batch.
    ///
    /// On success the output has exactly one entry per call, in input order.
    /// Under [`FailureMode::AllOrNothing`] every entry is `Ok`; under
    /// [`FailureMode::Isolated`] failed calls hold their error in place.
    pub async fn execute(&self, calls: &[CallSpec]) -> Result<Vec<CallResult>, BatchFailure> {
        self.run(calls).await.map_err(|err| {
            tracing::warn!(
                calls = calls.len(),
                kind = %err.kind(),
                error = %err,
                "batch call failed"
            );
            BatchFailure::from(err)
        })
    }

    async fn run(&self, calls: &[CallSpec]) -> Result<Vec<CallResult>, CallError> {
        let isolate = self.config.failure_mode == FailureMode::Isolated;

        let mut slots = Vec::with_capacity(calls.len());
        let mut requests = Vec::with_capacity(calls.len());
        let mut sent_ids = Vec::with_capacity(calls.len());

        for (pos, call) in calls.iter().enumerate() {
            let id = CorrelationId::from_position(pos);
            match encode_request(call, id, &self.table) {
                Ok(encoded) => {
                    sent_ids.push(encoded.id);
                    requests.push(encoded.request);
                    slots.push(Slot::Sent {
                        id: encoded.id,
                        signature: encoded.signature,
                    });
                }
                Err(err) if isolate => {
                    tracing::debug!(id = %id, function = %call.function_name, error = %err, "call not sent");
                    slots.push(Slot::Failed(err));
                }
                Err(err) => return Err(err),
            }
        }

        let mut index = if requests.is_empty() {
            ResponseIndex::default()
        } else {
            let responses = dispatch(self.transport.as_ref(), requests).await?;
            ResponseIndex::build(&sent_ids, responses)?
        };

        let errors = self.table.custom_errors();
        let mut results = Vec::with_capacity(slots.len());
        for slot in slots {
            let result = match slot {
                Slot::Sent { id, signature } => index
                    .take(id)
                    .and_then(|resp| decode_response(signature, resp, errors)),
                Slot::Failed(err) => Err(err),
            };
            match result {
                Err(err) if !isolate => return Err(err),
                other => results.push(other),
            }
        }

        tracing::debug!(
            calls = calls.len(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "batch decoded"
        );
        Ok(results)
    }
}

/// One-shot form: build the function table for `abi`, execute `calls` over
/// `transport` with the default all-or-nothing configuration.
pub async fn execute(
    calls: &[CallSpec],
    abi: &JsonAbi,
    transport: Arc<dyn RpcTransport>,
) -> Result<Vec<CallResult>, BatchFailure> {
    BatchCaller::new(transport, abi, BatchConfig::default())?
        .execute(calls)
        .await
}
