//! Response correlation: match batch responses back to their requests by id.

use std::collections::{HashMap, HashSet};

use crate::call::CorrelationId;
use crate::error::{CallError, TransportError};
use crate::request::JsonRpcResponse;

/// Responses of one batch, indexed by correlation id.
#[derive(Debug, Default)]
pub struct ResponseIndex {
    responses: HashMap<CorrelationId, JsonRpcResponse>,
}

impl ResponseIndex {
    /// Index `responses` against the ids that were actually sent.
    ///
    /// Fails when the node answers with an id that was never requested, answers
    /// the same id twice, or rejects the whole batch with an id-less error
    /// object. Requested ids without a response are detected later, by
    /// [`ResponseIndex::take`].
    pub fn build(
        requested: &[CorrelationId],
        responses: Vec<JsonRpcResponse>,
    ) -> Result<Self, CallError> {
        let expected: HashSet<CorrelationId> = requested.iter().copied().collect();
        let mut index = HashMap::with_capacity(responses.len());

        for resp in responses {
            let Some(raw) = resp.id.as_u64() else {
                if let Some(err) = resp.error {
                    return Err(CallError::Transport(TransportError::Rpc(err)));
                }
                return Err(CallError::MissingCorrelation {
                    id: resp.id.to_string(),
                    reason: "response id is not numeric".into(),
                });
            };

            let id = CorrelationId(raw);
            if !expected.contains(&id) {
                return Err(CallError::MissingCorrelation {
                    id: id.to_string(),
                    reason: "response id was never requested".into(),
                });
            }
            if index.insert(id, resp).is_some() {
                return Err(CallError::MissingCorrelation {
                    id: id.to_string(),
                    reason: "duplicate response".into(),
                });
            }
        }

        tracing::trace!(
            requested = requested.len(),
            received = index.len(),
            "indexed batch responses"
        );
        Ok(Self { responses: index })
    }

    /// Remove and return the response for `id`.
    pub fn take(&mut self, id: CorrelationId) -> Result<JsonRpcResponse, CallError> {
        self.responses
            .remove(&id)
            .ok_or_else(|| CallError::MissingCorrelation {
                id: id.to_string(),
                reason: "no response received".into(),
            })
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::request::{JsonRpcError, RpcId};
    use serde_json::json;

    fn ok(id: RpcId, result: &str) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!(result))
    }

    fn ids(n: usize) -> Vec<CorrelationId> {
        (0..n).map(CorrelationId::from_position).collect()
    }

    #[test]
    fn out_of_order_responses_are_matched() {
        let responses = vec![
            ok(RpcId::Number(2), "0x02"),
            ok(RpcId::Number(0), "0x00"),
            ok(RpcId::String("1".into()), "0x01"),
        ];
        let mut index = ResponseIndex::build(&ids(3), responses).unwrap();
        assert_eq!(index.len(), 3);
        for i in 0..3u64 {
            let resp = index.take(CorrelationId(i)).unwrap();
            assert_eq!(resp.result, Some(json!(format!("0x0{i}"))));
        }
        assert!(index.is_empty());
    }

    #[test]
    fn missing_response_fails_on_take() {
        let mut index = ResponseIndex::build(&ids(2), vec![ok(RpcId::Number(0), "0x")]).unwrap();
        assert!(index.take(CorrelationId(0)).is_ok());
        let err = index.take(CorrelationId(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCorrelation);
        assert!(err.to_string().contains("no response received"));
    }

    #[test]
    fn stray_response_id_is_rejected() {
        let err = ResponseIndex::build(&ids(1), vec![ok(RpcId::Number(9), "0x")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCorrelation);
        assert!(err.to_string().contains("never requested"));
    }

    #[test]
    fn duplicate_response_id_is_rejected() {
        let responses = vec![ok(RpcId::Number(0), "0x"), ok(RpcId::Number(0), "0x")];
        let err = ResponseIndex::build(&ids(1), responses).unwrap_err();
        assert!(err.to_string().contains("duplicate response"));
    }

    #[test]
    fn idless_error_rejects_whole_batch() {
        let resp = JsonRpcResponse::failure(
            RpcId::Null,
            JsonRpcError {
                code: -32600,
                message: "invalid request".into(),
                data: None,
            },
        );
        let err = ResponseIndex::build(&ids(1), vec![resp]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
