//! Return-data decoder for `eth_call` results.
//!
//! An `eth_call` result is the hex-encoded return data of the function:
//! the ABI parameter encoding of its outputs tuple, with no selector.

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_json_abi::Error as AbiError;
use chaincall_core::{
    call::DecodedReturn,
    error::CallError,
    normalize::rpc_error_message,
    request::JsonRpcResponse,
};
use serde_json::Value;

use crate::function_table::FunctionSignature;
use crate::normalizer::normalize;
use crate::revert::{revert_data, revert_reason};

/// Decode raw return bytes with the function's output types.
pub fn decode_return(sig: &FunctionSignature, data: &[u8]) -> Result<DecodedReturn, CallError> {
    if sig.outputs.is_empty() {
        return Ok(DecodedReturn {
            function_name: sig.name.clone(),
            outputs: vec![],
        });
    }

    if data.is_empty() {
        // Calling an address with no code returns empty data instead of reverting.
        return Err(CallError::Decoding {
            function: sig.signature.clone(),
            reason: "empty return data (is the target a contract?)".into(),
        });
    }

    let decoded = DynSolType::Tuple(sig.output_types())
        .abi_decode_params(data)
        .map_err(|e| CallError::Decoding {
            function: sig.signature.clone(),
            reason: e.to_string(),
        })?;

    let values = match decoded {
        DynSolValue::Tuple(vals) => vals,
        other => vec![other],
    };

    let outputs = sig
        .outputs
        .iter()
        .zip(values)
        .map(|((name, _), val)| (name.clone(), normalize(val)))
        .collect();

    Ok(DecodedReturn {
        function_name: sig.name.clone(),
        outputs,
    })
}

/// Decode one correlated JSON-RPC response for `sig`.
///
/// Error payloads become [`CallError::Rpc`], with the revert reason appended
/// when the node supplied revert data; `errors` are the ABI's custom errors.
pub fn decode_response(
    sig: &FunctionSignature,
    resp: JsonRpcResponse,
    errors: &[AbiError],
) -> Result<DecodedReturn, CallError> {
    let result = resp.into_result().map_err(|err| {
        let mut message = rpc_error_message(&err);
        if let Some(reason) = err
            .data
            .as_ref()
            .and_then(revert_data)
            .and_then(|bytes| revert_reason(&bytes, errors))
        {
            message = format!("{message}: {reason}");
        }
        CallError::Rpc {
            function: sig.signature.clone(),
            code: err.code,
            message,
        }
    })?;

    let bytes = result_bytes(&result).map_err(|reason| CallError::Decoding {
        function: sig.signature.clone(),
        reason,
    })?;
    decode_return(sig, &bytes)
}

/// Parse the `result` field of an `eth_call` response as hex bytes.
fn result_bytes(result: &Value) -> Result<Vec<u8>, String> {
    let s = result
        .as_str()
        .ok_or_else(|| format!("expected hex string result, got {result}"))?;
    let stripped = s
        .strip_prefix("0x")
        .ok_or_else(|| format!("result '{s}' is missing the 0x prefix"))?;
    hex::decode(stripped).map_err(|e| format!("invalid hex result: {e}"))
}
