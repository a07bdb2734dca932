//! Revert reason extraction for failed `eth_call`s.
//!
//! Nodes return revert data in the JSON-RPC error's `data` field. Decode
//! priority:
//! 1. `0x08c379a0` prefix → `Error(string)`
//! 2. `0x4e487b71` prefix → `Panic(uint256)`
//! 3. selector of a custom error declared in the ABI
//! 4. anything else → `None`

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_dyn_abi::Specifier;
use alloy_json_abi::Error as AbiError;
use serde_json::Value;

use crate::normalizer::normalize;

/// The 4-byte selector for `Error(string)`.
pub const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// The 4-byte selector for `Panic(uint256)`.
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Try to decode the revert data as an `Error(string)` payload.
pub fn decode_error_string(data: &[u8]) -> Option<String> {
    let payload = data.strip_prefix(&ERROR_STRING_SELECTOR[..])?;
    match DynSolType::Tuple(vec![DynSolType::String]).abi_decode_params(payload) {
        Ok(DynSolValue::Tuple(mut vals)) => match vals.pop() {
            Some(DynSolValue::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Decode `Panic(uint256)` revert data into `(code, meaning)`.
pub fn decode_panic(data: &[u8]) -> Option<(u64, &'static str)> {
    let payload = data.strip_prefix(&PANIC_SELECTOR[..])?;
    match DynSolType::Uint(256).abi_decode(payload) {
        Ok(DynSolValue::Uint(v, _)) => {
            let code = u64::try_from(v).ok()?;
            Some((code, panic_meaning(code)))
        }
        _ => None,
    }
}

/// Map a Solidity panic code to a human-readable description.
pub fn panic_meaning(code: u64) -> &'static str {
    match code {
        0x00 => "generic compiler-inserted panic",
        0x01 => "assert() called with false condition",
        0x11 => "arithmetic overflow or underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum value",
        0x22 => "corrupted storage byte array",
        0x31 => ".pop() on empty array",
        0x32 => "out-of-bounds array access",
        0x41 => "too much memory allocated (out of memory)",
        0x51 => "called zero-initialized internal function pointer",
        _ => "unknown panic code",
    }
}

/// Decode a custom error declared in the ABI, rendered as `Name(arg, ...)`.
pub fn decode_custom_error(data: &[u8], errors: &[AbiError]) -> Option<String> {
    let selector = data.get(..4)?;
    let err = errors.iter().find(|e| e.selector().as_slice() == selector)?;
    let types = err
        .inputs
        .iter()
        .map(|p| p.resolve())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    let args = match DynSolType::Tuple(types).abi_decode_params(&data[4..]).ok()? {
        DynSolValue::Tuple(vals) => vals,
        other => vec![other],
    };
    let rendered: Vec<String> = args.into_iter().map(|v| normalize(v).to_string()).collect();
    Some(format!("{}({})", err.name, rendered.join(", ")))
}

/// Human-readable revert reason for raw revert bytes.
pub fn revert_reason(data: &[u8], errors: &[AbiError]) -> Option<String> {
    if let Some(msg) = decode_error_string(data) {
        return Some(msg);
    }
    if let Some((code, meaning)) = decode_panic(data) {
        return Some(format!("panic 0x{code:02x}: {meaning}"));
    }
    decode_custom_error(data, errors)
}

/// Pull revert bytes out of a JSON-RPC error `data` field.
///
/// Accepts a bare hex string or an object wrapping one under `data`
/// (the shape some clients nest it in).
pub fn revert_data(data: &Value) -> Option<Vec<u8>> {
    match data {
        Value::String(s) => {
            let hex_str = s.strip_prefix("0x")?;
            hex::decode(hex_str).ok().filter(|b| !b.is_empty())
        }
        Value::Object(map) => map.get("data").and_then(revert_data),
        _ => None,
    }
}
