//! Calldata encoder: `NormalizedValue` arguments → selector ++ ABI-encoded params.
//!
//! # Usage
//! ```ignore
//! let table = FunctionTable::from_abi_json(ERC20_ABI, OverloadPolicy::Reject)?;
//! let calldata = encode_call(table.get("balanceOf")?, &[
//!     NormalizedValue::Address("0xd8dA...".into()),
//! ])?;
//! ```

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address, B256, I256, U256};
use chaincall_core::{error::CallError, types::NormalizedValue};
use serde_json::Value;
use std::str::FromStr;

use crate::function_table::FunctionSignature;

/// Encode a function call to calldata bytes.
///
/// Returns `selector ++ abi_encode_params(args...)`, the calldata format
/// `eth_call` expects.
pub fn encode_call(sig: &FunctionSignature, args: &[NormalizedValue]) -> Result<Vec<u8>, CallError> {
    let encoding_error = |reason: String| CallError::Encoding {
        function: sig.signature.clone(),
        reason,
    };

    if args.len() != sig.inputs.len() {
        return Err(encoding_error(format!(
            "argument count mismatch: ABI has {}, got {}",
            sig.inputs.len(),
            args.len()
        )));
    }

    let mut dyn_values = Vec::with_capacity(args.len());
    for ((name, ty), arg) in sig.inputs.iter().zip(args) {
        let dyn_val =
            normalized_to_dyn_value(arg, ty).map_err(|e| encoding_error(format!("param '{name}': {e}")))?;
        dyn_values.push(dyn_val);
    }

    let mut calldata = sig.selector.to_vec();
    calldata.extend_from_slice(&DynSolValue::Tuple(dyn_values).abi_encode_params());
    Ok(calldata)
}

/// Parse a `0x`-prefixed 20-byte hex address.
pub fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s).map_err(|e| format!("invalid address '{s}': {e}"))
}

/// Convert a `NormalizedValue` to the alloy `DynSolValue` for the given expected type.
///
/// Numbers and addresses may also be supplied as strings (decimal or `0x` hex),
/// which is how they usually arrive from JSON.
pub fn normalized_to_dyn_value(
    val: &NormalizedValue,
    expected: &DynSolType,
) -> Result<DynSolValue, String> {
    match (val, expected) {
        (NormalizedValue::Bool(b), DynSolType::Bool) => Ok(DynSolValue::Bool(*b)),

        (NormalizedValue::Uint(u), DynSolType::Uint(bits)) => {
            checked_uint(U256::from(*u), *bits)
        }
        (
            NormalizedValue::BigUint(s) | NormalizedValue::Str(s),
            DynSolType::Uint(bits),
        ) => {
            let u = U256::from_str(s).map_err(|e| format!("uint parse '{s}': {e}"))?;
            checked_uint(u, *bits)
        }

        (NormalizedValue::Int(i), DynSolType::Int(bits)) => {
            let v = I256::try_from(*i).map_err(|e| e.to_string())?;
            checked_int(v, *bits)
        }
        (NormalizedValue::Uint(u), DynSolType::Int(bits)) => {
            let v = I256::try_from(*u).map_err(|e| e.to_string())?;
            checked_int(v, *bits)
        }
        (
            NormalizedValue::BigInt(s) | NormalizedValue::Str(s),
            DynSolType::Int(bits),
        ) => {
            let i = I256::from_str(s).map_err(|e| format!("int parse '{s}': {e}"))?;
            checked_int(i, *bits)
        }

        (NormalizedValue::Address(s) | NormalizedValue::Str(s), DynSolType::Address) => {
            Ok(DynSolValue::Address(parse_address(s)?))
        }

        (NormalizedValue::Bytes(b), DynSolType::Bytes) => Ok(DynSolValue::Bytes(b.clone())),
        (NormalizedValue::Str(s), DynSolType::Bytes) => Ok(DynSolValue::Bytes(hex_bytes(s)?)),

        (NormalizedValue::Bytes(b), DynSolType::FixedBytes(n)) => fixed_bytes(b, *n),
        (NormalizedValue::Str(s), DynSolType::FixedBytes(n)) => fixed_bytes(&hex_bytes(s)?, *n),

        (NormalizedValue::Str(s), DynSolType::String) => Ok(DynSolValue::String(s.clone())),

        (NormalizedValue::Array(elems), DynSolType::Array(inner)) => {
            let dyn_elems: Result<Vec<_>, _> =
                elems.iter().map(|e| normalized_to_dyn_value(e, inner)).collect();
            Ok(DynSolValue::Array(dyn_elems?))
        }

        (NormalizedValue::Array(elems), DynSolType::FixedArray(inner, len)) => {
            if elems.len() != *len {
                return Err(format!(
                    "fixed array length mismatch: expected {len}, got {}",
                    elems.len()
                ));
            }
            let dyn_elems: Result<Vec<_>, _> =
                elems.iter().map(|e| normalized_to_dyn_value(e, inner)).collect();
            Ok(DynSolValue::FixedArray(dyn_elems?))
        }

        (NormalizedValue::Tuple(fields), DynSolType::Tuple(types)) => {
            if fields.len() != types.len() {
                return Err(format!(
                    "tuple arity mismatch: expected {}, got {}",
                    types.len(),
                    fields.len()
                ));
            }
            let dyn_elems: Result<Vec<_>, _> = fields
                .iter()
                .zip(types.iter())
                .map(|((_, v), t)| normalized_to_dyn_value(v, t))
                .collect();
            Ok(DynSolValue::Tuple(dyn_elems?))
        }
        (NormalizedValue::Array(elems), DynSolType::Tuple(types)) => {
            if elems.len() != types.len() {
                return Err(format!(
                    "tuple arity mismatch: expected {}, got {}",
                    types.len(),
                    elems.len()
                ));
            }
            let dyn_elems: Result<Vec<_>, _> = elems
                .iter()
                .zip(types.iter())
                .map(|(v, t)| normalized_to_dyn_value(v, t))
                .collect();
            Ok(DynSolValue::Tuple(dyn_elems?))
        }

        _ => Err(format!("cannot convert {val:?} to {}", expected.sol_type_name())),
    }
}

/// Coerce a JSON value into a `NormalizedValue` shaped for `expected`.
///
/// Used by front-ends that accept call arguments as plain JSON: numbers may be
/// JSON numbers or strings, byte strings are `0x` hex, tuples are arrays.
pub fn value_from_json(v: &Value, expected: &DynSolType) -> Result<NormalizedValue, String> {
    match (v, expected) {
        (Value::Bool(b), DynSolType::Bool) => Ok(NormalizedValue::Bool(*b)),
        (Value::Number(n), DynSolType::Uint(_)) => n
            .as_u64()
            .map(|u| NormalizedValue::Uint(u as u128))
            .ok_or_else(|| format!("expected unsigned integer, got {n}")),
        (Value::Number(n), DynSolType::Int(_)) => n
            .as_i64()
            .map(|i| NormalizedValue::Int(i as i128))
            .ok_or_else(|| format!("expected integer, got {n}")),
        (Value::String(s), DynSolType::Uint(_)) => Ok(NormalizedValue::BigUint(s.clone())),
        (Value::String(s), DynSolType::Int(_)) => Ok(NormalizedValue::BigInt(s.clone())),
        (Value::String(s), DynSolType::Address) => Ok(NormalizedValue::Address(s.clone())),
        (Value::String(s), DynSolType::Bytes | DynSolType::FixedBytes(_)) => {
            Ok(NormalizedValue::Bytes(hex_bytes(s)?))
        }
        (Value::String(s), DynSolType::String) => Ok(NormalizedValue::Str(s.clone())),
        (Value::Array(items), DynSolType::Array(inner) | DynSolType::FixedArray(inner, _)) => items
            .iter()
            .map(|item| value_from_json(item, inner))
            .collect::<Result<Vec<_>, _>>()
            .map(NormalizedValue::Array),
        (Value::Array(items), DynSolType::Tuple(types)) => {
            if items.len() != types.len() {
                return Err(format!(
                    "tuple arity mismatch: expected {}, got {}",
                    types.len(),
                    items.len()
                ));
            }
            items
                .iter()
                .zip(types)
                .enumerate()
                .map(|(i, (item, ty))| Ok((i.to_string(), value_from_json(item, ty)?)))
                .collect::<Result<Vec<_>, String>>()
                .map(NormalizedValue::Tuple)
        }
        _ => Err(format!("cannot read {v} as {}", expected.sol_type_name())),
    }
}

fn checked_uint(u: U256, bits: usize) -> Result<DynSolValue, String> {
    if bits < 256 && u.bit_len() > bits {
        return Err(format!("value {u} does not fit in uint{bits}"));
    }
    Ok(DynSolValue::Uint(u, bits))
}

/// intN holds `[-2^(N-1), 2^(N-1) - 1]`.
fn checked_int(i: I256, bits: usize) -> Result<DynSolValue, String> {
    if bits < 256 {
        let magnitude = i.unsigned_abs();
        let bound = if i.is_negative() {
            magnitude.saturating_sub(U256::from(1u8))
        } else {
            magnitude
        };
        if bound.bit_len() > bits - 1 {
            return Err(format!("value {i} does not fit in int{bits}"));
        }
    }
    Ok(DynSolValue::Int(i, bits))
}

fn fixed_bytes(b: &[u8], n: usize) -> Result<DynSolValue, String> {
    if b.len() > n {
        return Err(format!("bytes{n}: got {} bytes", b.len()));
    }
    // Word is right-padded with zeros past the declared length.
    let mut word = [0u8; 32];
    word[..b.len()].copy_from_slice(b);
    Ok(DynSolValue::FixedBytes(B256::from(word), n))
}

fn hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(stripped).map_err(|e| format!("invalid hex '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function_table::{FunctionTable, OverloadPolicy};
    use chaincall_core::error::ErrorKind;

    const ERC20_ABI: &str = r#"[
        {
            "name": "transfer",
            "type": "function",
            "inputs": [
                {"name": "to", "type": "address"},
                {"name": "amount", "type": "uint256"}
            ],
            "outputs": [{"name": "", "type": "bool"}],
            "stateMutability": "nonpayable"
        },
        {
            "name": "totalSupply",
            "type": "function",
            "inputs": [],
            "outputs": [{"name": "", "type": "uint256"}],
            "stateMutability": "view"
        },
        {
            "name": "setName",
            "type": "function",
            "inputs": [{"name": "name", "type": "string"}],
            "outputs": [],
            "stateMutability": "nonpayable"
        },
        {
            "name": "setDecimals",
            "type": "function",
            "inputs": [{"name": "decimals", "type": "uint8"}],
            "outputs": [],
            "stateMutability": "nonpayable"
        }
    ]"#;

    fn table() -> FunctionTable {
        FunctionTable::from_abi_json(ERC20_ABI, OverloadPolicy::Reject).unwrap()
    }

    #[test]
    fn encode_transfer() {
        let table = table();
        let calldata = encode_call(
            table.get("transfer").unwrap(),
            &[
                NormalizedValue::Address("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045".into()),
                NormalizedValue::Uint(1_000_000),
            ],
        )
        .unwrap();

        // First 4 bytes = selector for transfer(address,uint256) = 0xa9059cbb
        assert_eq!(&calldata[..4], hex::decode("a9059cbb").unwrap().as_slice());
        // Total length = 4 + 32 + 32 = 68 bytes
        assert_eq!(calldata.len(), 68);
        assert_eq!(
            hex::encode(&calldata[36..]),
            "00000000000000000000000000000000000000000000000000000000000f4240"
        );
    }

    #[test]
    fn encode_no_args_is_selector_only() {
        let table = table();
        let calldata = encode_call(table.get("totalSupply").unwrap(), &[]).unwrap();
        assert_eq!(hex::encode(calldata), "18160ddd");
    }

    #[test]
    fn dynamic_args_use_params_encoding() {
        let table = table();
        let calldata =
            encode_call(table.get("setName").unwrap(), &[NormalizedValue::Str("abc".into())])
                .unwrap();
        // selector + offset word + length word + one padded data word
        assert_eq!(calldata.len(), 4 + 32 * 3);
        assert_eq!(calldata[4 + 31], 0x20);
        assert_eq!(calldata[4 + 63], 3);
    }

    #[test]
    fn wrong_arg_count_returns_error() {
        let table = table();
        let err = encode_call(table.get("transfer").unwrap(), &[NormalizedValue::Uint(1)])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
        assert!(err.to_string().contains("argument count mismatch"));
    }

    #[test]
    fn type_mismatch_returns_error() {
        let table = table();
        let err = encode_call(
            table.get("transfer").unwrap(),
            &[NormalizedValue::Bool(true), NormalizedValue::Uint(1)],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
        assert!(err.to_string().contains("param 'to'"));
    }

    #[test]
    fn narrow_uint_overflow_is_rejected() {
        let table = table();
        let sig = table.get("setDecimals").unwrap();
        assert!(encode_call(sig, &[NormalizedValue::Uint(255)]).is_ok());
        assert!(encode_call(sig, &[NormalizedValue::Uint(256)]).is_err());
    }

    #[test]
    fn narrow_int_range_is_enforced() {
        let int8 = DynSolType::Int(8);
        assert!(normalized_to_dyn_value(&NormalizedValue::Int(127), &int8).is_ok());
        assert!(normalized_to_dyn_value(&NormalizedValue::Int(-128), &int8).is_ok());

        let err = normalized_to_dyn_value(&NormalizedValue::Int(128), &int8).unwrap_err();
        assert!(err.contains("does not fit in int8"));
        assert!(normalized_to_dyn_value(&NormalizedValue::Int(-129), &int8).is_err());

        assert!(normalized_to_dyn_value(&NormalizedValue::Uint(128), &int8).is_err());
        assert!(normalized_to_dyn_value(&NormalizedValue::BigInt("-129".into()), &int8).is_err());
        assert!(normalized_to_dyn_value(&NormalizedValue::Str("-128".into()), &int8).is_ok());
        assert!(normalized_to_dyn_value(&NormalizedValue::Int(1000), &int8).is_err());
    }

    #[test]
    fn int256_accepts_full_range() {
        let v = normalized_to_dyn_value(&NormalizedValue::Int(i128::MIN), &DynSolType::Int(256))
            .unwrap();
        assert_eq!(v, DynSolValue::Int(I256::try_from(i128::MIN).unwrap(), 256));
    }

    #[test]
    fn string_numbers_and_addresses_are_coerced() {
        let v = normalized_to_dyn_value(&NormalizedValue::Str("0x10".into()), &DynSolType::Uint(256))
            .unwrap();
        assert_eq!(v, DynSolValue::Uint(U256::from(16u64), 256));

        let v = normalized_to_dyn_value(
            &NormalizedValue::Str("0x00000000000000000000000000000000000000bb".into()),
            &DynSolType::Address,
        )
        .unwrap();
        assert!(matches!(v, DynSolValue::Address(_)));

        assert!(normalized_to_dyn_value(&NormalizedValue::Str("0xBBB".into()), &DynSolType::Address)
            .is_err());
    }

    #[test]
    fn fixed_bytes_are_right_padded() {
        let v = normalized_to_dyn_value(&NormalizedValue::Bytes(vec![0xab]), &DynSolType::FixedBytes(4))
            .unwrap();
        match v {
            DynSolValue::FixedBytes(word, 4) => {
                assert_eq!(word[0], 0xab);
                assert!(word[1..].iter().all(|b| *b == 0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn json_arguments_are_coerced() {
        use serde_json::json;

        assert_eq!(
            value_from_json(&json!(7), &DynSolType::Uint(256)).unwrap(),
            NormalizedValue::Uint(7)
        );
        assert_eq!(
            value_from_json(&json!("1000000000000000000000000"), &DynSolType::Uint(256)).unwrap(),
            NormalizedValue::BigUint("1000000000000000000000000".into())
        );
        assert_eq!(
            value_from_json(&json!([1, true]), &DynSolType::Tuple(vec![DynSolType::Uint(8), DynSolType::Bool]))
                .unwrap(),
            NormalizedValue::Tuple(vec![
                ("0".into(), NormalizedValue::Uint(1)),
                ("1".into(), NormalizedValue::Bool(true)),
            ])
        );
        assert!(value_from_json(&json!(-1), &DynSolType::Uint(256)).is_err());
    }
}
