//! Calls file parsing.
//!
//! ```json
//! [
//!   { "address": "0x…", "function": "balanceOf", "args": ["0x…"] },
//!   { "address": "0x…", "function": "totalSupply", "block": 19000000 }
//! ]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use chaincall_core::{CallSpec, NormalizedValue};
use chaincall_evm::{value_from_json, FunctionTable};

#[derive(Debug, Deserialize)]
struct CallEntry {
    address: String,
    function: String,
    #[serde(default)]
    args: Vec<Value>,
    #[serde(default)]
    block: Option<u64>,
}

/// Parse a calls file, coercing JSON arguments to the declared input types.
///
/// Only a malformed file is an error here. Entries whose function is unknown,
/// whose argument count is wrong or whose arguments do not coerce keep their
/// raw arguments, so the batch reports the failure in that call's slot.
pub fn parse_calls(text: &str, table: &FunctionTable) -> Result<Vec<CallSpec>> {
    let entries: Vec<CallEntry> =
        serde_json::from_str(text).context("calls file must be a JSON array of call objects")?;

    Ok(entries
        .into_iter()
        .map(|entry| to_call_spec(entry, table))
        .collect())
}

fn to_call_spec(entry: CallEntry, table: &FunctionTable) -> CallSpec {
    let args = match table.get(&entry.function) {
        Ok(sig) if sig.inputs.len() == entry.args.len() => entry
            .args
            .iter()
            .zip(&sig.inputs)
            .map(|(arg, (name, ty))| {
                value_from_json(arg, ty).unwrap_or_else(|reason| {
                    tracing::debug!(function = %entry.function, param = %name, %reason, "argument left uncoerced");
                    raw_value(arg)
                })
            })
            .collect(),
        _ => entry.args.iter().map(raw_value).collect(),
    };

    let spec = CallSpec::new(entry.address, entry.function, args);
    match entry.block {
        Some(n) => spec.at_block(n),
        None => spec,
    }
}

/// Type-agnostic reading of a JSON argument.
fn raw_value(v: &Value) -> NormalizedValue {
    match v {
        Value::Bool(b) => NormalizedValue::Bool(*b),
        Value::Number(n) => match (n.as_u64(), n.as_i64()) {
            (Some(u), _) => NormalizedValue::Uint(u as u128),
            (None, Some(i)) => NormalizedValue::Int(i as i128),
            _ => NormalizedValue::Str(n.to_string()),
        },
        Value::String(s) => NormalizedValue::Str(s.clone()),
        Value::Array(items) => NormalizedValue::Array(items.iter().map(raw_value).collect()),
        Value::Object(_) => NormalizedValue::Str(v.to_string()),
        Value::Null => NormalizedValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaincall_core::{BlockTag, ErrorKind};
    use chaincall_evm::{encode_call, OverloadPolicy};

    const ABI: &str = r#"[
        {"type":"function","name":"balanceOf","stateMutability":"view",
         "inputs":[{"name":"owner","type":"address"}],
         "outputs":[{"name":"","type":"uint256"}]},
        {"type":"function","name":"totalSupply","stateMutability":"view",
         "inputs":[],"outputs":[{"name":"","type":"uint256"}]}
    ]"#;

    const HOLDER: &str = "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

    fn table() -> FunctionTable {
        FunctionTable::from_abi_json(ABI, OverloadPolicy::Reject).unwrap()
    }

    #[test]
    fn parses_args_and_block() {
        let text = format!(
            r#"[
                {{"address": "0x1111111111111111111111111111111111111111", "function": "balanceOf", "args": ["{HOLDER}"]}},
                {{"address": "0x1111111111111111111111111111111111111111", "function": "totalSupply", "block": 123}}
            ]"#
        );
        let calls = parse_calls(&text, &table()).unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args, vec![NormalizedValue::Address(HOLDER.into())]);
        assert_eq!(calls[0].block_tag(), BlockTag::Latest);
        assert!(calls[1].args.is_empty());
        assert_eq!(calls[1].block_tag().to_string(), "0x7b");
    }

    #[test]
    fn bad_entry_does_not_sink_the_file() {
        let text = r#"[
            {"address": "0x1111111111111111111111111111111111111111", "function": "totalSupply"},
            {"address": "0x1111111111111111111111111111111111111111", "function": "balanceOf"}
        ]"#;
        let table = table();
        let calls = parse_calls(text, &table).unwrap();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].args.is_empty());

        let err = encode_call(table.get("balanceOf").unwrap(), &calls[1].args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
        assert!(err.to_string().contains("argument count mismatch"));
    }

    #[test]
    fn uncoercible_argument_is_kept_raw() {
        let text = r#"[{"address": "0x1111111111111111111111111111111111111111", "function": "balanceOf", "args": [true]}]"#;
        let table = table();
        let calls = parse_calls(text, &table).unwrap();
        assert_eq!(calls[0].args, vec![NormalizedValue::Bool(true)]);

        let err = encode_call(table.get("balanceOf").unwrap(), &calls[0].args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
        assert!(err.to_string().contains("param 'owner'"));
    }

    #[test]
    fn unknown_function_passes_through() {
        let text = r#"[{"address": "0x1111111111111111111111111111111111111111", "function": "nope", "args": [1]}]"#;
        let calls = parse_calls(text, &table()).unwrap();
        assert_eq!(calls[0].function_name, "nope");
        assert_eq!(calls[0].args, vec![NormalizedValue::Uint(1)]);
    }

    #[test]
    fn not_an_array() {
        assert!(parse_calls(r#"{"address": "0x"}"#, &table()).is_err());
    }
}
