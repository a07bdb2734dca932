//! Request encoder: one `CallSpec` → one `eth_call` JSON-RPC request.

use chaincall_core::{
    call::{CallSpec, CorrelationId},
    error::CallError,
    request::JsonRpcRequest,
};
use chaincall_evm::{encode_call, parse_address, FunctionSignature, FunctionTable};
use serde_json::json;

pub const ETH_CALL: &str = "eth_call";

/// A call that made it onto the wire.
#[derive(Debug, Clone)]
pub struct EncodedCall<'t> {
    pub id: CorrelationId,
    pub signature: &'t FunctionSignature,
    pub request: JsonRpcRequest,
}

/// Look up the call's function, encode its arguments and wrap them into an
/// `eth_call` request tagged with `id`.
pub fn encode_request<'t>(
    call: &CallSpec,
    id: CorrelationId,
    table: &'t FunctionTable,
) -> Result<EncodedCall<'t>, CallError> {
    let signature = table.get(&call.function_name)?;
    let to = parse_address(&call.contract_address).map_err(|reason| CallError::Encoding {
        function: signature.signature.clone(),
        reason,
    })?;
    let calldata = encode_call(signature, &call.args)?;

    let params = vec![
        json!({
            "to": to.to_checksum(None),
            "data": format!("0x{}", hex::encode(calldata)),
        }),
        call.block_tag().to_param(),
    ];

    Ok(EncodedCall {
        id,
        signature,
        request: JsonRpcRequest::new(id.0, ETH_CALL, params),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaincall_core::{error::ErrorKind, request::RpcId, types::NormalizedValue};
    use chaincall_evm::OverloadPolicy;

    const ABI: &str = r#"[
        {
            "name": "balanceOf",
            "type": "function",
            "inputs": [{"name": "owner", "type": "address"}],
            "outputs": [{"name": "", "type": "uint256"}],
            "stateMutability": "view"
        }
    ]"#;

    const TOKEN: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";
    const HOLDER: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    fn table() -> FunctionTable {
        FunctionTable::from_abi_json(ABI, OverloadPolicy::Reject).unwrap()
    }

    #[test]
    fn encodes_eth_call_with_latest_tag() {
        let table = table();
        let call = CallSpec::new(TOKEN, "balanceOf", vec![NormalizedValue::Address(HOLDER.into())]);
        let encoded = encode_request(&call, CorrelationId(7), &table).unwrap();

        let req = &encoded.request;
        assert_eq!(req.method, "eth_call");
        assert_eq!(req.id, RpcId::Number(7));
        assert_eq!(req.params.len(), 2);
        assert_eq!(req.params[0]["to"], "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
        assert_eq!(
            req.params[0]["data"],
            "0x70a08231000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045"
        );
        assert_eq!(req.params[1], "latest");
        assert_eq!(encoded.signature.signature, "balanceOf(address)");
    }

    #[test]
    fn block_number_becomes_hex_quantity() {
        let table = table();
        let call = CallSpec::new(TOKEN, "balanceOf", vec![NormalizedValue::Address(HOLDER.into())]);

        let encoded = encode_request(&call.clone().at_block(0), CorrelationId(0), &table).unwrap();
        assert_eq!(encoded.request.params[1], "0x0");

        let encoded = encode_request(&call.at_block(123), CorrelationId(0), &table).unwrap();
        assert_eq!(encoded.request.params[1], "0x7b");
    }

    #[test]
    fn unknown_function_and_bad_address() {
        let table = table();
        let err = encode_request(&CallSpec::new(TOKEN, "decimals", vec![]), CorrelationId(0), &table)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownFunction);

        let call = CallSpec::new("0xAAA", "balanceOf", vec![NormalizedValue::Address(HOLDER.into())]);
        let err = encode_request(&call, CorrelationId(0), &table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }
}
