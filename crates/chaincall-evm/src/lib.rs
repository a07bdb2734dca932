//! # chaincall-evm
//!
//! EVM ABI support for ChainCall, built on alloy-rs:
//!
//! - [`FunctionTable`]: ABI JSON → function name → resolved signature
//! - [`encode_call`]: `NormalizedValue` arguments → calldata
//! - [`decode_response`]: `eth_call` result → named `NormalizedValue` outputs
//! - [`revert`]: `Error(string)`, `Panic(uint256)` and ABI custom error reasons

pub mod decoder;
pub mod encoder;
pub mod function_table;
pub mod normalizer;
pub mod revert;

pub use decoder::{decode_response, decode_return};
pub use encoder::{encode_call, normalized_to_dyn_value, parse_address, value_from_json};
pub use function_table::{FunctionSignature, FunctionTable, OverloadPolicy};
pub use revert::revert_reason;
