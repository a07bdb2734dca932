//! The call model: what callers ask for and what they get back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CallError;
use crate::request::RpcId;
use crate::types::NormalizedValue;

/// One read-only contract function invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSpec {
    /// Target contract, `0x`-prefixed hex.
    pub contract_address: String,
    /// Function name, or full signature such as `balanceOf(address)`.
    pub function_name: String,
    /// Arguments in declaration order.
    #[serde(default)]
    pub args: Vec<NormalizedValue>,
    /// Block to execute against; `None` means the node's latest block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
}

impl CallSpec {
    pub fn new(
        contract_address: impl Into<String>,
        function_name: impl Into<String>,
        args: Vec<NormalizedValue>,
    ) -> Self {
        Self {
            contract_address: contract_address.into(),
            function_name: function_name.into(),
            args,
            block_number: None,
        }
    }

    /// Pin this call to a specific block.
    pub fn at_block(mut self, block_number: u64) -> Self {
        self.block_number = Some(block_number);
        self
    }

    pub fn block_tag(&self) -> BlockTag {
        match self.block_number {
            Some(n) => BlockTag::Number(n),
            None => BlockTag::Latest,
        }
    }
}

/// Which chain state an `eth_call` executes against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockTag {
    Latest,
    Number(u64),
}

impl BlockTag {
    /// The JSON-RPC parameter: `"latest"` or a canonical hex quantity.
    pub fn to_param(self) -> Value {
        Value::String(self.to_string())
    }
}

impl std::fmt::Display for BlockTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Number(n) => write!(f, "{n:#x}"),
        }
    }
}

/// Join key between an outgoing request and its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelationId(pub u64);

impl CorrelationId {
    /// Id for the call at zero-based `position` in the input sequence.
    pub fn from_position(position: usize) -> Self {
        Self(position as u64)
    }
}

impl From<CorrelationId> for RpcId {
    fn from(id: CorrelationId) -> Self {
        RpcId::Number(id.0)
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decoded return values of one successful call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedReturn {
    pub function_name: String,
    /// Outputs in declaration order; unnamed outputs are called `out0`, `out1`, ...
    pub outputs: Vec<(String, NormalizedValue)>,
}

impl DecodedReturn {
    /// Look up an output by name.
    pub fn output(&self, name: &str) -> Option<&NormalizedValue> {
        self.outputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// The first output, which for most view functions is the only one.
    pub fn value(&self) -> Option<&NormalizedValue> {
        self.outputs.first().map(|(_, v)| v)
    }
}

/// Outcome of one call slot.
pub type CallResult = Result<DecodedReturn, CallError>;
