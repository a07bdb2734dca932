//! Function table: ABI JSON → name → resolved function signature.
//!
//! Built once per batch invocation and read-only afterwards. Every function
//! is reachable by its full signature (`balanceOf(address)`); bare names are
//! resolved according to the [`OverloadPolicy`].

use std::collections::HashMap;

use alloy_core::dyn_abi::DynSolType;
use alloy_dyn_abi::Specifier;
use alloy_json_abi::{Error as AbiError, Function, JsonAbi, Param};
use chaincall_core::error::CallError;
use serde::{Deserialize, Serialize};

/// How a bare function name that is declared more than once is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverloadPolicy {
    /// Overloaded names are ambiguous; calls must use the full signature.
    #[default]
    Reject,
    /// The overload declared last in the ABI wins.
    LastWins,
}

/// A function's selector plus resolved input and output types.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    /// Canonical signature, e.g. `transfer(address,uint256)`.
    pub signature: String,
    pub selector: [u8; 4],
    pub inputs: Vec<(String, DynSolType)>,
    pub outputs: Vec<(String, DynSolType)>,
}

impl FunctionSignature {
    /// Resolve all parameter types of an ABI function.
    pub fn from_function(func: &Function) -> Result<Self, CallError> {
        let inputs = resolve_params(&func.inputs, "arg").map_err(|reason| {
            CallError::InvalidAbi {
                reason: format!("{}: {reason}", func.signature()),
            }
        })?;
        let outputs = resolve_params(&func.outputs, "out").map_err(|reason| {
            CallError::InvalidAbi {
                reason: format!("{}: {reason}", func.signature()),
            }
        })?;

        Ok(Self {
            name: func.name.clone(),
            signature: func.signature(),
            selector: func.selector().0,
            inputs,
            outputs,
        })
    }

    /// Selector as a hex string ("0xaabbccdd").
    pub fn selector_hex(&self) -> String {
        format!("0x{}", hex::encode(self.selector))
    }

    pub fn output_types(&self) -> Vec<DynSolType> {
        self.outputs.iter().map(|(_, ty)| ty.clone()).collect()
    }
}

/// Resolve params to `(name, type)` pairs; unnamed params get `{prefix}{i}`.
fn resolve_params(params: &[Param], prefix: &str) -> Result<Vec<(String, DynSolType)>, String> {
    params
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let ty = p.resolve().map_err(|e| format!("param {i}: {e}"))?;
            let name = if p.name.is_empty() {
                format!("{prefix}{i}")
            } else {
                p.name.clone()
            };
            Ok((name, ty))
        })
        .collect()
}

/// Lookup table from function name (or full signature) to its signature.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: Vec<FunctionSignature>,
    by_name: HashMap<String, usize>,
    by_signature: HashMap<String, usize>,
    /// Bare names declared more than once, with their declaration count.
    ambiguous: HashMap<String, usize>,
    errors: Vec<AbiError>,
}

impl FunctionTable {
    /// Build the table from a parsed ABI.
    pub fn from_abi(abi: &JsonAbi, policy: OverloadPolicy) -> Result<Self, CallError> {
        let mut table = Self::default();

        for (name, overloads) in &abi.functions {
            for func in overloads {
                let sig = FunctionSignature::from_function(func)?;
                let idx = table.functions.len();
                table.by_signature.insert(sig.signature.clone(), idx);
                table.functions.push(sig);
            }

            let Some(last) = overloads.last() else {
                continue;
            };
            if overloads.len() == 1 || policy == OverloadPolicy::LastWins {
                if overloads.len() > 1 {
                    tracing::debug!(
                        function = %name,
                        overloads = overloads.len(),
                        chosen = %last.signature(),
                        "resolving overloaded name to last declaration"
                    );
                }
                if let Some(&idx) = table.by_signature.get(&last.signature()) {
                    table.by_name.insert(name.clone(), idx);
                }
            } else {
                table.ambiguous.insert(name.clone(), overloads.len());
            }
        }

        table.errors = abi.errors().cloned().collect();
        Ok(table)
    }

    /// Build the table from standard Ethereum ABI JSON text.
    pub fn from_abi_json(abi_json: &str, policy: OverloadPolicy) -> Result<Self, CallError> {
        let abi: JsonAbi = serde_json::from_str(abi_json).map_err(|e| CallError::InvalidAbi {
            reason: format!("invalid ABI JSON: {e}"),
        })?;
        Self::from_abi(&abi, policy)
    }

    /// Look up a function by bare name or by full signature.
    pub fn get(&self, key: &str) -> Result<&FunctionSignature, CallError> {
        let idx = if key.contains('(') {
            self.by_signature.get(key)
        } else {
            if let Some(&count) = self.ambiguous.get(key) {
                return Err(CallError::DuplicateFunction {
                    name: key.to_string(),
                    count,
                });
            }
            self.by_name.get(key)
        };
        idx.map(|&i| &self.functions[i])
            .ok_or_else(|| CallError::UnknownFunction {
                name: key.to_string(),
            })
    }

    /// All function signatures, sorted by name; overloads of one name keep
    /// their declaration order.
    pub fn functions(&self) -> &[FunctionSignature] {
        &self.functions
    }

    /// Bare names addressable without a full signature.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Custom errors declared in the ABI, used to explain reverts.
    pub fn custom_errors(&self) -> &[AbiError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
