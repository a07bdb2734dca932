//! Pipeline configuration.

use chaincall_evm::OverloadPolicy;
use serde::{Deserialize, Serialize};

/// How per-call failures affect the rest of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Any error replaces the whole output with a single `BatchFailure`.
    #[default]
    AllOrNothing,
    /// Encode/decode/RPC errors stay in their own slot. Transport and
    /// correlation failures still fail the batch.
    Isolated,
}

/// Configuration for a [`BatchCaller`](crate::BatchCaller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub failure_mode: FailureMode,
    #[serde(default)]
    pub overload_policy: OverloadPolicy,
}

impl BatchConfig {
    /// Default configuration with per-call failure isolation.
    pub fn isolated() -> Self {
        Self {
            failure_mode: FailureMode::Isolated,
            ..Self::default()
        }
    }
}
