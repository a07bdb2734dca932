//! # chaincall-batch
//!
//! Batched `eth_call` execution. A list of [`CallSpec`]s becomes one
//! JSON-RPC batch; responses are matched back by correlation id and decoded
//! against the contract ABI, so the output always lines up with the input.
//!
//! ```text
//! CallSpec[] ─► encode ─► dispatch (one send_batch) ─► correlate ─► decode ─► CallResult[]
//! ```

pub mod caller;
pub mod config;
pub mod dispatch;
pub mod encode;

pub use caller::{execute, BatchCaller};
pub use chaincall_core::{BatchFailure, CallResult, CallSpec};
pub use config::{BatchConfig, FailureMode};
