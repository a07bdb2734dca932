//! ChainCall CLI: batch read-only contract calls from the command line.
//!
//! # Commands
//! ```text
//! chaincall call      --url <rpc> --abi <path.json> --calls <calls.json> [--isolate] [--json]
//! chaincall functions --abi <path.json>
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use alloy_json_abi::JsonAbi;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;

mod cmd_call;
mod cmd_functions;
mod input;
mod logging;

use logging::{init_tracing, LogConfig};

#[derive(Parser)]
#[command(
    name = "chaincall",
    about = "Batch read-only smart-contract calls over JSON-RPC",
    long_about = "
ChainCall CLI: send many eth_call reads as one JSON-RPC batch and decode the
results against the contract ABI. Results are printed in input order.

ENVIRONMENT VARIABLES:
  CHAINCALL_RPC_URL    default JSON-RPC endpoint for `call`
  RUST_LOG             log filter, overrides --log-level
",
    version
)]
struct Cli {
    /// Log level: trace | debug | info | warn | error
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Per-crate log level override, e.g. chaincall-http=debug (repeatable)
    #[arg(long = "log", global = true, value_parser = parse_component)]
    log_components: Vec<(String, String)>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a batch of read-only calls
    Call {
        /// JSON-RPC endpoint URL
        #[arg(long, env = "CHAINCALL_RPC_URL")]
        url: String,
        /// Path to the ABI JSON file (plain ABI array or artifact with an "abi" field)
        #[arg(long)]
        abi: String,
        /// Path to the calls JSON file
        #[arg(long)]
        calls: String,
        /// Keep failures in their own slot instead of failing the whole batch
        #[arg(long)]
        isolate: bool,
        /// Resolve overloaded names to the last declaration instead of rejecting them
        #[arg(long)]
        last_wins: bool,
        /// Retry attempts for transient transport failures
        #[arg(long, default_value_t = 3)]
        retries: u32,
        /// Per-request timeout in milliseconds
        #[arg(long, default_value_t = 30_000)]
        timeout_ms: u64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the callable functions of an ABI
    Functions {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_component(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(c, l)| (c.to_string(), l.to_string()))
        .ok_or_else(|| format!("expected <crate>=<level>, got '{s}'"))
}

/// Read an ABI file: either a bare ABI array or a build artifact carrying `abi`.
pub(crate) fn load_abi(path: impl AsRef<Path>) -> Result<JsonAbi> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read ABI file {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let abi = match value {
        Value::Object(mut obj) if obj.contains_key("abi") => obj.remove("abi").unwrap_or_default(),
        other => other,
    };
    serde_json::from_value(abi).with_context(|| format!("{} is not a valid ABI", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&LogConfig {
        level: cli.log_level.clone(),
        components: cli.log_components.iter().cloned().collect::<BTreeMap<_, _>>(),
        json: cli.log_json,
    });

    match cli.command {
        Commands::Call {
            url,
            abi,
            calls,
            isolate,
            last_wins,
            retries,
            timeout_ms,
            json,
        } => {
            cmd_call::run(cmd_call::CallArgs {
                url,
                abi,
                calls,
                isolate,
                last_wins,
                retries,
                timeout: Duration::from_millis(timeout_ms),
                json,
            })
            .await
        }
        Commands::Functions { abi, json } => cmd_functions::run(&abi, json),
    }
}
