//! `chaincall call`: run a calls file as one JSON-RPC batch.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};

use chaincall_batch::{BatchCaller, BatchConfig, CallResult, FailureMode};
use chaincall_core::CallSpec;
use chaincall_evm::{FunctionTable, OverloadPolicy};
use chaincall_http::{HttpClientConfig, HttpRpcClient, RetryConfig};

use crate::input::parse_calls;
use crate::load_abi;

pub struct CallArgs {
    pub url: String,
    pub abi: String,
    pub calls: String,
    pub isolate: bool,
    pub last_wins: bool,
    pub retries: u32,
    pub timeout: Duration,
    pub json: bool,
}

pub async fn run(args: CallArgs) -> Result<()> {
    let config = BatchConfig {
        failure_mode: if args.isolate {
            FailureMode::Isolated
        } else {
            FailureMode::AllOrNothing
        },
        overload_policy: if args.last_wins {
            OverloadPolicy::LastWins
        } else {
            OverloadPolicy::Reject
        },
    };

    let abi = load_abi(&args.abi)?;
    let table = FunctionTable::from_abi(&abi, config.overload_policy)?;

    let calls_text = std::fs::read_to_string(&args.calls)
        .with_context(|| format!("cannot read calls file {}", args.calls))?;
    let calls = parse_calls(&calls_text, &table)?;

    let client = HttpRpcClient::new(
        args.url,
        HttpClientConfig {
            retry: RetryConfig {
                max_retries: args.retries,
                ..RetryConfig::default()
            },
            request_timeout: args.timeout,
        },
    )?;

    tracing::info!(calls = calls.len(), functions = table.len(), "executing batch");
    let caller = BatchCaller::with_table(Arc::new(client), table, config);

    match caller.execute(&calls).await {
        Ok(results) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&results_json(&calls, &results))?);
            } else {
                print_results(&calls, &results);
            }
            Ok(())
        }
        Err(failure) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "failure": failure }))?
                );
            }
            Err(anyhow!("batch failed ({}): {}", failure.kind, failure.message))
        }
    }
}

fn results_json(calls: &[CallSpec], results: &[CallResult]) -> Value {
    let rows: Vec<Value> = calls
        .iter()
        .zip(results)
        .map(|(call, result)| match result {
            Ok(decoded) => json!({
                "address": call.contract_address,
                "function": call.function_name,
                "ok": decoded.outputs.iter().map(|(name, value)| json!({ "name": name, "value": value })).collect::<Vec<_>>(),
            }),
            Err(err) => json!({
                "address": call.contract_address,
                "function": call.function_name,
                "error": { "kind": err.kind(), "message": err.to_string() },
            }),
        })
        .collect();
    Value::Array(rows)
}

fn print_results(calls: &[CallSpec], results: &[CallResult]) {
    for (i, (call, result)) in calls.iter().zip(results).enumerate() {
        match result {
            Ok(decoded) => {
                println!("✓ [{i}] {} @ {}", call.function_name, call.contract_address);
                for (name, value) in &decoded.outputs {
                    println!("    {name}: {value}");
                }
            }
            Err(err) => {
                println!("✗ [{i}] {} @ {}", call.function_name, call.contract_address);
                println!("    {}: {err}", err.kind());
            }
        }
    }
}
