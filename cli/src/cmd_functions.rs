//! `chaincall functions`: list what an ABI exposes to `call`.

use anyhow::Result;
use serde_json::json;

use chaincall_evm::{FunctionTable, OverloadPolicy};

use crate::load_abi;

pub fn run(abi_path: &str, as_json: bool) -> Result<()> {
    let abi = load_abi(abi_path)?;
    let table = FunctionTable::from_abi(&abi, OverloadPolicy::Reject)?;

    if as_json {
        let rows: Vec<_> = table
            .functions()
            .iter()
            .map(|f| {
                json!({
                    "name": f.name,
                    "signature": f.signature,
                    "selector": f.selector_hex(),
                    "outputs": f.outputs.iter().map(|(n, t)| format!("{} {n}", t.sol_type_name())).collect::<Vec<_>>(),
                    "addressable_by_name": table.get(&f.name).is_ok(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{} function(s)", table.len());
    for f in table.functions() {
        let outputs: Vec<_> = f
            .outputs
            .iter()
            .map(|(_, t)| t.sol_type_name().into_owned())
            .collect();
        let note = if table.get(&f.name).is_err() {
            "  [overloaded: use full signature]"
        } else {
            ""
        };
        println!(
            "  {}  {} -> ({}){}",
            f.selector_hex(),
            f.signature,
            outputs.join(","),
            note
        );
    }
    Ok(())
}
