//! Panel workspace replay tool.
//!
//! Applies a JSON script of host events (panel opens, pointer gestures, key
//! presses, service responses, clock ticks) to a fresh workspace and prints
//! the resulting panels as JSON. Handy for reproducing layout bugs outside
//! the browser and for golden comparisons in CI.
//!
//! ```text
//! pw-replay [--config <config.json>] [<script.json>]
//! ```
//!
//! Reads the script from stdin when no path is given. Set `RUST_LOG=debug`
//! to trace every step.

mod script;

use pw_editor::WorkspaceConfig;
use script::{ReplayError, ReplayScript};
use std::io::Read;

struct Args {
    config: Option<String>,
    script: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config: None,
        script: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                args.config = Some(iter.next().ok_or("--config needs a file path")?);
            }
            "-h" | "--help" => {
                return Err("usage: pw-replay [--config <config.json>] [<script.json>]".into());
            }
            _ if args.script.is_none() => args.script = Some(arg),
            _ => return Err(format!("unexpected argument '{arg}'")),
        }
    }
    Ok(args)
}

fn run(args: Args) -> Result<String, ReplayError> {
    let source = match &args.script {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    let config = match &args.config {
        Some(path) => Some(WorkspaceConfig::from_json(&std::fs::read_to_string(path)?)?),
        None => None,
    };
    let workspace = ReplayScript::from_json(&source)?.run(config)?;
    Ok(serde_json::to_string_pretty(&workspace.panels())?)
}

fn main() {
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
    };
    match run(args) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("pw-replay error: {e}");
            std::process::exit(1);
        }
    }
}
