//! Centralized command-line argument handling.
//!
//! Logger debug gating (`--debug-<tag>`) and a handful of operational
//! flags read through here; everything else is configured via env vars
//! (see `config`).

use once_cell::sync::Lazy;
use std::env;
use std::sync::Mutex;

pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

pub fn has_arg(arg: &str) -> bool {
    get_cmd_args().iter().any(|a| a == arg)
}

pub fn get_arg_value(flag: &str) -> Option<String> {
    let args = get_cmd_args();
    for (i, arg) in args.iter().enumerate() {
        if arg == flag && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

pub fn is_run_enabled() -> bool {
    has_arg("--run")
}

pub fn is_reset_enabled() -> bool {
    has_arg("--reset")
}

pub fn is_force_enabled() -> bool {
    has_arg("--force")
}

pub fn print_help() {
    println!("core-pipeline - real-time launch-token telemetry pipeline");
    println!();
    println!("USAGE:");
    println!("    core-pipeline [FLAGS]");
    println!();
    println!("CORE FLAGS:");
    println!("    --run                     Start the feed/consumer/reconciler/score pipeline");
    println!("    --reset                   Drop and recreate the store's tables");
    println!("    --force                   Skip confirmation prompts (use with --reset)");
    println!("    --help, -h                Show this help message");
    println!();
    println!("DEBUG FLAGS (silence with a log level, enable a tag with --debug-<tag>):");
    println!("    --debug-feed              Feed client debug mode");
    println!("    --debug-consumer          Consumer worker debug mode");
    println!("    --debug-reconciler        Reconciler debug mode");
    println!("    --debug-store             Store debug mode");
    println!("    --debug-score             Technical score debug mode");
    println!("    --debug-holder            Holder score debug mode");
    println!("    --debug-rpc               Chain RPC debug mode");
    println!("    --debug-enrich            Enrichment API debug mode");
    println!("    --debug-budget            Analyzer budget debug mode");
    println!("    --debug-config            Config debug mode");
    println!("    --debug-shutdown          Shutdown coordinator debug mode");
    println!();
    println!("EXAMPLES:");
    println!("    core-pipeline --run                     # Start the pipeline normally");
    println!("    core-pipeline --run --debug-reconciler  # Start with reconciler debug logs");
    println!("    core-pipeline --reset --force           # Reset the store without confirmation");
    println!("    core-pipeline --help                    # Show this help");
}

pub fn get_enabled_debug_modes() -> Vec<String> {
    get_cmd_args()
        .iter()
        .filter_map(|arg| arg.strip_prefix("--debug-").map(str::to_string))
        .collect()
}

pub mod patterns {
    use super::*;

    pub fn is_help_requested() -> bool {
        has_arg("--help") || has_arg("-h")
    }

    pub fn is_quiet_mode() -> bool {
        has_arg("--quiet") || has_arg("-q")
    }

    pub fn is_verbose_mode() -> bool {
        has_arg("--verbose") || has_arg("-v")
    }
}
