//! CLI driver for Ergo P2PK vanity address search.
//!
//! Usage:
//!   vanity_search --pattern 9Trader --pattern 9Lucky --workers 8 \
//!       --num-indices 5 --max-results 3 --deadline-secs 600 --case-insensitive
//!
//! Flags:
//!   --pattern <str>        vanity prefix, repeatable (at least one required)
//!   --case-insensitive     match Base58 letters regardless of case
//!   --workers <n>          worker threads (default: available parallelism)
//!   --num-indices <n>      address indices tried per candidate seed (default 20)
//!   --batch-size <n>       work items per worker per batch round (default 2^18)
//!   --max-results <n>      stop after this many verified matches (default 1)
//!   --deadline-secs <n>    stop after this many seconds, regardless of matches

#![forbid(unsafe_code)]

use std::env;
use std::time::Duration;

use ergo_vanity_search::controller::{Controller, SearchConfigBuilder};
use ergo_vanity_search::controller::StopReason;
use tracing::info;

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

fn parse_repeated_flag(args: &[String], key: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            if let Some(v) = it.next() {
                out.push(v.clone());
            }
        }
    }
    out
}

fn parse_switch(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "vanity_search=info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();

    let patterns = parse_repeated_flag(&args, "--pattern");
    if patterns.is_empty() {
        anyhow::bail!("at least one --pattern is required");
    }
    let case_insensitive = parse_switch(&args, "--case-insensitive");
    let workers = parse_flag(&args, "--workers")
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(default_workers);
    let num_indices: u32 = parse_flag(&args, "--num-indices")
        .and_then(|s| s.parse().ok())
        .unwrap_or(20);
    let max_results: usize = parse_flag(&args, "--max-results")
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);
    let deadline_secs: Option<u64> = parse_flag(&args, "--deadline-secs").and_then(|s| s.parse().ok());

    let mut builder = SearchConfigBuilder::new()
        .patterns(patterns.iter().cloned())
        .case_insensitive(case_insensitive)
        .workers(workers)
        .num_indices(num_indices)
        .max_results(max_results);
    if let Some(n) = parse_flag(&args, "--batch-size").and_then(|s| s.parse().ok()) {
        builder = builder.batch_size(n);
    }
    if let Some(secs) = deadline_secs {
        builder = builder.deadline(Duration::from_secs(secs));
    }

    let config = builder.build()?;

    info!(
        patterns = ?patterns,
        case_insensitive,
        workers,
        num_indices,
        max_results,
        "starting vanity address search"
    );

    let mut controller = Controller::new(config);
    let outcome = controller.run();

    match outcome.stop_reason {
        StopReason::MaxResults => info!("stopping: reached max-results"),
        StopReason::Deadline => info!("stopping: deadline elapsed"),
        StopReason::Cancelled => info!("stopping: cancelled"),
    }

    if outcome.matches.is_empty() {
        println!("no matches found");
    }
    for m in &outcome.matches {
        println!("address:    {}", m.address);
        println!("mnemonic:   {}", m.mnemonic);
        println!("address_index: {}", m.address_index);
        println!("pattern:    {}", patterns[m.pattern_index as usize]);
        println!("private_key: {}", hex::encode(m.private_key));
        println!();
    }

    Ok(())
}
