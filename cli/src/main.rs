//! `http-call` - run one configured HTTP call for a build.
//!
//! Reads the call configuration from a JSON file, runs it against a JSON
//! property file, writes the properties back and prints every extracted
//! property as `key=value` on stdout. Logs go to stderr. The process exits
//! non-zero when the call fails the build.

mod properties;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use http_call_core::{HttpCall, HttpCallConfig, Invocation, UreqTransport};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "http-call")]
#[command(about = "Make an HTTP call and publish values extracted from the response")]
struct Args {
    /// JSON file with the call configuration (url, method, jsonPaths, ...)
    config: PathBuf,

    /// JSON property file read before and written after the call
    #[arg(short, long)]
    properties: Option<PathBuf>,

    /// Seed a property before the call, e.g. maven.execution.failed=true
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = properties::parse_assignment)]
    set: Vec<(String, String)>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    for line in run(args)? {
        println!("{line}");
    }
    Ok(())
}

/// Run one call and return the `key=value` lines for every extracted
/// property. An error means the build must fail.
fn run(args: Args) -> Result<Vec<String>> {
    let raw = fs::read_to_string(&args.config)
        .with_context(|| format!("reading configuration from {}", args.config.display()))?;
    let config = HttpCallConfig::from_json(&raw)
        .with_context(|| format!("parsing configuration in {}", args.config.display()))?;
    debug!(?config, "loaded configuration");

    let mut store = match &args.properties {
        Some(path) => properties::load(path)?,
        None => properties::Properties::new(),
    };
    store.extend(args.set);

    let outcome = HttpCall::new(config, UreqTransport::new()).execute(&mut store);

    // Written even on failure so earlier properties are not lost.
    if let Some(path) = &args.properties {
        properties::save(path, &store)?;
    }

    let lines = match outcome? {
        Invocation::Completed(result) => result
            .properties
            .iter()
            .filter_map(|name| store.get(name).map(|value| format!("{name}={value}")))
            .collect(),
        Invocation::Skipped | Invocation::Abandoned(_) => Vec::new(),
    };
    Ok(lines)
}
