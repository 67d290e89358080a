//! Property file persistence for the CLI.
//!
//! The file is a flat JSON object of string values. A missing file is an
//! empty store, so the first invocation in a build can create it.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};

pub type Properties = BTreeMap<String, String>;

pub fn load(path: &Path) -> Result<Properties> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Properties::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("reading properties from {}", path.display()))
        }
    };
    if raw.trim().is_empty() {
        return Ok(Properties::new());
    }
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing properties in {}", path.display()))
}

pub fn save(path: &Path, properties: &Properties) -> Result<()> {
    let json = serde_json::to_string_pretty(properties)?;
    fs::write(path, json + "\n")
        .with_context(|| format!("writing properties to {}", path.display()))
}

/// Parse a `key=value` pair given on the command line.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
