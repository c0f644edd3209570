//! Environment-file source layering.
//!
//! Configuration is merged from an ordered list of sources: the process
//! environment snapshot first, then the `.env` file. First source wins; a
//! file value never overwrites a value that is already present. The process
//! environment itself is never mutated.

use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

/// Variables every database bootstrap needs, in reporting order.
pub const REQUIRED_KEYS: [&str; 6] = [
    "DB_HOST",
    "DB_PORT",
    "DB_USER",
    "DB_PASSWORD",
    "DB_NAME",
    "DB_DIALECT",
];

/// Keys probed to decide whether the fallback re-parse should run.
const FALLBACK_PROBE_KEYS: [&str; 3] = ["DB_HOST", "DB_USER", "DB_NAME"];

pub type EnvMap = HashMap<String, String>;

/// Merge the environment file at `env_path` into `vars`, first-wins.
///
/// An absent or unreadable file is a warning, not an error: the process
/// environment may already carry everything required. If the primary parse
/// leaves any of the probe keys unset, the same file is re-read with a
/// tolerant line parser that injects only still-absent keys.
pub fn merge_env_file(env_path: &Path, vars: &mut EnvMap) {
    match dotenvy::from_path_iter(env_path) {
        Ok(iter) => {
            for item in iter {
                match item {
                    Ok((key, value)) => {
                        vars.entry(key).or_insert(value);
                    }
                    Err(err) => {
                        warn!(
                            path = %env_path.display(),
                            error = %err,
                            "stopped parsing env file at malformed entry"
                        );
                        break;
                    }
                }
            }
        }
        Err(err) => {
            warn!(
                path = %env_path.display(),
                error = %err,
                "env file not loaded; relying on process environment"
            );
        }
    }

    if FALLBACK_PROBE_KEYS.iter().any(|key| is_blank(vars.get(*key))) {
        fallback_merge(env_path, vars);
    }
}

/// Tolerant `KEY=VALUE` re-parse. Skips malformed lines instead of aborting
/// the file, and injects only keys that are still absent.
fn fallback_merge(env_path: &Path, vars: &mut EnvMap) {
    let contents = match std::fs::read_to_string(env_path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(path = %env_path.display(), error = %err, "fallback env parse failed");
            return;
        }
    };

    let mut injected = 0usize;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let key = key.strip_prefix("export ").map(str::trim).unwrap_or(key);
        if key.is_empty() {
            continue;
        }
        if !vars.contains_key(key) {
            vars.insert(key.to_string(), unquote(value).to_string());
            injected += 1;
        }
    }

    if injected > 0 {
        info!(path = %env_path.display(), injected, "loaded env file via fallback parse");
    }
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Absent or all-whitespace.
pub fn is_blank(value: Option<&String>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Required keys that are absent or blank, in declaration order.
pub fn missing_keys(vars: &EnvMap) -> Vec<String> {
    REQUIRED_KEYS
        .iter()
        .filter(|key| is_blank(vars.get(**key)))
        .map(|key| key.to_string())
        .collect()
}
